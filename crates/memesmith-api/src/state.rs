//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use memesmith_billing::StripeClient;
use memesmith_core::{MemeTemplate, MemesmithConfig, TemplateCatalog};
use memesmith_store::Store;

use crate::error::{ApiError, Result};

/// Everything a handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<MemesmithConfig>,
    /// Template catalog.
    pub catalog: Arc<TemplateCatalog>,
    /// Users and memes.
    pub store: Arc<dyn Store>,
    /// Stripe client; `None` when no secret key is configured.
    pub stripe: Option<StripeClient>,
    /// Client for fetching remote template images.
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble state from parts.
    pub fn new(
        config: MemesmithConfig,
        catalog: TemplateCatalog,
        store: Arc<dyn Store>,
    ) -> Result<Self> {
        let stripe = match StripeClient::new(config.stripe.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Stripe checkout disabled: {e}");
                None
            }
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.render.fetch_timeout_secs))
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            store,
            stripe,
            http,
        })
    }

    /// Build state from configuration: load the catalog and open the store.
    pub fn from_config(config: MemesmithConfig) -> Result<Self> {
        let catalog = match &config.render.catalog_path {
            Some(path) => TemplateCatalog::load(path)?,
            None => TemplateCatalog::builtin(),
        };
        tracing::info!(templates = catalog.len(), "Template catalog loaded");
        let store = memesmith_store::create_store(&config.supabase)?;
        Self::new(config, catalog, store)
    }

    /// Local path of a template's base image.
    pub fn template_path(&self, template: &MemeTemplate) -> Option<PathBuf> {
        template
            .file_name()
            .map(|name| self.config.render.templates_dir.join(name))
    }

    /// Read a template's base image, from disk or over HTTP.
    pub async fn template_image(&self, template: &MemeTemplate) -> Result<Vec<u8>> {
        if template.is_remote() {
            let resp = self
                .http
                .get(&template.url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| ApiError::internal(format!("Failed to fetch template image: {e}")))?;
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| ApiError::internal(format!("Failed to fetch template image: {e}")))?;
            return Ok(bytes.to_vec());
        }

        let path = self.template_path(template).ok_or_else(|| {
            ApiError::internal(format!("Template {} has no image path", template.id))
        })?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ApiError::NotFound(format!("Template image not found: {}", path.display()))
            } else {
                ApiError::internal(format!("Failed to read {}: {e}", path.display()))
            }
        })
    }
}
