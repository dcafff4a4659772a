//! Service configuration.
//!
//! Resolution order: built-in defaults, then a TOML file, then environment
//! variables. The file is found from an explicit path, `$MEMESMITH_CONFIG`,
//! or `<config dir>/memesmith/config.toml`, in that order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MEMESMITH_CONFIG";

/// Top-level MemeSmith configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemesmithConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Token validation settings.
    pub auth: AuthSettings,
    /// Supabase (users/memes storage) settings.
    pub supabase: SupabaseConfig,
    /// Stripe settings.
    pub stripe: StripeConfig,
    /// Compositing settings.
    pub render: RenderConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// CORS preflight cache lifetime.
    pub cors_max_age_secs: u64,
    /// Largest accepted request body (uploads included).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            cors_max_age_secs: 3600,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// When false, every request runs as a fixed development user.
    pub enabled: bool,
    /// Supabase project JWT secret (HS256).
    pub jwt_secret: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: String::new(),
            audience: "authenticated".to_string(),
        }
    }
}

/// Supabase settings. An empty `url` selects the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key; bypasses row-level security.
    pub service_role_key: String,
    /// Per-request timeout for PostgREST calls.
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl SupabaseConfig {
    /// Whether a remote project is configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Stripe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    /// Secret API key.
    pub secret_key: String,
    /// Webhook endpoint signing secret (`whsec_...`).
    pub webhook_secret: String,
    /// API base URL.
    pub api_base: String,
    /// ISO currency code for line items.
    pub currency: String,
    /// Price of the Pro Pack in minor units.
    pub pro_price_cents: u64,
    /// Credits in one credit pack.
    pub credit_pack_size: u32,
    /// Price of one credit pack in minor units.
    pub credit_pack_cents: u64,
    /// Accepted webhook timestamp skew.
    pub tolerance_secs: u64,
    /// Per-request timeout for Stripe API calls.
    pub timeout_secs: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            webhook_secret: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            pro_price_cents: 1999,
            credit_pack_size: 10,
            credit_pack_cents: 499,
            tolerance_secs: 300,
            timeout_secs: 30,
        }
    }
}

/// Compositing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding template base images.
    pub templates_dir: PathBuf,
    /// Optional `memeTemplates.json`; the bundled catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Watermark text stamped on uploads.
    pub watermark: String,
    /// Longest output edge for landscape uploads.
    pub max_width: u32,
    /// Longest output edge for portrait uploads.
    pub max_height: u32,
    /// Timeout for downloading remote template images.
    pub fetch_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("public/memes"),
            catalog_path: None,
            watermark: "MemeSmith.com".to_string(),
            max_width: 1080,
            max_height: 1920,
            fetch_timeout_secs: 15,
        }
    }
}

impl MemesmithConfig {
    /// Project name, used for the config directory.
    pub fn project_name() -> &'static str {
        "memesmith"
    }

    /// Default config file location for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::project_name()).join("config.toml"))
    }

    /// Resolve which config file applies.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        Self::default_config_path()
    }

    /// Load configuration: defaults, then the config file if it exists, then
    /// environment overrides.
    ///
    /// An explicitly named file that does not exist is an error; a missing
    /// default file is not.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "Config file does not exist at {}",
                    path.display()
                )));
            }
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MEMESMITH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MEMESMITH_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => log::warn!("Ignoring invalid MEMESMITH_PORT '{port}': {e}"),
            }
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase.url = url;
        }
        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = key;
        }
        if let Some(secret) = lookup("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(key) = lookup("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = key;
        }
        if let Some(secret) = lookup("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = secret;
        }
        if let Some(dir) = lookup("MEMESMITH_TEMPLATES_DIR") {
            self.render.templates_dir = PathBuf::from(dir);
        }
    }

    /// Check settings that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        if self.auth.enabled && self.auth.jwt_secret.is_empty() {
            return Err(Error::config(
                "auth.enabled is true but no JWT secret is set (SUPABASE_JWT_SECRET)",
            ));
        }
        if self.supabase.is_configured() && self.supabase.service_role_key.is_empty() {
            return Err(Error::config(
                "supabase.url is set but supabase.service_role_key is empty",
            ));
        }
        if self.render.max_width == 0 || self.render.max_height == 0 {
            return Err(Error::config("render.max_width and render.max_height must be positive"));
        }
        if self.supabase.timeout_secs == 0
            || self.stripe.timeout_secs == 0
            || self.render.fetch_timeout_secs == 0
        {
            return Err(Error::config("HTTP timeouts must be positive"));
        }
        Ok(())
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The settings that have environment variable equivalents, secrets included.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("MEMESMITH_HOST".to_string(), self.server.host.clone()),
            ("MEMESMITH_PORT".to_string(), self.server.port.to_string()),
            ("SUPABASE_URL".to_string(), self.supabase.url.clone()),
            (
                "SUPABASE_SERVICE_ROLE_KEY".to_string(),
                self.supabase.service_role_key.clone(),
            ),
            ("SUPABASE_JWT_SECRET".to_string(), self.auth.jwt_secret.clone()),
            ("STRIPE_SECRET_KEY".to_string(), self.stripe.secret_key.clone()),
            (
                "STRIPE_WEBHOOK_SECRET".to_string(),
                self.stripe.webhook_secret.clone(),
            ),
            (
                "MEMESMITH_TEMPLATES_DIR".to_string(),
                self.render.templates_dir.display().to_string(),
            ),
        ]
    }
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    let mut current = value;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(Error::config("Empty key path"));
    };

    let mut current = root;
    for part in parents {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?;
    table.insert(last.to_string(), value);
    Ok(())
}

/// Parse a string into a TOML value: bool, then integer, then float, then string.
pub fn parse_value(s: &str) -> toml::Value {
    if s == "true" {
        return toml::Value::Boolean(true);
    }
    if s == "false" {
        return toml::Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}
