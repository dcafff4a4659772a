//! Template catalog.
//!
//! The catalog is either the bundled set of classic templates or a
//! `memeTemplates.json` array loaded from disk. Lookups go through
//! [`TemplateId`] normalization, so `"Two Buttons"` and `"two-buttons"`
//! resolve to the same entry.

use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{MemeTemplate, TemplateId, TextPosition, TextPositions};
use crate::{Error, Result};

/// An ordered, id-indexed set of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    order: Vec<TemplateId>,
    by_id: BTreeMap<TemplateId, MemeTemplate>,
}

impl TemplateCatalog {
    /// Builds a catalog, rejecting duplicate ids and empty dimensions.
    pub fn new(templates: Vec<MemeTemplate>) -> Result<Self> {
        let mut catalog = Self::default();
        for template in templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    /// The bundled classic templates.
    pub fn builtin() -> Self {
        let templates = vec![
            MemeTemplate {
                text_positions: TextPositions {
                    top: TextPosition::new(900.0, 300.0),
                    bottom: TextPosition::new(900.0, 900.0),
                },
                ..MemeTemplate::with_default_anchors("drake", "Drake Hotline Bling", 1200, 1200)
            },
            MemeTemplate::with_default_anchors("distracted-boyfriend", "Distracted Boyfriend", 1200, 800),
            MemeTemplate::with_default_anchors("two-buttons", "Two Buttons", 600, 908),
            MemeTemplate::with_default_anchors("change-my-mind", "Change My Mind", 482, 361),
            MemeTemplate::with_default_anchors("expanding-brain", "Expanding Brain", 857, 1202).pro(),
            MemeTemplate::with_default_anchors("gru-plan", "Gru's Plan", 700, 449),
            MemeTemplate::with_default_anchors("this-is-fine", "This Is Fine", 580, 282),
            MemeTemplate::with_default_anchors("surprised-pikachu", "Surprised Pikachu", 1893, 1867).pro(),
        ];

        let mut catalog = Self::default();
        for template in templates {
            catalog.order.push(template.id.clone());
            catalog.by_id.insert(template.id.clone(), template);
        }
        catalog
    }

    /// Parses a `memeTemplates.json` array.
    pub fn from_json(json: &str) -> Result<Self> {
        let templates: Vec<MemeTemplate> = serde_json::from_str(json)?;
        Self::new(templates)
    }

    /// Loads a `memeTemplates.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let catalog = Self::from_json(&content)?;
        log::info!(
            "Loaded {} templates from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    fn insert(&mut self, template: MemeTemplate) -> Result<()> {
        if template.id.as_str().is_empty() {
            return Err(Error::validation_field("id", "template id must not be empty"));
        }
        if template.width == 0 || template.height == 0 {
            return Err(Error::validation_field(
                "width",
                format!(
                    "template '{}' has invalid dimensions {}x{}",
                    template.id, template.width, template.height
                ),
            ));
        }
        if self.by_id.contains_key(&template.id) {
            return Err(Error::validation_field(
                "id",
                format!("duplicate template id '{}'", template.id),
            ));
        }
        self.order.push(template.id.clone());
        self.by_id.insert(template.id.clone(), template);
        Ok(())
    }

    /// Looks a template up by (un-normalized) id.
    pub fn get(&self, id: &str) -> Result<&MemeTemplate> {
        self.by_id
            .get(&TemplateId::new(id))
            .ok_or_else(|| Error::TemplateNotFound { id: id.to_string() })
    }

    /// All templates in catalog order.
    pub fn list(&self) -> Vec<&MemeTemplate> {
        self.order.iter().filter_map(|id| self.by_id.get(id)).collect()
    }

    /// Templates a user can render without paying: everything for pro users,
    /// free templates otherwise.
    pub fn available_to(&self, is_pro: bool) -> Vec<&MemeTemplate> {
        self.list()
            .into_iter()
            .filter(|t| is_pro || !t.pro_only)
            .collect()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
