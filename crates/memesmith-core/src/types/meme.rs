//! Saved meme records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MemeId, TemplateId, UserId};
use crate::{Error, Result};

/// Longest caption accepted on a saved meme.
pub const MAX_CAPTION_CHARS: usize = 200;

/// A row of the `memes` table: a rendered image paired with its source
/// template and caption text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
    /// Meme id.
    pub id: MemeId,
    /// Owner.
    pub user_id: UserId,
    /// Template the meme was made from, if any (uploads have none).
    #[serde(default)]
    pub template_id: Option<TemplateId>,
    /// Location of the rendered image.
    pub meme_url: String,
    /// Top caption.
    #[serde(default)]
    pub top_text: String,
    /// Bottom caption.
    #[serde(default)]
    pub bottom_text: String,
    /// Listed in the public gallery.
    #[serde(default)]
    pub is_public: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a meme record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeme {
    /// Source template.
    #[serde(default)]
    pub template_id: Option<TemplateId>,
    /// Location of the rendered image.
    pub meme_url: String,
    /// Top caption.
    #[serde(default)]
    pub top_text: String,
    /// Bottom caption.
    #[serde(default)]
    pub bottom_text: String,
    /// List in the public gallery.
    #[serde(default)]
    pub is_public: bool,
}

impl NewMeme {
    /// Checks the payload before it is stored.
    pub fn validate(&self) -> Result<()> {
        let url = self.meme_url.trim();
        if url.is_empty() {
            return Err(Error::validation_field("memeUrl", "must not be empty"));
        }
        if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')) {
            return Err(Error::validation_field(
                "memeUrl",
                "must be an http(s) URL or a site-relative path",
            ));
        }
        for (field, text) in [("topText", &self.top_text), ("bottomText", &self.bottom_text)] {
            if text.chars().count() > MAX_CAPTION_CHARS {
                return Err(Error::validation_field(
                    field,
                    format!("must be at most {MAX_CAPTION_CHARS} characters"),
                ));
            }
        }
        Ok(())
    }

    /// Turns the payload into a stored row owned by `user_id`.
    pub fn into_meme(self, user_id: UserId) -> Meme {
        Meme {
            id: MemeId::new(),
            user_id,
            template_id: self.template_id,
            meme_url: self.meme_url,
            top_text: self.top_text,
            bottom_text: self.bottom_text,
            is_public: self.is_public,
            created_at: Utc::now(),
        }
    }
}

/// One page of the public gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemePage {
    /// Memes on this page, newest first.
    pub memes: Vec<Meme>,
    /// Next page index, present only when this page was full.
    pub next_page: Option<u32>,
    /// Total number of public memes.
    pub total_count: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_meme(url: &str) -> NewMeme {
        NewMeme {
            template_id: Some(TemplateId::new("drake")),
            meme_url: url.to_string(),
            top_text: "writing tests".to_string(),
            bottom_text: "shipping anyway".to_string(),
            is_public: true,
        }
    }

    #[test]
    fn test_validate_accepts_urls_and_paths() {
        assert!(new_meme("https://cdn.example.com/m/1.png").validate().is_ok());
        assert!(new_meme("/storage/m/1.png").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let err = new_meme("  ").validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validate_rejects_data_url() {
        assert!(new_meme("data:image/png;base64,AAAA").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_long_caption() {
        let mut meme = new_meme("/m.png");
        meme.bottom_text = "a".repeat(MAX_CAPTION_CHARS + 1);
        assert!(meme.validate().is_err());
    }

    #[test]
    fn test_into_meme_sets_owner() {
        let meme = new_meme("/m.png").into_meme(UserId::new("u1"));
        assert_eq!(meme.user_id.as_str(), "u1");
        assert!(meme.is_public);
        assert_eq!(meme.template_id, Some(TemplateId::new("drake")));
    }

    #[test]
    fn test_new_meme_accepts_camel_case() {
        let json = r#"{"templateId":"Two Buttons","memeUrl":"/x.png","topText":"a","isPublic":true}"#;
        let meme: NewMeme = serde_json::from_str(json).unwrap();
        assert_eq!(meme.template_id.unwrap().as_str(), "two-buttons");
        assert_eq!(meme.bottom_text, "");
        assert!(meme.is_public);
    }
}
