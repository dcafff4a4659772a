//! Identifier types for users, memes, and templates.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of an account in the auth provider.
///
/// Carried verbatim from the token's `sub` claim; Supabase issues UUIDs but
/// nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user ID from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use memesmith_core::UserId;
    ///
    /// let id = UserId::new("8f14e45f-ceea-467f-a0e6-1f4c0c7b1a2d");
    /// assert_eq!(id.as_str(), "8f14e45f-ceea-467f-a0e6-1f4c0c7b1a2d");
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Returns the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a saved meme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemeId(Uuid);

impl MemeId {
    /// Creates a new random meme ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a meme ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MemeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MemeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for MemeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a meme template, always in normalized kebab-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a template ID, normalizing it with [`normalize_id`].
    ///
    /// ```
    /// use memesmith_core::TemplateId;
    ///
    /// assert_eq!(TemplateId::new("Distracted Boyfriend").as_str(), "distracted-boyfriend");
    /// ```
    pub fn new(id: &str) -> Self {
        Self(normalize_id(id))
    }

    /// Returns the template ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<TemplateId> for String {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}

/// Normalize an identifier to lowercase kebab-case.
///
/// Trims, lowercases, turns underscores into separators, and collapses runs
/// of whitespace into single hyphens.
///
/// ```
/// use memesmith_core::normalize_id;
///
/// assert_eq!(normalize_id("Two_Buttons"), "two-buttons");
/// assert_eq!(normalize_id("  This   Is Fine "), "this-is-fine");
/// ```
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("-")
}
