//! User profile rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::UserId;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account id, shared with the auth provider.
    pub id: UserId,
    /// Email address, when the provider exposes one.
    #[serde(default)]
    pub email: Option<String>,
    /// Public handle.
    #[serde(default)]
    pub username: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Pro status, set by the payment webhook.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_pro: bool,
    /// Remaining premium-render credits.
    #[serde(default, deserialize_with = "null_as_default")]
    pub credits: u32,
    /// Battle wins.
    #[serde(default, deserialize_with = "null_as_default")]
    pub wins: u32,
    /// Battle losses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub losses: u32,
    /// Avatar location.
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

impl UserProfile {
    /// A fresh, non-pro profile with no credits.
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self {
            id,
            email,
            username: None,
            created_at: Utc::now(),
            is_pro: false,
            credits: 0,
            wins: 0,
            losses: 0,
            profile_pic_url: None,
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New avatar location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.profile_pic_url.is_none()
    }

    /// Applies the update to a profile in place.
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(username) = &self.username {
            profile.username = Some(username.clone());
        }
        if let Some(url) = &self.profile_pic_url {
            profile.profile_pic_url = Some(url.clone());
        }
    }
}

// PostgREST sends explicit nulls for unset columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
