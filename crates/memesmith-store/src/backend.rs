//! Store traits and backend selection.
//!
//! # Backends
//!
//! - `PostgrestStore`: Supabase tables over the PostgREST API
//! - `MemoryStore`: in-process maps, for tests and local development

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memesmith_core::config::SupabaseConfig;
use memesmith_core::{Meme, MemeId, MemePage, NewMeme, ProfileUpdate, UserId, UserProfile};

use crate::memory::MemoryStore;
use crate::postgrest::PostgrestStore;
use crate::{Result, StoreError};

/// Gallery page size.
pub const PAGE_SIZE: u32 = 12;

/// Access to the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a profile.
    async fn get_user(&self, id: &UserId) -> Result<UserProfile>;

    /// Insert a profile. Fails with `Conflict` if the id exists.
    async fn create_user(&self, profile: UserProfile) -> Result<UserProfile>;

    /// Apply a partial update and return the new row.
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<UserProfile>;

    /// Set the pro flag.
    async fn set_pro(&self, id: &UserId, is_pro: bool) -> Result<()>;

    /// Add credits and return the new balance.
    async fn add_credits(&self, id: &UserId, credits: u32) -> Result<u32>;

    /// Take one credit and return the remaining balance.
    async fn spend_credit(&self, id: &UserId) -> Result<u32>;

    /// Mark a payment event as handled. Returns `false` if it already was.
    async fn record_event(&self, event_id: &str) -> Result<bool>;

    /// Drop a recorded event so a redelivery is handled again.
    async fn forget_event(&self, event_id: &str) -> Result<()>;

    /// Fetch a profile, creating it on first access.
    ///
    /// A concurrent first request may create the row between the read and
    /// the insert; the row it created is returned.
    async fn get_or_create_user(&self, id: &UserId, email: Option<String>) -> Result<UserProfile> {
        match self.get_user(id).await {
            Err(e) if e.is_not_found() => {
                log::info!("Creating profile for {id}");
                match self.create_user(UserProfile::new(id.clone(), email)).await {
                    Err(StoreError::Conflict(_)) => {
                        log::debug!("Profile for {id} created concurrently");
                        self.get_user(id).await
                    }
                    other => other,
                }
            }
            other => other,
        }
    }
}

/// Access to the `memes` table.
#[async_trait]
pub trait MemeStore: Send + Sync {
    /// Save a meme owned by `user`.
    async fn create_meme(&self, user: &UserId, meme: NewMeme) -> Result<Meme>;

    /// Fetch one meme.
    async fn get_meme(&self, id: &MemeId) -> Result<Meme>;

    /// A user's memes, newest first.
    async fn list_user_memes(&self, user: &UserId) -> Result<Vec<Meme>>;

    /// One page of public memes, newest first. Pages start at 0.
    async fn list_public(&self, page: u32) -> Result<MemePage>;

    /// Delete a meme. Only its owner may.
    async fn delete_meme(&self, id: &MemeId, requester: &UserId) -> Result<()>;
}

/// Both tables behind one handle.
pub trait Store: UserStore + MemeStore {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Pick a backend: Supabase when a project URL is configured, memory
/// otherwise.
pub fn create_store(config: &SupabaseConfig) -> Result<Arc<dyn Store>> {
    if config.is_configured() {
        log::info!("Using Supabase store at {}", config.url);
        Ok(Arc::new(PostgrestStore::new(
            &config.url,
            &config.service_role_key,
            Duration::from_secs(config.timeout_secs),
        )?))
    } else {
        log::warn!("Supabase not configured; using in-memory store");
        Ok(Arc::new(MemoryStore::new()))
    }
}

/// Build a gallery page from up to [`PAGE_SIZE`] rows.
pub(crate) fn page_of(memes: Vec<Meme>, page: u32, total_count: u64) -> MemePage {
    let next_page = (memes.len() as u32 == PAGE_SIZE).then(|| page.saturating_add(1));
    MemePage {
        memes,
        next_page,
        total_count,
    }
}
