//! In-memory store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use memesmith_core::{Meme, MemeId, MemePage, NewMeme, ProfileUpdate, UserId, UserProfile};
use tokio::sync::RwLock;

use crate::backend::{page_of, MemeStore, Store, UserStore, PAGE_SIZE};
use crate::{Result, StoreError};

/// Users and memes held in process memory.
///
/// Memes are kept in insertion order so rows created within the same clock
/// tick still list newest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, UserProfile>>,
    memes: RwLock<Vec<Meme>>,
    events: RwLock<HashSet<String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<'a>(memes: impl DoubleEndedIterator<Item = &'a Meme>) -> Vec<Meme> {
    let mut out: Vec<Meme> = memes.rev().cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<UserProfile> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn create_user(&self, profile: UserProfile) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        if users.contains_key(&profile.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", profile.id)));
        }
        users.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        update.apply(profile);
        Ok(profile.clone())
    }

    async fn set_pro(&self, id: &UserId, is_pro: bool) -> Result<()> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        profile.is_pro = is_pro;
        Ok(())
    }

    async fn add_credits(&self, id: &UserId, credits: u32) -> Result<u32> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        profile.credits = profile.credits.saturating_add(credits);
        Ok(profile.credits)
    }

    async fn spend_credit(&self, id: &UserId) -> Result<u32> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        if profile.credits == 0 {
            return Err(StoreError::InsufficientCredits(id.to_string()));
        }
        profile.credits -= 1;
        Ok(profile.credits)
    }

    async fn record_event(&self, event_id: &str) -> Result<bool> {
        Ok(self.events.write().await.insert(event_id.to_string()))
    }

    async fn forget_event(&self, event_id: &str) -> Result<()> {
        self.events.write().await.remove(event_id);
        Ok(())
    }
}

#[async_trait]
impl MemeStore for MemoryStore {
    async fn create_meme(&self, user: &UserId, meme: NewMeme) -> Result<Meme> {
        let row = meme.into_meme(user.clone());
        self.memes.write().await.push(row.clone());
        Ok(row)
    }

    async fn get_meme(&self, id: &MemeId) -> Result<Meme> {
        self.memes
            .read()
            .await
            .iter()
            .find(|m| m.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("meme", id))
    }

    async fn list_user_memes(&self, user: &UserId) -> Result<Vec<Meme>> {
        let memes = self.memes.read().await;
        Ok(newest_first(memes.iter().filter(|m| m.user_id == *user)))
    }

    async fn list_public(&self, page: u32) -> Result<MemePage> {
        let memes = self.memes.read().await;
        let public = newest_first(memes.iter().filter(|m| m.is_public));
        let total = public.len() as u64;
        let rows = public
            .into_iter()
            .skip(page as usize * PAGE_SIZE as usize)
            .take(PAGE_SIZE as usize)
            .collect();
        Ok(page_of(rows, page, total))
    }

    async fn delete_meme(&self, id: &MemeId, requester: &UserId) -> Result<()> {
        let mut memes = self.memes.write().await;
        let idx = memes
            .iter()
            .position(|m| m.id == *id)
            .ok_or_else(|| StoreError::not_found("meme", id))?;
        if memes[idx].user_id != *requester {
            return Err(StoreError::Forbidden(format!(
                "meme {id} belongs to another user"
            )));
        }
        memes.remove(idx);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }
}
