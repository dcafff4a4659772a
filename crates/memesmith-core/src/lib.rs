//! MemeSmith Core: shared types, template catalog, configuration, and errors.
//!
//! This crate has no internal MemeSmith dependencies. Everything else in the
//! workspace builds on it.
//!
//! # Modules
//!
//! - [`types`]: ids, templates, user profiles, memes, effects
//! - [`catalog`]: the template catalog
//! - [`entitlement`]: premium feature gating
//! - [`config`]: layered TOML + environment configuration
//! - [`error`]: error type and `Result` alias

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod types;

pub use catalog::TemplateCatalog;
pub use config::MemesmithConfig;
pub use entitlement::Entitlement;
pub use error::{Error, Result};
pub use types::{
    normalize_id, Effect, Meme, MemeId, MemePage, MemeTemplate, NewMeme, ProfileUpdate,
    TemplateId, TextPosition, TextPositions, UserId, UserProfile,
};
