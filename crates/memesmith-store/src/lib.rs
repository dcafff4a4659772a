//! MemeSmith Store: persistence for user profiles and saved memes.
//!
//! [`UserStore`] and [`MemeStore`] describe the `users` and `memes` tables.
//! [`create_store`] picks [`PostgrestStore`] (Supabase) when a project URL is
//! configured and [`MemoryStore`] otherwise.

#![forbid(unsafe_code)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod postgrest;

pub use backend::{create_store, MemeStore, Store, UserStore, PAGE_SIZE};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
