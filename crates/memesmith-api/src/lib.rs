//! # memesmith-api
//!
//! HTTP API server for MemeSmith.
//!
//! - Image compositing: uploads with caption overlays, template renders
//! - Stripe checkout sessions and the payment webhook
//! - Profiles, saved memes, and the public gallery
//!
//! [`routes::router`] builds the axum `Router`; [`Server`] binds it and
//! shuts down on Ctrl-C or SIGTERM.

#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use routes::router;
pub use server::Server;
pub use state::AppState;
