//! # memesmith-cli
//!
//! Command-line front end for MemeSmith:
//! - `serve` runs the HTTP API
//! - `render` and `render-template` composite memes locally
//! - `templates` lists the catalog
//! - `config` inspects and edits the configuration file

pub mod cli;
pub mod commands;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction};
