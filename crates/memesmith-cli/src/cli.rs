//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MemeSmith - meme compositing and payments backend
#[derive(Parser, Debug)]
#[command(name = "memesmith", version)]
#[command(about = "MemeSmith meme compositing and payments backend", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Run every request as the development user
        #[arg(long)]
        no_auth: bool,
    },

    /// Caption a local image the way uploads are processed
    Render {
        /// Source image
        input: PathBuf,

        /// Where to write the result; `.jpg` selects JPEG
        #[arg(short, long)]
        output: PathBuf,

        /// Overlay settings JSON, or `@path` to read it from a file
        #[arg(short, long)]
        settings: Option<String>,

        /// Caption with default styling; repeat for more lines
        #[arg(short, long = "text")]
        texts: Vec<String>,

        /// Skip the watermark
        #[arg(long)]
        no_watermark: bool,
    },

    /// Render a catalog template with top and bottom captions
    RenderTemplate {
        /// Template id
        template: String,

        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,

        /// Top caption
        #[arg(long, default_value = "")]
        top: String,

        /// Bottom caption
        #[arg(long, default_value = "")]
        bottom: String,

        /// Caption effect: none, glow, or golden
        #[arg(long, default_value = "none")]
        effect: String,

        /// Base image to use instead of the templates directory
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List catalog templates
    Templates {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Hide pro-only templates
        #[arg(long)]
        free_only: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `memesmith config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print the effective configuration with secrets masked
    Show,
    /// Get a value by dotted key
    Get {
        /// Dotted key, e.g. `server.port`
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key, e.g. `server.port`
        key: String,
        /// New value; booleans and numbers are detected
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file instead of the default location
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print settings as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
