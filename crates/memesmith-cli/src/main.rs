//! `memesmith` binary entry point.

use clap::Parser;
use memesmith_cli::config_handlers::handle_config_command;
use memesmith_cli::{commands, Cli, Command};
use memesmith_core::MemesmithConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else {
        "info,memesmith=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Serve {
            host,
            port,
            no_auth,
        } => {
            let config = MemesmithConfig::load(config_path)?;
            commands::serve(config, host, port, no_auth).await?;
        }
        Command::Render {
            input,
            output,
            settings,
            texts,
            no_watermark,
        } => {
            let config = MemesmithConfig::load(config_path)?;
            commands::render(
                &config,
                &input,
                &output,
                settings.as_deref(),
                &texts,
                no_watermark,
            )?;
        }
        Command::RenderTemplate {
            template,
            output,
            top,
            bottom,
            effect,
            image,
        } => {
            let config = MemesmithConfig::load(config_path)?;
            commands::render_template_cmd(
                &config,
                &template,
                &output,
                &top,
                &bottom,
                &effect,
                image.as_deref(),
            )?;
        }
        Command::Templates { json, free_only } => {
            let config = MemesmithConfig::load(config_path)?;
            commands::templates(&config, json, free_only)?;
        }
    }

    Ok(())
}
