//! Handlers for the non-config commands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use memesmith_api::Server;
use memesmith_core::{Effect, MemeTemplate, MemesmithConfig, TemplateCatalog};
use memesmith_render::{
    process_upload, render_template, OutputFormat, OverlaySettings, TextOverlay, UploadOptions,
    Watermark,
};

/// `memesmith serve`
pub async fn serve(
    mut config: MemesmithConfig,
    host: Option<String>,
    port: Option<u16>,
    no_auth: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if no_auth {
        tracing::warn!("Authentication disabled; every request runs as the development user");
        config.auth.enabled = false;
    }
    config.validate()?;

    let server = Server::new(config)?;
    tracing::info!("Starting MemeSmith API on {}", server.address());
    server.run().await?;
    Ok(())
}

/// `memesmith render`
pub fn render(
    config: &MemesmithConfig,
    input: &Path,
    output: &Path,
    settings: Option<&str>,
    texts: &[String],
    no_watermark: bool,
) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let mut overlays = load_settings(settings)?;
    overlays
        .texts
        .extend(texts.iter().map(|t| TextOverlay::new(t.as_str())));
    stack_default_positions(&mut overlays);

    let options = UploadOptions {
        max_width: config.render.max_width,
        max_height: config.render.max_height,
        watermark: (!no_watermark).then(|| Watermark::upload(config.render.watermark.clone())),
        format: output_format(output),
    };

    let encoded = process_upload(&bytes, &overlays, &options)?;
    write_output(output, &encoded)?;
    println!("Wrote {} ({} bytes)", output.display(), encoded.len());
    Ok(())
}

/// `memesmith render-template`
pub fn render_template_cmd(
    config: &MemesmithConfig,
    template_id: &str,
    output: &Path,
    top: &str,
    bottom: &str,
    effect: &str,
    image: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(config)?;
    let template = catalog.get(template_id)?;
    let effect: Effect = effect.parse()?;
    log::debug!("Rendering template {} with effect {effect}", template.id);

    let base_path = match image {
        Some(path) => path.to_path_buf(),
        None => template_image_path(config, template)?,
    };
    let base = std::fs::read(&base_path)
        .with_context(|| format!("reading template image {}", base_path.display()))?;

    let png = render_template(
        template,
        &base,
        top,
        bottom,
        effect,
        &Watermark::template(&config.render.watermark),
    )?;
    write_output(output, &png)?;
    println!("Wrote {} ({}x{})", output.display(), template.width, template.height);
    Ok(())
}

/// `memesmith templates`
pub fn templates(config: &MemesmithConfig, json: bool, free_only: bool) -> Result<()> {
    let catalog = load_catalog(config)?;
    let list = if free_only {
        catalog.available_to(false)
    } else {
        catalog.list()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{:<24} {:<28} {:>11}  PRO", "ID", "NAME", "SIZE");
    for t in list {
        println!(
            "{:<24} {:<28} {:>11}  {}",
            t.id.as_str(),
            t.name,
            format!("{}x{}", t.width, t.height),
            if t.pro_only { "yes" } else { "" }
        );
    }
    Ok(())
}

/// The configured catalog, or the bundled one.
pub fn load_catalog(config: &MemesmithConfig) -> Result<TemplateCatalog> {
    match &config.render.catalog_path {
        Some(path) => TemplateCatalog::load(path)
            .with_context(|| format!("loading template catalog {}", path.display())),
        None => Ok(TemplateCatalog::builtin()),
    }
}

fn template_image_path(config: &MemesmithConfig, template: &MemeTemplate) -> Result<PathBuf> {
    if template.is_remote() {
        bail!(
            "template '{}' uses a remote image ({}); pass --image with a local copy",
            template.id,
            template.url
        );
    }
    let Some(name) = template.file_name() else {
        bail!("template '{}' has no image file name", template.id);
    };
    Ok(config.render.templates_dir.join(name))
}

/// Settings from inline JSON or `@file`.
fn load_settings(settings: Option<&str>) -> Result<OverlaySettings> {
    let json = match settings {
        Some(s) if s.starts_with('@') => {
            let path = &s[1..];
            Some(std::fs::read_to_string(path).with_context(|| format!("reading settings {path}"))?)
        }
        Some(s) => Some(s.to_string()),
        None => None,
    };
    Ok(OverlaySettings::parse(json.as_deref())?)
}

/// Captions without a `y` would all land on the default line; space them
/// 80px apart instead.
fn stack_default_positions(settings: &mut OverlaySettings) {
    let mut y = 100.0;
    for overlay in settings.texts.iter_mut().filter(|t| t.y.is_none()) {
        overlay.y = Some(y);
        y += 80.0;
    }
}

fn output_format(path: &Path) -> OutputFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(OutputFormat::from_extension)
        .unwrap_or_default()
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
