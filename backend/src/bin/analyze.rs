//! One-shot analysis of a local leaf image
//!
//! Usage: `leafscan-analyze <image-path>`
//!
//! Runs the same pipeline as the server and prints the result as JSON.

use std::path::Path;

use anyhow::{bail, Context};
use leafscan_backend::{init_tracing, AppState, Config};
use shared::ImageFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    init_tracing(config.logging.format);

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: leafscan-analyze <image-path>");
    };
    let path = Path::new(&path);

    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .with_context(|| {
            format!(
                "cannot infer image type of {}; supported: {}",
                path.display(),
                ImageFormat::supported_list()
            )
        })?;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let state = AppState::from_config(config)?;
    let result = state.detector.analyze(&data, format.mime_type()).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
