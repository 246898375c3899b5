use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use log::info;
use std::path::PathBuf;

/// Encode a rendered sheet as PNG on the blocking pool
pub async fn export_png(raster: RgbaImage, path: PathBuf) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        raster
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write sheet: {}", path.display()))?;
        info!(
            "Wrote {}x{} sheet to {}",
            raster.width(),
            raster.height(),
            path.display()
        );
        Ok(path)
    })
    .await
    .context("Export task panicked")?
}
