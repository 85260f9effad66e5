use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::{RoundelError, RoundelResult};

/// Decode a raster file from disk into a straight-alpha RGBA8 buffer.
pub fn load_rgba(path: &Path) -> RoundelResult<RgbaImage> {
    if !path.exists() {
        return Err(RoundelError::asset(format!(
            "input file '{}' not found",
            path.display()
        )));
    }
    let dyn_img =
        image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(dyn_img.to_rgba8())
}

/// Decode an in-memory body (e.g. an HTTP response) into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> RoundelResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

pub fn save_png(img: &RgbaImage, path: &Path) -> RoundelResult<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Explicit deterministic resize to `size x size` (Lanczos3). Every other
/// transform in this crate preserves its input dimensions.
pub fn resize_square(img: &RgbaImage, size: u32) -> RoundelResult<RgbaImage> {
    if size == 0 {
        return Err(RoundelError::validation("resize target must be non-zero"));
    }
    Ok(image::imageops::resize(img, size, size, FilterType::Lanczos3))
}

pub fn ensure_parent_dir(path: &Path) -> RoundelResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Output naming convention for one avatar directory.
#[derive(Clone, Debug)]
pub struct OutputPaths {
    pub dir: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn avatar_png(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }

    pub fn original_png(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}_original.png"))
    }

    pub fn gif(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.gif"))
    }

    pub fn preview_png(&self) -> PathBuf {
        self.dir.join("preview.png")
    }
}
