use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::assets::ensure_parent_dir;
use crate::error::{RoundelError, RoundelResult};

#[derive(Clone, Debug)]
pub struct GifConfig {
    pub out_path: PathBuf,
    pub delay_ms: u32,
    pub overwrite: bool,
}

impl GifConfig {
    pub fn validate(&self) -> RoundelResult<()> {
        if self.delay_ms == 0 {
            return Err(RoundelError::validation("gif frame delay must be non-zero"));
        }
        Ok(())
    }
}

pub fn default_gif_config(out_path: impl Into<PathBuf>) -> GifConfig {
    GifConfig {
        out_path: out_path.into(),
        delay_ms: 120,
        overwrite: true,
    }
}

/// Encode an ordered frame sequence as an infinitely looping GIF with a
/// fixed per-frame delay. All frames must share one set of dimensions.
pub fn encode_gif(frames: &[RgbaImage], cfg: &GifConfig) -> RoundelResult<()> {
    cfg.validate()?;
    ensure_parent_dir(&cfg.out_path)?;

    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(RoundelError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }

    let f = File::create(&cfg.out_path)
        .with_context(|| format!("create gif '{}'", cfg.out_path.display()))?;
    encode_gif_to(frames, cfg, BufWriter::new(f))
}

fn encode_gif_to<W: std::io::Write>(
    frames: &[RgbaImage],
    cfg: &GifConfig,
    writer: W,
) -> RoundelResult<()> {
    let Some(first) = frames.first() else {
        return Err(RoundelError::validation("gif needs at least one frame"));
    };
    let dims = first.dimensions();
    if frames.iter().any(|f| f.dimensions() != dims) {
        return Err(RoundelError::validation(
            "all gif frames must share one set of dimensions",
        ));
    }

    let mut encoder = GifEncoder::new(writer);
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|e| RoundelError::encode(format!("set gif loop count: {e}")))?;

    let delay = Delay::from_numer_denom_ms(cfg.delay_ms, 1);
    for frame in frames {
        encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))
            .map_err(|e| RoundelError::encode(format!("encode gif frame: {e}")))?;
    }
    Ok(())
}
