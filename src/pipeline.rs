use std::time::Duration;

use image::RgbaImage;
use tracing::{info, warn};

use crate::{
    assets::{self, OutputPaths},
    bob,
    circle,
    encode_gif,
    error::RoundelResult,
    generate::Generator,
    preview::{self, PreviewLayout},
    remove::{self, Thresholds},
    roster::{AgentSpec, Roster},
    sample,
};

/// Outcome counts for one batch run. Item failures are counted, never
/// propagated; only configuration errors abort a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Parameters for the final avatar stage (circular composite + bob GIF).
#[derive(Clone, Copy, Debug)]
pub struct FinishOptions {
    pub frames: u32,
    pub delay_ms: u32,
}

impl Default for FinishOptions {
    fn default() -> Self {
        Self {
            frames: bob::DEFAULT_FRAME_COUNT,
            delay_ms: 120,
        }
    }
}

/// Circular composite with the agent's theme color, saved as
/// `<name>.png`, then the bob cycle encoded as `<name>.gif`.
pub fn finish_avatar(
    img: &RgbaImage,
    agent: &AgentSpec,
    paths: &OutputPaths,
    opts: &FinishOptions,
) -> RoundelResult<()> {
    let circular = circle::composite_circular(img, agent.color.to_rgba8())?;

    let png_path = paths.avatar_png(&agent.name);
    assets::save_png(&circular, &png_path)?;
    info!(path = %png_path.display(), "wrote avatar");

    let frames = bob::bob_frames(&circular, opts.frames)?;
    let mut cfg = encode_gif::default_gif_config(paths.gif(&agent.name));
    cfg.delay_ms = opts.delay_ms;
    encode_gif::encode_gif(&frames, &cfg)?;
    info!(path = %cfg.out_path.display(), "wrote bob cycle");
    Ok(())
}

/// Generate every roster agent from the remote endpoint, strictly in
/// order, pausing `item_delay` between items to respect the endpoint's
/// rate limit. Per item: generate (with model fallback), save the
/// untouched original, then finish. Afterwards a preview sheet is
/// assembled from whatever succeeded.
pub fn run_generate(
    roster: &Roster,
    generator: &Generator,
    paths: &OutputPaths,
    opts: &FinishOptions,
    item_delay: Duration,
) -> RoundelResult<BatchSummary> {
    roster.validate()?;

    let mut summary = BatchSummary::default();
    for (index, agent) in roster.agents.iter().enumerate() {
        if index > 0 && !item_delay.is_zero() {
            std::thread::sleep(item_delay);
        }

        info!(agent = %agent.display_name(), "generating avatar");
        let result = generator.generate(&agent.full_prompt()).and_then(|img| {
            assets::save_png(&img, &paths.original_png(&agent.name))?;
            finish_avatar(&img, agent, paths, opts)
        });
        match result {
            Ok(()) => summary.processed += 1,
            Err(err) => {
                warn!(agent = %agent.name, %err, "item failed, continuing");
                summary.failed += 1;
            }
        }
    }

    if summary.processed > 0 {
        if let Err(err) = run_preview(roster, paths, &PreviewLayout::default()) {
            warn!(%err, "preview assembly failed");
        }
    }
    Ok(summary)
}

/// Re-run background removal over existing `<name>.png` files: optional
/// explicit resize, border sample, alpha recompute, then finish. Missing
/// inputs are skipped with a log line.
pub fn run_reprocess(
    roster: &Roster,
    paths: &OutputPaths,
    thresholds: &Thresholds,
    resize: Option<u32>,
    opts: &FinishOptions,
) -> RoundelResult<BatchSummary> {
    roster.validate()?;
    thresholds.validate()?;

    let mut summary = BatchSummary::default();
    for agent in &roster.agents {
        let path = paths.avatar_png(&agent.name);
        if !path.exists() {
            warn!(agent = %agent.name, path = %path.display(), "input missing, skipping");
            summary.skipped += 1;
            continue;
        }

        let result = (|| {
            let mut img = assets::load_rgba(&path)?;
            if let Some(size) = resize {
                img = assets::resize_square(&img, size)?;
            }
            let bg = sample::sample_border(&img)?;
            info!(agent = %agent.name, bg = ?bg, "sampled background");
            let cleared = remove::remove_background(&img, bg, thresholds)?;
            finish_avatar(&cleared, agent, paths, opts)
        })();
        match result {
            Ok(()) => summary.processed += 1,
            Err(err) => {
                warn!(agent = %agent.name, %err, "item failed, continuing");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Apply the circular composite (theme-color fill, ellipse clip) to each
/// agent's existing `<name>.png`, in place.
pub fn run_circle(roster: &Roster, paths: &OutputPaths) -> RoundelResult<BatchSummary> {
    roster.validate()?;

    let mut summary = BatchSummary::default();
    for agent in &roster.agents {
        let path = paths.avatar_png(&agent.name);
        if !path.exists() {
            warn!(agent = %agent.name, path = %path.display(), "input missing, skipping");
            summary.skipped += 1;
            continue;
        }

        let result = (|| {
            let img = assets::load_rgba(&path)?;
            let circular = circle::composite_circular(&img, agent.color.to_rgba8())?;
            assets::save_png(&circular, &path)
        })();
        match result {
            Ok(()) => {
                info!(agent = %agent.name, path = %path.display(), "wrote circular avatar");
                summary.processed += 1;
            }
            Err(err) => {
                warn!(agent = %agent.name, %err, "item failed, continuing");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Assemble `preview.png` from every agent avatar present on disk,
/// skipping missing files.
pub fn run_preview(
    roster: &Roster,
    paths: &OutputPaths,
    layout: &PreviewLayout,
) -> RoundelResult<BatchSummary> {
    roster.validate()?;
    layout.validate()?;

    let mut summary = BatchSummary::default();
    let mut images = Vec::new();
    for agent in &roster.agents {
        let path = paths.avatar_png(&agent.name);
        if !path.exists() {
            warn!(agent = %agent.name, path = %path.display(), "input missing, skipping");
            summary.skipped += 1;
            continue;
        }
        images.push(assets::load_rgba(&path)?);
        summary.processed += 1;
    }

    if images.is_empty() {
        warn!("no avatars found, preview not written");
        return Ok(summary);
    }

    let sheet = preview::assemble(&images, layout)?;
    let out = paths.preview_png();
    assets::save_png(&sheet, &out)?;
    info!(path = %out.display(), count = images.len(), "wrote preview sheet");
    Ok(summary)
}
