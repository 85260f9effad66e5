use image::{Rgba, RgbaImage};

use crate::error::{RoundelError, RoundelResult};

/// Background-removal thresholds, in RGB-distance units. The defaults are
/// the empirically tuned values the original pipeline shipped with; they
/// are parameters here, not fixed truths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Below this distance a pixel is fully transparent.
    pub full: f32,
    /// Between `full` and this distance the alpha ramps linearly 0..255.
    pub feather: f32,
    /// Distance bound for the bright-background rule.
    pub bright_distance: f32,
    /// Minimum mean channel brightness for the bright-background rule.
    pub bright_floor: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            full: 35.0,
            feather: 60.0,
            bright_distance: 50.0,
            bright_floor: 200.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> RoundelResult<()> {
        let all = [self.full, self.feather, self.bright_distance, self.bright_floor];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RoundelError::validation(
                "thresholds must be finite and non-negative",
            ));
        }
        if self.full > self.feather {
            return Err(RoundelError::validation(
                "full threshold must not exceed the feather threshold",
            ));
        }
        Ok(())
    }
}

/// Recompute the alpha channel of `img` against an estimated background
/// color. RGB channels are copied through untouched; the output buffer has
/// the input dimensions.
///
/// Per pixel, evaluated in order:
/// 1. near the background and bright (washed-out halo) -> transparent
/// 2. very near the background -> transparent
/// 3. inside the feather band -> linear alpha ramp
/// 4. otherwise -> opaque
///
/// This is plain color thresholding, not segmentation: subject pixels that
/// happen to match the background are misclassified.
pub fn remove_background(
    img: &RgbaImage,
    bg: [u8; 3],
    thresholds: &Thresholds,
) -> RoundelResult<RgbaImage> {
    thresholds.validate()?;

    let mut out = img.clone();
    for px in out.pixels_mut() {
        let Rgba([r, g, b, _]) = *px;
        let distance = color_distance([r, g, b], bg);
        let brightness = (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0;

        let alpha = if distance < thresholds.bright_distance && brightness > thresholds.bright_floor
        {
            0
        } else if distance < thresholds.full {
            0
        } else if distance < thresholds.feather {
            let band = thresholds.feather - thresholds.full;
            (((distance - thresholds.full) / band) * 255.0) as u8
        } else {
            255
        };

        px[3] = alpha;
    }
    Ok(out)
}

/// Euclidean distance between two colors in RGB space.
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let dr = f32::from(a[0]) - f32::from(b[0]);
    let dg = f32::from(a[1]) - f32::from(b[1]);
    let db = f32::from(a[2]) - f32::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}
