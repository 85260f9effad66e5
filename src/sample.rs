use image::RgbaImage;

use crate::error::{RoundelError, RoundelResult};

/// Target number of samples per border edge.
pub const SAMPLES_PER_EDGE: u32 = 20;

/// Estimate the background color of `img` by averaging pixels spaced
/// evenly along all four border edges. Read-only; the mean per channel is
/// truncated to an integer.
pub fn sample_border(img: &RgbaImage) -> RoundelResult<[u8; 3]> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(RoundelError::validation(
            "cannot sample the border of an empty image",
        ));
    }

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for (x, y) in border_positions(width, height) {
        let px = img.get_pixel(x, y);
        sums[0] += u64::from(px[0]);
        sums[1] += u64::from(px[1]);
        sums[2] += u64::from(px[2]);
        count += 1;
    }

    Ok([
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    ])
}

/// Sample positions along the four border edges: the top and bottom rows
/// stepped by `width / SAMPLES_PER_EDGE`, the left and right columns
/// stepped by `height / SAMPLES_PER_EDGE` (step clamped to at least 1).
fn border_positions(width: u32, height: u32) -> Vec<(u32, u32)> {
    let x_step = (width / SAMPLES_PER_EDGE).max(1);
    let y_step = (height / SAMPLES_PER_EDGE).max(1);

    let mut positions = Vec::new();
    for x in (0..width).step_by(x_step as usize) {
        positions.push((x, 0));
        positions.push((x, height - 1));
    }
    for y in (0..height).step_by(y_step as usize) {
        positions.push((0, y));
        positions.push((width - 1, y));
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn uniform_border_samples_exactly() {
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([17, 130, 201, 255]));
        // A differently-colored interior must not influence the estimate.
        for y in 4..28 {
            for x in 4..28 {
                img.put_pixel(x, y, Rgba([250, 10, 10, 255]));
            }
        }
        assert_eq!(sample_border(&img).unwrap(), [17, 130, 201]);
    }

    #[test]
    fn mean_is_truncated_toward_zero() {
        // Top+bottom rows white, left+right columns black: the mean of any
        // 50/50 split truncates, never rounds.
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        for x in 0..4 {
            img.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
            img.put_pixel(x, 3, Rgba([255, 255, 255, 255]));
        }
        // 8 white row samples, 8 column samples of which the 4 corners are
        // white too (they sit on both an edge row and an edge column).
        let got = sample_border(&img).unwrap();
        assert_eq!(got[0], got[1]);
        assert_eq!(got[1], got[2]);
        let expected = (255u64 * 12) / 16;
        assert_eq!(u64::from(got[0]), expected);
    }

    #[test]
    fn single_pixel_image_samples_itself() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 0]));
        assert_eq!(sample_border(&img).unwrap(), [9, 8, 7]);
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(sample_border(&img).is_err());
    }
}
