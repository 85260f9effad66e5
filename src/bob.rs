use image::RgbaImage;

use crate::error::{RoundelError, RoundelResult};

/// Amplitude of the idle bob, in pixels.
const BOB_AMPLITUDE: f32 = 2.0;
/// Extra canvas height used while offsetting, cropped away afterwards.
const BOB_HEADROOM: u32 = 10;
/// Resting vertical position inside the padded canvas.
const BOB_REST_Y: i64 = 5;

pub const DEFAULT_FRAME_COUNT: u32 = 8;

/// Vertical pixel offset per frame: one full sine period across the frame
/// count, truncated to whole pixels. Eight frames yields the cycle
/// 0, 1, 2, 1, 0, -1, -2, -1.
pub fn bob_offsets(frame_count: u32) -> Vec<i32> {
    (0..frame_count)
        .map(|i| {
            let phase = i as f32 * std::f32::consts::TAU / frame_count as f32;
            (BOB_AMPLITUDE * phase.sin()) as i32
        })
        .collect()
}

/// Produce the idle-bob frame sequence: each frame pastes the source onto
/// a transparent canvas at its vertical offset and crops back to the
/// source dimensions. Frames are ordered and sized like the input.
pub fn bob_frames(img: &RgbaImage, frame_count: u32) -> RoundelResult<Vec<RgbaImage>> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(RoundelError::validation("cannot animate an empty image"));
    }
    if frame_count == 0 {
        return Err(RoundelError::validation("frame count must be non-zero"));
    }

    let frames = bob_offsets(frame_count)
        .into_iter()
        .map(|offset| {
            let mut canvas = RgbaImage::new(width, height + BOB_HEADROOM);
            image::imageops::replace(&mut canvas, img, 0, BOB_REST_Y + i64::from(offset));
            image::imageops::crop_imm(&canvas, 0, 0, width, height).to_image()
        })
        .collect();
    Ok(frames)
}
