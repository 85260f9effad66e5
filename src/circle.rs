use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::error::{RoundelError, RoundelResult};

/// Filled ellipse mask spanning the full image bounding box (the inscribed
/// circle for a square image): 255 inside, 0 outside. A pixel is inside
/// when its center lies within the ellipse, so inclusion depends only on
/// the squared offset from the image center, not its sign.
pub fn circle_mask(width: u32, height: u32) -> GrayImage {
    let rx = width as f32 / 2.0;
    let ry = height as f32 / 2.0;

    GrayImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 + 0.5 - rx) / rx;
        let dy = (y as f32 + 0.5 - ry) / ry;
        if dx * dx + dy * dy <= 1.0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Composite `src` over a solid `fill` layer and clip the result to the
/// inscribed ellipse: inside the ellipse the source blends over the fill
/// using its own alpha; outside, every pixel is fully transparent. Output
/// dimensions equal input dimensions.
pub fn composite_circular(src: &RgbaImage, fill: [u8; 4]) -> RoundelResult<RgbaImage> {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return Err(RoundelError::validation(
            "cannot composite an empty image",
        ));
    }

    let mask = circle_mask(width, height);
    let mut out = RgbaImage::new(width, height);
    for (x, y, px) in out.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == 0 {
            *px = Rgba([0, 0, 0, 0]);
        } else {
            let s = src.get_pixel(x, y).0;
            *px = Rgba(over_straight(s, fill));
        }
    }
    Ok(out)
}

/// Source-over for straight (non-premultiplied) RGBA8.
fn over_straight(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = u16::from(src[3]);
    if sa == 255 {
        return src;
    }
    let inv = 255 - sa;
    let da = mul_div255(u16::from(dst[3]), inv);
    let oa = sa + da;
    if oa == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        // Weighted by the contributing alphas, then un-premultiplied.
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da);
        out[i] = (num / u32::from(oa)) as u8;
    }
    out[3] = oa as u8;
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
