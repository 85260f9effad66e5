use image::RgbaImage;

use crate::error::{RoundelError, RoundelResult};

/// Fixed-grid preview sheet geometry. Inputs are laid out as-is; an image
/// that is not `cell`-sized will not align with the grid.
#[derive(Clone, Copy, Debug)]
pub struct PreviewLayout {
    pub columns: u32,
    pub cell: u32,
    pub margin: u32,
}

impl Default for PreviewLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            cell: 256,
            margin: 10,
        }
    }
}

impl PreviewLayout {
    pub fn validate(&self) -> RoundelResult<()> {
        if self.columns == 0 || self.cell == 0 {
            return Err(RoundelError::validation(
                "preview columns and cell size must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let row = index as u32 / self.columns;
        let col = index as u32 % self.columns;
        let x = self.margin + col * (self.cell + self.margin);
        let y = self.margin + row * (self.cell + self.margin);
        (x, y)
    }

    pub fn canvas_size(&self, count: usize) -> (u32, u32) {
        let rows = (count as u32).div_ceil(self.columns);
        let width = self.columns * self.cell + (self.columns + 1) * self.margin;
        let height = rows * self.cell + (rows + 1) * self.margin;
        (width, height)
    }
}

/// Lay already-processed avatars into the grid on one transparent canvas.
pub fn assemble(images: &[RgbaImage], layout: &PreviewLayout) -> RoundelResult<RgbaImage> {
    layout.validate()?;
    if images.is_empty() {
        return Err(RoundelError::validation("no avatars to lay out"));
    }

    let (width, height) = layout.canvas_size(images.len());
    let mut canvas = RgbaImage::new(width, height);
    for (index, img) in images.iter().enumerate() {
        let (x, y) = layout.cell_origin(index);
        image::imageops::replace(&mut canvas, img, i64::from(x), i64::from(y));
    }
    Ok(canvas)
}
