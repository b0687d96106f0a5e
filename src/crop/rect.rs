//! Crop rectangle calculation
//!
//! Picks the dominant outline, grows its bounding box by the margin and
//! clamps the result to the image.

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use super::types::{CropOutcome, CropRect, RegionOutline};

/// Stateless crop rectangle calculator
pub struct CropRectCalculator;

impl CropRectCalculator {
    /// Outline with the largest enclosed area; the first one wins a tie
    pub fn largest_outline(outlines: &[RegionOutline]) -> Option<&RegionOutline> {
        outlines.iter().fold(None, |best, outline| match best {
            Some(b) if b.area() >= outline.area() => Some(b),
            _ => Some(outline),
        })
    }

    /// Grow `bounds` by `margin` on every side, clamped to `image_size`.
    ///
    /// The origin moves out by at most `margin` and never below zero. Width
    /// and height are then limited to the space remaining from the new
    /// origin, so the result always fits within the image.
    pub fn expand(bounds: CropRect, margin: u32, image_size: (u32, u32)) -> CropRect {
        let (width, height) = image_size;
        let grow = margin.saturating_mul(2);

        let x = bounds.x.saturating_sub(margin);
        let y = bounds.y.saturating_sub(margin);
        let w = bounds
            .width
            .saturating_add(grow)
            .min(width.saturating_sub(x));
        let h = bounds
            .height
            .saturating_add(grow)
            .min(height.saturating_sub(y));

        CropRect::new(x, y, w, h)
    }

    /// Crop rectangle for `outlines` on an image of `image_size`
    pub fn rect_for(
        outlines: &[RegionOutline],
        margin: u32,
        image_size: (u32, u32),
    ) -> Option<CropRect> {
        let largest = Self::largest_outline(outlines)?;
        let bounds = largest.bounding_rect()?;
        Some(Self::expand(bounds, margin, image_size))
    }

    /// Cut the full-color pixels for the dominant outline out of `image`
    pub fn crop(image: &DynamicImage, outlines: &[RegionOutline], margin: u32) -> CropOutcome {
        let Some(rect) = Self::rect_for(outlines, margin, image.dimensions()) else {
            return CropOutcome::NoContent;
        };

        debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            margin,
            "Computed crop rectangle"
        );

        let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
        CropOutcome::Cropped {
            image: cropped,
            rect,
        }
    }
}
