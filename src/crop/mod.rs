//! Content detection & crop module
//!
//! Finds the photograph on a scanned page and crops the page to it.
//!
//! # Features
//!
//! - Foreground mask from luminance, Gaussian smoothing and an inverted threshold
//! - Outer contour tracing with collinear vertex reduction
//! - Largest-region selection and margin expansion clamped to the image
//!
//! # Example
//!
//! ```rust,no_run
//! use scan_cropper::{ContentCropper, CropOutcome};
//!
//! let img = image::open("scan.jpg").unwrap();
//!
//! match ContentCropper::crop(&img, 8) {
//!     CropOutcome::Cropped { rect, .. } => println!("Cropped to {:?}", rect),
//!     CropOutcome::NoContent => println!("Nothing to crop"),
//! }
//! ```

// Submodules
mod foreground;
mod rect;
mod types;

// Re-export public API
pub use foreground::{ForegroundExtractor, ForegroundMask};
pub use rect::CropRectCalculator;
pub use types::{CropError, CropOutcome, CropRect, RegionOutline, Result};

use image::DynamicImage;

// ============================================================
// Constants
// ============================================================

/// Luminance above this value is scanner background (0-255)
pub const FOREGROUND_THRESHOLD: u8 = 240;

/// Margin used when none is supplied
pub const DEFAULT_MARGIN: u32 = 8;

/// Mask value for foreground pixels
const FOREGROUND_VALUE: u8 = 255;

/// Mask value for background pixels
const BACKGROUND_VALUE: u8 = 0;

// ============================================================
// Content Cropper
// ============================================================

/// Foreground extraction followed by rectangle calculation.
///
/// A pure function of the image and margin; holds no state between calls.
pub struct ContentCropper;

impl ContentCropper {
    /// Crop `image` to its dominant content region grown by `margin` pixels
    pub fn crop(image: &DynamicImage, margin: u32) -> CropOutcome {
        let outlines = ForegroundExtractor::extract(image);
        CropRectCalculator::crop(image, &outlines, margin)
    }

    /// Crop rectangle only, without copying pixels
    pub fn detect(image: &DynamicImage, margin: u32) -> Option<CropRect> {
        let outlines = ForegroundExtractor::extract(image);
        CropRectCalculator::rect_for(&outlines, margin, (image.width(), image.height()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    /// Smoothing widens a solid black block by this many pixels on each side
    const BLUR_SPREAD: u32 = 2;

    fn scan_with_photo(width: u32, height: u32, photo: CropRect) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for y in photo.y..photo.bottom() {
            for x in photo.x..photo.right() {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn detected_bounds(photo: CropRect) -> CropRect {
        CropRect::new(
            photo.x - BLUR_SPREAD,
            photo.y - BLUR_SPREAD,
            photo.width + 2 * BLUR_SPREAD,
            photo.height + 2 * BLUR_SPREAD,
        )
    }

    #[test]
    fn test_constants() {
        assert_eq!(FOREGROUND_THRESHOLD, 240);
        assert_eq!(DEFAULT_MARGIN, 8);
    }

    #[test]
    fn test_crop_margin_zero() {
        let photo = CropRect::new(50, 40, 120, 90);
        let img = scan_with_photo(300, 200, photo);

        let rect = ContentCropper::detect(&img, 0).unwrap();
        assert_eq!(rect, detected_bounds(photo));
    }

    #[test]
    fn test_crop_default_margin() {
        let photo = CropRect::new(50, 40, 120, 90);
        let img = scan_with_photo(300, 200, photo);

        let outcome = ContentCropper::crop(&img, DEFAULT_MARGIN);
        let (cropped, rect) = outcome.into_result().unwrap();

        let bounds = detected_bounds(photo);
        assert_eq!(
            rect,
            CropRect::new(bounds.x - 8, bounds.y - 8, bounds.width + 16, bounds.height + 16)
        );
        assert_eq!(cropped.dimensions(), (rect.width, rect.height));
    }

    #[test]
    fn test_crop_margin_larger_than_image() {
        let photo = CropRect::new(50, 40, 120, 90);
        let img = scan_with_photo(300, 200, photo);

        let rect = ContentCropper::detect(&img, 5000).unwrap();
        assert_eq!(rect, CropRect::new(0, 0, 300, 200));
    }

    #[test]
    fn test_blank_scan_is_no_content() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([255, 255, 255])));
        for margin in [0, DEFAULT_MARGIN, 1000] {
            assert!(matches!(
                ContentCropper::crop(&img, margin),
                CropOutcome::NoContent
            ));
        }
    }

    #[test]
    fn test_photo_touching_left_edge() {
        let photo = CropRect::new(0, 30, 100, 60);
        let img = scan_with_photo(240, 160, photo);

        for margin in [0, DEFAULT_MARGIN, 40] {
            let rect = ContentCropper::detect(&img, margin).unwrap();
            assert_eq!(rect.x, 0);
            assert!(rect.fits_within(240, 160));
        }
    }

    #[test]
    fn test_full_page_photo_keeps_whole_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([30, 60, 90])));
        let rect = ContentCropper::detect(&img, DEFAULT_MARGIN).unwrap();
        assert_eq!(rect, CropRect::new(0, 0, 64, 48));
    }

    #[test]
    fn test_largest_region_wins_over_specks() {
        let photo = CropRect::new(100, 60, 80, 70);
        let mut img = scan_with_photo(300, 200, photo).to_rgb8();
        for y in 10..14 {
            for x in 10..14 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let img = DynamicImage::ImageRgb8(img);

        let rect = ContentCropper::detect(&img, 0).unwrap();
        assert_eq!(rect, detected_bounds(photo));
    }

    #[test]
    fn test_crop_is_deterministic() {
        let photo = CropRect::new(33, 21, 77, 55);
        let img = scan_with_photo(200, 150, photo);

        let first = ContentCropper::detect(&img, DEFAULT_MARGIN);
        let second = ContentCropper::detect(&img, DEFAULT_MARGIN);
        assert_eq!(first, second);
    }

    #[test]
    fn test_crop_preserves_color() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 20..60 {
            for x in 30..70 {
                img.put_pixel(x, y, Rgb([10, 120, 40]));
            }
        }
        let img = DynamicImage::ImageRgb8(img);

        let (cropped, rect) = ContentCropper::crop(&img, 0).into_result().unwrap();
        let px = cropped.to_rgb8().get_pixel(30 - rect.x + 5, 20 - rect.y + 5).0;
        assert_eq!(px, [10, 120, 40]);
    }

    #[test]
    fn test_no_content_error_message() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([255, 255, 255])));
        let err = ContentCropper::crop(&blank, 0)
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("content"));
    }
}
