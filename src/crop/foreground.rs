//! Foreground extraction
//!
//! Separates the scanned photo from the near-white scanner bed and traces
//! the outer boundary of every foreground shape.
//!
//! # Algorithm
//!
//! 1. Convert to BT.601 luminance
//! 2. Smooth with a 5x5 Gaussian in floating point, rounded once to 8 bits
//! 3. Inverted binary threshold: luminance above 240 is background
//! 4. Trace outer contours only and drop collinear boundary vertices

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::separable_filter_equal;
use imageproc::point::Point;
use tracing::debug;

use super::types::RegionOutline;
use super::{BACKGROUND_VALUE, FOREGROUND_THRESHOLD, FOREGROUND_VALUE};

/// 5-tap Gaussian kernel with the sigma a 5x5 window implies (binomial 1-4-6-4-1)
const GAUSSIAN_KERNEL_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Binary foreground/background classification of an image.
///
/// Foreground pixels hold 255, background pixels hold 0. Dimensions always
/// match the image the mask was built from.
#[derive(Debug, Clone)]
pub struct ForegroundMask {
    mask: GrayImage,
}

impl ForegroundMask {
    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.mask.get_pixel(x, y).0[0] == FOREGROUND_VALUE
    }

    pub fn foreground_count(&self) -> usize {
        self.mask
            .pixels()
            .filter(|p| p.0[0] == FOREGROUND_VALUE)
            .count()
    }

    pub fn is_blank(&self) -> bool {
        self.mask.pixels().all(|p| p.0[0] == BACKGROUND_VALUE)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.mask
    }
}

/// Stateless foreground extractor
pub struct ForegroundExtractor;

impl ForegroundExtractor {
    /// Trace the outer outlines of all foreground shapes in `image`
    pub fn extract(image: &DynamicImage) -> Vec<RegionOutline> {
        let mask = Self::mask(image);
        Self::outlines(&mask)
    }

    /// Build the binary foreground mask for `image`
    pub fn mask(image: &DynamicImage) -> ForegroundMask {
        let gray = Self::luminance(image);
        let smoothed = Self::smooth(&gray);
        Self::threshold(&smoothed)
    }

    /// Outer contours of the mask, simplified to their corner vertices
    pub fn outlines(mask: &ForegroundMask) -> Vec<RegionOutline> {
        let outlines: Vec<RegionOutline> = find_contours::<u32>(mask.as_gray())
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .map(|c| RegionOutline::new(Self::simplify(c.points)))
            .collect();

        let (width, height) = mask.dimensions();
        debug!(width, height, outlines = outlines.len(), "Traced foreground outlines");

        outlines
    }

    /// BT.601 luma (0.299 R + 0.587 G + 0.114 B), rounded to the nearest level
    fn luminance(image: &DynamicImage) -> GrayImage {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        ImageBuffer::from_fn(width, height, |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
            Luma([((weighted + 500) / 1000) as u8])
        })
    }

    /// Gaussian smoothing with replicated borders.
    ///
    /// Both passes run on `f32` so the only rounding happens once, right
    /// before the threshold.
    fn smooth(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                Luma([f32::from(gray.get_pixel(x, y).0[0])])
            });

        let blurred = separable_filter_equal(&levels, &GAUSSIAN_KERNEL_5[..]);

        ImageBuffer::from_fn(width, height, |x, y| {
            let value = blurred.get_pixel(x, y).0[0];
            Luma([value.round().clamp(0.0, 255.0) as u8])
        })
    }

    /// Inverted threshold: bright scanner bed becomes background
    fn threshold(gray: &GrayImage) -> ForegroundMask {
        let (width, height) = gray.dimensions();
        let mut mask = GrayImage::new(width, height);

        for (x, y, pixel) in gray.enumerate_pixels() {
            let value = if pixel.0[0] > FOREGROUND_THRESHOLD {
                BACKGROUND_VALUE
            } else {
                FOREGROUND_VALUE
            };
            mask.put_pixel(x, y, Luma([value]));
        }

        ForegroundMask { mask }
    }

    /// Keep only the vertices where the boundary changes direction
    fn simplify(points: Vec<Point<u32>>) -> Vec<Point<u32>> {
        let n = points.len();
        if n < 3 {
            return points;
        }

        let step = |a: Point<u32>, b: Point<u32>| {
            (
                (b.x as i64 - a.x as i64).signum(),
                (b.y as i64 - a.y as i64).signum(),
            )
        };

        let corners: Vec<Point<u32>> = (0..n)
            .filter(|&i| {
                let prev = points[(i + n - 1) % n];
                let cur = points[i];
                let next = points[(i + 1) % n];
                step(prev, cur) != step(cur, next)
            })
            .map(|i| points[i])
            .collect();

        if corners.is_empty() {
            points
        } else {
            corners
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn page_with_block(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_mask_matches_image_dimensions() {
        let img = page_with_block(64, 48, 10, 10, 20, 20);
        let mask = ForegroundExtractor::mask(&img);
        assert_eq!(mask.dimensions(), (64, 48));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut gray = GrayImage::from_pixel(3, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([240]));
        gray.put_pixel(1, 0, Luma([241]));

        let mask = ForegroundExtractor::threshold(&gray);

        assert!(mask.is_foreground(0, 0));
        assert!(!mask.is_foreground(1, 0));
        assert!(!mask.is_foreground(2, 0));
    }

    #[test]
    fn test_blank_page_has_no_outlines() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, Rgb([255, 255, 255])));
        let mask = ForegroundExtractor::mask(&img);

        assert!(mask.is_blank());
        assert_eq!(mask.foreground_count(), 0);
        assert!(ForegroundExtractor::outlines(&mask).is_empty());
    }

    #[test]
    fn test_light_gray_page_is_background() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([245, 245, 245])));
        assert!(ForegroundExtractor::extract(&img).is_empty());
    }

    #[test]
    fn test_near_threshold_dip_rounds_to_background() {
        // blurred centre is 241 - 0.375^2 = 240.86
        let mut gray = GrayImage::from_pixel(21, 21, Luma([241]));
        gray.put_pixel(10, 10, Luma([240]));
        let img = DynamicImage::ImageLuma8(gray);

        let mask = ForegroundExtractor::mask(&img);
        assert!(mask.is_blank());
        assert!(ForegroundExtractor::extract(&img).is_empty());
    }

    #[test]
    fn test_short_dark_run_rounds_to_background() {
        // blurred peak is 242 - 0.375 * 3.5 = 240.69
        let mut gray = GrayImage::from_pixel(21, 21, Luma([242]));
        for x in 9..12 {
            gray.put_pixel(x, 10, Luma([238]));
        }

        let mask = ForegroundExtractor::mask(&DynamicImage::ImageLuma8(gray));
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_deeper_dip_stays_foreground() {
        // blurred centre is 241 - 5 * 0.375^2 = 240.30
        let mut gray = GrayImage::from_pixel(21, 21, Luma([241]));
        gray.put_pixel(10, 10, Luma([236]));

        let mask = ForegroundExtractor::mask(&DynamicImage::ImageLuma8(gray));
        assert_eq!(mask.foreground_count(), 1);
        assert!(mask.is_foreground(10, 10));
    }

    #[test]
    fn test_luminance_uses_bt601_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([255, 255, 100])));
        let gray = ForegroundExtractor::luminance(&img);
        assert_eq!(gray.get_pixel(0, 0).0[0], 237);

        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([255, 255, 255])));
        assert_eq!(ForegroundExtractor::luminance(&img).get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_pale_yellow_patch_is_foreground() {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([255, 255, 255]));
        for y in 20..40 {
            for x in 20..40 {
                img.put_pixel(x, y, Rgb([255, 255, 100]));
            }
        }

        let mask = ForegroundExtractor::mask(&DynamicImage::ImageRgb8(img));
        assert!(mask.is_foreground(30, 30));
        assert!(!mask.is_foreground(5, 5));
    }

    #[test]
    fn test_single_block_yields_one_outline() {
        let img = page_with_block(80, 60, 20, 15, 30, 25);
        let outlines = ForegroundExtractor::extract(&img);
        assert_eq!(outlines.len(), 1);
    }

    #[test]
    fn test_blur_spreads_mask_two_pixels() {
        let img = page_with_block(80, 60, 20, 15, 30, 25);
        let outlines = ForegroundExtractor::extract(&img);
        let rect = outlines[0].bounding_rect().unwrap();

        assert_eq!(rect.x, 18);
        assert_eq!(rect.y, 13);
        assert_eq!(rect.width, 34);
        assert_eq!(rect.height, 29);
    }

    #[test]
    fn test_hole_is_not_a_separate_outline() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 10..90 {
            for x in 10..90 {
                let inside_hole = (35..65).contains(&x) && (35..65).contains(&y);
                if !inside_hole {
                    img.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }

        let outlines = ForegroundExtractor::extract(&DynamicImage::ImageRgb8(img));
        assert_eq!(outlines.len(), 1);
    }

    #[test]
    fn test_disjoint_blocks_yield_separate_outlines() {
        let mut img = RgbImage::from_pixel(120, 60, Rgb([255, 255, 255]));
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
            for x in 70..110 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }

        let outlines = ForegroundExtractor::extract(&DynamicImage::ImageRgb8(img));
        assert_eq!(outlines.len(), 2);
    }

    #[test]
    fn test_simplify_rectangle_keeps_corners() {
        let mut points = Vec::new();
        for x in 0..=4 {
            points.push(Point::new(x, 0));
        }
        for y in 1..=3 {
            points.push(Point::new(4, y));
        }
        for x in (0..=4).rev() {
            points.push(Point::new(x, 3));
        }
        for y in (1..=2).rev() {
            points.push(Point::new(0, y));
        }
        // drop the duplicated corner (4, 3)
        points.dedup();

        let simplified = ForegroundExtractor::simplify(points);

        assert_eq!(
            simplified,
            vec![
                Point::new(0, 0),
                Point::new(4, 0),
                Point::new(4, 3),
                Point::new(0, 3),
            ]
        );
    }

    #[test]
    fn test_simplify_short_contour_unchanged() {
        let points = vec![Point::new(5u32, 5u32)];
        assert_eq!(ForegroundExtractor::simplify(points.clone()), points);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let img = page_with_block(90, 70, 5, 7, 40, 33);
        assert_eq!(
            ForegroundExtractor::extract(&img),
            ForegroundExtractor::extract(&img)
        );
    }
}
