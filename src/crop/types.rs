//! Common types for the crop module

use image::DynamicImage;
use imageproc::point::Point;
use std::path::PathBuf;
use thiserror::Error;

/// Crop error types
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No content detected")]
    NoContentDetected,

    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Could not create directory {path}: {source}")]
    DirectorySetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the rectangle lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Boundary of one outer connected foreground shape.
///
/// Vertices are ordered along the perimeter. Runs of collinear boundary
/// pixels are collapsed to their end points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOutline {
    points: Vec<Point<u32>>,
}

impl RegionOutline {
    pub fn new(points: Vec<Point<u32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point<u32>] {
        &self.points
    }

    /// Polygon area enclosed by the vertices (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();

        twice_area.abs() as f64 / 2.0
    }

    /// Smallest rectangle containing every vertex, or `None` for an empty outline
    pub fn bounding_rect(&self) -> Option<CropRect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(CropRect::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

/// Result of cropping one image
#[derive(Debug, Clone)]
pub enum CropOutcome {
    /// Content was found; `image` holds the full-color pixels inside `rect`
    Cropped { image: DynamicImage, rect: CropRect },
    /// The mask contained no foreground pixels
    NoContent,
}

impl CropOutcome {
    pub fn rect(&self) -> Option<CropRect> {
        match self {
            CropOutcome::Cropped { rect, .. } => Some(*rect),
            CropOutcome::NoContent => None,
        }
    }

    pub fn is_cropped(&self) -> bool {
        matches!(self, CropOutcome::Cropped { .. })
    }

    /// Convert into a `Result`, mapping `NoContent` to [`CropError::NoContentDetected`]
    pub fn into_result(self) -> Result<(DynamicImage, CropRect)> {
        match self {
            CropOutcome::Cropped { image, rect } => Ok((image, rect)),
            CropOutcome::NoContent => Err(CropError::NoContentDetected),
        }
    }
}
