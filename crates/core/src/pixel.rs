//! Mean colour over a bounding box of a decoded card image.
//!
//! The box is supplied by the caller (typically a lane polygon's extent after
//! [`crate::geometry::Layout::scale_to_width`]); locating it is not done here.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Axis-aligned box in pixel space. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// Intersect with an image of the given size.
    fn clip(&self, width: u32, height: u32) -> BoundingBox {
        BoundingBox {
            left: self.left.min(width),
            top: self.top.min(height),
            right: self.right.min(width),
            bottom: self.bottom.min(height),
        }
    }

    fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

/// Mean R, G and B over the part of `bbox` that lies inside `image`.
pub fn mean_rgb(image: &RgbImage, bbox: BoundingBox) -> Result<[f64; 3], CoreError> {
    let clipped = bbox.clip(image.width(), image.height());
    if clipped.is_empty() {
        return Err(CoreError::Validation(format!(
            "Bounding box {bbox:?} does not overlap the {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let mut sums = [0u64; 3];
    for y in clipped.top..clipped.bottom {
        for x in clipped.left..clipped.right {
            let pixel = image.get_pixel(x, y);
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += u64::from(channel);
            }
        }
    }

    let count = f64::from(clipped.right - clipped.left) * f64::from(clipped.bottom - clipped.top);
    Ok(sums.map(|sum| sum as f64 / count))
}
