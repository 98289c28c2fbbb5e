//! Binary foreground/background raster.
//!
//! Every stage after binarization reads a [`Mask`]: thinning consumes the
//! wall mask, classification and line extraction consume the skeleton.
//! Pixels are stored as one byte each (0 background, 255 foreground), the
//! same layout the external renderer expects for skeleton visualization.
//!
//! A mask is immutable to consumers once produced; only the thinning
//! stage builds masks incrementally, through the crate-private setter.

use serde::{Deserialize, Serialize};

use image::GrayImage;

use crate::types::{Dimensions, PipelineError};

/// Neighbor offsets `p2..p9`, clockwise starting north.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (0, -1),  // p2 N
    (1, -1),  // p3 NE
    (1, 0),   // p4 E
    (1, 1),   // p5 SE
    (0, 1),   // p6 S
    (-1, 1),  // p7 SW
    (-1, 0),  // p8 W
    (-1, -1), // p9 NW
];

/// A width x height binary raster backed by a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    /// Create an all-background mask.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::ZeroDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// Create a mask from a raw byte buffer, one byte per pixel in row-major
    /// order. Any positive value is treated as foreground and normalized
    /// to 255.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimensions`] if either dimension is zero,
    /// or [`PipelineError::BufferSizeMismatch`] if the buffer length does not
    /// equal `width * height`.
    pub fn from_raw(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(PipelineError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        for byte in &mut data {
            *byte = if *byte > 0 { 255 } else { 0 };
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a pair struct.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// The raw byte buffer (0 background, 255 foreground), row-major.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Whether the pixel at `(x, y)` is foreground.
    ///
    /// Coordinates outside the mask read as background, so border
    /// neighborhoods need no special casing at call sites.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] != 0
    }

    /// Set the pixel at `(x, y)`. Crate-private: consumers treat masks as
    /// immutable; only mask-producing stages write.
    pub(crate) fn set(&mut self, x: u32, y: u32, foreground: bool) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = if foreground { 255 } else { 0 };
    }

    /// The 8 neighbor flags of `(x, y)` as `p2..p9`, clockwise starting
    /// north. Out-of-bounds neighbors read as background.
    #[must_use]
    pub fn neighborhood(&self, x: i64, y: i64) -> [bool; 8] {
        let mut flags = [false; 8];
        for (flag, (dx, dy)) in flags.iter_mut().zip(NEIGHBOR_OFFSETS) {
            *flag = self.get(x + dx, y + dy);
        }
        flags
    }

    /// Count of foreground pixels in the mask.
    #[must_use]
    pub fn foreground_count(&self) -> u64 {
        self.data.iter().map(|&b| u64::from(b != 0)).sum()
    }

    /// Convert to an 8-bit grayscale image (0/255) for visualization.
    #[must_use]
    pub fn to_gray_image(&self) -> GrayImage {
        // from_raw only fails when the buffer is too short, which the
        // constructors rule out.
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// Count of 0-to-1 transitions walking the neighbor cycle
/// `p2, p3, ..., p9, p2`.
#[must_use]
pub fn transitions(neighborhood: &[bool; 8]) -> u8 {
    let mut count = 0;
    for i in 0..8 {
        if !neighborhood[i] && neighborhood[(i + 1) % 8] {
            count += 1;
        }
    }
    count
}

/// Count of foreground flags in a neighborhood.
#[must_use]
pub fn neighbor_count(neighborhood: &[bool; 8]) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let count = neighborhood.iter().filter(|&&b| b).count() as u8;
    count
}
