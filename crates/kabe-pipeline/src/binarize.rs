//! Binarization: packed RGBA samples to a foreground mask.
//!
//! The first stage of the pipeline. Luminance uses the standard BT.601
//! weights `0.299*R + 0.587*G + 0.114*B`; the alpha channel is ignored.
//! With `inverse = true` (the default) pixels darker than the threshold
//! become foreground, matching floorplans drawn with dark walls on a
//! light background.

use crate::mask::Mask;
use crate::types::{BinarizeConfig, PipelineError};

/// Threshold a packed RGBA buffer (4 bytes per pixel, row-major) into a
/// foreground [`Mask`] of the same dimensions.
///
/// # Errors
///
/// Returns [`PipelineError::ZeroDimensions`] if either dimension is zero,
/// or [`PipelineError::BufferSizeMismatch`] if `rgba.len()` is not
/// `width * height * 4`.
pub fn binarize(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &BinarizeConfig,
) -> Result<Mask, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::ZeroDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(PipelineError::BufferSizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }

    let threshold = f64::from(config.threshold);
    let mut mask = Mask::new(width, height)?;

    for y in 0..height {
        for x in 0..width {
            let base = (y as usize * width as usize + x as usize) * 4;
            let lum = luminance(rgba[base], rgba[base + 1], rgba[base + 2]);
            let foreground = if config.inverse {
                lum < threshold
            } else {
                lum > threshold
            };
            mask.set(x, y, foreground);
        }
    }

    Ok(mask)
}

/// BT.601 luminance of an RGB sample.
fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.114f64.mul_add(
        f64::from(b),
        0.299f64.mul_add(f64::from(r), 0.587 * f64::from(g)),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build an RGBA buffer where every pixel has the given gray value.
    fn uniform_rgba(width: u32, height: u32, value: u8) -> Vec<u8> {
        let mut buf = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width * height {
            buf.extend_from_slice(&[value, value, value, 255]);
        }
        buf
    }

    #[test]
    fn zero_dimensions_rejected() {
        let result = binarize(&[], 0, 4, &BinarizeConfig::default());
        assert!(matches!(result, Err(PipelineError::ZeroDimensions { .. })));
    }

    #[test]
    fn wrong_buffer_length_rejected() {
        let result = binarize(&[0; 10], 2, 2, &BinarizeConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::BufferSizeMismatch {
                expected: 16,
                actual: 10,
            }),
        ));
    }

    #[test]
    fn inverse_marks_dark_pixels_foreground() {
        let dark = uniform_rgba(2, 2, 10);
        let mask = binarize(&dark, 2, 2, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.foreground_count(), 4);

        let light = uniform_rgba(2, 2, 200);
        let mask = binarize(&light, 2, 2, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn non_inverse_marks_bright_pixels_foreground() {
        let config = BinarizeConfig {
            threshold: 128,
            inverse: false,
        };
        let light = uniform_rgba(2, 2, 200);
        let mask = binarize(&light, 2, 2, &config).unwrap();
        assert_eq!(mask.foreground_count(), 4);

        let dark = uniform_rgba(2, 2, 10);
        let mask = binarize(&dark, 2, 2, &config).unwrap();
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn threshold_boundary_is_strict() {
        // Luminance exactly equal to the threshold is background in
        // both polarities (strict < and >).
        let exact = uniform_rgba(1, 1, 100);
        let inverse = BinarizeConfig {
            threshold: 100,
            inverse: true,
        };
        assert_eq!(binarize(&exact, 1, 1, &inverse).unwrap().foreground_count(), 0);
        let direct = BinarizeConfig {
            threshold: 100,
            inverse: false,
        };
        assert_eq!(binarize(&exact, 1, 1, &direct).unwrap().foreground_count(), 0);
    }

    #[test]
    fn luminance_is_channel_weighted() {
        // Pure green is brighter than pure red is brighter than pure blue.
        assert!(luminance(0, 255, 0) > luminance(255, 0, 0));
        assert!(luminance(255, 0, 0) > luminance(0, 0, 255));
    }

    #[test]
    fn output_dimensions_match_input() {
        let buf = uniform_rgba(17, 31, 0);
        let mask = binarize(&buf, 17, 31, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.width(), 17);
        assert_eq!(mask.height(), 31);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let mut buf = uniform_rgba(1, 1, 10);
        buf[3] = 0; // fully transparent, still dark
        let mask = binarize(&buf, 1, 1, &BinarizeConfig::default()).unwrap();
        assert_eq!(mask.foreground_count(), 1);
    }
}
