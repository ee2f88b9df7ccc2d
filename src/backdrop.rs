//! Styled backdrop synthesis
//!
//! Backdrops are generated procedurally and are fully determined by
//! `(width, height, style)`.

use crate::error::{Result, StudioError};
use crate::types::Style;
use image::{Rgb, RgbImage};

/// Top color of the brown gradient (`#85572A`)
pub const BROWN_GRADIENT_TOP: [u8; 3] = [133, 87, 42];
/// Bottom color of the brown gradient
pub const BROWN_GRADIENT_BOTTOM: [u8; 3] = [100, 60, 30];
/// Fill color of the minimal-white style
pub const MINIMAL_WHITE_FILL: [u8; 3] = [245, 245, 245];

/// Synthesize a backdrop for a named style
///
/// # Errors
/// - `UnsupportedStyle` when `style` is not a known style name
/// - `InvalidDimensions` when either dimension is zero
pub fn synthesize(width: u32, height: u32, style: &str) -> Result<RgbImage> {
    let style: Style = style.parse()?;
    render(width, height, style)
}

/// Render a backdrop for an already-parsed style
///
/// # Errors
/// - `InvalidDimensions` when either dimension is zero
pub fn render(width: u32, height: u32, style: Style) -> Result<RgbImage> {
    if width == 0 || height == 0 {
        return Err(StudioError::InvalidDimensions { width, height });
    }

    let backdrop = match style {
        Style::BrownGradient => {
            vertical_gradient(width, height, BROWN_GRADIENT_TOP, BROWN_GRADIENT_BOTTOM)
        },
        Style::MinimalWhite => RgbImage::from_pixel(width, height, Rgb(MINIMAL_WHITE_FILL)),
    };

    tracing::debug!(width, height, style = %style, "Synthesized backdrop");
    Ok(backdrop)
}

/// Linear interpolation from `top` (row 0) towards `bottom`
///
/// Row `i` receives `top * (1 - i/height) + bottom * (i/height)`, so the last
/// row stops one step short of `bottom`.
fn vertical_gradient(width: u32, height: u32, top: [u8; 3], bottom: [u8; 3]) -> RgbImage {
    let mut image = RgbImage::new(width, height);
    for (y, row) in image.rows_mut().enumerate() {
        let ratio = y as f64 / f64::from(height);
        let color = Rgb(std::array::from_fn(|c| {
            let top_c = f64::from(top.get(c).copied().unwrap_or(0));
            let bottom_c = f64::from(bottom.get(c).copied().unwrap_or(0));
            (top_c * (1.0 - ratio) + bottom_c * ratio).round() as u8
        }));
        for pixel in row {
            *pixel = color;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brown_gradient_dimensions_and_endpoints() {
        for (width, height) in [(1, 1), (3, 7), (64, 100), (200, 50)] {
            let backdrop = synthesize(width, height, "brown-gradient").unwrap();
            assert_eq!(backdrop.dimensions(), (width, height));
            assert_eq!(backdrop.get_pixel(0, 0).0, BROWN_GRADIENT_TOP);
            assert_eq!(backdrop.get_pixel(width - 1, 0).0, BROWN_GRADIENT_TOP);
        }

        let backdrop = synthesize(10, 100, "brown-gradient").unwrap();
        let last = backdrop.get_pixel(5, 99).0;
        for (channel, target) in last.iter().zip(BROWN_GRADIENT_BOTTOM) {
            assert!(channel.abs_diff(target) <= 1, "{last:?} not close to bottom color");
        }
    }

    #[test]
    fn test_brown_gradient_is_monotonic_and_row_uniform() {
        let backdrop = synthesize(4, 50, "brown-gradient").unwrap();
        let mut previous = backdrop.get_pixel(0, 0).0;
        for y in 0..50 {
            let first = backdrop.get_pixel(0, y).0;
            for x in 1..4 {
                assert_eq!(backdrop.get_pixel(x, y).0, first);
            }
            for c in 0..3 {
                assert!(first[c] <= previous[c]);
            }
            previous = first;
        }
    }

    #[test]
    fn test_gradient_midpoint_rounding() {
        // ratio 0.5: (133+100)/2 = 116.5 -> 117, (87+60)/2 = 73.5 -> 74, (42+30)/2 = 36
        let backdrop = synthesize(1, 2, "brown-gradient").unwrap();
        assert_eq!(backdrop.get_pixel(0, 1).0, [117, 74, 36]);
    }

    #[test]
    fn test_minimal_white_is_uniform() {
        let backdrop = synthesize(8, 6, "minimal-white").unwrap();
        assert!(backdrop.pixels().all(|p| p.0 == MINIMAL_WHITE_FILL));
    }

    #[test]
    fn test_deterministic() {
        let a = synthesize(31, 17, "brown-gradient").unwrap();
        let b = synthesize(31, 17, "brown-gradient").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_unsupported_style() {
        let err = synthesize(10, 10, "neon-grid").unwrap_err();
        assert!(matches!(err, StudioError::UnsupportedStyle(ref s) if s == "neon-grid"));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            synthesize(0, 10, "minimal-white"),
            Err(StudioError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(render(10, 0, Style::BrownGradient).is_err());
    }
}
