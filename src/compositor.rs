//! Alpha compositing of a foreground over a backdrop

use crate::error::{Result, StudioError};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Composite `foreground` over `background` with the "over" operator
///
/// The background is treated as opaque; the output alpha is always 255.
///
/// # Errors
/// - `DimensionMismatch` when the two images differ in size
pub fn composite(background: &DynamicImage, foreground: &DynamicImage) -> Result<RgbaImage> {
    if background.dimensions() != foreground.dimensions() {
        return Err(StudioError::DimensionMismatch {
            background: background.dimensions(),
            foreground: foreground.dimensions(),
        });
    }

    let background = background.to_rgba8();
    let foreground = foreground.to_rgba8();
    Ok(composite_rgba(&background, &foreground))
}

fn composite_rgba(background: &RgbaImage, foreground: &RgbaImage) -> RgbaImage {
    let (width, height) = background.dimensions();
    let mut result = RgbaImage::new(width, height);

    for ((out, bg), fg) in result
        .pixels_mut()
        .zip(background.pixels())
        .zip(foreground.pixels())
    {
        *out = blend_over(*bg, *fg);
    }

    result
}

#[inline]
fn blend_over(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    match fg[3] {
        255 => Rgba([fg[0], fg[1], fg[2], 255]),
        0 => Rgba([bg[0], bg[1], bg[2], 255]),
        alpha => {
            let a = f32::from(alpha) / 255.0;
            let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8;
            Rgba([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]), 255])
        },
    }
}
