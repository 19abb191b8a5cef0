//! The three demo backgrounds: all dark, all light, and dark over light.

use std::fmt;

use image::{Rgba, RgbaImage};

pub const DARK: Rgba<u8> = Rgba([20, 20, 20, 255]);
pub const LIGHT: Rgba<u8> = Rgba([240, 240, 240, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoImage {
    Dark,
    Light,
    Split,
}

impl DemoImage {
    pub const ALL: [Self; 3] = [Self::Dark, Self::Light, Self::Split];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Split => "split",
        }
    }

    #[must_use]
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        match self {
            Self::Dark => dark_image(width, height),
            Self::Light => light_image(width, height),
            Self::Split => split_image(width, height),
        }
    }
}

impl fmt::Display for DemoImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[must_use]
pub fn dark_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, DARK)
}

#[must_use]
pub fn light_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, LIGHT)
}

/// Top half dark, bottom half light. For odd heights the extra row is light.
#[must_use]
pub fn split_image(width: u32, height: u32) -> RgbaImage {
    let half = height / 2;
    RgbaImage::from_fn(width, height, |_, y| if y < half { DARK } else { LIGHT })
}
