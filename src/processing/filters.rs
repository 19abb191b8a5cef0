//! Color filters applied while building a palette.

use std::fmt;

use image::Rgb;
use serde::Deserialize;

use crate::processing::color::to_hsl;

/// Decides whether a color may contribute to the palette.
pub trait ColorFilter: fmt::Debug + Send + Sync {
    fn allows(&self, rgb: Rgb<u8>) -> bool;
}

/// Lets every color through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl ColorFilter for NoFilter {
    fn allows(&self, _rgb: Rgb<u8>) -> bool {
        true
    }
}

/// Rejects near-black, near-white and the skin-tone "red I-line".
///
/// Useful when the palette should describe the image content rather than its
/// shadows and highlights. Note that a region made only of such colors yields
/// no swatch at all.
#[derive(Debug, Clone, Copy)]
pub struct ExtremesFilter {
    pub black_max_lightness: f32,
    pub white_min_lightness: f32,
}

impl Default for ExtremesFilter {
    fn default() -> Self {
        Self {
            black_max_lightness: 0.05,
            white_min_lightness: 0.95,
        }
    }
}

impl ExtremesFilter {
    fn is_near_red_i_line(hsl: [f32; 3]) -> bool {
        (10.0..=37.0).contains(&hsl[0]) && hsl[1] <= 0.82
    }
}

impl ColorFilter for ExtremesFilter {
    fn allows(&self, rgb: Rgb<u8>) -> bool {
        let hsl = to_hsl(rgb);
        hsl[2] > self.black_max_lightness
            && hsl[2] < self.white_min_lightness
            && !Self::is_near_red_i_line(hsl)
    }
}

/// Filter selection as written in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorFilterKind {
    #[default]
    None,
    Extremes,
}

impl ColorFilterKind {
    pub fn build(self) -> Box<dyn ColorFilter> {
        match self {
            Self::None => Box::new(NoFilter),
            Self::Extremes => Box::new(ExtremesFilter::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter_allows_extremes() {
        assert!(NoFilter.allows(Rgb([0, 0, 0])));
        assert!(NoFilter.allows(Rgb([255, 255, 255])));
    }

    #[test]
    fn extremes_filter_rejects_black_white_and_skin() {
        let f = ExtremesFilter::default();
        assert!(!f.allows(Rgb([0, 0, 0])));
        assert!(!f.allows(Rgb([250, 250, 250])));
        // hue ~25deg, moderate saturation
        assert!(!f.allows(Rgb([200, 150, 110])));
        assert!(f.allows(Rgb([30, 90, 200])));
        assert!(f.allows(Rgb([128, 128, 128])));
    }

    #[test]
    fn kind_parses_from_yaml() {
        let kind: ColorFilterKind = serde_yaml::from_str("extremes").unwrap();
        assert_eq!(kind, ColorFilterKind::Extremes);
        assert!(!kind.build().allows(Rgb([0, 0, 0])));
    }
}
