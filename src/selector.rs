//! Status-bar icon style selection from the luminance of the dominant color
//! behind the status bar.

use std::fmt;

use anyhow::Context;
use fast_image_resize as fir;
use image::{RgbaImage, imageops};
use tracing::debug;

use crate::config::AnalysisOptions;
use crate::error::Error;
use crate::geometry::Region;
use crate::processing::color::{relative_luminance, to_hex};
use crate::processing::quantize::{MedianCutQuantizer, Quantizer, Swatch};

pub const DEFAULT_MAX_SWATCHES: usize = 5;
pub const DEFAULT_LUMINANCE_THRESHOLD: f64 = 0.5;

/// How status-bar icons should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleDecision {
    /// Light icons, for a dark background.
    LightIcons,
    /// Dark icons, for a light background.
    DarkIcons,
}

impl StyleDecision {
    /// Map a luminance to a style. Values strictly below `threshold` count as dark.
    #[must_use]
    pub fn from_luminance(luminance: f64, threshold: f64) -> Self {
        if luminance < threshold {
            Self::LightIcons
        } else {
            Self::DarkIcons
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LightIcons => "light-icons",
            Self::DarkIcons => "dark-icons",
        }
    }
}

impl fmt::Display for StyleDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision together with the data it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub dominant: Swatch,
    pub luminance: f64,
    pub decision: StyleDecision,
}

/// First swatch with the largest population. Later swatches replace the pick
/// only when strictly more populous.
#[must_use]
pub fn dominant_swatch(swatches: &[Swatch]) -> Option<Swatch> {
    let mut best: Option<Swatch> = None;
    for swatch in swatches {
        if best.is_none_or(|b| swatch.population > b.population) {
            best = Some(*swatch);
        }
    }
    best
}

#[derive(Debug)]
pub struct StyleSelector {
    max_swatches: usize,
    luminance_threshold: f64,
    resize_area: Option<u32>,
    quantizer: Box<dyn Quantizer>,
}

impl Default for StyleSelector {
    fn default() -> Self {
        Self {
            max_swatches: DEFAULT_MAX_SWATCHES,
            luminance_threshold: DEFAULT_LUMINANCE_THRESHOLD,
            resize_area: None,
            quantizer: Box::new(MedianCutQuantizer::default()),
        }
    }
}

impl StyleSelector {
    /// Build a selector from validated analysis options.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the options are out of range.
    pub fn from_options(options: &AnalysisOptions) -> Result<Self, Error> {
        Self::default()
            .with_quantizer(Box::new(MedianCutQuantizer::new(options.color_filter.build())))
            .with_resize_area(options.resize_area)
            .with_params(options.max_swatches, options.luminance_threshold)
    }

    /// Replace the swatch cap and luminance threshold.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `max_swatches` is zero or the
    /// threshold is not within `[0, 1]`.
    pub fn with_params(mut self, max_swatches: usize, luminance_threshold: f64) -> Result<Self, Error> {
        validate_params(max_swatches, luminance_threshold)?;
        self.max_swatches = max_swatches;
        self.luminance_threshold = luminance_threshold;
        Ok(self)
    }

    /// Cap on the number of pixels handed to the quantizer; larger crops are
    /// downsampled first. `None` (the default) analyses every pixel of the
    /// crop, so swatch populations are exact source-pixel counts.
    #[must_use]
    pub fn with_resize_area(mut self, resize_area: Option<u32>) -> Self {
        self.resize_area = resize_area.filter(|area| *area > 0);
        self
    }

    #[must_use]
    pub fn with_quantizer(mut self, quantizer: Box<dyn Quantizer>) -> Self {
        self.quantizer = quantizer;
        self
    }

    #[must_use]
    pub const fn max_swatches(&self) -> usize {
        self.max_swatches
    }

    #[must_use]
    pub const fn luminance_threshold(&self) -> f64 {
        self.luminance_threshold
    }

    /// Decide the icon style for the part of `image` covered by `region`.
    ///
    /// `Ok(None)` means no color could be extracted; callers should keep
    /// whatever style is currently shown.
    ///
    /// # Errors
    /// [`Error::InvalidRegion`] for a region with negative extent,
    /// [`Error::Downsample`] if a configured resize fails, and
    /// [`Error::Quantizer`] if palette extraction fails.
    pub fn select_style(
        &self,
        image: &RgbaImage,
        region: Region,
    ) -> Result<Option<StyleDecision>, Error> {
        Ok(self.analyze(image, region)?.map(|analysis| analysis.decision))
    }

    /// Like [`select_style`](Self::select_style) but keeps the dominant swatch
    /// and its luminance.
    ///
    /// # Errors
    /// See [`select_style`](Self::select_style).
    pub fn analyze(&self, image: &RgbaImage, region: Region) -> Result<Option<Analysis>, Error> {
        region.validate()?;
        let Some(bounded) = region.intersect_image(image.width(), image.height()) else {
            debug!(?region, width = image.width(), height = image.height(), "region misses image");
            return Ok(None);
        };

        let crop = crop_region(image, bounded);
        let sample = match self.resize_area {
            Some(max_area) => downsample_to_area(crop, max_area).map_err(Error::Downsample)?,
            None => crop,
        };

        let swatches = self
            .quantizer
            .quantize(&sample, self.max_swatches)
            .map_err(Error::Quantizer)?;
        debug!(
            count = swatches.len(),
            sample_w = sample.width(),
            sample_h = sample.height(),
            "extracted swatches"
        );

        let Some(dominant) = dominant_swatch(&swatches) else {
            debug!("no swatch extracted; leaving style undecided");
            return Ok(None);
        };
        let luminance = relative_luminance(dominant.rgb);
        let decision = StyleDecision::from_luminance(luminance, self.luminance_threshold);
        debug!(
            swatch = %to_hex(dominant.rgb),
            population = dominant.population,
            luminance,
            %decision,
            "selected status bar style"
        );

        Ok(Some(Analysis {
            dominant,
            luminance,
            decision,
        }))
    }
}

/// One-shot selection with the default median-cut quantizer.
///
/// # Errors
/// [`Error::InvalidRegion`], [`Error::InvalidParameter`] or [`Error::Quantizer`].
pub fn select_style(
    image: &RgbaImage,
    region: Region,
    max_swatches: usize,
    luminance_threshold: f64,
) -> Result<Option<StyleDecision>, Error> {
    StyleSelector::default()
        .with_params(max_swatches, luminance_threshold)?
        .select_style(image, region)
}

fn validate_params(max_swatches: usize, luminance_threshold: f64) -> Result<(), Error> {
    if max_swatches == 0 {
        return Err(Error::InvalidParameter(
            "max swatches must be greater than zero".into(),
        ));
    }
    if !(0.0..=1.0).contains(&luminance_threshold) {
        return Err(Error::InvalidParameter(format!(
            "luminance threshold {luminance_threshold} must be within [0, 1]"
        )));
    }
    Ok(())
}

/// Scale `w` x `h` down uniformly so the product fits in `max_area`. The
/// shorter side is fixed first (at least 1) and the longer side takes
/// whatever area remains.
fn bounded_dimensions(w: u32, h: u32, max_area: u32) -> (u32, u32) {
    let max_area = max_area.max(1);
    let scale = (f64::from(max_area) / (f64::from(w) * f64::from(h))).sqrt();
    let fit = |short: u32, long: u32| {
        let short_t = ((f64::from(short) * scale).floor() as u32).clamp(1, short);
        let long_t = (max_area / short_t).clamp(1, long);
        (short_t, long_t)
    };
    if w <= h {
        fit(w, h)
    } else {
        let (th, tw) = fit(h, w);
        (tw, th)
    }
}

// `bounded` has already been clamped to the image.
fn crop_region(image: &RgbaImage, bounded: Region) -> RgbaImage {
    imageops::crop_imm(
        image,
        bounded.left as u32,
        bounded.top as u32,
        bounded.width() as u32,
        bounded.height() as u32,
    )
    .to_image()
}

/// Nearest-neighbour downsample so that `width * height <= max_area`.
/// Sampling never blends pixels, so no new colors enter the palette.
fn downsample_to_area(crop: RgbaImage, max_area: u32) -> anyhow::Result<RgbaImage> {
    let (w, h) = crop.dimensions();
    let area = u64::from(w) * u64::from(h);
    if area <= u64::from(max_area) {
        return Ok(crop);
    }

    let (target_w, target_h) = bounded_dimensions(w, h, max_area);
    let src_view = fir::images::ImageRef::new(w, h, crop.as_raw(), fir::PixelType::U8x4)
        .context("failed to create source view for region downsample")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Nearest);
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("region downsample failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("failed to construct downsampled RGBA image"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[derive(Debug)]
    struct FixedSwatches(Vec<Swatch>);

    impl Quantizer for FixedSwatches {
        fn quantize(&self, _pixels: &RgbaImage, max_colors: usize) -> anyhow::Result<Vec<Swatch>> {
            Ok(self.0.iter().copied().take(max_colors).collect())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Quantizer for Failing {
        fn quantize(&self, _pixels: &RgbaImage, _max_colors: usize) -> anyhow::Result<Vec<Swatch>> {
            anyhow::bail!("palette backend exploded")
        }
    }

    fn grey(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    #[test]
    fn threshold_comparison_is_strict() {
        assert_eq!(StyleDecision::from_luminance(0.49, 0.5), StyleDecision::LightIcons);
        assert_eq!(StyleDecision::from_luminance(0.5, 0.5), StyleDecision::DarkIcons);
        assert_eq!(StyleDecision::from_luminance(0.0, 0.0), StyleDecision::DarkIcons);
        assert_eq!(StyleDecision::from_luminance(0.99, 1.0), StyleDecision::LightIcons);
    }

    #[test]
    fn dominant_swatch_prefers_first_on_tie() {
        let swatches = [
            Swatch::new([1, 1, 1], 4),
            Swatch::new([2, 2, 2], 9),
            Swatch::new([3, 3, 3], 9),
            Swatch::new([4, 4, 4], 2),
        ];
        assert_eq!(dominant_swatch(&swatches), Some(Swatch::new([2, 2, 2], 9)));
        assert_eq!(dominant_swatch(&[]), None);
    }

    #[test]
    fn tie_break_decides_on_first_swatch() {
        let image = grey(4, 4, 0);
        let dark_first = StyleSelector::default().with_quantizer(Box::new(FixedSwatches(vec![
            Swatch::new([0, 0, 0], 8),
            Swatch::new([255, 255, 255], 8),
        ])));
        let light_first = StyleSelector::default().with_quantizer(Box::new(FixedSwatches(vec![
            Swatch::new([255, 255, 255], 8),
            Swatch::new([0, 0, 0], 8),
        ])));
        let region = Region::full(4, 4);
        assert_eq!(
            dark_first.select_style(&image, region).unwrap(),
            Some(StyleDecision::LightIcons)
        );
        assert_eq!(
            light_first.select_style(&image, region).unwrap(),
            Some(StyleDecision::DarkIcons)
        );
    }

    #[test]
    fn luminance_equal_to_threshold_is_dark_icons() {
        let image = grey(4, 2, 128);
        let lum = relative_luminance(image::Rgb([128, 128, 128]));
        let selector = StyleSelector::default().with_params(5, lum).unwrap();
        let analysis = selector.analyze(&image, Region::full(4, 2)).unwrap().unwrap();
        assert_eq!(analysis.luminance, lum);
        assert_eq!(analysis.decision, StyleDecision::DarkIcons);
    }

    #[test]
    fn empty_quantizer_output_is_no_decision() {
        let selector = StyleSelector::default().with_quantizer(Box::new(FixedSwatches(vec![])));
        assert_eq!(selector.select_style(&grey(2, 2, 0), Region::full(2, 2)).unwrap(), None);
    }

    #[test]
    fn quantizer_failure_propagates() {
        let selector = StyleSelector::default().with_quantizer(Box::new(Failing));
        let err = selector.select_style(&grey(2, 2, 0), Region::full(2, 2)).unwrap_err();
        assert!(matches!(err, Error::Quantizer(_)));
        assert!(err.to_string().contains("palette backend exploded"));
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(
            StyleSelector::default().with_params(0, 0.5),
            Err(Error::InvalidParameter(_))
        ));
        assert!(StyleSelector::default().with_params(5, 1.5).is_err());
        assert!(StyleSelector::default().with_params(5, -0.1).is_err());
        assert!(StyleSelector::default().with_params(5, f64::NAN).is_err());
    }

    #[test]
    fn downsample_bounds_area_and_keeps_colors() {
        let mut img = grey(300, 40, 10);
        for x in 150..300 {
            for y in 0..40 {
                img.put_pixel(x, y, Rgba([250, 250, 250, 255]));
            }
        }
        let small = downsample_to_area(img, 1000).unwrap();
        assert!(small.width() * small.height() <= 1000);
        assert!(small.pixels().all(|p| p[0] == 10 || p[0] == 250));
    }

    #[test]
    fn downsample_caps_thin_crops() {
        let wide = downsample_to_area(grey(100_000, 1, 5), 12_544).unwrap();
        assert_eq!(wide.dimensions(), (12_544, 1));
        let tall = downsample_to_area(grey(3, 50_000, 5), 1_000).unwrap();
        assert!(tall.width() * tall.height() <= 1_000);
        assert_eq!(tall.width(), 1);
    }

    #[test]
    fn bounded_dimensions_never_exceed_area() {
        for (w, h, max) in [(300, 40, 1000), (100_000, 1, 12_544), (7, 90_001, 50), (4_000, 3_000, 12_544)] {
            let (tw, th) = bounded_dimensions(w, h, max);
            assert!(tw >= 1 && th >= 1 && tw <= w && th <= h, "{w}x{h} -> {tw}x{th}");
            assert!(u64::from(tw) * u64::from(th) <= u64::from(max), "{w}x{h} -> {tw}x{th}");
        }
    }

    #[test]
    fn downsample_leaves_small_crops_alone() {
        let img = grey(10, 10, 77);
        let same = downsample_to_area(img.clone(), 100).unwrap();
        assert_eq!(same.as_raw(), img.as_raw());
    }
}
