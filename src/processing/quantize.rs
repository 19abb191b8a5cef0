//! Median-cut palette extraction.
//!
//! Pixels are bucketed by their 5-bit-per-channel color. Each bucket keeps the
//! sum of the original 8-bit channels so that swatch colors are exact averages
//! of the pixels they represent rather than re-expanded 5-bit values.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use image::{Rgb, RgbaImage};
use tracing::trace;

use crate::processing::filters::{ColorFilter, NoFilter};

const QUANTIZE_BITS: u8 = 5;
const QUANTIZE_SHIFT: u8 = 8 - QUANTIZE_BITS;

/// A representative color and the number of source pixels assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub rgb: Rgb<u8>,
    pub population: u32,
}

impl Swatch {
    #[must_use]
    pub const fn new(rgb: [u8; 3], population: u32) -> Self {
        Self {
            rgb: Rgb(rgb),
            population,
        }
    }
}

/// Reduces a pixel buffer to at most `max_colors` swatches.
///
/// Implementations must be deterministic: the same input produces the same
/// swatches in the same order.
pub trait Quantizer: fmt::Debug + Send + Sync {
    fn quantize(&self, pixels: &RgbaImage, max_colors: usize) -> Result<Vec<Swatch>>;
}

#[derive(Debug)]
pub struct MedianCutQuantizer {
    filter: Box<dyn ColorFilter>,
}

impl Default for MedianCutQuantizer {
    fn default() -> Self {
        Self::new(Box::new(NoFilter))
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    key: u16,
    count: u32,
    sum: [u64; 3],
}

impl Bucket {
    fn quantized(&self) -> [u8; 3] {
        [
            ((self.key >> (2 * QUANTIZE_BITS)) & 0x1f) as u8,
            ((self.key >> QUANTIZE_BITS) & 0x1f) as u8,
            (self.key & 0x1f) as u8,
        ]
    }

    fn mean(&self) -> Rgb<u8> {
        mean_color(self.sum, u64::from(self.count))
    }
}

fn mean_color(sum: [u64; 3], count: u64) -> Rgb<u8> {
    if count == 0 {
        return Rgb([0, 0, 0]);
    }
    Rgb(sum.map(|s| ((s + count / 2) / count).min(255) as u8))
}

#[inline]
fn quantize_key(r: u8, g: u8, b: u8) -> u16 {
    let r = u16::from(r >> QUANTIZE_SHIFT);
    let g = u16::from(g >> QUANTIZE_SHIFT);
    let b = u16::from(b >> QUANTIZE_SHIFT);
    (r << (2 * QUANTIZE_BITS)) | (g << QUANTIZE_BITS) | b
}

/// Contiguous, inclusive range of buckets forming one color box.
#[derive(Debug, Clone, Copy)]
struct ColorBox {
    lower: usize,
    upper: usize,
}

impl ColorBox {
    fn can_split(&self) -> bool {
        self.upper > self.lower
    }

    fn bounds(&self, buckets: &[Bucket]) -> ([u8; 3], [u8; 3]) {
        let mut min = [u8::MAX; 3];
        let mut max = [0u8; 3];
        for bucket in &buckets[self.lower..=self.upper] {
            let q = bucket.quantized();
            for c in 0..3 {
                min[c] = min[c].min(q[c]);
                max[c] = max[c].max(q[c]);
            }
        }
        (min, max)
    }

    fn volume(&self, buckets: &[Bucket]) -> u32 {
        let (min, max) = self.bounds(buckets);
        (0..3)
            .map(|c| u32::from(max[c] - min[c]) + 1)
            .product()
    }

    fn longest_dimension(&self, buckets: &[Bucket]) -> usize {
        let (min, max) = self.bounds(buckets);
        let len = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        if len[0] >= len[1] && len[0] >= len[2] {
            0
        } else if len[1] >= len[0] && len[1] >= len[2] {
            1
        } else {
            2
        }
    }

    /// Split at the population median of the longest dimension. `self` keeps
    /// the lower half and the upper half is returned.
    fn split(&mut self, buckets: &mut [Bucket]) -> ColorBox {
        let dim = self.longest_dimension(buckets);
        let range = &mut buckets[self.lower..=self.upper];
        range.sort_by_key(|b| (b.quantized()[dim], b.key));

        let total: u64 = range.iter().map(|b| u64::from(b.count)).sum();
        let midpoint = total / 2;
        let mut running = 0u64;
        let mut split_at = self.lower;
        for (offset, bucket) in range.iter().enumerate() {
            running += u64::from(bucket.count);
            if running >= midpoint {
                split_at = self.lower + offset;
                break;
            }
        }
        let split_at = split_at.min(self.upper - 1);

        let upper = ColorBox {
            lower: split_at + 1,
            upper: self.upper,
        };
        self.upper = split_at;
        upper
    }

    fn swatch(&self, buckets: &[Bucket]) -> Swatch {
        let mut sum = [0u64; 3];
        let mut population = 0u64;
        for bucket in &buckets[self.lower..=self.upper] {
            population += u64::from(bucket.count);
            for c in 0..3 {
                sum[c] += bucket.sum[c];
            }
        }
        Swatch {
            rgb: mean_color(sum, population),
            population: population.min(u64::from(u32::MAX)) as u32,
        }
    }
}

impl MedianCutQuantizer {
    pub fn new(filter: Box<dyn ColorFilter>) -> Self {
        Self { filter }
    }

    fn histogram(&self, pixels: &RgbaImage) -> Vec<Bucket> {
        let mut buckets: BTreeMap<u16, Bucket> = BTreeMap::new();
        for px in pixels.pixels() {
            let [r, g, b, _] = px.0;
            let key = quantize_key(r, g, b);
            let bucket = buckets.entry(key).or_insert(Bucket {
                key,
                count: 0,
                sum: [0; 3],
            });
            bucket.count += 1;
            bucket.sum[0] += u64::from(r);
            bucket.sum[1] += u64::from(g);
            bucket.sum[2] += u64::from(b);
        }
        buckets
            .into_values()
            .filter(|bucket| self.filter.allows(bucket.mean()))
            .collect()
    }
}

impl Quantizer for MedianCutQuantizer {
    fn quantize(&self, pixels: &RgbaImage, max_colors: usize) -> Result<Vec<Swatch>> {
        anyhow::ensure!(max_colors > 0, "max_colors must be greater than zero");
        let mut buckets = self.histogram(pixels);
        trace!(distinct = buckets.len(), max_colors, "built color histogram");

        if buckets.len() <= max_colors {
            return Ok(buckets
                .iter()
                .map(|bucket| Swatch {
                    rgb: bucket.mean(),
                    population: bucket.count,
                })
                .collect());
        }

        let mut boxes = vec![ColorBox {
            lower: 0,
            upper: buckets.len() - 1,
        }];
        while boxes.len() < max_colors {
            let mut target: Option<(usize, u32)> = None;
            for (idx, candidate) in boxes.iter().enumerate() {
                if !candidate.can_split() {
                    continue;
                }
                let volume = candidate.volume(&buckets);
                if target.is_none_or(|(_, best)| volume > best) {
                    target = Some((idx, volume));
                }
            }
            let Some((idx, _)) = target else {
                break;
            };
            let upper = boxes[idx].split(&mut buckets);
            boxes.push(upper);
        }

        // Filtering happens per bucket only, so populations always add up to
        // the number of pixels that passed the filter.
        Ok(boxes
            .iter()
            .map(|color_box| color_box.swatch(&buckets))
            .collect())
    }
}
