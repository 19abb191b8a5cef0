//! Region-of-interest geometry and the status-bar strip derived from display metrics.

use serde::Deserialize;

use crate::error::Error;

/// Axis-aligned rectangle in pixel coordinates. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Region {
    #[must_use]
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Region covering a whole `width` x `height` image.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, i64::from(width), i64::from(height))
    }

    #[must_use]
    pub const fn width(&self) -> i64 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i64 {
        self.bottom - self.top
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Reject rectangles with a negative extent.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRegion`] if `right < left` or `bottom < top`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.width() < 0 || self.height() < 0 {
            return Err(Error::InvalidRegion {
                left: self.left,
                top: self.top,
                right: self.right,
                bottom: self.bottom,
            });
        }
        Ok(())
    }

    /// Clamp to the bounds of a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the region lies inside the image.
    #[must_use]
    pub fn intersect_image(&self, width: u32, height: u32) -> Option<Self> {
        let clamped = Self {
            left: self.left.clamp(0, i64::from(width)),
            top: self.top.clamp(0, i64::from(height)),
            right: self.right.clamp(0, i64::from(width)),
            bottom: self.bottom.clamp(0, i64::from(height)),
        };
        (!clamped.is_empty()).then_some(clamped)
    }
}

/// Screen metrics used to locate the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DisplayGeometry {
    pub screen_width: u32,
    pub status_bar_height: u32,
}

impl DisplayGeometry {
    const DEFAULT_SCREEN_WIDTH: u32 = 1080;
    // 24dp at xxhdpi
    const DEFAULT_STATUS_BAR_HEIGHT: u32 = 72;

    /// The strip at the top of the screen covered by the status bar.
    #[must_use]
    pub fn status_bar_region(&self) -> Region {
        Region::new(
            0,
            0,
            i64::from(self.screen_width),
            i64::from(self.status_bar_height),
        )
    }
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            screen_width: Self::DEFAULT_SCREEN_WIDTH,
            status_bar_height: Self::DEFAULT_STATUS_BAR_HEIGHT,
        }
    }
}
