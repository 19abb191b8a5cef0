use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::chrome::{StatusBarChrome, apply_outcome};
use crate::error::Error;
use crate::geometry::Region;
use crate::selector::{Analysis, StyleSelector};

/// Run one analysis on the blocking pool so the calling task stays responsive.
///
/// # Errors
/// Whatever [`StyleSelector::analyze`] returns, or [`Error::Worker`] if the
/// blocking task panicked.
pub async fn analyze(
    selector: Arc<StyleSelector>,
    image: Arc<RgbaImage>,
    region: Region,
) -> Result<Option<Analysis>, Error> {
    debug!(?region, "scheduling status bar analysis");
    tokio::task::spawn_blocking(move || selector.analyze(&image, region))
        .await
        .map_err(|err| Error::Worker(err.to_string()))?
}

/// Analyze and apply the decision to `chrome`. On failure, or when no decision
/// is reached, the chrome keeps its current style.
///
/// # Errors
/// See [`analyze`].
pub async fn analyze_into<C: StatusBarChrome + ?Sized>(
    selector: Arc<StyleSelector>,
    image: Arc<RgbaImage>,
    region: Region,
    chrome: &mut C,
) -> Result<Option<Analysis>, Error> {
    let outcome = analyze(selector, image, region).await?;
    apply_outcome(chrome, outcome.map(|a| a.decision));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrome::{SYSTEM_UI_FLAG_LIGHT_STATUS_BAR, SystemUiFlags};
    use crate::samples::split_image;
    use crate::selector::StyleDecision;

    #[tokio::test]
    async fn runs_selector_off_thread() {
        let selector = Arc::new(StyleSelector::default());
        let image = Arc::new(split_image(10, 10));
        let top = analyze(Arc::clone(&selector), Arc::clone(&image), Region::new(0, 0, 10, 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(top.decision, StyleDecision::LightIcons);
        let bottom = analyze(selector, image, Region::new(0, 5, 10, 10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bottom.decision, StyleDecision::DarkIcons);
    }

    #[tokio::test]
    async fn invalid_region_error_survives_the_worker() {
        let err = analyze(
            Arc::new(StyleSelector::default()),
            Arc::new(split_image(4, 4)),
            Region::new(0, 3, 4, 1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { .. }));
    }

    #[tokio::test]
    async fn failed_analysis_keeps_chrome_and_next_image_still_applies() {
        let selector = Arc::new(StyleSelector::default());
        let image = Arc::new(split_image(10, 10));
        let mut flags = SystemUiFlags(SYSTEM_UI_FLAG_LIGHT_STATUS_BAR);

        let err = analyze_into(
            Arc::clone(&selector),
            Arc::clone(&image),
            Region::new(0, 5, 10, 1),
            &mut flags,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { .. }));
        assert_eq!(flags.bits(), SYSTEM_UI_FLAG_LIGHT_STATUS_BAR);

        let next = analyze_into(selector, image, Region::new(0, 0, 10, 5), &mut flags)
            .await
            .unwrap();
        assert_eq!(next.map(|a| a.decision), Some(StyleDecision::LightIcons));
        assert_eq!(flags.bits(), 0);
    }
}
