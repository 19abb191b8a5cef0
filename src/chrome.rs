//! Adapter from [`StyleDecision`] to the platform's status-bar flag word.

use tracing::trace;

use crate::selector::StyleDecision;

/// Set when the status bar is light and its icons are drawn dark.
pub const SYSTEM_UI_FLAG_LIGHT_STATUS_BAR: u32 = 0x0000_2000;

/// Return `flags` with the light-status-bar bit set for dark icons and cleared
/// for light icons. All other bits are preserved.
#[must_use]
pub const fn apply_to_flags(flags: u32, decision: StyleDecision) -> u32 {
    match decision {
        StyleDecision::DarkIcons => flags | SYSTEM_UI_FLAG_LIGHT_STATUS_BAR,
        // OR then XOR clears the bit whatever its previous state.
        StyleDecision::LightIcons => {
            (flags | SYSTEM_UI_FLAG_LIGHT_STATUS_BAR) ^ SYSTEM_UI_FLAG_LIGHT_STATUS_BAR
        }
    }
}

/// Read the current style back out of a flag word.
#[must_use]
pub const fn decision_from_flags(flags: u32) -> StyleDecision {
    if flags & SYSTEM_UI_FLAG_LIGHT_STATUS_BAR != 0 {
        StyleDecision::DarkIcons
    } else {
        StyleDecision::LightIcons
    }
}

/// Something that can draw status-bar icons in either style.
pub trait StatusBarChrome {
    fn apply(&mut self, decision: StyleDecision);
}

/// A window's system-UI visibility flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemUiFlags(pub u32);

impl SystemUiFlags {
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn decision(&self) -> StyleDecision {
        decision_from_flags(self.0)
    }
}

impl StatusBarChrome for SystemUiFlags {
    fn apply(&mut self, decision: StyleDecision) {
        let before = self.0;
        self.0 = apply_to_flags(self.0, decision);
        trace!(before, after = self.0, %decision, "updated system ui flags");
    }
}

/// Apply `outcome` if there is one. Without a decision the chrome keeps its
/// current style. Returns whether anything was applied.
pub fn apply_outcome<C: StatusBarChrome + ?Sized>(
    chrome: &mut C,
    outcome: Option<StyleDecision>,
) -> bool {
    match outcome {
        Some(decision) => {
            chrome.apply(decision);
            true
        }
        None => false,
    }
}
