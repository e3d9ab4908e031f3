//! Drag policy configuration.
//!
//! The threshold is intentionally shared between the scroll and click paths
//! to avoid "dead zones" where a gesture is already visually scrolling but a
//! release would still fire a click.

/// Drag threshold in device pixels.
///
/// If the pointer moves more than this distance from the initial press
/// position, a pending click is cancelled and the gesture becomes a drag.
///
/// 8.0 is a reasonable touch slop: large enough to ignore finger jitter,
/// small enough to feel responsive, and in line with common platform
/// conventions (Android uses ~8dp for ViewConfiguration.TOUCH_SLOP).
pub const DRAG_THRESHOLD: f32 = 8.0;

/// What a press-and-drag on the surface means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Drags do nothing and clicks are suppressed. Discrete scroll events
    /// are still forwarded when scrolling is independently enabled.
    Disabled,
    /// Drags scroll the page content, like touch scrolling.
    DragToScroll,
    /// Drags move the pointer within the page, so the page can implement
    /// its own drag interactions (sliders, drag-and-drop).
    DragWithinPage,
}

/// Gesture classification policy.
///
/// Read-only during a gesture; swapping it mid-gesture is rejected by
/// [`crate::GestureClassifier::set_policy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragPolicy {
    pub mode: DragMode,
    /// Minimum cumulative pointer displacement, in device pixels, before a
    /// pending click is reclassified as a drag.
    pub threshold_px: f32,
    /// Scale applied to drag-to-scroll deltas before they are handed to the
    /// browser. Wheel deltas are not affected.
    pub scroll_sensitivity: f32,
}

impl DragPolicy {
    pub fn new(mode: DragMode) -> Self {
        Self {
            mode,
            threshold_px: DRAG_THRESHOLD,
            scroll_sensitivity: 1.0,
        }
    }
}

impl Default for DragPolicy {
    fn default() -> Self {
        Self::new(DragMode::DragToScroll)
    }
}
