//! Per-gesture state.
//!
//! A [`PointerSession`] is created on pointer-down, mutated through
//! drag/move events, and discarded on pointer-up or exit. It is owned
//! exclusively by the classifier and never shared.

use websurface_core::{Point, PointerOptions};

/// Optional operations a browser handle may support.
///
/// An explicit descriptor instead of runtime type inspection: the classifier
/// snapshots it once per gesture (the handle can change between gestures,
/// e.g. when a popup replaces it).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleCapabilities {
    /// The handle accepts explicit pointer-down / pointer-up calls.
    pub explicit_pointer_events: bool,
    /// The handle accepts programmatic pointer moves: hover, and the
    /// drag-within-page fallback when explicit pointer events are
    /// unavailable.
    pub movable_pointer: bool,
}

/// Fate of the deferred click for the current gesture.
///
/// A click is deferred at pointer-down so a drag can still cancel it, and
/// committed at pointer-up only if it survived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickState {
    Pending,
    Cancelled,
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    /// Button down, threshold not yet crossed.
    Pressed,
    /// Threshold crossed; the gesture is a drag.
    Dragging,
    /// Explicit pointer-down was forwarded to the page; the page owns the
    /// gesture until pointer-up.
    Captured,
}

#[derive(Clone, Copy, Debug)]
pub struct PointerSession {
    pub phase: GesturePhase,
    pub click: ClickState,
    /// Normalized press position; a surviving click is committed here, not
    /// at the release point.
    pub down_point: Point,
    /// Previous drag position in viewport pixels, for scroll deltas.
    pub prev_drag_px: Point,
    /// Last point a move-pointer intent was dispatched for, to suppress
    /// duplicates.
    pub prev_move_sent: Option<Point>,
    /// Whether the cumulative displacement ever exceeded the threshold.
    pub threshold_crossed: bool,
    /// Capabilities snapshotted at pointer-down. In-gesture transitions
    /// consult this snapshot, never the handle's live descriptor, so a
    /// handle swapped mid-gesture cannot change the gesture's behavior.
    pub capabilities: HandleCapabilities,
    /// Button / click-count metadata from the press.
    pub options: PointerOptions,
}

impl PointerSession {
    /// Cancels the deferred click. A committed click cannot be cancelled.
    pub fn cancel_click(&mut self) {
        if self.click == ClickState::Pending {
            self.click = ClickState::Cancelled;
        }
    }

    /// Commits the deferred click, if it survived to release.
    ///
    /// Transitions `Pending` to `Committed` and reports whether a click
    /// intent should be dispatched. Cancelled clicks stay cancelled, and a
    /// session commits at most once.
    pub fn commit_click(&mut self) -> bool {
        if self.click != ClickState::Pending {
            return false;
        }
        self.click = ClickState::Committed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_session() -> PointerSession {
        PointerSession {
            phase: GesturePhase::Pressed,
            click: ClickState::Pending,
            down_point: Point::ZERO,
            prev_drag_px: Point::ZERO,
            prev_move_sent: None,
            threshold_crossed: false,
            capabilities: HandleCapabilities::default(),
            options: PointerOptions::default(),
        }
    }

    #[test]
    fn a_pending_click_commits_exactly_once() {
        let mut session = pending_session();
        assert!(session.commit_click());
        assert_eq!(session.click, ClickState::Committed);
        assert!(!session.commit_click());
    }

    #[test]
    fn a_cancelled_click_never_commits() {
        let mut session = pending_session();
        session.cancel_click();
        assert_eq!(session.click, ClickState::Cancelled);
        assert!(!session.commit_click());
        assert_eq!(session.click, ClickState::Cancelled);
    }

    #[test]
    fn a_committed_click_cannot_be_cancelled() {
        let mut session = pending_session();
        assert!(session.commit_click());
        session.cancel_click();
        assert_eq!(session.click, ClickState::Committed);
    }
}
