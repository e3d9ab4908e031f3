//! The gesture state machine.
//!
//! One logical pointer moves through `Idle` (no session), `Pressed`,
//! `Dragging` and `Captured`. Clicks are deferred at press time and either
//! committed at release or cancelled once the drag threshold is crossed, so
//! the cancellation window is explicit state rather than an implicit flag.
//!
//! Hover is independent of the drag machine: while idle, moves are forwarded
//! as pointer moves (deduplicated) when hovering is enabled and the handle
//! supports a movable pointer.

use smallvec::SmallVec;
use websurface_core::geometry::{normalized_to_spatial, Point, Size};
use websurface_core::{PointerEvent, PointerOptions};

use crate::policy::{DragMode, DragPolicy};
use crate::session::{ClickState, GesturePhase, HandleCapabilities, PointerSession};

/// Semantic action derived from the raw pointer stream, to be applied to the
/// browser handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerIntent {
    Click {
        point: Point,
        options: PointerOptions,
    },
    PointerDown {
        point: Point,
        options: PointerOptions,
    },
    PointerUp {
        point: Point,
        options: PointerOptions,
    },
    MovePointer {
        point: Point,
    },
    /// Scroll by `delta` (viewport pixels, already scaled by the policy's
    /// sensitivity for drag-to-scroll) at `point`.
    Scroll {
        delta: Point,
        point: Point,
    },
}

/// Up to two intents can result from one raw event (none is common).
pub type Intents = SmallVec<[PointerIntent; 2]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureError {
    /// The drag policy cannot change between pointer-down and pointer-up;
    /// the semantics of the in-flight gesture would be ambiguous.
    PolicyChangeMidGesture,
}

impl std::fmt::Display for GestureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureError::PolicyChangeMidGesture => {
                write!(f, "drag policy cannot change during an active gesture")
            }
        }
    }
}

impl std::error::Error for GestureError {}

pub struct GestureClassifier {
    policy: DragPolicy,
    /// Pixel size of the content surface; converts normalized deltas into
    /// the pixels the threshold is expressed in.
    viewport_px: Size,
    hover_enabled: bool,
    scroll_enabled: bool,
    session: Option<PointerSession>,
    /// Last hover point dispatched while idle, for deduplication.
    last_hover_sent: Option<Point>,
}

impl GestureClassifier {
    pub fn new(policy: DragPolicy, viewport_px: Size) -> Self {
        Self {
            policy,
            viewport_px,
            hover_enabled: false,
            scroll_enabled: true,
            session: None,
            last_hover_sent: None,
        }
    }

    pub fn policy(&self) -> DragPolicy {
        self.policy
    }

    /// Swaps the policy between gestures.
    ///
    /// Rejected while a gesture is in flight; the current gesture keeps the
    /// policy it started with.
    pub fn set_policy(&mut self, policy: DragPolicy) -> Result<(), GestureError> {
        if self.session.is_some() {
            return Err(GestureError::PolicyChangeMidGesture);
        }
        self.policy = policy;
        Ok(())
    }

    pub fn set_viewport_px(&mut self, viewport_px: Size) {
        self.viewport_px = viewport_px;
    }

    pub fn set_hover_enabled(&mut self, enabled: bool) {
        self.hover_enabled = enabled;
    }

    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled = enabled;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.session.is_some()
    }

    /// Feeds one raw event through the state machine.
    ///
    /// `capabilities` is the handle's current descriptor; it is snapshotted
    /// into the session at pointer-down and the snapshot is used for the
    /// rest of that gesture.
    pub fn process(&mut self, event: PointerEvent, capabilities: HandleCapabilities) -> Intents {
        match event {
            PointerEvent::Down { point, options } => self.on_down(point, options, capabilities),
            PointerEvent::Move { point } => self.on_move(point, capabilities),
            PointerEvent::Up { point } => self.on_up(point),
            PointerEvent::Exited => self.on_exited(capabilities),
            PointerEvent::Scrolled { delta, point } => self.on_scrolled(delta, point),
        }
    }

    fn on_down(
        &mut self,
        point: Point,
        options: PointerOptions,
        capabilities: HandleCapabilities,
    ) -> Intents {
        let mut intents = Intents::new();
        if self.session.is_some() {
            // A down without a matching up; the old gesture is stale.
            log::debug!("pointer down while a gesture was active; discarding previous session");
        }

        let captured =
            self.policy.mode == DragMode::DragWithinPage && capabilities.explicit_pointer_events;
        let (phase, click) = if captured {
            intents.push(PointerIntent::PointerDown { point, options });
            // The page owns the gesture; no deferred click.
            (GesturePhase::Captured, ClickState::Cancelled)
        } else if self.policy.mode == DragMode::Disabled {
            (GesturePhase::Pressed, ClickState::Cancelled)
        } else {
            (GesturePhase::Pressed, ClickState::Pending)
        };

        self.session = Some(PointerSession {
            phase,
            click,
            down_point: point,
            prev_drag_px: normalized_to_spatial(point, self.viewport_px),
            prev_move_sent: captured.then_some(point),
            threshold_crossed: false,
            capabilities,
            options,
        });
        intents
    }

    fn on_move(&mut self, point: Point, capabilities: HandleCapabilities) -> Intents {
        let Some(mut session) = self.session.take() else {
            return self.on_hover_move(point, capabilities);
        };

        let mut intents = Intents::new();
        let current_px = normalized_to_spatial(point, self.viewport_px);
        let displacement_px = Point {
            x: (point.x - session.down_point.x) * self.viewport_px.width,
            y: (point.y - session.down_point.y) * self.viewport_px.height,
        };
        if displacement_px.length() > self.policy.threshold_px {
            session.threshold_crossed = true;
        }

        match session.phase {
            GesturePhase::Captured => {
                if session.prev_move_sent != Some(point) {
                    intents.push(PointerIntent::MovePointer { point });
                    session.prev_move_sent = Some(point);
                }
            }
            GesturePhase::Pressed if session.threshold_crossed => match self.policy.mode {
                DragMode::DragToScroll => {
                    session.phase = GesturePhase::Dragging;
                    session.cancel_click();
                    if let Some(scroll) = self.drag_scroll(&mut session, current_px, point) {
                        intents.push(scroll);
                    }
                }
                DragMode::DragWithinPage => {
                    session.phase = GesturePhase::Dragging;
                    session.cancel_click();
                    // The fallback needs a movable pointer; the snapshot
                    // taken at pointer-down decides, not the live handle.
                    if session.capabilities.movable_pointer {
                        intents.push(PointerIntent::MovePointer { point });
                        session.prev_move_sent = Some(point);
                    } else {
                        log::debug!(
                            "drag-within-page without a movable pointer; drag not forwarded"
                        );
                    }
                }
                DragMode::Disabled => {
                    session.prev_drag_px = current_px;
                }
            },
            GesturePhase::Pressed => {
                session.prev_drag_px = current_px;
            }
            GesturePhase::Dragging => match self.policy.mode {
                DragMode::DragToScroll => {
                    if let Some(scroll) = self.drag_scroll(&mut session, current_px, point) {
                        intents.push(scroll);
                    }
                }
                DragMode::DragWithinPage => {
                    if session.capabilities.movable_pointer
                        && session.prev_move_sent != Some(point)
                    {
                        intents.push(PointerIntent::MovePointer { point });
                        session.prev_move_sent = Some(point);
                    }
                }
                // A Dragging session cannot exist in Disabled mode, but the
                // state machine stays total.
                DragMode::Disabled => {}
            },
        }

        self.session = Some(session);
        intents
    }

    /// Scroll delta from the previous drag point, negated so content follows
    /// the pointer (touch convention). Degenerate deltas (e.g. the pointer
    /// pinned at a device edge) are suppressed.
    fn drag_scroll(
        &self,
        session: &mut PointerSession,
        current_px: Point,
        point: Point,
    ) -> Option<PointerIntent> {
        let delta = Point {
            x: current_px.x - session.prev_drag_px.x,
            y: current_px.y - session.prev_drag_px.y,
        };
        session.prev_drag_px = current_px;
        if delta == Point::ZERO {
            return None;
        }
        Some(PointerIntent::Scroll {
            delta: Point {
                x: -delta.x * self.policy.scroll_sensitivity,
                y: -delta.y * self.policy.scroll_sensitivity,
            },
            point,
        })
    }

    fn on_up(&mut self, point: Point) -> Intents {
        let mut intents = Intents::new();
        let Some(mut session) = self.session.take() else {
            return intents;
        };
        // The gesture may have moved the page's pointer; hover dedup
        // restarts from scratch.
        self.last_hover_sent = None;

        match session.phase {
            GesturePhase::Captured => {
                // A sub-threshold release is a click as far as the page is
                // concerned; report it at the press position so it cannot be
                // misread as a tiny drag.
                let up_point = if session.threshold_crossed {
                    point
                } else {
                    session.down_point
                };
                intents.push(PointerIntent::PointerUp {
                    point: up_point,
                    options: session.options,
                });
            }
            _ => {
                if session.commit_click() {
                    intents.push(PointerIntent::Click {
                        point: session.down_point,
                        options: session.options,
                    });
                }
            }
        }
        intents
    }

    fn on_exited(&mut self, capabilities: HandleCapabilities) -> Intents {
        let mut intents = Intents::new();
        if self.session.take().is_some() {
            // Mid-gesture exit discards the gesture.
            self.last_hover_sent = None;
            return intents;
        }
        if self.hover_enabled && capabilities.movable_pointer && self.last_hover_sent.is_some() {
            intents.push(PointerIntent::MovePointer { point: Point::ZERO });
            self.last_hover_sent = None;
        }
        intents
    }

    fn on_hover_move(&mut self, point: Point, capabilities: HandleCapabilities) -> Intents {
        let mut intents = Intents::new();
        if !self.hover_enabled || !capabilities.movable_pointer {
            return intents;
        }
        if self.last_hover_sent != Some(point) {
            intents.push(PointerIntent::MovePointer { point });
            self.last_hover_sent = Some(point);
        }
        intents
    }

    fn on_scrolled(&mut self, delta: Point, point: Point) -> Intents {
        let mut intents = Intents::new();
        if self.scroll_enabled && delta != Point::ZERO {
            intents.push(PointerIntent::Scroll { delta, point });
        }
        intents
    }
}
