//! Raw pointer event stream delivered by the host's input source.
//!
//! Points are normalized to the content surface: both components in [0, 1],
//! origin top-left, y-down. Classification into semantic intents happens in
//! `websurface-input`; this module only defines the wire-facing shapes.

use crate::geometry::Point;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary = 0,
    Secondary = 1,
    Middle = 2,
}

impl Default for PointerButton {
    fn default() -> Self {
        Self::Primary
    }
}

/// Button and click-count metadata attached to a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerOptions {
    pub button: PointerButton,
    /// 1 for a single click, 2 for the second press of a double click, etc.
    pub click_count: u8,
}

impl Default for PointerOptions {
    fn default() -> Self {
        Self {
            button: PointerButton::Primary,
            click_count: 1,
        }
    }
}

/// One raw event from the input source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down {
        point: Point,
        options: PointerOptions,
    },
    Move {
        point: Point,
    },
    Up {
        point: Point,
    },
    /// The pointer left the device bounds of the surface.
    Exited,
    /// A discrete scroll (wheel / trackpad) at `point`, with the delta in
    /// the device's scroll units.
    Scrolled {
        delta: Point,
        point: Point,
    },
}
