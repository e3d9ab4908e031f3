//! Embedded browser contract.
//!
//! The handle is an opaque reference to the platform's browser instance.
//! This crate holds it from "ready" until disposal and forwards classified
//! pointer intents to it; it never implements one.

use std::rc::Rc;

use websurface_core::geometry::{Point, Rect, Size};
use websurface_core::PointerOptions;
use websurface_input::HandleCapabilities;

use crate::channel::EventSender;
use crate::error::PaneError;
use crate::surface::SurfaceHandle;

/// Severity of a page console message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Warning,
    Error,
}

/// Event emitted by the browser, possibly from its own thread; marshaled
/// onto the controller's loop through the event channel.
#[derive(Clone, Debug, PartialEq)]
pub enum BrowserEvent {
    /// The page's video rectangle changed, in normalized coordinates of the
    /// primary surface (origin top-left, y-down).
    VideoRectChanged(Rect),
    ConsoleMessage {
        level: ConsoleLevel,
        message: String,
    },
}

pub trait BrowserHandle {
    /// Binds the handle to its render targets and starts it at `size_px`.
    fn init(
        &self,
        primary: Rc<dyn SurfaceHandle>,
        size_px: Size,
        secondary: Option<Rc<dyn SurfaceHandle>>,
    );
    /// Whether the handle was already initialized (e.g. a reused popup
    /// window handle).
    fn is_initialized(&self) -> bool;
    fn resize(&self, size_px: Size);
    fn set_resolution(&self, pixels_per_unit: f32);
    fn load_url(&self, url: &str);
    fn capabilities(&self) -> HandleCapabilities;

    fn click(&self, point: Point, options: PointerOptions);
    fn scroll(&self, delta: Point, point: Point);
    fn pointer_down(&self, point: Point, options: PointerOptions);
    fn pointer_up(&self, point: Point, options: PointerOptions);
    fn move_pointer(&self, point: Point);

    /// Registers the sink for browser events. At most one sender may be
    /// registered per handle; a second registration is an error.
    fn set_event_sender(&self, sender: EventSender) -> Result<(), PaneError>;
    fn dispose(&self);
}

/// Creates browser handles asynchronously.
pub trait BrowserFactory {
    fn create_browser(&self, on_ready: Box<dyn FnOnce(Rc<dyn BrowserHandle>)>);
}
