//! Web pane lifecycle orchestration.
//!
//! Joins the asynchronous resource-creation steps (primary surface, optional
//! video surface, browser handle) behind a single ready barrier, forwards
//! classified pointer intents to the browser, and keeps the video overlay
//! geometrically synchronized with the content surface.
//!
//! The crate consumes, and never implements, the collaborator contracts in
//! [`browser`] and [`surface`]; platform bindings live elsewhere.

pub mod barrier;
pub mod browser;
pub mod channel;
pub mod controller;
pub mod engine_settings;
pub mod error;
pub mod surface;

pub use barrier::{BarrierOutput, ResourceBarrier, SlotKind, SlotState, SlotToken};
pub use browser::{BrowserEvent, BrowserFactory, BrowserHandle, ConsoleLevel};
pub use channel::{event_channel, EventReceiver, EventSender};
pub use controller::{BrowserSource, PaneConfig, PaneController, PaneDeps, DEFAULT_PIXELS_PER_UNIT};
pub use engine_settings::{apply_engine_settings, engine_settings, EngineSettings};
pub use error::PaneError;
pub use surface::{SurfaceHandle, SurfaceProvider};
