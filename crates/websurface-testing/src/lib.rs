//! In-memory fakes for Websurface integration tests and demos.
//!
//! The fakes record every call they receive and let a test resolve the
//! asynchronous resource requests manually, in any order, to exercise the
//! barrier interleavings.

pub mod fake_browser;
pub mod fake_surfaces;

pub use fake_browser::{BrowserCall, FakeBrowser, ManualBrowserFactory};
pub use fake_surfaces::{ManualSurfaceProvider, RecordingSurface, SurfaceCall};
