//! Pointer gesture classification.
//!
//! Consumes the raw pointer stream from `websurface-core::events` and emits
//! semantic [`PointerIntent`]s (click, scroll, pointer move, explicit
//! down/up) according to a configured [`DragPolicy`]. The classifier is a
//! single-logical-pointer state machine; it owns all per-gesture state and
//! shares none of it.

pub mod classifier;
pub mod policy;
pub mod session;

pub use classifier::{GestureClassifier, GestureError, PointerIntent};
pub use policy::{DragMode, DragPolicy, DRAG_THRESHOLD};
pub use session::HandleCapabilities;
