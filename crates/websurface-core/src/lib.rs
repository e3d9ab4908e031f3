//! Shared data model for Websurface: geometric primitives, the raw pointer
//! event stream, and the diagnostics sink consumed by the higher layers.

pub mod diagnostics;
pub mod events;
pub mod geometry;

pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use events::{PointerButton, PointerEvent, PointerOptions};
pub use geometry::{
    compute_crop_rect, normalized_to_spatial, position_secondary_rect, Point, Rect,
    SecondaryLayout, Size, SurfaceOrigin,
};
