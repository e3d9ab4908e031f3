//! Surface provider contract.
//!
//! Surfaces are the visual targets the browser renders into: a primary
//! surface for the page content and an optional secondary surface for video
//! overlay. Creation is asynchronous; the provider invokes the callback when
//! the underlying material/texture resources exist.

use std::rc::Rc;

use websurface_core::geometry::{Point, Rect, Size};

/// One visual target in the host scene.
pub trait SurfaceHandle {
    fn set_visible(&self, visible: bool);
    /// A normalized sub-rectangle of the surface to leave unrendered, or
    /// `None` for no cutout.
    fn set_cutout_rect(&self, rect: Option<Rect>);
    /// Offset + scale placement within the parent surface, in normalized
    /// parent units. Only meaningful for secondary surfaces.
    fn set_layout(&self, offset: Point, scale: Size);
    /// Crop region in the surface's own texture space, or `None` for no
    /// cropping.
    fn set_crop(&self, crop: Option<Rect>);
    /// Releases the surface's owned material/texture resources.
    fn release(&self);
}

pub trait SurfaceProvider {
    fn create_primary_surface(&self, on_ready: Box<dyn FnOnce(Rc<dyn SurfaceHandle>)>);
    /// `None` signals that secondary (video) content is unsupported or
    /// disabled on this platform.
    fn create_secondary_surface(&self, on_ready: Box<dyn FnOnce(Option<Rc<dyn SurfaceHandle>>)>);
}
