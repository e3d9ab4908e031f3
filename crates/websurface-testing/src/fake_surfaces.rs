//! Recording fakes of the surface provider and its surfaces.

use std::cell::RefCell;
use std::rc::Rc;

use websurface_core::geometry::{Point, Rect, Size};
use websurface_pane::{SurfaceHandle, SurfaceProvider};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceCall {
    SetVisible(bool),
    SetCutoutRect(Option<Rect>),
    SetLayout { offset: Point, scale: Size },
    SetCrop(Option<Rect>),
    Release,
}

/// A surface that records every call.
#[derive(Default)]
pub struct RecordingSurface {
    calls: RefCell<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    pub fn last_visible(&self) -> Option<bool> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                SurfaceCall::SetVisible(visible) => Some(*visible),
                _ => None,
            })
    }

    pub fn last_layout(&self) -> Option<(Point, Size)> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                SurfaceCall::SetLayout { offset, scale } => Some((*offset, *scale)),
                _ => None,
            })
    }

    pub fn last_crop(&self) -> Option<Option<Rect>> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                SurfaceCall::SetCrop(crop) => Some(*crop),
                _ => None,
            })
    }

    pub fn released(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| matches!(call, SurfaceCall::Release))
    }
}

impl SurfaceHandle for RecordingSurface {
    fn set_visible(&self, visible: bool) {
        self.calls.borrow_mut().push(SurfaceCall::SetVisible(visible));
    }

    fn set_cutout_rect(&self, rect: Option<Rect>) {
        self.calls.borrow_mut().push(SurfaceCall::SetCutoutRect(rect));
    }

    fn set_layout(&self, offset: Point, scale: Size) {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::SetLayout { offset, scale });
    }

    fn set_crop(&self, crop: Option<Rect>) {
        self.calls.borrow_mut().push(SurfaceCall::SetCrop(crop));
    }

    fn release(&self) {
        self.calls.borrow_mut().push(SurfaceCall::Release);
    }
}

type PrimaryCallback = Box<dyn FnOnce(Rc<dyn SurfaceHandle>)>;
type SecondaryCallback = Box<dyn FnOnce(Option<Rc<dyn SurfaceHandle>>)>;

#[derive(Default)]
struct ProviderState {
    pending_primary: Vec<PrimaryCallback>,
    pending_secondary: Vec<SecondaryCallback>,
}

/// Provider whose surface requests complete only when the test says so,
/// letting tests permute completion orders.
#[derive(Default)]
pub struct ManualSurfaceProvider {
    state: RefCell<ProviderState>,
}

impl ManualSurfaceProvider {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pending_primary(&self) -> usize {
        self.state.borrow().pending_primary.len()
    }

    pub fn pending_secondary(&self) -> usize {
        self.state.borrow().pending_secondary.len()
    }

    pub fn resolve_primary(&self, surface: Rc<dyn SurfaceHandle>) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.pending_primary.is_empty() {
                panic!("no pending primary surface request");
            }
            state.pending_primary.remove(0)
        };
        callback(surface);
    }

    pub fn resolve_secondary(&self, surface: Option<Rc<dyn SurfaceHandle>>) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.pending_secondary.is_empty() {
                panic!("no pending secondary surface request");
            }
            state.pending_secondary.remove(0)
        };
        callback(surface);
    }
}

impl SurfaceProvider for ManualSurfaceProvider {
    fn create_primary_surface(&self, on_ready: PrimaryCallback) {
        self.state.borrow_mut().pending_primary.push(on_ready);
    }

    fn create_secondary_surface(&self, on_ready: SecondaryCallback) {
        self.state.borrow_mut().pending_secondary.push(on_ready);
    }
}
