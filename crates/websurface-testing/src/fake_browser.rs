//! Recording fake of the embedded browser.

use std::cell::RefCell;
use std::rc::Rc;

use websurface_core::geometry::{Point, Size};
use websurface_core::PointerOptions;
use websurface_input::HandleCapabilities;
use websurface_pane::{BrowserEvent, BrowserFactory, BrowserHandle, EventSender, PaneError};

/// Everything a [`FakeBrowser`] was asked to do, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum BrowserCall {
    Init { size_px: Size, has_secondary: bool },
    Resize { size_px: Size },
    SetResolution { pixels_per_unit: f32 },
    LoadUrl { url: String },
    Click { point: Point, options: PointerOptions },
    Scroll { delta: Point, point: Point },
    PointerDown { point: Point, options: PointerOptions },
    PointerUp { point: Point, options: PointerOptions },
    MovePointer { point: Point },
    Dispose,
}

#[derive(Default)]
struct FakeBrowserState {
    calls: Vec<BrowserCall>,
    initialized: bool,
    sender: Option<EventSender>,
}

/// A browser handle that records calls and lets tests emit events.
pub struct FakeBrowser {
    state: RefCell<FakeBrowserState>,
    capabilities: HandleCapabilities,
}

impl FakeBrowser {
    pub fn new(capabilities: HandleCapabilities) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(FakeBrowserState::default()),
            capabilities,
        })
    }

    /// A handle that reports itself as already initialized, like a reused
    /// popup window handle.
    pub fn preinitialized(capabilities: HandleCapabilities) -> Rc<Self> {
        let browser = Self::new(capabilities);
        browser.state.borrow_mut().initialized = true;
        browser
    }

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_of<F: Fn(&BrowserCall) -> bool>(&self, predicate: F) -> Vec<BrowserCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .cloned()
            .collect()
    }

    /// Emits a browser event through the registered sender, as the real
    /// engine would from its own thread.
    pub fn emit(&self, event: BrowserEvent) {
        let sender = self.state.borrow().sender.clone();
        match sender {
            Some(sender) => sender.send(event),
            None => log::warn!("fake browser has no event sender registered"),
        }
    }

    pub fn has_event_sender(&self) -> bool {
        self.state.borrow().sender.is_some()
    }

    fn record(&self, call: BrowserCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl BrowserHandle for FakeBrowser {
    fn init(
        &self,
        _primary: Rc<dyn websurface_pane::SurfaceHandle>,
        size_px: Size,
        secondary: Option<Rc<dyn websurface_pane::SurfaceHandle>>,
    ) {
        self.record(BrowserCall::Init {
            size_px,
            has_secondary: secondary.is_some(),
        });
        self.state.borrow_mut().initialized = true;
    }

    fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    fn resize(&self, size_px: Size) {
        self.record(BrowserCall::Resize { size_px });
    }

    fn set_resolution(&self, pixels_per_unit: f32) {
        self.record(BrowserCall::SetResolution { pixels_per_unit });
    }

    fn load_url(&self, url: &str) {
        self.record(BrowserCall::LoadUrl { url: url.into() });
    }

    fn capabilities(&self) -> HandleCapabilities {
        self.capabilities
    }

    fn click(&self, point: Point, options: PointerOptions) {
        self.record(BrowserCall::Click { point, options });
    }

    fn scroll(&self, delta: Point, point: Point) {
        self.record(BrowserCall::Scroll { delta, point });
    }

    fn pointer_down(&self, point: Point, options: PointerOptions) {
        self.record(BrowserCall::PointerDown { point, options });
    }

    fn pointer_up(&self, point: Point, options: PointerOptions) {
        self.record(BrowserCall::PointerUp { point, options });
    }

    fn move_pointer(&self, point: Point) {
        self.record(BrowserCall::MovePointer { point });
    }

    fn set_event_sender(&self, sender: EventSender) -> Result<(), PaneError> {
        let mut state = self.state.borrow_mut();
        if state.sender.is_some() {
            return Err(PaneError::ListenerAlreadyRegistered);
        }
        state.sender = Some(sender);
        Ok(())
    }

    fn dispose(&self) {
        self.record(BrowserCall::Dispose);
    }
}

/// Factory whose creation completes only when the test says so.
#[derive(Default)]
pub struct ManualBrowserFactory {
    pending: RefCell<Vec<Box<dyn FnOnce(Rc<dyn BrowserHandle>)>>>,
}

impl ManualBrowserFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolves the oldest pending request with `handle`.
    pub fn resolve(&self, handle: Rc<dyn BrowserHandle>) {
        let mut pending = self.pending.borrow_mut();
        if pending.is_empty() {
            panic!("no pending browser creation request");
        }
        let callback = pending.remove(0);
        drop(pending);
        callback(handle);
    }
}

impl BrowserFactory for ManualBrowserFactory {
    fn create_browser(&self, on_ready: Box<dyn FnOnce(Rc<dyn BrowserHandle>)>) {
        self.pending.borrow_mut().push(on_ready);
    }
}
