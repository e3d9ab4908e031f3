//! Pane controller: owns the lifecycle of one embedded web pane.
//!
//! `initialize` issues the resource requests and parks them behind a
//! [`ResourceBarrier`]; the finalize path runs once, whatever order the
//! completions arrive in, and raises a single ready notification. From then
//! on the controller forwards classified pointer intents to the browser
//! handle and keeps the video overlay aligned with the content surface.
//!
//! Operations that need the handle before readiness are skipped per
//! operation rather than erroring; initialization races are expected and the
//! controller favors degraded-but-running behavior for anything that
//! originates from caller configuration.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use web_time::Instant;

use websurface_core::geometry::{
    compute_crop_rect, position_secondary_rect, Rect, Size, SurfaceOrigin,
};
use websurface_core::{Diagnostics, LogDiagnostics, PointerEvent};
use websurface_input::{DragPolicy, GestureClassifier, PointerIntent};

use crate::barrier::{BarrierOutput, ResourceBarrier, SlotKind};
use crate::browser::{BrowserEvent, BrowserFactory, BrowserHandle, ConsoleLevel};
use crate::channel::{event_channel, EventReceiver};
use crate::error::PaneError;
use crate::surface::{SurfaceHandle, SurfaceProvider};

/// Pixel density used when the caller does not request a resolution.
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 1280.0;

/// Caller configuration, fixed at construction.
#[derive(Clone, Debug)]
pub struct PaneConfig {
    /// Pane size in the host scene's spatial units.
    pub size: Size,
    /// Requested pixel density (pixels per spatial unit). Non-positive
    /// values are ignored with a warning. `None` uses
    /// [`DEFAULT_PIXELS_PER_UNIT`].
    pub resolution: Option<f32>,
    /// Content to load once ready. Ignored with a warning when the browser
    /// handle comes pre-initialized, since its content is already
    /// determined.
    pub initial_url: Option<String>,
    /// Whether to request a secondary surface for video overlay.
    pub video_enabled: bool,
    pub drag_policy: DragPolicy,
    pub hover_enabled: bool,
    pub scroll_enabled: bool,
    /// Origin convention of the surface type hosting the video overlay.
    pub secondary_origin: SurfaceOrigin,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            size: Size::new(0.6, 0.4),
            resolution: None,
            initial_url: None,
            video_enabled: false,
            drag_policy: DragPolicy::default(),
            hover_enabled: true,
            scroll_enabled: true,
            secondary_origin: SurfaceOrigin::TopLeft,
        }
    }
}

/// Where the browser handle comes from.
pub enum BrowserSource {
    /// A new handle is created asynchronously.
    Factory(Rc<dyn BrowserFactory>),
    /// An existing handle transfers ownership to this controller (e.g. a
    /// popup window's handle).
    Existing(Rc<dyn BrowserHandle>),
}

/// Collaborators handed to [`PaneController::initialize`].
pub struct PaneDeps {
    pub surfaces: Rc<dyn SurfaceProvider>,
    pub browser: BrowserSource,
}

/// Values joined by the barrier.
enum SlotValue {
    Surface(Rc<dyn SurfaceHandle>),
    Browser(Rc<dyn BrowserHandle>),
}

struct PaneInner {
    config: PaneConfig,
    diagnostics: Rc<dyn Diagnostics>,
    classifier: GestureClassifier,
    size: Size,
    initialized: bool,
    ready: bool,
    disposed: bool,
    preinitialized: bool,
    visible: bool,
    /// The video overlay stays hidden until the page reports a usable video
    /// rect, and whenever the rect leaves the container entirely.
    video_hidden_by_crop: bool,
    video_rect: Option<Rect>,
    browser: Option<Rc<dyn BrowserHandle>>,
    primary: Option<Rc<dyn SurfaceHandle>>,
    secondary: Option<Rc<dyn SurfaceHandle>>,
    events: Option<EventReceiver>,
    /// Host callback invoked when a browser event is queued, so an idle
    /// host can schedule an update tick. May run on the browser's thread.
    wake_callback: Option<Arc<dyn Fn() + Send + Sync>>,
    ready_listener: Option<Box<dyn FnOnce()>>,
    ready_listener_registered: bool,
    init_started: Option<Instant>,
}

impl PaneInner {
    fn effective_resolution(&self) -> f32 {
        match self.config.resolution {
            Some(resolution) if resolution > 0.0 => resolution,
            _ => DEFAULT_PIXELS_PER_UNIT,
        }
    }

    fn pixel_size(&self) -> Size {
        let resolution = self.effective_resolution();
        Size::new(self.size.width * resolution, self.size.height * resolution)
    }
}

pub struct PaneController {
    inner: Rc<RefCell<PaneInner>>,
}

impl PaneController {
    pub fn new(config: PaneConfig) -> Self {
        Self::with_diagnostics(config, Rc::new(LogDiagnostics))
    }

    pub fn with_diagnostics(config: PaneConfig, diagnostics: Rc<dyn Diagnostics>) -> Self {
        let size = config.size;
        let mut classifier = GestureClassifier::new(config.drag_policy, Size::ZERO);
        classifier.set_hover_enabled(config.hover_enabled);
        classifier.set_scroll_enabled(config.scroll_enabled);
        let inner = Rc::new(RefCell::new(PaneInner {
            config,
            diagnostics,
            classifier,
            size,
            initialized: false,
            ready: false,
            disposed: false,
            preinitialized: false,
            visible: true,
            video_hidden_by_crop: true,
            video_rect: None,
            browser: None,
            primary: None,
            secondary: None,
            events: None,
            wake_callback: None,
            ready_listener: None,
            ready_listener_registered: false,
            init_started: None,
        }));
        {
            let mut borrowed = inner.borrow_mut();
            let viewport = borrowed.pixel_size();
            borrowed.classifier.set_viewport_px(viewport);
        }
        Self { inner }
    }

    /// Issues the parallel resource requests and arms the ready barrier.
    ///
    /// Fails with [`PaneError::AlreadyInitialized`] on a second call. The
    /// completions may arrive in any order, synchronously included; exactly
    /// one ready notification is raised either way.
    pub fn initialize(&self, deps: PaneDeps) -> Result<(), PaneError> {
        let video_enabled;
        {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return Err(PaneError::InvalidArgument(
                    "cannot initialize a disposed controller",
                ));
            }
            if inner.initialized {
                return Err(PaneError::AlreadyInitialized);
            }
            inner.initialized = true;
            inner.init_started = Some(Instant::now());
            video_enabled = inner.config.video_enabled;
        }

        let barrier = Rc::new(RefCell::new(ResourceBarrier::<SlotValue>::new()));
        let primary_token = barrier.borrow_mut().register(SlotKind::PrimarySurface)?;
        let video_token = if video_enabled {
            Some(barrier.borrow_mut().register(SlotKind::VideoSurface)?)
        } else {
            None
        };
        let browser_token = barrier.borrow_mut().register(SlotKind::BrowserHandle)?;

        let weak = Rc::downgrade(&self.inner);
        barrier.borrow_mut().on_all_ready(move |output| {
            match weak.upgrade() {
                Some(inner) => finalize(&inner, output),
                None => log::debug!("pane resources resolved after the controller was dropped"),
            }
        })?;

        // From here on any completion may fire the barrier synchronously; no
        // controller borrow is held.
        {
            let barrier = barrier.clone();
            deps.surfaces.create_primary_surface(Box::new(move |surface| {
                report_resolution(
                    barrier
                        .borrow_mut()
                        .complete(primary_token, SlotValue::Surface(surface)),
                );
            }));
        }
        if let Some(video_token) = video_token {
            let barrier = barrier.clone();
            deps.surfaces
                .create_secondary_surface(Box::new(move |surface| {
                    let result = match surface {
                        Some(surface) => barrier
                            .borrow_mut()
                            .complete(video_token, SlotValue::Surface(surface)),
                        None => barrier.borrow_mut().skip(video_token),
                    };
                    report_resolution(result);
                }));
        }
        match deps.browser {
            BrowserSource::Existing(handle) => {
                report_resolution(
                    barrier
                        .borrow_mut()
                        .complete(browser_token, SlotValue::Browser(handle)),
                );
            }
            BrowserSource::Factory(factory) => {
                let barrier = barrier.clone();
                factory.create_browser(Box::new(move |handle| {
                    report_resolution(
                        barrier
                            .borrow_mut()
                            .complete(browser_token, SlotValue::Browser(handle)),
                    );
                }));
            }
        }
        Ok(())
    }

    /// Registers the one-time ready notification.
    ///
    /// At most one subscriber; registering after readiness invokes the
    /// callback synchronously.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) -> Result<(), PaneError> {
        let mut inner = self.inner.borrow_mut();
        if inner.ready_listener_registered {
            return Err(PaneError::ListenerAlreadyRegistered);
        }
        inner.ready_listener_registered = true;
        if inner.ready {
            drop(inner);
            callback();
        } else {
            inner.ready_listener = Some(Box::new(callback));
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// The video rect last reported by the page, if any.
    pub fn video_rect(&self) -> Option<Rect> {
        self.inner.borrow().video_rect
    }

    /// Per-frame tick: applies browser events queued from other threads.
    pub fn update(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let events = match &inner.events {
            Some(receiver) => receiver.drain(),
            None => return,
        };
        for event in events {
            match event {
                BrowserEvent::VideoRectChanged(rect) => apply_video_rect(&mut inner, rect),
                BrowserEvent::ConsoleMessage { level, message } => match level {
                    ConsoleLevel::Debug => log::debug!("page console: {message}"),
                    ConsoleLevel::Log => log::info!("page console: {message}"),
                    ConsoleLevel::Warning => log::warn!("page console: {message}"),
                    ConsoleLevel::Error => log::error!("page console: {message}"),
                },
            }
        }
    }

    /// Feeds one raw pointer event through the classifier and applies the
    /// resulting intents to the browser handle.
    ///
    /// Before readiness the intents are dropped; input races initialization
    /// routinely and is not an error.
    pub fn handle_pointer_event(&self, event: PointerEvent) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let capabilities = inner
            .browser
            .as_ref()
            .map(|browser| browser.capabilities())
            .unwrap_or_default();
        let intents = inner.classifier.process(event, capabilities);
        if intents.is_empty() {
            return;
        }
        let Some(browser) = inner.browser.clone() else {
            log::trace!("pointer intents before readiness dropped");
            return;
        };
        for intent in intents {
            match intent {
                PointerIntent::Click { point, options } => browser.click(point, options),
                PointerIntent::PointerDown { point, options } => {
                    browser.pointer_down(point, options)
                }
                PointerIntent::PointerUp { point, options } => browser.pointer_up(point, options),
                PointerIntent::MovePointer { point } => browser.move_pointer(point),
                PointerIntent::Scroll { delta, point } => browser.scroll(delta, point),
            }
        }
    }

    /// Registers the host's wake callback.
    ///
    /// Invoked whenever the browser queues an event, possibly from the
    /// browser's own thread, so a host that only ticks on demand can
    /// schedule an [`update`](Self::update). May be registered before
    /// readiness; it attaches to the event channel once it exists.
    pub fn set_wake_callback(&self, waker: impl Fn() + Send + Sync + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let waker: Arc<dyn Fn() + Send + Sync> = Arc::new(waker);
        if let Some(events) = &inner.events {
            let attached = waker.clone();
            events.set_waker(move || attached());
        }
        inner.wake_callback = Some(waker);
    }

    /// Swaps the drag policy between gestures.
    pub fn set_drag_policy(&self, policy: DragPolicy) -> Result<(), PaneError> {
        let mut inner = self.inner.borrow_mut();
        inner.classifier.set_policy(policy)?;
        inner.config.drag_policy = policy;
        Ok(())
    }

    pub fn set_hover_enabled(&self, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.config.hover_enabled = enabled;
        inner.classifier.set_hover_enabled(enabled);
    }

    pub fn set_scroll_enabled(&self, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.config.scroll_enabled = enabled;
        inner.classifier.set_scroll_enabled(enabled);
    }

    /// Resizes the pane, in spatial units.
    ///
    /// Local geometry always updates so visual layout stays consistent with
    /// pending initialization; the handle is resized only once ready, and
    /// multiple calls before readiness collapse to the last.
    pub fn resize(&self, size: Size) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.size = size;
        let pixel_size = inner.pixel_size();
        inner.classifier.set_viewport_px(pixel_size);
        if inner.ready {
            if let Some(browser) = &inner.browser {
                browser.resize(pixel_size);
            }
        }
    }

    pub fn set_visible(&self, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.visible = visible;
        if let Some(primary) = &inner.primary {
            primary.set_visible(visible);
        }
        if let Some(secondary) = &inner.secondary {
            secondary.set_visible(visible && !inner.video_hidden_by_crop);
        }
    }

    pub fn set_cutout_rect(&self, rect: Option<Rect>) {
        let inner = self.inner.borrow();
        if inner.disposed {
            return;
        }
        if let Some(primary) = &inner.primary {
            primary.set_cutout_rect(rect);
        }
        if let Some(secondary) = &inner.secondary {
            secondary.set_cutout_rect(rect);
        }
    }

    /// Releases the browser handle and owned surface resources.
    ///
    /// Idempotent, and safe before the barrier ever fires: late resource
    /// completions are absorbed and their resources released.
    pub fn dispose(&self) {
        let (browser, primary, secondary) = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.ready_listener = None;
            inner.wake_callback = None;
            if let Some(events) = inner.events.take() {
                // A racing send must not wake a disposed controller.
                events.clear_waker();
            }
            (
                inner.browser.take(),
                inner.primary.take(),
                inner.secondary.take(),
            )
        };
        if let Some(browser) = browser {
            browser.dispose();
        }
        if let Some(primary) = primary {
            primary.release();
        }
        if let Some(secondary) = secondary {
            secondary.release();
        }
    }
}

/// Logs a duplicate-resolution contract violation from a collaborator.
///
/// Completions run inside collaborator callbacks, so there is no caller to
/// propagate to.
fn report_resolution(result: Result<(), PaneError>) {
    if let Err(err) = result {
        log::error!("resource resolution failed: {err}");
    }
}

fn finalize(inner_rc: &Rc<RefCell<PaneInner>>, mut output: BarrierOutput<SlotValue>) {
    let mut inner = inner_rc.borrow_mut();
    if inner.disposed {
        // The controller was torn down while resources were in flight;
        // release whatever arrived late.
        release_late_resources(output);
        return;
    }

    let primary = match output.take(SlotKind::PrimarySurface) {
        Some(SlotValue::Surface(surface)) => surface,
        _ => {
            inner
                .diagnostics
                .error("primary surface missing at barrier release");
            return;
        }
    };
    let secondary = match output.take(SlotKind::VideoSurface) {
        Some(SlotValue::Surface(surface)) => Some(surface),
        _ => None,
    };
    let browser = match output.take(SlotKind::BrowserHandle) {
        Some(SlotValue::Browser(handle)) => handle,
        _ => {
            inner
                .diagnostics
                .error("browser handle missing at barrier release");
            return;
        }
    };

    let preinitialized = browser.is_initialized();
    let pixel_size = inner.pixel_size();

    primary.set_visible(inner.visible);
    if let Some(secondary) = &secondary {
        // Hidden until the page reports a video rect.
        secondary.set_visible(false);
    }

    if preinitialized {
        if inner.config.resolution.is_some() {
            inner.diagnostics.warn(
                "requested resolution ignored: the browser handle was pre-initialized",
            );
        }
        browser.resize(pixel_size);
    } else {
        match inner.config.resolution {
            Some(resolution) if resolution > 0.0 => browser.set_resolution(resolution),
            Some(resolution) => inner.diagnostics.warn(&format!(
                "ignoring non-positive resolution {resolution}; using the default"
            )),
            None => {}
        }
        browser.init(primary.clone(), pixel_size, secondary.clone());
    }

    let (sender, receiver) = event_channel();
    if let Err(err) = browser.set_event_sender(sender) {
        inner
            .diagnostics
            .error(&format!("failed to subscribe to browser events: {err}"));
    }
    if let Some(waker) = inner.wake_callback.clone() {
        receiver.set_waker(move || waker());
    }
    inner.events = Some(receiver);
    inner.classifier.set_viewport_px(pixel_size);
    inner.primary = Some(primary);
    inner.secondary = secondary;
    inner.browser = Some(browser.clone());
    inner.preinitialized = preinitialized;
    inner.ready = true;
    if let Some(started) = inner.init_started {
        log::debug!("pane ready in {:?}", started.elapsed());
    }

    let listener = inner.ready_listener.take();
    let initial_url = inner.config.initial_url.clone();
    let diagnostics = inner.diagnostics.clone();
    drop(inner);

    if let Some(listener) = listener {
        listener();
    }
    if let Some(url) = initial_url {
        if preinitialized {
            diagnostics.warn(
                "initial URL ignored: the pre-initialized handle's content is already determined",
            );
        } else {
            browser.load_url(&url);
        }
    }
}

fn release_late_resources(mut output: BarrierOutput<SlotValue>) {
    for kind in [
        SlotKind::PrimarySurface,
        SlotKind::VideoSurface,
        SlotKind::BrowserHandle,
    ] {
        match output.take(kind) {
            Some(SlotValue::Surface(surface)) => surface.release(),
            Some(SlotValue::Browser(browser)) => browser.dispose(),
            None => {}
        }
    }
}

/// Repositions and re-crops the video overlay for a new page video rect.
fn apply_video_rect(inner: &mut PaneInner, rect: Rect) {
    inner.video_rect = Some(rect);
    let Some(secondary) = inner.secondary.clone() else {
        return;
    };
    let layout = position_secondary_rect(rect, inner.config.secondary_origin);
    secondary.set_layout(layout.offset, layout.scale);
    match compute_crop_rect(rect) {
        None => {
            inner.video_hidden_by_crop = true;
            secondary.set_visible(false);
        }
        Some(crop) => {
            inner.video_hidden_by_crop = false;
            secondary.set_visible(inner.visible);
            let crop = if crop == Rect::ZERO { None } else { Some(crop) };
            secondary.set_crop(crop);
        }
    }
}
