//! Integration tests for the pane lifecycle: barrier interleavings, ready
//! notification, disposal races, and the geometry/input wiring, driven
//! through the in-memory fakes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use websurface_core::geometry::{Point, Rect, Size};
use websurface_core::{Diagnostics, PointerEvent, PointerOptions};
use websurface_input::HandleCapabilities;
use websurface_pane::{
    BrowserEvent, BrowserSource, ConsoleLevel, PaneConfig, PaneController, PaneDeps, PaneError,
};
use websurface_testing::{
    BrowserCall, FakeBrowser, ManualBrowserFactory, ManualSurfaceProvider, RecordingSurface,
    SurfaceCall,
};

#[derive(Default)]
struct RecordingDiagnostics {
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingDiagnostics {
    fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.into());
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.into());
    }
}

struct Harness {
    controller: PaneController,
    provider: Rc<ManualSurfaceProvider>,
    factory: Rc<ManualBrowserFactory>,
    browser: Rc<FakeBrowser>,
    diagnostics: Rc<RecordingDiagnostics>,
    ready_count: Rc<Cell<u32>>,
}

impl Harness {
    fn new(config: PaneConfig) -> Self {
        Self::with_capabilities(config, HandleCapabilities::default())
    }

    fn with_capabilities(config: PaneConfig, capabilities: HandleCapabilities) -> Self {
        let diagnostics = RecordingDiagnostics::new();
        let controller = PaneController::with_diagnostics(config, diagnostics.clone());
        let provider = ManualSurfaceProvider::new();
        let factory = ManualBrowserFactory::new();
        let browser = FakeBrowser::new(capabilities);
        let ready_count = Rc::new(Cell::new(0));
        let count = ready_count.clone();
        controller
            .on_ready(move || count.set(count.get() + 1))
            .unwrap();
        Self {
            controller,
            provider,
            factory,
            browser,
            diagnostics,
            ready_count,
        }
    }

    fn initialize(&self) {
        self.controller
            .initialize(PaneDeps {
                surfaces: self.provider.clone(),
                browser: BrowserSource::Factory(self.factory.clone()),
            })
            .unwrap();
    }

    /// Resolves everything in the standard order: primary, secondary (when
    /// requested), browser.
    fn resolve_all(&self) -> (Rc<RecordingSurface>, Option<Rc<RecordingSurface>>) {
        let primary = RecordingSurface::new();
        self.provider.resolve_primary(primary.clone());
        let secondary = if self.provider.pending_secondary() > 0 {
            let surface = RecordingSurface::new();
            self.provider.resolve_secondary(Some(surface.clone()));
            Some(surface)
        } else {
            None
        };
        self.factory.resolve(self.browser.clone());
        (primary, secondary)
    }
}

fn video_config() -> PaneConfig {
    PaneConfig {
        video_enabled: true,
        ..PaneConfig::default()
    }
}

#[test]
fn ready_fires_once_for_every_completion_order() {
    // Indices: 0 = primary surface, 1 = secondary surface, 2 = browser.
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for order in orders {
        let harness = Harness::new(video_config());
        harness.initialize();

        for &step in &order {
            assert_eq!(
                harness.ready_count.get(),
                0,
                "ready before all resources resolved, order {order:?}"
            );
            match step {
                0 => harness.provider.resolve_primary(RecordingSurface::new()),
                1 => harness
                    .provider
                    .resolve_secondary(Some(RecordingSurface::new())),
                _ => harness.factory.resolve(harness.browser.clone()),
            }
        }

        assert_eq!(harness.ready_count.get(), 1, "order {order:?}");
        assert!(harness.controller.is_ready());
        let inits = harness
            .browser
            .calls_of(|call| matches!(call, BrowserCall::Init { .. }));
        assert_eq!(inits.len(), 1, "order {order:?}");
        assert_eq!(
            inits[0],
            BrowserCall::Init {
                size_px: Size::new(768.0, 512.0),
                has_secondary: true
            },
            "order {order:?}"
        );
    }
}

#[test]
fn secondary_unsupported_is_skipped() {
    let harness = Harness::new(video_config());
    harness.initialize();

    harness.provider.resolve_primary(RecordingSurface::new());
    harness.provider.resolve_secondary(None);
    harness.factory.resolve(harness.browser.clone());

    assert_eq!(harness.ready_count.get(), 1);
    let inits = harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Init { .. }));
    assert_eq!(
        inits[0],
        BrowserCall::Init {
            size_px: Size::new(768.0, 512.0),
            has_secondary: false
        }
    );
}

#[test]
fn initialize_twice_fails() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    let result = harness.controller.initialize(PaneDeps {
        surfaces: harness.provider.clone(),
        browser: BrowserSource::Factory(harness.factory.clone()),
    });
    assert_eq!(result, Err(PaneError::AlreadyInitialized));
}

#[test]
fn dispose_before_ready_absorbs_late_completions() {
    let harness = Harness::new(video_config());
    harness.initialize();

    let primary = RecordingSurface::new();
    harness.provider.resolve_primary(primary.clone());
    harness.controller.dispose();

    // Late completions must neither crash nor raise ready; their resources
    // are torn down.
    let secondary = RecordingSurface::new();
    harness.provider.resolve_secondary(Some(secondary.clone()));
    harness.factory.resolve(harness.browser.clone());

    assert_eq!(harness.ready_count.get(), 0);
    assert!(!harness.controller.is_ready());
    assert!(primary.released());
    assert!(secondary.released());
    assert!(harness
        .browser
        .calls()
        .contains(&BrowserCall::Dispose));
}

#[test]
fn dispose_is_idempotent() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    let (primary, _) = harness.resolve_all();

    harness.controller.dispose();
    harness.controller.dispose();

    assert!(harness.controller.is_disposed());
    let disposals = harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Dispose));
    assert_eq!(disposals.len(), 1);
    assert!(primary.released());
}

#[test]
fn wake_callback_follows_the_controller_lifecycle() {
    let harness = Harness::new(PaneConfig::default());
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = wakes.clone();
    // Registered before initialization; attaches once the channel exists.
    harness
        .controller
        .set_wake_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    harness.initialize();
    harness.resolve_all();

    harness.browser.emit(BrowserEvent::ConsoleMessage {
        level: ConsoleLevel::Log,
        message: "hello".into(),
    });
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
    harness.controller.update();

    // A racing send after disposal must not wake the host.
    harness.controller.dispose();
    harness.browser.emit(BrowserEvent::ConsoleMessage {
        level: ConsoleLevel::Log,
        message: "late".into(),
    });
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
}

#[test]
fn resize_before_ready_applies_the_last_requested_size() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();

    harness.controller.resize(Size::new(1.0, 1.0));
    harness.controller.resize(Size::new(2.0, 1.0));
    harness.resolve_all();

    let inits = harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Init { .. }));
    assert_eq!(
        inits[0],
        BrowserCall::Init {
            size_px: Size::new(2560.0, 1280.0),
            has_secondary: false
        }
    );
    // No intermediate resize ever reached the handle.
    assert!(harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Resize { .. }))
        .is_empty());
}

#[test]
fn resize_after_ready_forwards_to_the_handle() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    harness.resolve_all();

    harness.controller.resize(Size::new(1.0, 0.5));
    assert_eq!(
        harness
            .browser
            .calls_of(|call| matches!(call, BrowserCall::Resize { .. })),
        vec![BrowserCall::Resize {
            size_px: Size::new(1280.0, 640.0)
        }]
    );
}

#[test]
fn fresh_handle_gets_resolution_then_init_then_url() {
    let config = PaneConfig {
        resolution: Some(2000.0),
        initial_url: Some("https://example.com".into()),
        ..PaneConfig::default()
    };
    let harness = Harness::new(config);
    harness.initialize();
    harness.resolve_all();

    let calls = harness.browser.calls();
    let resolution_index = calls
        .iter()
        .position(|call| matches!(call, BrowserCall::SetResolution { .. }))
        .expect("resolution applied");
    let init_index = calls
        .iter()
        .position(|call| matches!(call, BrowserCall::Init { .. }))
        .expect("init called");
    let load_index = calls
        .iter()
        .position(|call| matches!(call, BrowserCall::LoadUrl { .. }))
        .expect("url loaded");
    assert!(resolution_index < init_index);
    assert!(init_index < load_index);
    assert_eq!(
        calls[load_index],
        BrowserCall::LoadUrl {
            url: "https://example.com".into()
        }
    );
    assert_eq!(
        calls[init_index],
        BrowserCall::Init {
            size_px: Size::new(1200.0, 800.0),
            has_secondary: false
        }
    );
}

#[test]
fn non_positive_resolution_is_ignored_with_a_warning() {
    let config = PaneConfig {
        resolution: Some(-5.0),
        ..PaneConfig::default()
    };
    let harness = Harness::new(config);
    harness.initialize();
    harness.resolve_all();

    assert!(harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::SetResolution { .. }))
        .is_empty());
    // Falls back to the default pixel density.
    let inits = harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Init { .. }));
    assert_eq!(
        inits[0],
        BrowserCall::Init {
            size_px: Size::new(768.0, 512.0),
            has_secondary: false
        }
    );
    assert_eq!(harness.diagnostics.warnings().len(), 1);
}

#[test]
fn preinitialized_handle_is_resized_not_reinitialized() {
    let config = PaneConfig {
        resolution: Some(2000.0),
        initial_url: Some("https://example.com".into()),
        ..PaneConfig::default()
    };
    let diagnostics = RecordingDiagnostics::new();
    let controller = PaneController::with_diagnostics(config, diagnostics.clone());
    let provider = ManualSurfaceProvider::new();
    let browser = FakeBrowser::preinitialized(HandleCapabilities::default());

    let ready = Rc::new(Cell::new(false));
    let ready_flag = ready.clone();
    controller.on_ready(move || ready_flag.set(true)).unwrap();
    controller
        .initialize(PaneDeps {
            surfaces: provider.clone(),
            browser: BrowserSource::Existing(browser.clone()),
        })
        .unwrap();
    provider.resolve_primary(RecordingSurface::new());

    assert!(ready.get());
    let calls = browser.calls();
    assert!(!calls.iter().any(|c| matches!(c, BrowserCall::Init { .. })));
    assert!(!calls
        .iter()
        .any(|c| matches!(c, BrowserCall::SetResolution { .. })));
    assert!(!calls.iter().any(|c| matches!(c, BrowserCall::LoadUrl { .. })));
    assert!(calls.iter().any(|c| matches!(c, BrowserCall::Resize { .. })));
    // Both the ignored resolution and the ignored URL are advisory.
    assert_eq!(diagnostics.warnings().len(), 2);
}

#[test]
fn on_ready_after_readiness_fires_synchronously_and_rejects_seconds() {
    let config = PaneConfig::default();
    let controller = PaneController::new(config);
    let provider = ManualSurfaceProvider::new();
    let browser = FakeBrowser::new(HandleCapabilities::default());
    controller
        .initialize(PaneDeps {
            surfaces: provider.clone(),
            browser: BrowserSource::Existing(browser),
        })
        .unwrap();
    provider.resolve_primary(RecordingSurface::new());
    assert!(controller.is_ready());

    let fired = Rc::new(Cell::new(false));
    let fired_flag = fired.clone();
    controller.on_ready(move || fired_flag.set(true)).unwrap();
    assert!(fired.get());

    assert_eq!(
        controller.on_ready(|| {}),
        Err(PaneError::ListenerAlreadyRegistered)
    );
}

#[test]
fn video_rect_event_drives_layout_and_crop() {
    let harness = Harness::new(video_config());
    harness.initialize();
    let (_, secondary) = harness.resolve_all();
    let secondary = secondary.expect("secondary surface");

    // Hidden until the page reports a rect.
    assert_eq!(secondary.last_visible(), Some(false));

    // Partially hanging off the left edge.
    harness
        .browser
        .emit(BrowserEvent::VideoRectChanged(Rect::new(-0.25, 0.0, 0.5, 1.0)));
    harness.controller.update();

    assert_eq!(secondary.last_visible(), Some(true));
    let (offset, scale) = secondary.last_layout().expect("layout applied");
    assert_eq!(offset, Point::new(-0.25, 0.0));
    assert_eq!(scale, Size::new(0.5, 1.0));
    assert_eq!(
        secondary.last_crop(),
        Some(Some(Rect::new(0.5, 0.0, 0.5, 1.0)))
    );
    assert_eq!(
        harness.controller.video_rect(),
        Some(Rect::new(-0.25, 0.0, 0.5, 1.0))
    );
}

#[test]
fn fully_visible_video_rect_clears_the_crop() {
    let harness = Harness::new(video_config());
    harness.initialize();
    let (_, secondary) = harness.resolve_all();
    let secondary = secondary.expect("secondary surface");

    harness
        .browser
        .emit(BrowserEvent::VideoRectChanged(Rect::new(0.1, 0.1, 0.5, 0.5)));
    harness.controller.update();

    assert_eq!(secondary.last_crop(), Some(None));
    assert_eq!(secondary.last_visible(), Some(true));
}

#[test]
fn degenerate_video_rect_hides_the_overlay() {
    let harness = Harness::new(video_config());
    harness.initialize();
    let (_, secondary) = harness.resolve_all();
    let secondary = secondary.expect("secondary surface");

    harness
        .browser
        .emit(BrowserEvent::VideoRectChanged(Rect::new(0.1, 0.1, 0.5, 0.5)));
    harness.controller.update();
    assert_eq!(secondary.last_visible(), Some(true));

    harness
        .browser
        .emit(BrowserEvent::VideoRectChanged(Rect::new(0.1, 0.1, 0.0, 0.5)));
    harness.controller.update();
    assert_eq!(secondary.last_visible(), Some(false));

    // Visibility toggles keep respecting the hidden-by-crop state.
    harness.controller.set_visible(true);
    assert_eq!(secondary.last_visible(), Some(false));
}

#[test]
fn console_messages_are_absorbed() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    harness.resolve_all();

    harness.browser.emit(BrowserEvent::ConsoleMessage {
        level: ConsoleLevel::Error,
        message: "boom".into(),
    });
    // Routed to the log facade; must not panic or surface as an error.
    harness.controller.update();
    assert!(harness.diagnostics.errors().is_empty());
}

#[test]
fn click_pipeline_reaches_the_handle() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    harness.resolve_all();

    let point = Point::new(0.2, 0.3);
    harness.controller.handle_pointer_event(PointerEvent::Down {
        point,
        options: PointerOptions::default(),
    });
    harness
        .controller
        .handle_pointer_event(PointerEvent::Up { point });

    assert_eq!(
        harness
            .browser
            .calls_of(|call| matches!(call, BrowserCall::Click { .. })),
        vec![BrowserCall::Click {
            point,
            options: PointerOptions::default()
        }]
    );
}

#[test]
fn drag_pipeline_scrolls_instead_of_clicking() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();
    harness.resolve_all();

    harness.controller.handle_pointer_event(PointerEvent::Down {
        point: Point::new(0.1, 0.1),
        options: PointerOptions::default(),
    });
    harness.controller.handle_pointer_event(PointerEvent::Move {
        point: Point::new(0.5, 0.5),
    });
    harness.controller.handle_pointer_event(PointerEvent::Up {
        point: Point::new(0.5, 0.5),
    });

    assert!(harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Click { .. }))
        .is_empty());
    assert!(!harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Scroll { .. }))
        .is_empty());
}

#[test]
fn pointer_events_before_ready_are_dropped() {
    let harness = Harness::new(PaneConfig::default());
    harness.initialize();

    harness.controller.handle_pointer_event(PointerEvent::Down {
        point: Point::new(0.2, 0.2),
        options: PointerOptions::default(),
    });
    harness
        .controller
        .handle_pointer_event(PointerEvent::Up {
            point: Point::new(0.2, 0.2),
        });

    harness.resolve_all();
    assert!(harness
        .browser
        .calls_of(|call| matches!(call, BrowserCall::Click { .. }))
        .is_empty());

    // A gesture after readiness goes through.
    let point = Point::new(0.4, 0.4);
    harness.controller.handle_pointer_event(PointerEvent::Down {
        point,
        options: PointerOptions::default(),
    });
    harness
        .controller
        .handle_pointer_event(PointerEvent::Up { point });
    assert_eq!(
        harness
            .browser
            .calls_of(|call| matches!(call, BrowserCall::Click { .. }))
            .len(),
        1
    );
}

#[test]
fn cutout_rect_is_forwarded_to_both_surfaces() {
    let harness = Harness::new(video_config());
    harness.initialize();
    let (primary, secondary) = harness.resolve_all();
    let secondary = secondary.expect("secondary surface");

    let cutout = Some(Rect::new(0.25, 0.25, 0.5, 0.5));
    harness.controller.set_cutout_rect(cutout);

    assert!(primary.calls().contains(&SurfaceCall::SetCutoutRect(cutout)));
    assert!(secondary
        .calls()
        .contains(&SurfaceCall::SetCutoutRect(cutout)));
}
