//! Drives a full pane lifecycle against the in-memory fakes: initialize,
//! resolve resources out of order, run a click and a drag, feed a video
//! rect, then dispose. Run with RUST_LOG=debug to watch the lifecycle.

use websurface_core::geometry::{Point, Rect, Size};
use websurface_core::{PointerEvent, PointerOptions};
use websurface_input::{DragMode, DragPolicy, HandleCapabilities};
use websurface_pane::{
    apply_engine_settings, BrowserEvent, BrowserSource, EngineSettings, PaneConfig,
    PaneController, PaneDeps,
};
use websurface_testing::{FakeBrowser, ManualBrowserFactory, ManualSurfaceProvider, RecordingSurface};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    apply_engine_settings(EngineSettings {
        remote_debugging_port: Some(9222),
        user_agent: None,
    });

    let config = PaneConfig {
        size: Size::new(1.0, 0.6),
        initial_url: Some("https://example.com".into()),
        video_enabled: true,
        drag_policy: DragPolicy::new(DragMode::DragToScroll),
        ..PaneConfig::default()
    };
    let controller = PaneController::new(config);
    controller
        .on_ready(|| log::info!("pane is ready"))
        .expect("first ready listener");
    controller.set_wake_callback(|| log::debug!("browser event queued; tick requested"));

    let provider = ManualSurfaceProvider::new();
    let factory = ManualBrowserFactory::new();
    let browser = FakeBrowser::new(HandleCapabilities {
        explicit_pointer_events: false,
        movable_pointer: true,
    });

    controller
        .initialize(PaneDeps {
            surfaces: provider.clone(),
            browser: BrowserSource::Factory(factory.clone()),
        })
        .expect("initialize");

    // Resources complete out of order; the barrier does not care.
    factory.resolve(browser.clone());
    let secondary = RecordingSurface::new();
    provider.resolve_secondary(Some(secondary.clone()));
    provider.resolve_primary(RecordingSurface::new());

    // A click and a drag-to-scroll gesture.
    let point = Point::new(0.5, 0.3);
    controller.handle_pointer_event(PointerEvent::Down {
        point,
        options: PointerOptions::default(),
    });
    controller.handle_pointer_event(PointerEvent::Up { point });

    controller.handle_pointer_event(PointerEvent::Down {
        point: Point::new(0.5, 0.7),
        options: PointerOptions::default(),
    });
    controller.handle_pointer_event(PointerEvent::Move {
        point: Point::new(0.5, 0.4),
    });
    controller.handle_pointer_event(PointerEvent::Up {
        point: Point::new(0.5, 0.4),
    });

    // The page starts playing a video in its lower-right quadrant.
    browser.emit(BrowserEvent::VideoRectChanged(Rect::new(
        0.5, 0.5, 0.5, 0.5,
    )));
    controller.update();

    for call in browser.calls() {
        log::info!("browser <- {call:?}");
    }
    if let Some((offset, scale)) = secondary.last_layout() {
        log::info!("video overlay at offset {offset:?}, scale {scale:?}");
    }

    controller.dispose();
    log::info!("pane disposed");
}
