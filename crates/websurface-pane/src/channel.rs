//! Thread-safe hand-off of browser events onto the controller's loop.
//!
//! The browser may complete work on its own thread; everything that touches
//! controller state must run on the host's update tick. The sender side is
//! `Send` and cheap to clone; the controller owns the receiver and drains it
//! from `update()`. An optional waker lets an idle host schedule a tick when
//! an event arrives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use crate::browser::BrowserEvent;

struct ChannelInner {
    queue: Mutex<VecDeque<BrowserEvent>>,
    waker: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

/// Producer half; handed to the browser handle.
#[derive(Clone)]
pub struct EventSender {
    inner: Arc<ChannelInner>,
}

impl EventSender {
    pub fn send(&self, event: BrowserEvent) {
        match self.inner.queue.lock() {
            Ok(mut queue) => queue.push_back(event),
            Err(poisoned) => poisoned.into_inner().push_back(event),
        }
        let waker = match self.inner.waker.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(waker) = waker {
            waker();
        }
    }
}

/// Consumer half; drained on the controller's thread.
pub struct EventReceiver {
    inner: Arc<ChannelInner>,
}

impl EventReceiver {
    /// Takes every queued event, in arrival order.
    pub fn drain(&self) -> Vec<BrowserEvent> {
        match self.inner.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    /// Registers a waker invoked whenever an event is queued.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut guard) = self.inner.waker.write() {
            *guard = Some(Arc::new(waker));
        }
    }

    pub fn clear_waker(&self) {
        if let Ok(mut guard) = self.inner.waker.write() {
            *guard = None;
        }
    }
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    let inner = Arc::new(ChannelInner {
        queue: Mutex::new(VecDeque::new()),
        waker: RwLock::new(None),
    });
    (
        EventSender {
            inner: inner.clone(),
        },
        EventReceiver { inner },
    )
}
