//! Join barrier over the asynchronous resource-creation steps.
//!
//! The barrier releases exactly once, when every registered slot is `Ready`
//! or `Skipped`, in whatever order the completions arrive. It is single-use:
//! once fired, late completions are absorbed with a diagnostic instead of
//! erroring, because asynchronous callbacks can race the teardown of the
//! owning controller.

use smallvec::SmallVec;

use crate::error::PaneError;

/// Which awaited resource a slot stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    PrimarySurface,
    VideoSurface,
    BrowserHandle,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SlotKind::PrimarySurface => "primary surface",
            SlotKind::VideoSurface => "video surface",
            SlotKind::BrowserHandle => "browser handle",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum SlotState<T> {
    Pending,
    Ready(T),
    /// The resource will never arrive and the barrier should not wait for
    /// it (e.g. video disabled or unsupported on the platform).
    Skipped,
}

/// Token returned by [`ResourceBarrier::register`], identifying one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotToken(usize);

struct Slot<T> {
    kind: SlotKind,
    state: SlotState<T>,
}

/// Resolved slot values handed to the `on_all_ready` callback.
pub struct BarrierOutput<T> {
    values: SmallVec<[(SlotKind, Option<T>); 3]>,
}

impl<T> BarrierOutput<T> {
    /// Takes the value of the first slot of `kind`, if it was `Ready`.
    pub fn take(&mut self, kind: SlotKind) -> Option<T> {
        self.values
            .iter_mut()
            .find(|(slot_kind, value)| *slot_kind == kind && value.is_some())
            .and_then(|(_, value)| value.take())
    }
}

type ReadyCallback<T> = Box<dyn FnOnce(BarrierOutput<T>)>;

pub struct ResourceBarrier<T> {
    slots: SmallVec<[Slot<T>; 3]>,
    callback: Option<ReadyCallback<T>>,
    callback_registered: bool,
    fired: bool,
}

impl<T> Default for ResourceBarrier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceBarrier<T> {
    pub fn new() -> Self {
        Self {
            slots: SmallVec::new(),
            callback: None,
            callback_registered: false,
            fired: false,
        }
    }

    /// Adds a slot the barrier will wait for.
    pub fn register(&mut self, kind: SlotKind) -> Result<SlotToken, PaneError> {
        if self.fired {
            return Err(PaneError::InvalidArgument(
                "cannot register a slot on a barrier that already fired",
            ));
        }
        self.slots.push(Slot {
            kind,
            state: SlotState::Pending,
        });
        Ok(SlotToken(self.slots.len() - 1))
    }

    /// Marks the slot as ready with its resource value.
    pub fn complete(&mut self, token: SlotToken, value: T) -> Result<(), PaneError> {
        self.resolve(token, SlotState::Ready(value))
    }

    /// Marks the slot as one the barrier should not wait for.
    pub fn skip(&mut self, token: SlotToken) -> Result<(), PaneError> {
        self.resolve(token, SlotState::Skipped)
    }

    /// Registers the at-most-one callback.
    ///
    /// Fires synchronously if every slot is already resolved. A second
    /// registration is an error.
    pub fn on_all_ready(
        &mut self,
        callback: impl FnOnce(BarrierOutput<T>) + 'static,
    ) -> Result<(), PaneError> {
        if self.callback_registered {
            return Err(PaneError::ListenerAlreadyRegistered);
        }
        self.callback_registered = true;
        self.callback = Some(Box::new(callback));
        self.try_fire();
        Ok(())
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }

    fn resolve(&mut self, token: SlotToken, state: SlotState<T>) -> Result<(), PaneError> {
        if self.fired {
            // Late completions race controller teardown; absorb them.
            log::debug!("resource slot resolved after the barrier fired; ignoring");
            return Ok(());
        }
        let slot = match self.slots.get_mut(token.0) {
            Some(slot) => slot,
            None => return Err(PaneError::InvalidArgument("unknown slot token")),
        };
        match slot.state {
            SlotState::Pending => {
                slot.state = state;
                self.try_fire();
                Ok(())
            }
            _ => Err(PaneError::DuplicateResolution { kind: slot.kind }),
        }
    }

    fn try_fire(&mut self) {
        if self.fired || self.callback.is_none() {
            return;
        }
        let all_resolved = self
            .slots
            .iter()
            .all(|slot| !matches!(slot.state, SlotState::Pending));
        if !all_resolved {
            return;
        }
        self.fired = true;
        let values = self
            .slots
            .drain(..)
            .map(|slot| {
                let value = match slot.state {
                    SlotState::Ready(value) => Some(value),
                    _ => None,
                };
                (slot.kind, value)
            })
            .collect();
        if let Some(callback) = self.callback.take() {
            callback(BarrierOutput { values });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn fires_once_for_every_completion_order() {
        // All six orderings of three slots.
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let mut barrier = ResourceBarrier::new();
            let tokens = [
                barrier.register(SlotKind::PrimarySurface).unwrap(),
                barrier.register(SlotKind::VideoSurface).unwrap(),
                barrier.register(SlotKind::BrowserHandle).unwrap(),
            ];
            let fired = Rc::new(Cell::new(0));
            let fired_in_cb = fired.clone();
            barrier
                .on_all_ready(move |_output| fired_in_cb.set(fired_in_cb.get() + 1))
                .unwrap();

            for &index in &order {
                assert_eq!(fired.get(), 0, "fired before all slots resolved");
                barrier.complete(tokens[index], index).unwrap();
            }
            assert_eq!(fired.get(), 1, "order {order:?}");
        }
    }

    #[test]
    fn skipped_slots_do_not_block_release() {
        let mut barrier = ResourceBarrier::new();
        let primary = barrier.register(SlotKind::PrimarySurface).unwrap();
        let video = barrier.register(SlotKind::VideoSurface).unwrap();

        let output = Rc::new(RefCell::new(None));
        let output_in_cb = output.clone();
        barrier
            .on_all_ready(move |out| *output_in_cb.borrow_mut() = Some(out))
            .unwrap();

        barrier.skip(video).unwrap();
        barrier.complete(primary, "surface").unwrap();

        let mut output = output.borrow_mut().take().expect("barrier fired");
        assert_eq!(output.take(SlotKind::PrimarySurface), Some("surface"));
        assert_eq!(output.take(SlotKind::VideoSurface), None);
    }

    #[test]
    fn callback_registered_after_resolution_fires_synchronously() {
        let mut barrier = ResourceBarrier::new();
        let token = barrier.register(SlotKind::BrowserHandle).unwrap();
        barrier.complete(token, 7).unwrap();

        let fired = Rc::new(Cell::new(false));
        let fired_in_cb = fired.clone();
        barrier
            .on_all_ready(move |_| fired_in_cb.set(true))
            .unwrap();
        assert!(fired.get());
    }

    #[test]
    fn duplicate_resolution_is_an_error() {
        let mut barrier: ResourceBarrier<i32> = ResourceBarrier::new();
        let a = barrier.register(SlotKind::PrimarySurface).unwrap();
        let _b = barrier.register(SlotKind::BrowserHandle).unwrap();

        barrier.complete(a, 1).unwrap();
        assert_eq!(
            barrier.complete(a, 2),
            Err(PaneError::DuplicateResolution {
                kind: SlotKind::PrimarySurface
            })
        );
        assert_eq!(
            barrier.skip(a),
            Err(PaneError::DuplicateResolution {
                kind: SlotKind::PrimarySurface
            })
        );
    }

    #[test]
    fn resolutions_after_fire_are_absorbed() {
        let mut barrier = ResourceBarrier::new();
        let a = barrier.register(SlotKind::PrimarySurface).unwrap();
        barrier.on_all_ready(|_| {}).unwrap();
        barrier.complete(a, 1).unwrap();
        assert!(barrier.is_fired());

        // Not an error: the completion may have been queued before teardown.
        assert!(barrier.complete(a, 2).is_ok());
        assert!(barrier.skip(a).is_ok());
    }

    #[test]
    fn second_callback_registration_is_rejected() {
        let mut barrier: ResourceBarrier<i32> = ResourceBarrier::new();
        barrier.on_all_ready(|_| {}).unwrap();
        assert_eq!(
            barrier.on_all_ready(|_| {}),
            Err(PaneError::ListenerAlreadyRegistered)
        );
    }

    #[test]
    fn registering_after_fire_is_rejected() {
        let mut barrier: ResourceBarrier<i32> = ResourceBarrier::new();
        barrier.on_all_ready(|_| {}).unwrap();
        assert!(barrier.is_fired());
        assert!(barrier.register(SlotKind::VideoSurface).is_err());
    }
}
