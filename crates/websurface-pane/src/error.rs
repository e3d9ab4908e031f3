//! Error taxonomy for the pane lifecycle.
//!
//! Only programmer/collaborator contract violations surface as errors.
//! Advisory conditions go through the diagnostics sink, and post-dispose
//! races are absorbed silently.

use crate::barrier::SlotKind;
use websurface_input::GestureError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaneError {
    /// `initialize` was called on an already-initialized controller.
    AlreadyInitialized,
    /// A resource slot was completed or skipped twice; this indicates a bug
    /// in the resource-providing collaborator.
    DuplicateResolution { kind: SlotKind },
    /// A second subscriber was registered on an at-most-one-subscriber
    /// notification.
    ListenerAlreadyRegistered,
    InvalidArgument(&'static str),
}

impl std::fmt::Display for PaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaneError::AlreadyInitialized => {
                write!(f, "the pane controller is already initialized")
            }
            PaneError::DuplicateResolution { kind } => {
                write!(f, "resource slot {kind} was resolved twice")
            }
            PaneError::ListenerAlreadyRegistered => {
                write!(f, "a listener is already registered for this notification")
            }
            PaneError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl std::error::Error for PaneError {}

impl From<GestureError> for PaneError {
    fn from(err: GestureError) -> Self {
        match err {
            GestureError::PolicyChangeMidGesture => {
                PaneError::InvalidArgument("drag policy cannot change during an active gesture")
            }
        }
    }
}
