//! Diagnostics sink for non-fatal advisory conditions.
//!
//! Invalid-but-recoverable caller configuration (a non-positive resolution,
//! a capability fallback, a load request ignored because the handle came
//! pre-initialized) is reported here and never interrupts control flow.

/// Collaborator-supplied sink for advisory conditions.
pub trait Diagnostics {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink forwarding to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}
