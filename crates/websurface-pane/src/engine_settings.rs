//! Process-wide browser engine settings.
//!
//! Some engine options can only be applied before the first handle is
//! created and hold for the life of the process. They are passed explicitly
//! and stored at most once: set once, never unset except at process restart.

use std::sync::OnceLock;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Port for the engine's remote debugging interface, if enabled.
    pub remote_debugging_port: Option<u16>,
    /// Override for the engine's user-agent string.
    pub user_agent: Option<String>,
}

static SETTINGS: OnceLock<EngineSettings> = OnceLock::new();

/// Applies the settings if none were applied yet.
///
/// Returns `false` (with a warning) when settings were already applied; the
/// stored settings are unchanged.
pub fn apply_engine_settings(settings: EngineSettings) -> bool {
    match SETTINGS.set(settings) {
        Ok(()) => true,
        Err(_) => {
            log::warn!("engine settings were already applied; new settings ignored");
            false
        }
    }
}

/// The settings applied for this process, if any.
pub fn engine_settings() -> Option<&'static EngineSettings> {
    SETTINGS.get()
}
