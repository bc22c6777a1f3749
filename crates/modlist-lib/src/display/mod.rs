//! Terminal display system
//!
//! Semantic APIs for user-facing output that adapt to terminal
//! capabilities. Logging goes through tracing; results and summaries the
//! user asked for go through here.

use crate::primitives::ConfigError;
use crate::terminal::TerminalCapabilities;
use std::sync::OnceLock;

pub mod progress;
pub mod status;
pub mod styling;

// Global display manager - initialized once with terminal capabilities
static GLOBAL_DISPLAY: OnceLock<Display> = OnceLock::new();

/// Main display manager that coordinates all user-facing communication
#[derive(Debug)]
pub struct Display {
    capabilities: TerminalCapabilities,
    styling: styling::StyleManager,
}

impl Display {
    fn new(capabilities: TerminalCapabilities) -> Self {
        let styling = styling::StyleManager::new(&capabilities);
        Self {
            capabilities,
            styling,
        }
    }

    /// Initialize global display system with terminal capabilities
    pub fn init(capabilities: TerminalCapabilities) -> Result<&'static Self, ConfigError> {
        GLOBAL_DISPLAY
            .set(Display::new(capabilities))
            .map_err(|_| ConfigError::AlreadyInitialized)?;

        Ok(Self::global())
    }

    /// Global display reference
    ///
    /// Falls back to plain output when `init` was never called (library
    /// use and unit tests).
    pub fn global() -> &'static Self {
        GLOBAL_DISPLAY.get_or_init(|| Display::new(TerminalCapabilities::minimal()))
    }

    /// Status updates with semantic intent
    pub fn status() -> status::StatusDisplay<'static> {
        status::StatusDisplay::new(&Self::global().styling)
    }

    /// Progress tracking for long operations
    pub fn progress() -> progress::ProgressDisplay<'static> {
        let display = Self::global();
        progress::ProgressDisplay::new(&display.styling, display.capabilities.is_tty)
    }

    pub fn capabilities() -> &'static TerminalCapabilities {
        &Self::global().capabilities
    }

    pub fn styling() -> &'static styling::StyleManager {
        &Self::global().styling
    }
}
