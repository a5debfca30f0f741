/*!
# Engine Backend

Core traits and types for the engine's platform/driver bootstrap layer.

This crate provides the backend-agnostic contract that upper engine layers
program against. A concrete backend (Vulkan today) implements these traits
and owns every graphics-API handle, so engine code never touches the
underlying API directly.

## Architecture

- **Platform**: creates exactly one Driver, then destroys the graphics instance
- **Driver**: tears down its diagnostics and terminates its Platform
- **PlatformConfig**: application metadata, build mode, required extensions
- **Engine**: process-wide logging entry points used by the `engine_*!` macros

Backend crates provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod engine;
mod config;
mod platform;
pub mod log;

// Main backend namespace module
pub mod backend {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging entry points
    pub use crate::engine::Engine;

    // Platform / Driver contract
    pub use crate::platform::{Backend, Driver, DriverState, Platform, PlatformState};

    // Configuration
    pub use crate::config::{ApiVersion, BuildMode, DebugSeverity, PlatformConfig, QueueCapability};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogFacadeLogger, LogSeverity, Logger};
    }
}
