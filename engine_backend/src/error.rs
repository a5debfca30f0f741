//! Error types for the engine backend
//!
//! Every bootstrap step is fallible internally and reports one of these
//! variants. The public `Platform` / `Driver` contract never returns them:
//! a failed bootstrap goes through `engine_fatal!` instead.

use std::fmt;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Backend errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Host graphics driver reported a failure (enumeration, creation, ...)
    BackendError(String),

    /// Initialization failed (instance, device, messenger)
    InitializationFailed(String),

    /// The graphics API loader or its entry points could not be found
    LoaderUnavailable(String),

    /// No physical device satisfies the minimum requirements
    NoSuitableDevice(String),

    /// A build-mode invariant was broken (e.g. debug extension in release)
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::LoaderUnavailable(msg) => write!(f, "Graphics loader unavailable: {}", msg),
            Error::NoSuitableDevice(msg) => write!(f, "No suitable device: {}", msg),
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
