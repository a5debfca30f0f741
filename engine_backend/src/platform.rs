/// Platform and Driver traits - the public bootstrap contract
///
/// A `Platform` owns the graphics-API instance of one backend. It produces
/// exactly one `Driver` over its lifetime; the driver tears down its own
/// diagnostics and then terminates the platform that created it.
///
/// ```text
/// Platform: Uninitialized --create_driver--> Active --terminate--> Terminated
/// Driver:   Constructed   --terminate-->     Terminated
/// ```
///
/// Neither call reports failure to its caller: bootstrap either succeeds or
/// the process terminates with a diagnostic.

use std::fmt;

/// Graphics backend implemented by a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Vulkan,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Vulkan => write!(f, "Vulkan"),
        }
    }
}

/// Lifecycle of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformState {
    /// Constructed, no graphics-API state yet
    Uninitialized,
    /// Instance (and device) created, driver handed out
    Active,
    /// Instance destroyed
    Terminated,
}

/// Lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Constructed,
    Terminated,
}

/// Backend platform: creates the graphics instance and the single Driver
pub trait Platform: Send {
    /// Backend implemented by this platform
    fn backend(&self) -> Backend;

    /// Current lifecycle state
    fn state(&self) -> PlatformState;

    /// Bootstrap the graphics API and return the driver
    ///
    /// Must be called at most once per platform. Blocking, non-cancelable and
    /// non-retryable: host failures terminate the process.
    fn create_driver(&mut self) -> Box<dyn Driver>;

    /// Destroy the graphics-API state owned by this platform
    ///
    /// Normally invoked through [`Driver::terminate`]. Must be called at most once.
    fn terminate(&mut self);
}

/// Backend driver: the object upper layers hold once bootstrap is done
///
/// A driver keeps a non-owning reference to its platform; the platform must
/// outlive every call made on the driver.
pub trait Driver: Send {
    /// Backend this driver was created by
    fn backend(&self) -> Backend;

    /// Current lifecycle state
    fn state(&self) -> DriverState;

    /// Tear down diagnostics, then terminate the owning platform
    ///
    /// Must be called exactly once, before the driver is dropped.
    fn terminate(&mut self);
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
