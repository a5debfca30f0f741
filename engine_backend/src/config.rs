//! Platform configuration
//!
//! The compile-time debug/release distinction is the only switch the backend
//! exposes. It is captured in [`BuildMode`] and carried inside
//! [`PlatformConfig`] so the negotiation logic can be exercised for either
//! mode from the same test binary. A release compilation clamps any
//! configured mode to release (see [`BuildMode::clamp_to`]).

use std::collections::BTreeSet;
use std::fmt;

/// Build mode of the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Validation layers, validation features and the debug messenger are attempted
    Debug,
    /// No debug-only extension or layer may be enabled
    Release,
}

impl BuildMode {
    /// Build mode of the current compilation
    ///
    /// Debug when `debug_assertions` are on or the `validation` feature is enabled.
    pub const fn current() -> Self {
        if cfg!(debug_assertions) || cfg!(feature = "validation") {
            BuildMode::Debug
        } else {
            BuildMode::Release
        }
    }

    pub fn is_debug(self) -> bool {
        self == BuildMode::Debug
    }

    /// Mode allowed by a build compiled as `compiled`
    ///
    /// A release compilation always negotiates in release mode, whatever the
    /// configuration asks for. A debug compilation honors the request.
    pub fn clamp_to(self, compiled: BuildMode) -> Self {
        match compiled {
            BuildMode::Release => BuildMode::Release,
            BuildMode::Debug => self,
        }
    }
}

/// Severity mask of messages forwarded by the debug messenger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugSeverity {
    /// Only error messages
    ErrorsOnly,
    /// Errors and warnings
    #[default]
    ErrorsAndWarnings,
    /// Everything including info and verbose
    All,
}

/// Queue capability a selected device must expose in at least one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCapability {
    Graphics,
    Compute,
    Transfer,
}

/// Graphics API version, compared on major.minor only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const V1_0: ApiVersion = ApiVersion::new(1, 0, 0);
    pub const V1_1: ApiVersion = ApiVersion::new(1, 1, 0);
    pub const V1_2: ApiVersion = ApiVersion::new(1, 2, 0);
    pub const V1_3: ApiVersion = ApiVersion::new(1, 3, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// True when `self` is at least `minimum`, checking major then minor
    pub fn satisfies(&self, minimum: ApiVersion) -> bool {
        if self.major != minimum.major {
            return self.major > minimum.major;
        }
        self.minor >= minimum.minor
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Application name reported to the driver
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Debug or release negotiation rules; release builds always negotiate as release
    pub build_mode: BuildMode,
    /// Minimum API version of the instance and of the selected device
    pub min_api_version: ApiVersion,
    /// Instance extensions required by an external collaborator (windowing surface)
    pub required_extensions: BTreeSet<String>,
    /// Capability the selected device must offer in one of its queue families
    pub required_queue: QueueCapability,
    /// Debug messenger severity mask
    pub debug_severity: DebugSeverity,
    /// Create a logical device and graphics queue after device selection
    pub create_device: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            app_name: "Engine Application".to_string(),
            app_version: (1, 0, 0),
            engine_name: "Engine".to_string(),
            build_mode: BuildMode::current(),
            min_api_version: ApiVersion::V1_1,
            required_extensions: BTreeSet::new(),
            required_queue: QueueCapability::Graphics,
            debug_severity: DebugSeverity::default(),
            create_device: true,
        }
    }
}

impl PlatformConfig {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = mode;
        self
    }

    pub fn with_min_api_version(mut self, version: ApiVersion) -> Self {
        self.min_api_version = version;
        self
    }

    /// Add externally required instance extensions (e.g. surface extensions)
    pub fn with_required_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    pub fn with_required_queue(mut self, capability: QueueCapability) -> Self {
        self.required_queue = capability;
        self
    }

    pub fn with_debug_severity(mut self, severity: DebugSeverity) -> Self {
        self.debug_severity = severity;
        self
    }

    pub fn with_device_creation(mut self, create_device: bool) -> Self {
        self.create_device = create_device;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
