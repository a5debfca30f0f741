/// VulkanContext - capability snapshot taken at bootstrap
///
/// Computed once after instance creation and passed by value to the driver
/// and its diagnostics sink, so downstream code branches on availability
/// instead of probing the host again.

use ash::vk;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VulkanContext {
    debug_utils_supported: bool,
    validation_enabled: bool,
    validation_features_enabled: bool,
}

impl VulkanContext {
    pub(crate) fn new(
        debug_utils_supported: bool,
        validation_enabled: bool,
        validation_features_enabled: bool,
    ) -> Self {
        Self {
            debug_utils_supported,
            validation_enabled,
            validation_features_enabled,
        }
    }

    /// The debug-utils extension is enabled (messenger + object naming)
    pub fn is_debug_utils_supported(&self) -> bool {
        self.debug_utils_supported
    }

    /// The validation layer is enabled on the instance
    pub fn is_validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    pub fn is_validation_features_enabled(&self) -> bool {
        self.validation_features_enabled
    }
}

/// Queue retrieved for a capability requirement, owned by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueDescriptor {
    pub family_index: u32,
    pub queue_index: u32,
    pub queue: vk::Queue,
}
