/// PlatformFactory - construction and destruction of the backend platform
///
/// `create` picks the platform implementation for the current target (Vulkan)
/// and hands ownership to the caller. `destroy` drops it and clears the
/// caller's handle, so a second call on the same handle does nothing.

use engine_backend::backend::{Backend, Platform, PlatformConfig, PlatformState};
use engine_backend::{engine_debug, engine_info, engine_warn};

use crate::vulkan_platform::VulkanPlatform;

const SOURCE: &str = "backend::PlatformFactory";

pub struct PlatformFactory;

impl PlatformFactory {
    /// Platform with the default configuration for the current build
    pub fn create() -> Box<dyn Platform> {
        Self::create_with_config(PlatformConfig::default())
    }

    pub fn create_with_config(config: PlatformConfig) -> Box<dyn Platform> {
        Self::create_vulkan(config)
    }

    /// Concrete Vulkan platform, for callers needing surfaces or native handles
    pub fn create_vulkan(config: PlatformConfig) -> Box<VulkanPlatform> {
        engine_info!(SOURCE, "Creating {} platform for '{}'", Backend::Vulkan, config.app_name);
        Box::new(VulkanPlatform::new(config))
    }

    /// Drop the platform and clear the handle
    pub fn destroy(platform: &mut Option<Box<dyn Platform>>) {
        let Some(platform) = platform.take() else {
            engine_debug!(SOURCE, "destroy called on an empty platform handle");
            return;
        };

        if platform.state() == PlatformState::Active {
            engine_warn!(SOURCE, "Destroying an active {} platform; terminate its driver first", platform.backend());
        }
        drop(platform);
        engine_info!(SOURCE, "Platform destroyed");
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
