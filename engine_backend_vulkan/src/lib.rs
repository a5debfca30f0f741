/*!
# Engine Backend - Vulkan

Vulkan implementation of the engine's platform/driver bootstrap layer.

This crate implements the `engine_backend` traits on top of the Ash
bindings: extension and layer negotiation, physical device selection,
instance and device creation, and the debug diagnostics sink.

## Example

```no_run
use engine_backend::backend::{Driver, Platform};
use engine_backend_vulkan::backend::PlatformFactory;

let mut platform = Some(PlatformFactory::create());
if let Some(platform) = platform.as_mut() {
    let mut driver = platform.create_driver();
    driver.terminate();
}
PlatformFactory::destroy(&mut platform);
```
*/

// Internal modules
mod extensions;
mod device_selector;
mod host;
mod vulkan_context;
mod vulkan_platform;
mod vulkan_driver;
mod debug_utils;
mod surface;
mod factory;

#[cfg(test)]
mod mock_host;

pub use vulkan_platform::VulkanPlatform;
pub use vulkan_driver::VulkanDriver;

// Main backend namespace module
pub mod backend {
    // Factory
    pub use crate::factory::PlatformFactory;

    // Platform / Driver implementation
    pub use crate::vulkan_platform::VulkanPlatform;
    pub use crate::vulkan_driver::VulkanDriver;
    pub use crate::vulkan_context::{QueueDescriptor, VulkanContext};
    pub use crate::debug_utils::DebugUtils;

    // Host seam
    pub use crate::host::{AshHost, InstanceDesc, PhysicalDeviceProperties, VulkanHost};

    // Negotiation and selection
    pub use crate::extensions::{
        check_build_mode_invariant, desired_instance_extensions, enabled_instance_extensions,
        missing_required_extensions, negotiate_instance_extensions, negotiate_layers,
        ExtensionSet, LayerNegotiation, DEBUG_UTILS_EXTENSION, DESIRED_LAYERS,
        SURFACE_EXTENSION, VALIDATION_FEATURES_EXTENSION, VALIDATION_LAYER,
    };
    pub use crate::device_selector::{
        find_queue_family, queue_flags, select_physical_device, DeviceType,
        PhysicalDeviceDescriptor, QueueFamily, Suitability,
    };

    // Windowing collaborator
    pub use crate::surface::required_surface_extensions;
}
