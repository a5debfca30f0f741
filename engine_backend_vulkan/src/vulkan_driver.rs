/// VulkanDriver - Vulkan implementation of the Driver trait
///
/// Holds a non-owning reference to the platform state that created it, the
/// debug context snapshot and the diagnostics sink. `terminate` tears the
/// sink down first, then terminates the platform.

use std::sync::{Arc, Mutex, Weak};
use engine_backend::backend::{Backend, DebugSeverity, Driver, DriverState, Result};
use engine_backend::{engine_debug, engine_warn};

use crate::debug_utils::DebugUtils;
use crate::host::{AshHost, VulkanHost};
use crate::vulkan_context::VulkanContext;
use crate::vulkan_platform::{lock_shared, PlatformShared};

pub struct VulkanDriver<H: VulkanHost = AshHost> {
    platform: Weak<Mutex<PlatformShared<H>>>,
    context: VulkanContext,
    debug_utils: DebugUtils<H>,
    state: DriverState,
}

impl<H: VulkanHost> VulkanDriver<H> {
    pub(crate) fn new(
        platform: &Arc<Mutex<PlatformShared<H>>>,
        context: VulkanContext,
        severity: DebugSeverity,
    ) -> Result<Self> {
        let debug_utils = DebugUtils::new(platform, context, severity)?;
        engine_debug!("backend::vulkan", "VulkanDriver constructed ({:?})", context);

        Ok(Self {
            platform: Arc::downgrade(platform),
            context,
            debug_utils,
            state: DriverState::Constructed,
        })
    }

    /// Capability snapshot taken at bootstrap
    pub fn context(&self) -> VulkanContext {
        self.context
    }

    /// Diagnostics sink for object naming
    ///
    /// # Panics
    ///
    /// Panics after [`Driver::terminate`].
    pub fn debug_utils(&self) -> &DebugUtils<H> {
        assert_eq!(
            self.state,
            DriverState::Constructed,
            "debug_utils accessed after the driver was terminated"
        );
        &self.debug_utils
    }
}

impl<H: VulkanHost> Driver for VulkanDriver<H> {
    fn backend(&self) -> Backend {
        Backend::Vulkan
    }

    fn state(&self) -> DriverState {
        self.state
    }

    fn terminate(&mut self) {
        assert_eq!(self.state, DriverState::Constructed, "VulkanDriver::terminate called twice");

        self.debug_utils.destroy();

        let Some(platform) = self.platform.upgrade() else {
            panic!("VulkanDriver outlived its platform");
        };
        lock_shared(&platform).terminate();

        self.state = DriverState::Terminated;
    }
}

impl<H: VulkanHost> Drop for VulkanDriver<H> {
    fn drop(&mut self) {
        if self.state == DriverState::Constructed {
            engine_warn!("backend::vulkan", "VulkanDriver dropped without terminate()");
        }
    }
}

#[cfg(test)]
#[path = "vulkan_driver_tests.rs"]
mod tests;
