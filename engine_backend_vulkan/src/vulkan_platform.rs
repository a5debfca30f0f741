/// VulkanPlatform - Vulkan implementation of the Platform trait
///
/// Owns the instance, the selected physical device and (when configured) the
/// logical device with its queue. `create_driver` runs the bootstrap pipeline:
///
/// 1. load the entry points
/// 2. negotiate instance extensions and layers
/// 3. create the instance
/// 4. resolve instance-level extension functions
/// 5. select the physical device
/// 6. log the device summary, create the logical device and queue
/// 7. snapshot the debug context and construct the driver
///
/// Each step depends on the output of the previous one. A failing step is
/// fatal: the error is logged and the process terminates.

use ash::vk;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use engine_backend::backend::{Backend, BuildMode, Error, Platform, PlatformConfig, PlatformState, Result};
use engine_backend::backend::Driver;
use engine_backend::{engine_debug, engine_error, engine_fatal, engine_info, engine_warn};

use crate::device_selector::{select_physical_device, PhysicalDeviceDescriptor};
use crate::extensions::{
    check_build_mode_invariant, desired_instance_extensions, enabled_instance_extensions,
    missing_required_extensions, negotiate_instance_extensions, negotiate_layers,
    ExtensionSet, LayerNegotiation, DEBUG_UTILS_EXTENSION, VALIDATION_LAYER,
};
use crate::host::{AshHost, InstanceDesc, PhysicalDeviceProperties, VulkanHost};
use crate::surface::raw_handles;
use crate::vulkan_context::{QueueDescriptor, VulkanContext};
use crate::vulkan_driver::VulkanDriver;

const SOURCE: &str = "backend::vulkan";

/// Lock the shared platform state, recovering from a poisoned lock
pub(crate) fn lock_shared<H: VulkanHost>(shared: &Mutex<PlatformShared<H>>) -> MutexGuard<'_, PlatformShared<H>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Platform state shared with the driver and its diagnostics sink
pub(crate) struct PlatformShared<H: VulkanHost> {
    pub(crate) host: H,
    /// Mode of the compilation; caps the configured build mode
    pub(crate) compiled_mode: BuildMode,
    pub(crate) state: PlatformState,
    pub(crate) instance: vk::Instance,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: vk::Device,
    pub(crate) graphics_queue: Option<QueueDescriptor>,
    pub(crate) context: VulkanContext,
    pub(crate) enabled_extensions: ExtensionSet,
    pub(crate) enabled_layers: Vec<String>,
}

impl<H: VulkanHost> PlatformShared<H> {
    pub(crate) fn new(host: H) -> Self {
        Self {
            host,
            compiled_mode: BuildMode::current(),
            state: PlatformState::Uninitialized,
            instance: vk::Instance::null(),
            physical_device: vk::PhysicalDevice::null(),
            device: vk::Device::null(),
            graphics_queue: None,
            context: VulkanContext::default(),
            enabled_extensions: ExtensionSet::new(),
            enabled_layers: Vec::new(),
        }
    }

    /// Run the whole bootstrap pipeline, leaving the platform Active on success
    pub(crate) fn bootstrap(&mut self, config: &PlatformConfig) -> Result<()> {
        self.host.load_entry_points()?;

        let (enabled_extensions, layers) = self.negotiate(config)?;

        self.create_instance(config, &enabled_extensions, &layers)?;
        self.host.load_instance_functions(&enabled_extensions)?;

        let (selected, properties, device_count) = self.select_device(config)?;
        log_device_summary(&properties, device_count);
        self.physical_device = selected.handle;

        if config.create_device {
            let family_index = selected.queue_family_index.ok_or_else(|| {
                Error::InvariantViolation(format!("Selected device '{}' has no queue family", selected.name))
            })?;
            self.device = self.host.create_device(selected.handle, family_index)?;
            let queue = self.host.device_queue(family_index, 0)?;
            self.graphics_queue = Some(QueueDescriptor {
                family_index,
                queue_index: 0,
                queue,
            });
            engine_debug!(SOURCE, "Logical device created (queue family {})", family_index);
        }

        self.context = VulkanContext::new(
            enabled_extensions.contains(DEBUG_UTILS_EXTENSION),
            layers.enabled_layers.iter().any(|l| l == VALIDATION_LAYER),
            layers.validation_features_supported,
        );
        self.enabled_extensions = enabled_extensions;
        self.enabled_layers = layers.enabled_layers;
        self.state = PlatformState::Active;

        Ok(())
    }

    /// Final extension and layer lists for instance creation
    fn negotiate(&self, config: &PlatformConfig) -> Result<(ExtensionSet, LayerNegotiation)> {
        let mode = config.build_mode.clamp_to(self.compiled_mode);
        if mode != config.build_mode {
            engine_warn!(
                SOURCE,
                "{:?} build mode requested in a {:?} build; debug extensions and layers stay disabled",
                config.build_mode,
                self.compiled_mode
            );
        }

        let available = self.host.instance_extensions(None)?;
        let desired = desired_instance_extensions(mode);
        let negotiated = negotiate_instance_extensions(&available, &desired, &config.required_extensions);

        for missing in missing_required_extensions(&config.required_extensions, &negotiated) {
            engine_warn!(SOURCE, "Required instance extension '{}' is not available", missing);
        }

        let layers = if mode.is_debug() {
            let available_layers = self.host.instance_layers()?;
            negotiate_layers(&available_layers, || self.host.instance_extensions(Some(VALIDATION_LAYER)))?
        } else {
            LayerNegotiation::default()
        };

        let enabled = enabled_instance_extensions(&negotiated, &layers);
        check_build_mode_invariant(mode, &enabled)?;

        engine_debug!(SOURCE, "Enabled instance extensions: {:?}", enabled);

        Ok((enabled, layers))
    }

    fn create_instance(
        &mut self,
        config: &PlatformConfig,
        extensions: &ExtensionSet,
        layers: &LayerNegotiation,
    ) -> Result<()> {
        let desc = InstanceDesc {
            app_name: config.app_name.clone(),
            app_version: config.app_version,
            engine_name: config.engine_name.clone(),
            api_version: config.min_api_version,
            layers: layers.enabled_layers.clone(),
            extensions: extensions.iter().cloned().collect(),
        };

        self.instance = self.host.create_instance(&desc)?;
        engine_info!(SOURCE, "Vulkan instance created (API {})", config.min_api_version);
        Ok(())
    }

    /// Evaluate every physical device and pick the best suitable one
    fn select_device(
        &self,
        config: &PlatformConfig,
    ) -> Result<(PhysicalDeviceDescriptor, PhysicalDeviceProperties, usize)> {
        let handles = self.host.physical_devices()?;
        let device_count = handles.len();

        let mut candidates = Vec::with_capacity(device_count);
        let mut properties = Vec::with_capacity(device_count);
        for handle in handles {
            let device_properties = self.host.physical_device_properties(handle)?;
            let families = self.host.queue_families(handle)?;
            let candidate = PhysicalDeviceDescriptor::evaluate(
                handle,
                device_properties.name.clone(),
                device_properties.device_type,
                device_properties.api_version,
                &families,
                config.min_api_version,
                config.required_queue,
            );
            if !candidate.is_suitable() {
                engine_debug!(SOURCE, "Excluding device '{}': {}", candidate.name, candidate.suitability);
            }
            candidates.push(candidate);
            properties.push(device_properties);
        }

        let Some(index) = select_physical_device(&candidates)
            .and_then(|selected| candidates.iter().position(|c| c.handle == selected.handle))
        else {
            let message = format!(
                "None of the {} physical device(s) supports API {} with a {:?} queue",
                device_count, config.min_api_version, config.required_queue
            );
            engine_error!(SOURCE, "{}", message);
            return Err(Error::NoSuitableDevice(message));
        };

        let selected_properties = properties.swap_remove(index);
        Ok((candidates.swap_remove(index), selected_properties, device_count))
    }

    /// Destroy the device then the instance
    pub(crate) fn terminate(&mut self) {
        assert_eq!(
            self.state,
            PlatformState::Active,
            "VulkanPlatform::terminate called on a platform that is not active"
        );

        if self.device != vk::Device::null() {
            self.host.destroy_device();
            self.device = vk::Device::null();
            self.graphics_queue = None;
        }
        self.host.destroy_instance();
        self.instance = vk::Instance::null();
        self.state = PlatformState::Terminated;

        engine_info!(SOURCE, "Vulkan platform terminated");
    }
}

fn log_device_summary(properties: &PhysicalDeviceProperties, device_count: usize) {
    engine_info!(
        SOURCE,
        "Selected '{}' ({}) out of {} physical device(s): vendor=0x{:04x} device=0x{:04x} driver={} api={}",
        properties.name,
        properties.device_type,
        device_count,
        properties.vendor_id,
        properties.device_id,
        properties.driver_version,
        properties.api_version
    );
    if let Some((name, info)) = &properties.driver {
        engine_info!(SOURCE, "Driver: {} ({})", name, info);
    }
}

/// Vulkan platform
///
/// The host type defaults to [`AshHost`]; tests plug in a recording host.
pub struct VulkanPlatform<H: VulkanHost = AshHost> {
    shared: Arc<Mutex<PlatformShared<H>>>,
    config: PlatformConfig,
}

impl VulkanPlatform<AshHost> {
    /// Platform backed by the system Vulkan loader
    pub fn new(config: PlatformConfig) -> Self {
        Self::with_host(AshHost::new(), config)
    }
}

impl<H: VulkanHost> VulkanPlatform<H> {
    pub fn with_host(host: H, config: PlatformConfig) -> Self {
        Self {
            shared: Arc::new(Mutex::new(PlatformShared::new(host))),
            config,
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Pretend the crate was compiled in `mode`
    #[cfg(test)]
    pub(crate) fn with_compiled_mode(self, mode: BuildMode) -> Self {
        self.shared().compiled_mode = mode;
        self
    }

    fn shared(&self) -> MutexGuard<'_, PlatformShared<H>> {
        lock_shared(&self.shared)
    }

    /// Instance handle (null until the driver is created)
    pub fn instance(&self) -> vk::Instance {
        self.shared().instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.shared().physical_device
    }

    /// Logical device handle (null when device creation is disabled)
    pub fn device(&self) -> vk::Device {
        self.shared().device
    }

    /// Queue for the required capability, when a logical device was created
    pub fn graphics_queue(&self) -> Option<QueueDescriptor> {
        self.shared().graphics_queue
    }

    pub fn context(&self) -> VulkanContext {
        self.shared().context
    }

    /// Extensions enabled on the instance; immutable once the instance exists
    pub fn enabled_extensions(&self) -> ExtensionSet {
        self.shared().enabled_extensions.clone()
    }

    pub fn enabled_layers(&self) -> Vec<String> {
        self.shared().enabled_layers.clone()
    }

    /// Bootstrap and return the concrete driver
    ///
    /// # Panics
    ///
    /// Panics when called twice, and on any bootstrap failure.
    pub fn create_vulkan_driver(&mut self) -> VulkanDriver<H> {
        assert_eq!(
            self.state(),
            PlatformState::Uninitialized,
            "create_driver called twice on the same platform"
        );

        match self.try_create_driver() {
            Ok(driver) => driver,
            Err(e) => engine_fatal!(SOURCE, "Vulkan bootstrap failed: {}", e),
        }
    }

    pub(crate) fn try_create_driver(&mut self) -> Result<VulkanDriver<H>> {
        let context = {
            let mut shared = self.shared();
            shared.bootstrap(&self.config)?;
            shared.context
        };
        VulkanDriver::new(&self.shared, context, self.config.debug_severity)
    }

    /// Create a drawable surface for a native window
    ///
    /// The surface must be destroyed with [`destroy_surface`](Self::destroy_surface)
    /// before the driver is terminated.
    pub fn create_surface<W>(&self, window: &W) -> Result<vk::SurfaceKHR>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        let (display, window) = raw_handles(window)?;
        let shared = self.shared();
        assert_eq!(shared.state, PlatformState::Active, "create_surface requires an active platform");
        let surface = shared.host.create_surface(display, window)?;
        engine_debug!(SOURCE, "Surface created");
        Ok(surface)
    }

    pub fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        let shared = self.shared();
        assert_eq!(shared.state, PlatformState::Active, "destroy_surface requires an active platform");
        shared.host.destroy_surface(surface);
    }
}

impl<H: VulkanHost> Platform for VulkanPlatform<H> {
    fn backend(&self) -> Backend {
        Backend::Vulkan
    }

    fn state(&self) -> PlatformState {
        self.shared().state
    }

    fn create_driver(&mut self) -> Box<dyn Driver> {
        Box::new(self.create_vulkan_driver())
    }

    fn terminate(&mut self) {
        self.shared().terminate();
    }
}

impl<H: VulkanHost> Drop for VulkanPlatform<H> {
    fn drop(&mut self) {
        if self.shared().state == PlatformState::Active {
            engine_warn!(SOURCE, "VulkanPlatform dropped while active; the driver was never terminated");
        }
    }
}

#[cfg(test)]
#[path = "vulkan_platform_tests.rs"]
mod tests;
