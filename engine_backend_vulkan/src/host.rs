/// VulkanHost - the seam between the bootstrap pipeline and the host driver
///
/// The platform drives bootstrap exclusively through this trait. [`AshHost`]
/// is the real implementation on top of `ash`; tests substitute a recording
/// host so the pipeline and teardown ordering can run without a GPU.

use ash::vk;
use std::ffi::{c_char, CStr, CString};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use engine_backend::backend::{ApiVersion, DebugSeverity, Error, Result};
use engine_backend::{engine_debug, engine_error, engine_err};

use crate::debug_utils::{debug_utils_callback, message_severity_mask, message_type_mask};
use crate::device_selector::{DeviceType, QueueFamily};
use crate::extensions::{ExtensionSet, DEBUG_UTILS_EXTENSION, SURFACE_EXTENSION};

/// Parameters of instance creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDesc {
    pub app_name: String,
    pub app_version: (u32, u32, u32),
    pub engine_name: String,
    pub api_version: ApiVersion,
    pub layers: Vec<String>,
    pub extensions: Vec<String>,
}

/// Properties of a physical device relevant to selection and diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceProperties {
    pub name: String,
    pub device_type: DeviceType,
    pub api_version: ApiVersion,
    pub vendor_id: u32,
    pub device_id: u32,
    pub driver_version: u32,
    /// Driver name and info, reported by devices with API 1.2 or later
    pub driver: Option<(String, String)>,
}

/// Host graphics driver operations used by the platform
///
/// Every call is blocking. Implementations report host failures as `Err`;
/// the platform turns them into the fatal path.
pub trait VulkanHost: Send + 'static {
    /// Load the global entry points (dynamic loader)
    fn load_entry_points(&mut self) -> Result<()>;

    /// Instance extensions, globally or for one layer
    fn instance_extensions(&self, layer: Option<&str>) -> Result<Vec<String>>;

    /// Instance layers
    fn instance_layers(&self) -> Result<Vec<String>>;

    fn create_instance(&mut self, desc: &InstanceDesc) -> Result<vk::Instance>;

    /// Resolve instance-level functions of the enabled extensions
    fn load_instance_functions(&mut self, enabled_extensions: &ExtensionSet) -> Result<()>;

    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>>;

    fn physical_device_properties(&self, device: vk::PhysicalDevice) -> Result<PhysicalDeviceProperties>;

    fn queue_families(&self, device: vk::PhysicalDevice) -> Result<Vec<QueueFamily>>;

    /// Create the logical device with one queue of `queue_family_index`
    fn create_device(&mut self, physical_device: vk::PhysicalDevice, queue_family_index: u32) -> Result<vk::Device>;

    fn device_queue(&self, family_index: u32, queue_index: u32) -> Result<vk::Queue>;

    fn create_debug_messenger(&mut self, severity: DebugSeverity) -> Result<vk::DebugUtilsMessengerEXT>;

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT);

    fn set_object_name(&self, object_type: vk::ObjectType, handle: u64, name: &CStr) -> Result<()>;

    fn create_surface(&self, display: RawDisplayHandle, window: RawWindowHandle) -> Result<vk::SurfaceKHR>;

    fn destroy_surface(&self, surface: vk::SurfaceKHR);

    fn destroy_device(&mut self);

    fn destroy_instance(&mut self);
}

/// Convert a fixed-size, NUL-terminated name array reported by the driver
pub(crate) fn fixed_name(raw: &[c_char]) -> String {
    let bytes: Vec<u8> = raw.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::InitializationFailed(format!("Interior NUL in '{}'", value)))
}

fn api_version_of(raw: u32) -> ApiVersion {
    ApiVersion::new(
        vk::api_version_major(raw),
        vk::api_version_minor(raw),
        vk::api_version_patch(raw),
    )
}

/// Host implementation backed by the system Vulkan loader through `ash`
#[derive(Default)]
pub struct AshHost {
    entry: Option<ash::Entry>,
    instance: Option<ash::Instance>,
    device: Option<ash::Device>,
    surface_loader: Option<ash::khr::surface::Instance>,
    debug_utils_instance: Option<ash::ext::debug_utils::Instance>,
    debug_utils_device: Option<ash::ext::debug_utils::Device>,
}

impl AshHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self) -> Result<&ash::Entry> {
        self.entry
            .as_ref()
            .ok_or_else(|| Error::LoaderUnavailable("Vulkan entry points not loaded".to_string()))
    }

    fn instance(&self) -> Result<&ash::Instance> {
        self.instance
            .as_ref()
            .ok_or_else(|| Error::InitializationFailed("Vulkan instance not created".to_string()))
    }
}

impl VulkanHost for AshHost {
    fn load_entry_points(&mut self) -> Result<()> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!("backend::vulkan", "Unable to load Vulkan entry points: {}", e);
            Error::LoaderUnavailable(format!("Unable to load Vulkan entry points: {}", e))
        })?;
        self.entry = Some(entry);
        Ok(())
    }

    fn instance_extensions(&self, layer: Option<&str>) -> Result<Vec<String>> {
        let layer_name = layer.map(to_cstring).transpose()?;
        let properties = unsafe {
            self.entry()?
                .enumerate_instance_extension_properties(layer_name.as_deref())
        }
        .map_err(|e| engine_err!("backend::vulkan", "Failed to enumerate instance extensions: {:?}", e))?;

        Ok(properties.iter().map(|p| fixed_name(&p.extension_name)).collect())
    }

    fn instance_layers(&self) -> Result<Vec<String>> {
        let properties = unsafe { self.entry()?.enumerate_instance_layer_properties() }
            .map_err(|e| engine_err!("backend::vulkan", "Failed to enumerate instance layers: {:?}", e))?;

        Ok(properties.iter().map(|p| fixed_name(&p.layer_name)).collect())
    }

    fn create_instance(&mut self, desc: &InstanceDesc) -> Result<vk::Instance> {
        let app_name = to_cstring(&desc.app_name)?;
        let engine_name = to_cstring(&desc.engine_name)?;
        let layers = desc.layers.iter().map(|l| to_cstring(l)).collect::<Result<Vec<_>>>()?;
        let extensions = desc.extensions.iter().map(|e| to_cstring(e)).collect::<Result<Vec<_>>>()?;
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|l| l.as_ptr()).collect();
        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();

        let (major, minor, patch) = desc.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::make_api_version(
                0,
                desc.api_version.major,
                desc.api_version.minor,
                0,
            ));

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        let instance = unsafe { self.entry()?.create_instance(&create_info, None) }.map_err(|e| {
            engine_error!("backend::vulkan", "Unable to create Vulkan instance. error={:?}", e);
            Error::InitializationFailed(format!("Unable to create Vulkan instance. error={:?}", e))
        })?;

        let handle = instance.handle();
        self.instance = Some(instance);
        Ok(handle)
    }

    fn load_instance_functions(&mut self, enabled_extensions: &ExtensionSet) -> Result<()> {
        let entry = self.entry()?;
        let instance = self.instance()?;

        let surface_loader = enabled_extensions
            .contains(SURFACE_EXTENSION)
            .then(|| ash::khr::surface::Instance::new(entry, instance));
        let debug_utils_instance = enabled_extensions
            .contains(DEBUG_UTILS_EXTENSION)
            .then(|| ash::ext::debug_utils::Instance::new(entry, instance));

        self.surface_loader = surface_loader;
        self.debug_utils_instance = debug_utils_instance;
        Ok(())
    }

    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance()?.enumerate_physical_devices() }
            .map_err(|e| engine_err!("backend::vulkan", "Failed to enumerate physical devices: {:?}", e))
    }

    fn physical_device_properties(&self, device: vk::PhysicalDevice) -> Result<PhysicalDeviceProperties> {
        let instance = self.instance()?;
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let api_version = api_version_of(properties.api_version);

        // Driver properties are core in 1.2
        let driver = if api_version.satisfies(ApiVersion::V1_2) {
            let mut driver_properties = vk::PhysicalDeviceDriverProperties::default();
            {
                let mut properties2 = vk::PhysicalDeviceProperties2::default().push_next(&mut driver_properties);
                unsafe { instance.get_physical_device_properties2(device, &mut properties2) };
            }
            Some((
                fixed_name(&driver_properties.driver_name),
                fixed_name(&driver_properties.driver_info),
            ))
        } else {
            None
        };

        Ok(PhysicalDeviceProperties {
            name: fixed_name(&properties.device_name),
            device_type: DeviceType::from_vk(properties.device_type),
            api_version,
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
            driver_version: properties.driver_version,
            driver,
        })
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Result<Vec<QueueFamily>> {
        let families = unsafe { self.instance()?.get_physical_device_queue_family_properties(device) };
        Ok(families
            .iter()
            .map(|family| QueueFamily {
                flags: family.queue_flags,
                queue_count: family.queue_count,
            })
            .collect())
    }

    fn create_device(&mut self, physical_device: vk::PhysicalDevice, queue_family_index: u32) -> Result<vk::Device> {
        let instance = self.instance()?;

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family_index)
            .queue_priorities(&queue_priorities)];
        let device_create_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_create_infos);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .map_err(|e| {
                engine_error!("backend::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        let debug_utils_device = self
            .debug_utils_instance
            .as_ref()
            .map(|_| ash::ext::debug_utils::Device::new(instance, &device));

        let handle = device.handle();
        self.debug_utils_device = debug_utils_device;
        self.device = Some(device);
        Ok(handle)
    }

    fn device_queue(&self, family_index: u32, queue_index: u32) -> Result<vk::Queue> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| Error::InitializationFailed("Logical device not created".to_string()))?;
        Ok(unsafe { device.get_device_queue(family_index, queue_index) })
    }

    fn create_debug_messenger(&mut self, severity: DebugSeverity) -> Result<vk::DebugUtilsMessengerEXT> {
        let debug_utils = self
            .debug_utils_instance
            .as_ref()
            .ok_or_else(|| Error::InitializationFailed("Debug utils functions not loaded".to_string()))?;

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(message_severity_mask(severity))
            .message_type(message_type_mask())
            .pfn_user_callback(Some(debug_utils_callback));

        unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }.map_err(|e| {
            engine_error!("backend::vulkan", "Unable to create Vulkan debug messenger. error={:?}", e);
            Error::InitializationFailed(format!("Unable to create debug messenger: {:?}", e))
        })
    }

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        if let Some(debug_utils) = self.debug_utils_instance.as_ref() {
            unsafe { debug_utils.destroy_debug_utils_messenger(messenger, None) };
        }
    }

    fn set_object_name(&self, object_type: vk::ObjectType, handle: u64, name: &CStr) -> Result<()> {
        let Some(debug_utils) = self.debug_utils_device.as_ref() else {
            engine_debug!("backend::vulkan::DebugUtils", "No device debug utils, skipping name {:?}", name);
            return Ok(());
        };

        let name_info = vk::DebugUtilsObjectNameInfoEXT {
            object_type,
            object_handle: handle,
            p_object_name: name.as_ptr(),
            ..Default::default()
        };

        unsafe { debug_utils.set_debug_utils_object_name(&name_info) }
            .map_err(|e| Error::BackendError(format!("vkSetDebugUtilsObjectNameEXT failed: {:?}", e)))
    }

    fn create_surface(&self, display: RawDisplayHandle, window: RawWindowHandle) -> Result<vk::SurfaceKHR> {
        let entry = self.entry()?;
        let instance = self.instance()?;
        unsafe { ash_window::create_surface(entry, instance, display, window, None) }.map_err(|e| {
            engine_error!("backend::vulkan", "Failed to create surface: {:?}", e);
            Error::BackendError(format!("Failed to create surface: {:?}", e))
        })
    }

    fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        if let Some(surface_loader) = self.surface_loader.as_ref() {
            unsafe { surface_loader.destroy_surface(surface, None) };
        }
    }

    fn destroy_device(&mut self) {
        self.debug_utils_device = None;
        if let Some(device) = self.device.take() {
            unsafe { device.destroy_device(None) };
        }
    }

    fn destroy_instance(&mut self) {
        self.surface_loader = None;
        self.debug_utils_instance = None;
        if let Some(instance) = self.instance.take() {
            unsafe { instance.destroy_instance(None) };
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
