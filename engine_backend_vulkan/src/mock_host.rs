/// MockHost - recording test double for the Vulkan host
///
/// Serves configurable extensions, layers and physical devices, injects a
/// failure at a chosen call, and records every call in order through a
/// shared [`CallLog`] the test keeps after the host moved into a platform.

use ash::vk::{self, Handle};
use std::ffi::CStr;
use std::sync::{Arc, Mutex};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
    WindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use engine_backend::backend::{ApiVersion, DebugSeverity, Engine, Error, Result};
use engine_backend::backend::log::{LogEntry, LogSeverity, Logger};

use crate::device_selector::{DeviceType, QueueFamily};
use crate::extensions::{ExtensionSet, DEBUG_UTILS_EXTENSION, SURFACE_EXTENSION, VALIDATION_FEATURES_EXTENSION, VALIDATION_LAYER};
use crate::host::{InstanceDesc, PhysicalDeviceProperties, VulkanHost};

/// One recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    LoadEntryPoints,
    InstanceExtensions(Option<String>),
    InstanceLayers,
    CreateInstance(InstanceDesc),
    LoadInstanceFunctions(ExtensionSet),
    PhysicalDevices,
    PhysicalDeviceProperties(u64),
    QueueFamilies(u64),
    CreateDevice { physical_device: u64, queue_family_index: u32 },
    DeviceQueue { family_index: u32, queue_index: u32 },
    CreateDebugMessenger(DebugSeverity),
    DestroyDebugMessenger,
    SetObjectName { object_type: vk::ObjectType, handle: u64, name: String },
    CreateSurface,
    DestroySurface,
    DestroyDevice,
    DestroyInstance,
}

/// Host call that fails when injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    LoadEntryPoints,
    InstanceExtensions,
    InstanceLayers,
    CreateInstance,
    PhysicalDevices,
    CreateDevice,
    CreateDebugMessenger,
    SetObjectName,
}

/// Calls recorded by a mock host, shared with the test
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<HostCall>>>);

impl CallLog {
    fn push(&self, call: HostCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn count_matching(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    /// Index of the first call matching `predicate`
    pub fn position(&self, predicate: impl Fn(&HostCall) -> bool) -> Option<usize> {
        self.calls().iter().position(predicate)
    }

    pub fn created_instance(&self) -> Option<InstanceDesc> {
        self.calls().into_iter().find_map(|c| match c {
            HostCall::CreateInstance(desc) => Some(desc),
            _ => None,
        })
    }
}

/// A physical device served by the mock
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub handle: u64,
    pub properties: PhysicalDeviceProperties,
    pub families: Vec<QueueFamily>,
}

impl MockDevice {
    pub fn new(handle: u64, device_type: DeviceType, api_version: ApiVersion, flags: vk::QueueFlags) -> Self {
        Self {
            handle,
            properties: PhysicalDeviceProperties {
                name: format!("Mock Device {}", handle),
                device_type,
                api_version,
                vendor_id: 0x10de,
                device_id: 0x2000 + handle as u32,
                driver_version: 1,
                driver: api_version
                    .satisfies(ApiVersion::V1_2)
                    .then(|| ("mock".to_string(), "mock driver".to_string())),
            },
            families: vec![QueueFamily { flags, queue_count: 1 }],
        }
    }

    pub fn discrete() -> Self {
        Self::new(1, DeviceType::DiscreteGpu, ApiVersion::V1_3, vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
    }
}

pub struct MockHost {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub validation_layer_extensions: Vec<String>,
    pub devices: Vec<MockDevice>,
    pub fail_at: Option<FailPoint>,
    log: CallLog,
}

const INSTANCE_HANDLE: u64 = 0x1000;
const DEVICE_HANDLE: u64 = 0x2000;
const MESSENGER_HANDLE: u64 = 0x3000;
const QUEUE_HANDLE: u64 = 0x4000;
const SURFACE_HANDLE: u64 = 0x5000;

impl Default for MockHost {
    fn default() -> Self {
        Self {
            extensions: vec![
                DEBUG_UTILS_EXTENSION.to_string(),
                SURFACE_EXTENSION.to_string(),
                "VK_KHR_xcb_surface".to_string(),
            ],
            layers: vec![VALIDATION_LAYER.to_string()],
            validation_layer_extensions: vec![VALIDATION_FEATURES_EXTENSION.to_string()],
            devices: vec![MockDevice::discrete()],
            fail_at: None,
            log: CallLog::default(),
        }
    }
}

impl MockHost {
    /// Host with one suitable discrete device, debug utils and validation layer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_layers(mut self, layers: &[&str]) -> Self {
        self.layers = layers.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_devices(mut self, devices: Vec<MockDevice>) -> Self {
        self.devices = devices;
        self
    }

    pub fn failing_at(mut self, fail_point: FailPoint) -> Self {
        self.fail_at = Some(fail_point);
        self
    }

    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    fn check(&self, fail_point: FailPoint) -> Result<()> {
        if self.fail_at == Some(fail_point) {
            return Err(Error::BackendError(format!("injected failure at {:?}", fail_point)));
        }
        Ok(())
    }

    fn device(&self, handle: vk::PhysicalDevice) -> Result<&MockDevice> {
        self.devices
            .iter()
            .find(|d| d.handle == handle.as_raw())
            .ok_or_else(|| Error::BackendError("unknown physical device".to_string()))
    }
}

impl VulkanHost for MockHost {
    fn load_entry_points(&mut self) -> Result<()> {
        self.log.push(HostCall::LoadEntryPoints);
        if self.fail_at == Some(FailPoint::LoadEntryPoints) {
            return Err(Error::LoaderUnavailable("no Vulkan loader".to_string()));
        }
        Ok(())
    }

    fn instance_extensions(&self, layer: Option<&str>) -> Result<Vec<String>> {
        self.log.push(HostCall::InstanceExtensions(layer.map(str::to_string)));
        self.check(FailPoint::InstanceExtensions)?;
        Ok(match layer {
            None => self.extensions.clone(),
            Some(VALIDATION_LAYER) => self.validation_layer_extensions.clone(),
            Some(_) => Vec::new(),
        })
    }

    fn instance_layers(&self) -> Result<Vec<String>> {
        self.log.push(HostCall::InstanceLayers);
        self.check(FailPoint::InstanceLayers)?;
        Ok(self.layers.clone())
    }

    fn create_instance(&mut self, desc: &InstanceDesc) -> Result<vk::Instance> {
        self.log.push(HostCall::CreateInstance(desc.clone()));
        if self.fail_at == Some(FailPoint::CreateInstance) {
            return Err(Error::InitializationFailed("ERROR_INCOMPATIBLE_DRIVER".to_string()));
        }
        Ok(vk::Instance::from_raw(INSTANCE_HANDLE))
    }

    fn load_instance_functions(&mut self, enabled_extensions: &ExtensionSet) -> Result<()> {
        self.log.push(HostCall::LoadInstanceFunctions(enabled_extensions.clone()));
        Ok(())
    }

    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        self.log.push(HostCall::PhysicalDevices);
        self.check(FailPoint::PhysicalDevices)?;
        Ok(self.devices.iter().map(|d| vk::PhysicalDevice::from_raw(d.handle)).collect())
    }

    fn physical_device_properties(&self, device: vk::PhysicalDevice) -> Result<PhysicalDeviceProperties> {
        self.log.push(HostCall::PhysicalDeviceProperties(device.as_raw()));
        Ok(self.device(device)?.properties.clone())
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Result<Vec<QueueFamily>> {
        self.log.push(HostCall::QueueFamilies(device.as_raw()));
        Ok(self.device(device)?.families.clone())
    }

    fn create_device(&mut self, physical_device: vk::PhysicalDevice, queue_family_index: u32) -> Result<vk::Device> {
        self.log.push(HostCall::CreateDevice {
            physical_device: physical_device.as_raw(),
            queue_family_index,
        });
        self.check(FailPoint::CreateDevice)?;
        Ok(vk::Device::from_raw(DEVICE_HANDLE))
    }

    fn device_queue(&self, family_index: u32, queue_index: u32) -> Result<vk::Queue> {
        self.log.push(HostCall::DeviceQueue { family_index, queue_index });
        Ok(vk::Queue::from_raw(QUEUE_HANDLE))
    }

    fn create_debug_messenger(&mut self, severity: DebugSeverity) -> Result<vk::DebugUtilsMessengerEXT> {
        self.log.push(HostCall::CreateDebugMessenger(severity));
        self.check(FailPoint::CreateDebugMessenger)?;
        Ok(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER_HANDLE))
    }

    fn destroy_debug_messenger(&mut self, _messenger: vk::DebugUtilsMessengerEXT) {
        self.log.push(HostCall::DestroyDebugMessenger);
    }

    fn set_object_name(&self, object_type: vk::ObjectType, handle: u64, name: &CStr) -> Result<()> {
        self.log.push(HostCall::SetObjectName {
            object_type,
            handle,
            name: name.to_string_lossy().into_owned(),
        });
        self.check(FailPoint::SetObjectName)
    }

    fn create_surface(&self, _display: RawDisplayHandle, _window: RawWindowHandle) -> Result<vk::SurfaceKHR> {
        self.log.push(HostCall::CreateSurface);
        Ok(vk::SurfaceKHR::from_raw(SURFACE_HANDLE))
    }

    fn destroy_surface(&self, _surface: vk::SurfaceKHR) {
        self.log.push(HostCall::DestroySurface);
    }

    fn destroy_device(&mut self) {
        self.log.push(HostCall::DestroyDevice);
    }

    fn destroy_instance(&mut self) {
        self.log.push(HostCall::DestroyInstance);
    }
}

/// Logger capturing entries for assertions
struct CapturingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Install a capturing logger; callers must be `#[serial]` and reset the logger
pub fn capture_logs() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CapturingLogger { entries: entries.clone() });
    entries
}

/// Captured entries of `severity` whose message contains `needle`
pub fn logged(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity, needle: &str) -> bool {
    entries
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.severity == severity && e.message.contains(needle))
}

/// Native window stand-in exposing Xlib handles
pub struct MockWindow;

impl HasDisplayHandle for MockWindow {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        let raw = RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0));
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}

impl HasWindowHandle for MockWindow {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        let raw = RawWindowHandle::Xlib(XlibWindowHandle::new(1));
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}
