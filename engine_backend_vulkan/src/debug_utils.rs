/// DebugUtils - Vulkan diagnostics sink
///
/// Installs the debug messenger when the debug-utils extension was enabled
/// and forwards driver messages to the engine logger: error severity goes to
/// ERROR, everything else to WARN. Also tags native objects with readable
/// names. When the extension is unavailable every operation is a no-op.
///
/// The sink is owned by the [`VulkanDriver`](crate::VulkanDriver) and reached
/// through `driver.debug_utils()`. It is destroyed before the platform
/// destroys the instance.

use ash::vk;
use std::ffi::{c_void, CStr, CString};
use std::sync::{Arc, Mutex, Weak};
use engine_backend::backend::{DebugSeverity, Result};
use engine_backend::{engine_debug, engine_error, engine_info, engine_warn};

use crate::host::{AshHost, VulkanHost};
use crate::vulkan_context::VulkanContext;
use crate::vulkan_platform::{lock_shared, PlatformShared};

const SOURCE: &str = "backend::vulkan::DebugUtils";

/// Messenger severity mask for a configured severity
pub(crate) fn message_severity_mask(severity: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    use vk::DebugUtilsMessageSeverityFlagsEXT as S;
    match severity {
        DebugSeverity::ErrorsOnly => S::ERROR,
        DebugSeverity::ErrorsAndWarnings => S::ERROR | S::WARNING,
        DebugSeverity::All => S::ERROR | S::WARNING | S::INFO | S::VERBOSE,
    }
}

/// Message types the messenger listens to
pub(crate) fn message_type_mask() -> vk::DebugUtilsMessageTypeFlagsEXT {
    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
}

fn message_type_label(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "performance"
    } else {
        "general"
    }
}

/// Forward one driver message to the engine logger
pub(crate) fn route_message(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    message_id: &str,
    message: &str,
) {
    let kind = message_type_label(message_type);
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        engine_error!(SOURCE, "VULKAN ERROR [{}]: ({}) {}", kind, message_id, message);
    } else {
        engine_warn!(SOURCE, "VULKAN [{}]: ({}) {}", kind, message_id, message);
    }
}

unsafe fn callback_str<'a>(ptr: *const std::ffi::c_char, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed(fallback)
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// Debug messenger callback installed on the instance
pub(crate) unsafe extern "system" fn debug_utils_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = &*p_callback_data;
    let message_id = callback_str(callback_data.p_message_id_name, "unknown");
    let message = callback_str(callback_data.p_message, "no message");

    route_message(message_severity, message_type, &message_id, &message);

    vk::FALSE
}

/// Diagnostics sink owned by the driver
pub struct DebugUtils<H: VulkanHost = AshHost> {
    platform: Weak<Mutex<PlatformShared<H>>>,
    context: VulkanContext,
    messenger: Option<vk::DebugUtilsMessengerEXT>,
    destroyed: bool,
}

impl<H: VulkanHost> DebugUtils<H> {
    /// Install the messenger when the context reports debug-utils support
    pub(crate) fn new(
        platform: &Arc<Mutex<PlatformShared<H>>>,
        context: VulkanContext,
        severity: DebugSeverity,
    ) -> Result<Self> {
        let messenger = if context.is_debug_utils_supported() {
            let messenger = lock_shared(platform).host.create_debug_messenger(severity)?;
            engine_info!(SOURCE, "Debug messenger installed (severity: {:?})", severity);
            Some(messenger)
        } else {
            engine_debug!(SOURCE, "Debug utils unsupported, diagnostics sink disabled");
            None
        };

        Ok(Self {
            platform: Arc::downgrade(platform),
            context,
            messenger,
            destroyed: false,
        })
    }

    /// True when driver messages are forwarded and names are applied
    pub fn is_enabled(&self) -> bool {
        !self.destroyed && self.context.is_debug_utils_supported()
    }

    /// Tag a native object with a readable name
    ///
    /// No-op when the sink is disabled. Naming failures are logged, never fatal.
    ///
    /// # Panics
    ///
    /// Panics when called after the sink was torn down.
    pub fn set_name<T: vk::Handle>(&self, object: T, name: &str) {
        assert!(!self.destroyed, "DebugUtils::set_name called after teardown");

        if !self.context.is_debug_utils_supported() {
            return;
        }

        let Ok(c_name) = CString::new(name) else {
            engine_warn!(SOURCE, "Object name '{}' contains a NUL byte, skipped", name);
            return;
        };

        let Some(platform) = self.platform.upgrade() else {
            panic!("DebugUtils used after its platform was destroyed");
        };

        let result = lock_shared(&platform)
            .host
            .set_object_name(T::TYPE, object.as_raw(), &c_name);
        if let Err(e) = result {
            engine_warn!(SOURCE, "Failed to name {:?} '{}': {}", T::TYPE, name, e);
        }
    }

    /// Uninstall the messenger; the sink is unusable afterwards
    pub(crate) fn destroy(&mut self) {
        if let Some(messenger) = self.messenger.take() {
            if let Some(platform) = self.platform.upgrade() {
                lock_shared(&platform).host.destroy_debug_messenger(messenger);
                engine_debug!(SOURCE, "Debug messenger destroyed");
            }
        }
        self.destroyed = true;
    }
}

#[cfg(test)]
#[path = "debug_utils_tests.rs"]
mod tests;
