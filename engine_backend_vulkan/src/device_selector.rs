/// Physical device selection
///
/// Every enumerated device becomes a [`PhysicalDeviceDescriptor`]. Devices
/// failing the minimum API version or the queue capability check keep an
/// explicit [`Suitability`] marker so the rejection reason can be reported.
/// Survivors are ranked by device type; the first-enumerated device wins
/// among equally ranked ones.

use ash::vk;
use std::cmp::Reverse;
use std::fmt;
use engine_backend::backend::{ApiVersion, QueueCapability};

/// Device type classification reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    DiscreteGpu,
    IntegratedGpu,
    Cpu,
    VirtualGpu,
    Other,
}

impl DeviceType {
    pub fn from_vk(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => DeviceType::DiscreteGpu,
            vk::PhysicalDeviceType::INTEGRATED_GPU => DeviceType::IntegratedGpu,
            vk::PhysicalDeviceType::CPU => DeviceType::Cpu,
            vk::PhysicalDeviceType::VIRTUAL_GPU => DeviceType::VirtualGpu,
            _ => DeviceType::Other,
        }
    }

    /// Preference rank: discrete > integrated > cpu > virtual > other
    pub fn preference_rank(self) -> u8 {
        match self {
            DeviceType::DiscreteGpu => 4,
            DeviceType::IntegratedGpu => 3,
            DeviceType::Cpu => 2,
            DeviceType::VirtualGpu => 1,
            DeviceType::Other => 0,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::DiscreteGpu => "discrete GPU",
            DeviceType::IntegratedGpu => "integrated GPU",
            DeviceType::Cpu => "CPU",
            DeviceType::VirtualGpu => "virtual GPU",
            DeviceType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Queue family as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
}

/// Queue flags matching a capability requirement
pub fn queue_flags(capability: QueueCapability) -> vk::QueueFlags {
    match capability {
        QueueCapability::Graphics => vk::QueueFlags::GRAPHICS,
        QueueCapability::Compute => vk::QueueFlags::COMPUTE,
        QueueCapability::Transfer => vk::QueueFlags::TRANSFER,
    }
}

/// Index of the first family with queues supporting `capability`
pub fn find_queue_family(families: &[QueueFamily], capability: QueueCapability) -> Option<u32> {
    let flags = queue_flags(capability);
    families
        .iter()
        .position(|family| family.queue_count != 0 && family.flags.intersects(flags))
        .map(|index| index as u32)
}

/// Why a candidate was kept or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suitability {
    Suitable,
    ApiVersionTooLow { found: ApiVersion, required: ApiVersion },
    MissingQueueCapability(QueueCapability),
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suitability::Suitable => write!(f, "suitable"),
            Suitability::ApiVersionTooLow { found, required } => {
                write!(f, "API version {} below required {}", found, required)
            }
            Suitability::MissingQueueCapability(capability) => {
                write!(f, "no queue family with {:?} capability", capability)
            }
        }
    }
}

/// A candidate device, computed during selection only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceDescriptor {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub device_type: DeviceType,
    pub api_version: ApiVersion,
    /// Family satisfying the required capability, if any
    pub queue_family_index: Option<u32>,
    pub suitability: Suitability,
}

impl PhysicalDeviceDescriptor {
    /// Classify a device against the minimum requirements
    pub fn evaluate(
        handle: vk::PhysicalDevice,
        name: String,
        device_type: DeviceType,
        api_version: ApiVersion,
        families: &[QueueFamily],
        min_api_version: ApiVersion,
        capability: QueueCapability,
    ) -> Self {
        let queue_family_index = find_queue_family(families, capability);
        let suitability = if !api_version.satisfies(min_api_version) {
            Suitability::ApiVersionTooLow { found: api_version, required: min_api_version }
        } else if queue_family_index.is_none() {
            Suitability::MissingQueueCapability(capability)
        } else {
            Suitability::Suitable
        };

        Self {
            handle,
            name,
            device_type,
            api_version,
            queue_family_index,
            suitability,
        }
    }

    pub fn is_suitable(&self) -> bool {
        self.suitability == Suitability::Suitable
    }
}

/// Best suitable candidate, or `None` when every device was rejected
pub fn select_physical_device(candidates: &[PhysicalDeviceDescriptor]) -> Option<&PhysicalDeviceDescriptor> {
    // min_by_key keeps the first of equal keys
    candidates
        .iter()
        .filter(|candidate| candidate.is_suitable())
        .min_by_key(|candidate| Reverse(candidate.device_type.preference_rank()))
}

#[cfg(test)]
#[path = "device_selector_tests.rs"]
mod tests;
