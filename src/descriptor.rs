//! Read-only snapshots of candidate devices and the source they are collected from.
//!
//! A [`DeviceSource`] answers the raw queries (devices, properties, extensions,
//! queue families, presentation). [`collect_descriptors`] asks every question
//! once up front and freezes the answers into [`DeviceDescriptor`]s, so the
//! selection that follows never observes a device changing underneath it.

use crate::{CapabilityMask, PhysicalDeviceError, QueueRequest, Version};
use ash::vk;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

#[repr(u8)]
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DeviceType {
    #[default]
    Other = 0,
    Integrated = 1,
    Discrete = 2,
    VirtualGpu = 3,
    Cpu = 4,
}

impl From<vk::PhysicalDeviceType> for DeviceType {
    fn from(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::INTEGRATED_GPU => DeviceType::Integrated,
            vk::PhysicalDeviceType::DISCRETE_GPU => DeviceType::Discrete,
            vk::PhysicalDeviceType::VIRTUAL_GPU => DeviceType::VirtualGpu,
            vk::PhysicalDeviceType::CPU => DeviceType::Cpu,
            _ => DeviceType::Other,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
    pub name: String,
    pub device_type: DeviceType,
    pub api_version: Version,
}

/// Raw queue family facts as reported by the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyProperties {
    pub capabilities: CapabilityMask,
    pub max_queue_count: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueFamilyDescriptor {
    pub index: u32,
    pub capabilities: CapabilityMask,
    pub max_queue_count: u32,
    /// Indices of queue requests whose surface this family can present to.
    pub presentation_support: BTreeSet<usize>,
}

impl QueueFamilyDescriptor {
    pub fn new(index: u32, capabilities: CapabilityMask, max_queue_count: u32) -> Self {
        Self {
            index,
            capabilities,
            max_queue_count,
            presentation_support: BTreeSet::new(),
        }
    }

    /// Marks the family as able to present to the surface of request `request`.
    pub fn presents_for(mut self, request: usize) -> Self {
        self.presentation_support.insert(request);
        self
    }
}

/// How much of a surface a device can drive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSupport {
    pub format_count: usize,
    pub present_mode_count: usize,
}

impl SurfaceSupport {
    pub fn is_usable(&self) -> bool {
        self.format_count > 0 && self.present_mode_count > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor<H = vk::PhysicalDevice> {
    pub handle: H,
    pub properties: DeviceProperties,
    pub supported_extensions: BTreeSet<String>,
    /// Required extensions this device was found to support. Filled in by the
    /// extension check of the run that owns this snapshot.
    pub enabled_extensions: BTreeSet<String>,
    pub families: Vec<QueueFamilyDescriptor>,
    /// Keyed by index of a queue request that names a surface.
    pub surface_support: BTreeMap<usize, SurfaceSupport>,
}

impl<H> DeviceDescriptor<H> {
    pub fn new(handle: H, properties: DeviceProperties) -> Self {
        Self {
            handle,
            properties,
            supported_extensions: BTreeSet::new(),
            enabled_extensions: BTreeSet::new(),
            families: Vec::new(),
            surface_support: BTreeMap::new(),
        }
    }

    pub fn with_family(mut self, family: QueueFamilyDescriptor) -> Self {
        self.families.push(family);
        self
    }

    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.supported_extensions.insert(name.into());
        self
    }

    pub fn with_surface_support(mut self, request: usize, support: SurfaceSupport) -> Self {
        self.surface_support.insert(request, support);
        self
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn family(&self, index: u32) -> Option<&QueueFamilyDescriptor> {
        self.families.iter().find(|family| family.index == index)
    }
}

/// Raw device queries the selection is built on.
///
/// Every call is expected to be a cheap blocking read. Errors abort the whole
/// collection; they are not treated as a per-device rejection.
pub trait DeviceSource {
    type Device: Copy + Debug;
    type Surface: Copy + Debug;

    fn enumerate_devices(&self) -> crate::Result<Vec<Self::Device>>;

    fn device_properties(&self, device: Self::Device) -> crate::Result<DeviceProperties>;

    fn device_extensions(&self, device: Self::Device) -> crate::Result<BTreeSet<String>>;

    fn queue_families(&self, device: Self::Device) -> crate::Result<Vec<QueueFamilyProperties>>;

    fn supports_presentation(
        &self,
        device: Self::Device,
        family_index: u32,
        surface: Self::Surface,
    ) -> crate::Result<bool>;

    fn surface_support(
        &self,
        device: Self::Device,
        surface: Self::Surface,
    ) -> crate::Result<SurfaceSupport>;
}

/// Snapshots every device `source` reports, with presentation support resolved
/// against the surfaces named in `requests`.
#[cfg_attr(feature = "enable_tracing", tracing::instrument(skip_all))]
pub fn collect_descriptors<D: DeviceSource>(
    source: &D,
    requests: &[QueueRequest<D::Surface>],
) -> crate::Result<Vec<DeviceDescriptor<D::Device>>> {
    let devices = source
        .enumerate_devices()
        .map_err(|_| PhysicalDeviceError::FailedToEnumeratePhysicalDevices)?;

    if devices.is_empty() {
        return Err(PhysicalDeviceError::NoPhysicalDevicesFound.into());
    }

    devices
        .into_iter()
        .map(|device| collect_descriptor(source, device, requests))
        .collect()
}

fn collect_descriptor<D: DeviceSource>(
    source: &D,
    device: D::Device,
    requests: &[QueueRequest<D::Surface>],
) -> crate::Result<DeviceDescriptor<D::Device>> {
    let mut descriptor = DeviceDescriptor::new(device, source.device_properties(device)?);
    descriptor.supported_extensions = source.device_extensions(device)?;

    for (index, properties) in source.queue_families(device)?.into_iter().enumerate() {
        let index = index as u32;
        let mut family =
            QueueFamilyDescriptor::new(index, properties.capabilities, properties.max_queue_count);

        for (request_index, request) in requests.iter().enumerate() {
            if let Some(surface) = request.surface {
                if source.supports_presentation(device, index, surface)? {
                    family.presentation_support.insert(request_index);
                }
            }
        }

        descriptor.families.push(family);
    }

    for (request_index, request) in requests.iter().enumerate() {
        if let Some(surface) = request.surface {
            let support = source.surface_support(device, surface)?;
            descriptor.surface_support.insert(request_index, support);
        }
    }

    #[cfg(feature = "enable_tracing")]
    tracing::trace!(
        name = descriptor.name(),
        families = descriptor.families.len(),
        extensions = descriptor.supported_extensions.len(),
        "Collected device"
    );

    Ok(descriptor)
}
