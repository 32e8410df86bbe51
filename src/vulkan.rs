//! Glue between the selection and `ash`.

use crate::{
    CapabilityMask, DeviceProperties, DeviceSource, FamilyCreateRecord, PhysicalDeviceError,
    QueueFamilyProperties, Selection, SurfaceSupport,
};
use ash::{khr, vk};
use std::collections::BTreeSet;

/// [`DeviceSource`] backed by a live Vulkan instance.
///
/// `surface_instance` is only needed when some queue request names a surface.
pub struct AshDeviceSource<'a> {
    instance: &'a ash::Instance,
    surface_instance: Option<&'a khr::surface::Instance>,
}

impl<'a> AshDeviceSource<'a> {
    pub fn new(
        instance: &'a ash::Instance,
        surface_instance: Option<&'a khr::surface::Instance>,
    ) -> Self {
        Self {
            instance,
            surface_instance,
        }
    }

    fn surface_instance(&self) -> crate::Result<&'a khr::surface::Instance> {
        self.surface_instance
            .ok_or_else(|| PhysicalDeviceError::SurfaceExtensionNotLoaded.into())
    }
}

impl DeviceSource for AshDeviceSource<'_> {
    type Device = vk::PhysicalDevice;
    type Surface = vk::SurfaceKHR;

    fn enumerate_devices(&self) -> crate::Result<Vec<vk::PhysicalDevice>> {
        Ok(unsafe { self.instance.enumerate_physical_devices() }?)
    }

    fn device_properties(&self, device: vk::PhysicalDevice) -> crate::Result<DeviceProperties> {
        let properties = unsafe { self.instance.get_physical_device_properties(device) };
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DeviceProperties {
            name,
            device_type: properties.device_type.into(),
            api_version: properties.api_version.into(),
        })
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> crate::Result<BTreeSet<String>> {
        let extensions = unsafe { self.instance.enumerate_device_extension_properties(device) }?;

        Ok(extensions
            .iter()
            .filter_map(|ext| ext.extension_name_as_c_str().ok())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn queue_families(
        &self,
        device: vk::PhysicalDevice,
    ) -> crate::Result<Vec<QueueFamilyProperties>> {
        let families =
            unsafe { self.instance.get_physical_device_queue_family_properties(device) };

        Ok(families
            .iter()
            .map(|family| QueueFamilyProperties {
                capabilities: CapabilityMask::from(family.queue_flags),
                max_queue_count: family.queue_count,
            })
            .collect())
    }

    fn supports_presentation(
        &self,
        device: vk::PhysicalDevice,
        family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> crate::Result<bool> {
        let surface_instance = self.surface_instance()?;

        Ok(unsafe {
            surface_instance.get_physical_device_surface_support(device, family_index, surface)
        }?)
    }

    fn surface_support(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> crate::Result<SurfaceSupport> {
        let surface_instance = self.surface_instance()?;

        let formats =
            unsafe { surface_instance.get_physical_device_surface_formats(device, surface) }?;
        let present_modes = unsafe {
            surface_instance.get_physical_device_surface_present_modes(device, surface)
        }?;

        Ok(SurfaceSupport {
            format_count: formats.len(),
            present_mode_count: present_modes.len(),
        })
    }
}

/// One `VkDeviceQueueCreateInfo` per record, borrowing the record's priorities.
pub fn queue_create_infos<'a>(
    records: impl IntoIterator<Item = &'a FamilyCreateRecord>,
) -> Vec<vk::DeviceQueueCreateInfo<'a>> {
    records
        .into_iter()
        .map(|record| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(record.family_index)
                .queue_priorities(&record.priorities)
        })
        .collect()
}

impl<S> Selection<vk::PhysicalDevice, S> {
    /// Create infos for every family the selection uses.
    pub fn queue_create_infos(&self) -> Vec<vk::DeviceQueueCreateInfo<'_>> {
        queue_create_infos(self.family_records.values())
    }

    /// Fetches the `unit`-th queue of request `request` from `device`.
    ///
    /// # Safety
    ///
    /// `device` must have been created from this selection's physical device
    /// with [`queue_create_infos`](Self::queue_create_infos).
    pub unsafe fn queue(
        &self,
        device: &ash::Device,
        request: usize,
        unit: usize,
    ) -> Option<vk::Queue> {
        let location = self.queue_location(request, unit)?;
        Some(unsafe { device.get_device_queue(location.family_index, location.slot_index) })
    }
}
