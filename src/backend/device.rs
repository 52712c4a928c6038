// Logical device - queues for rendering and presentation
//
// Responsibilities:
// - One queue request per distinct family (graphics / present)
// - Required extensions + BC texture compression + dynamic rendering
// - Queue handle lookup, shared when both roles use one family

use super::adapter::{AdapterSelection, QueueFamilyIndices};
use super::error::{native, BackendResult};
use ash::vk;

/// Device features enabled on every logical device we create
const REQUIRED_DEVICE_FEATURES: vk::PhysicalDeviceFeatures = vk::PhysicalDeviceFeatures {
    texture_compression_bc: vk::TRUE,
    ..unsafe { std::mem::zeroed() }
};

pub const DEFAULT_QUEUE_PRIORITY: f32 = 1.0;

pub struct LogicalDevice {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: QueueFamilyIndices,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
}

impl LogicalDevice {
    pub fn new(
        instance: &ash::Instance,
        selection: &AdapterSelection,
        priority: f32,
    ) -> BackendResult<Self> {
        let queue_families = selection.queue_families;
        let priorities = [priority];
        let queue_infos = queue_create_infos(&queue_families, &priorities);

        let extensions = selection.extension_name_ptrs();
        let mut dynamic_rendering = vk::PhysicalDeviceDynamicRenderingFeatures::builder().dynamic_rendering(true);

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&REQUIRED_DEVICE_FEATURES)
            .push_next(&mut dynamic_rendering);

        log::info!(
            "Creating logical device on \"{}\" with {} queue famil{}",
            selection.name,
            queue_infos.len(),
            if queue_infos.len() == 1 { "y" } else { "ies" }
        );

        let device = unsafe { instance.create_device(selection.physical_device, &create_info, None) }
            .map_err(native("vkCreateDevice"))?;

        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        let present_queue = if queue_families.is_shared() {
            graphics_queue
        } else {
            unsafe { device.get_device_queue(queue_families.present, 0) }
        };

        Ok(Self {
            device,
            physical_device: selection.physical_device,
            queue_families,
            graphics_queue,
            present_queue,
        })
    }

    /// Wait for device to be idle (e.g., before swapchain rebuild or cleanup)
    pub fn wait_idle(&self) -> BackendResult<()> {
        unsafe { self.device.device_wait_idle() }.map_err(native("vkDeviceWaitIdle"))
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        log::info!("Destroying logical device...");
        let _ = self.wait_idle();
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

/// One single-queue request per distinct family index.
///
/// The returned entries point into `priorities`, which must outlive them.
pub fn queue_create_infos(indices: &QueueFamilyIndices, priorities: &[f32]) -> Vec<vk::DeviceQueueCreateInfo> {
    indices
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(family)
                .queue_priorities(priorities)
                .build()
        })
        .collect()
}
