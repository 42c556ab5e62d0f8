use std::sync::Arc;

use vulkano::command_buffer::allocator::{
    StandardCommandBufferAllocator, StandardCommandBufferAllocatorCreateInfo,
};
use vulkano::descriptor_set::allocator::StandardDescriptorSetAllocator;
use vulkano::device::{Device, DeviceCreateInfo, Queue, QueueCreateInfo, QueueFlags};
use vulkano::instance::{Instance, InstanceCreateInfo};
use vulkano::memory::allocator::StandardMemoryAllocator;
use vulkano::VulkanLibrary;

use super::error::RenderError;

pub struct MemAllocators {
    pub memory: Arc<StandardMemoryAllocator>,
    pub command: Arc<StandardCommandBufferAllocator>,
    pub descriptor_set: Arc<StandardDescriptorSetAllocator>,
}

impl MemAllocators {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            memory: Arc::new(StandardMemoryAllocator::new_default(device.clone())),
            command: Arc::new(StandardCommandBufferAllocator::new(
                device.clone(),
                StandardCommandBufferAllocatorCreateInfo::default(),
            )),
            descriptor_set: Arc::new(StandardDescriptorSetAllocator::new(
                device.clone(),
                Default::default(),
            )),
        }
    }
}

/*
    The rendering context: device, queue and allocators, threaded explicitly
    through every call that touches the GPU.
*/
pub struct Vk {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub queue_family_index: u32,
    pub allocators: Arc<MemAllocators>,
}

impl Vk {
    pub fn new() -> Result<Self, RenderError> {
        let library = VulkanLibrary::new()
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;
        let instance = Instance::new(library, InstanceCreateInfo::default())
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;

        let physical_device = instance
            .enumerate_physical_devices()
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?
            .next()
            .ok_or_else(|| RenderError::ContextUnavailable("no devices available".into()))?;

        let queue_family_index = physical_device
            .queue_family_properties()
            .iter()
            .position(|properties| properties.queue_flags.contains(QueueFlags::GRAPHICS))
            .ok_or_else(|| {
                RenderError::ContextUnavailable("no graphical queue family".into())
            })? as u32;

        let (device, mut queues) = Device::new(
            physical_device,
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                ..Default::default()
            },
        )
        .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;

        let queue = queues
            .next()
            .ok_or_else(|| RenderError::ContextUnavailable("device returned no queue".into()))?;

        log::debug!(
            "using device: {}",
            device.physical_device().properties().device_name
        );

        let allocators = MemAllocators::new(device.clone());

        Ok(Self {
            device,
            queue,
            queue_family_index,
            allocators: Arc::new(allocators),
        })
    }
}
