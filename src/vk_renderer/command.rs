use std::sync::Arc;

use vulkano::{
    command_buffer::{
        allocator::StandardCommandBufferAllocator, AutoCommandBufferBuilder,
        CommandBufferExecFuture, CommandBufferUsage, PrimaryAutoCommandBuffer,
    },
    sync::{
        self,
        future::{FenceSignalFuture, NowFuture},
        GpuFuture,
    },
};

use super::error::RenderError;
use super::Vk;

pub type BuilderType = AutoCommandBufferBuilder<
    PrimaryAutoCommandBuffer<Arc<StandardCommandBufferAllocator>>,
    Arc<StandardCommandBufferAllocator>,
>;
pub type CommandBufferType = Arc<PrimaryAutoCommandBuffer<Arc<StandardCommandBufferAllocator>>>;

pub struct VkBuilder(pub BuilderType);

impl VkBuilder {
    /// Command buffer builder made only for submitting once
    pub fn new_once(vk: Arc<Vk>) -> Result<Self, RenderError> {
        let builder = AutoCommandBufferBuilder::primary(
            &vk.allocators.command.clone(),
            vk.queue_family_index,
            CommandBufferUsage::OneTimeSubmit,
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        Ok(Self(builder))
    }

    pub fn command_buffer(self) -> Result<CommandBufferType, RenderError> {
        self.0
            .build()
            .map_err(|e| RenderError::SubmitFailure(e.to_string()))
    }
}

pub fn submit_cmd_buf(
    vk: Arc<Vk>,
    cmd_buf: CommandBufferType,
) -> Result<FenceSignalFuture<CommandBufferExecFuture<NowFuture>>, RenderError> {
    sync::now(vk.device.clone())
        .then_execute(vk.queue.clone(), cmd_buf)
        .map_err(|e| RenderError::SubmitFailure(e.to_string()))?
        .then_signal_fence_and_flush()
        .map_err(|e| RenderError::SubmitFailure(e.to_string()))
}
