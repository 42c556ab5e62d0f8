use std::sync::Arc;

use vulkano::pipeline::graphics::viewport::Viewport;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::render_pass::RenderPass;
use vulkano::shader::ShaderModule;

use super::buffer::AttributeBinding;
use super::error::RenderError;
use super::shaders::graphics_pipeline;
use super::Vk;

#[derive(Clone)]
pub struct VkGraphicsPipeline {
    pub graphics_pipeline: Arc<GraphicsPipeline>,
    pub render_pass: Arc<RenderPass>,
    pub viewport: Viewport,
}

impl VkGraphicsPipeline {
    /// Build the one graphics pipeline of the scene. The order of
    /// `attributes` fixes the vertex buffer binding order for the draw.
    pub fn new(
        vk: Arc<Vk>,
        vs: Arc<ShaderModule>,
        fs: Arc<ShaderModule>,
        attributes: &[AttributeBinding],
        extent: [f32; 2],
    ) -> Result<Self, RenderError> {
        let viewport = Viewport {
            offset: [0.0, 0.0],
            extent,
            depth_range: 0.0..=1.0,
        };

        let render_pass = graphics_pipeline::render_pass(vk.clone())?;

        let graphics_pipeline = graphics_pipeline::graphics_pipeline(
            vk,
            vs,
            fs,
            attributes,
            render_pass.clone(),
            viewport.clone(),
        )?;

        Ok(Self {
            graphics_pipeline,
            render_pass,
            viewport,
        })
    }
}
