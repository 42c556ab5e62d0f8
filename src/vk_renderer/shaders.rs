/// A set of utility functions for the creation
/// of the render pass, framebuffer and graphics
/// pipeline behind the one sun draw call
pub mod graphics_pipeline {
    use std::sync::Arc;

    use vulkano::descriptor_set::{PersistentDescriptorSet, WriteDescriptorSet};
    use vulkano::format::Format;
    use vulkano::image::view::ImageView;
    use vulkano::image::{Image, ImageCreateInfo, ImageType, ImageUsage};
    use vulkano::memory::allocator::{AllocationCreateInfo, MemoryTypeFilter};
    use vulkano::pipeline::graphics::color_blend::{ColorBlendAttachmentState, ColorBlendState};
    use vulkano::pipeline::graphics::depth_stencil::{DepthState, DepthStencilState};
    use vulkano::pipeline::graphics::input_assembly::InputAssemblyState;
    use vulkano::pipeline::graphics::multisample::MultisampleState;
    use vulkano::pipeline::graphics::rasterization::RasterizationState;
    use vulkano::pipeline::graphics::vertex_input::{
        VertexInputAttributeDescription, VertexInputBindingDescription, VertexInputRate,
        VertexInputState,
    };
    use vulkano::pipeline::graphics::viewport::{Viewport, ViewportState};
    use vulkano::pipeline::graphics::GraphicsPipelineCreateInfo;
    use vulkano::pipeline::layout::PipelineDescriptorSetLayoutCreateInfo;
    use vulkano::pipeline::{
        GraphicsPipeline, Pipeline, PipelineLayout, PipelineShaderStageCreateInfo,
    };
    use vulkano::render_pass::{Framebuffer, FramebufferCreateInfo, RenderPass, Subpass};
    use vulkano::shader::ShaderModule;

    use crate::vk_renderer::buffer::AttributeBinding;
    use crate::vk_renderer::error::RenderError;
    use crate::vk_renderer::Vk;

    pub const COLOR_FORMAT: Format = Format::R8G8B8A8_UNORM;
    pub const DEPTH_FORMAT: Format = Format::D16_UNORM;

    pub fn render_pass(vk: Arc<Vk>) -> Result<Arc<RenderPass>, RenderError> {
        vulkano::single_pass_renderpass!(
            vk.device.clone(),
            attachments: {
                color: {
                    format: COLOR_FORMAT,
                    samples: 1,
                    load_op: Clear,
                    store_op: Store,
                },
                depth: {
                    format: DEPTH_FORMAT,
                    samples: 1,
                    load_op: Clear,
                    store_op: DontCare,
                },
            },
            pass: {
                color: [color],
                depth_stencil: {depth},
            },
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))
    }

    /// Offscreen color + depth framebuffer. The color image is returned as
    /// well so the caller can copy it out after the draw.
    pub fn framebuffer(
        vk: Arc<Vk>,
        rp: Arc<RenderPass>,
        extent: u32,
    ) -> Result<(Arc<Framebuffer>, Arc<Image>), RenderError> {
        let color = Image::new(
            vk.allocators.memory.clone(),
            ImageCreateInfo {
                image_type: ImageType::Dim2d,
                format: COLOR_FORMAT,
                extent: [extent, extent, 1],
                usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_SRC,
                ..Default::default()
            },
            AllocationCreateInfo {
                memory_type_filter: MemoryTypeFilter::PREFER_DEVICE,
                ..Default::default()
            },
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        let depth = Image::new(
            vk.allocators.memory.clone(),
            ImageCreateInfo {
                image_type: ImageType::Dim2d,
                format: DEPTH_FORMAT,
                extent: [extent, extent, 1],
                usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
                ..Default::default()
            },
            AllocationCreateInfo {
                memory_type_filter: MemoryTypeFilter::PREFER_DEVICE,
                ..Default::default()
            },
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        let color_view = ImageView::new_default(color.clone())
            .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;
        let depth_view = ImageView::new_default(depth)
            .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        let framebuffer = Framebuffer::new(
            rp,
            FramebufferCreateInfo {
                attachments: vec![color_view, depth_view],
                ..Default::default()
            },
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        Ok((framebuffer, color))
    }

    /// Vertex input follows the uploaded attribute bindings: one buffer
    /// binding per attribute, tightly packed at offset 0, read at the
    /// location the shader reflected for that name.
    pub fn graphics_pipeline(
        vk: Arc<Vk>,
        vs: Arc<ShaderModule>,
        fs: Arc<ShaderModule>,
        attributes: &[AttributeBinding],
        rp: Arc<RenderPass>,
        vp: Viewport,
    ) -> Result<Arc<GraphicsPipeline>, RenderError> {
        let vs_entry = vs
            .entry_point("main")
            .ok_or_else(|| RenderError::ShaderInitFailure("vertex entry point missing".into()))?;
        let fs_entry = fs
            .entry_point("main")
            .ok_or_else(|| RenderError::ShaderInitFailure("fragment entry point missing".into()))?;

        let mut vertex_input_state = VertexInputState::new();
        for (binding, attribute) in attributes.iter().enumerate() {
            vertex_input_state = vertex_input_state
                .binding(
                    binding as u32,
                    VertexInputBindingDescription {
                        stride: attribute.components * std::mem::size_of::<f32>() as u32,
                        input_rate: VertexInputRate::Vertex,
                    },
                )
                .attribute(
                    attribute.location,
                    VertexInputAttributeDescription {
                        binding: binding as u32,
                        format: attribute.format,
                        offset: 0,
                    },
                );
        }

        let stages = [
            PipelineShaderStageCreateInfo::new(vs_entry),
            PipelineShaderStageCreateInfo::new(fs_entry),
        ];

        let layout = PipelineLayout::new(
            vk.device.clone(),
            PipelineDescriptorSetLayoutCreateInfo::from_stages(&stages)
                .into_pipeline_layout_create_info(vk.device.clone())
                .map_err(|e| RenderError::ShaderInitFailure(e.to_string()))?,
        )
        .map_err(|e| RenderError::ShaderInitFailure(e.to_string()))?;

        let subpass = Subpass::from(rp, 0)
            .ok_or_else(|| RenderError::ShaderInitFailure("render pass has no subpass".into()))?;

        GraphicsPipeline::new(
            vk.device.clone(),
            None,
            GraphicsPipelineCreateInfo {
                stages: stages.into_iter().collect(),

                vertex_input_state: Some(vertex_input_state),

                input_assembly_state: Some(InputAssemblyState::default()),

                viewport_state: Some(ViewportState {
                    viewports: [vp].into_iter().collect(),
                    ..Default::default()
                }),

                rasterization_state: Some(RasterizationState::default()),
                multisample_state: Some(MultisampleState::default()),
                depth_stencil_state: Some(DepthStencilState {
                    depth: Some(DepthState::simple()),
                    ..Default::default()
                }),
                color_blend_state: Some(ColorBlendState::with_attachment_states(
                    subpass.num_color_attachments(),
                    ColorBlendAttachmentState::default(),
                )),

                subpass: Some(subpass.into()),
                ..GraphicsPipelineCreateInfo::layout(layout)
            },
        )
        .map_err(|e| RenderError::ShaderInitFailure(e.to_string()))
    }

    pub fn descriptor_set(
        vk: Arc<Vk>,
        pipeline: Arc<GraphicsPipeline>,
        writes: impl IntoIterator<Item = WriteDescriptorSet>,
    ) -> Result<Arc<PersistentDescriptorSet>, RenderError> {
        let layout = pipeline
            .layout()
            .set_layouts()
            .first()
            .ok_or_else(|| {
                RenderError::ShaderInitFailure("pipeline has no descriptor set layout".into())
            })?
            .clone();

        PersistentDescriptorSet::new(&vk.allocators.descriptor_set, layout, writes, [])
            .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))
    }
}

pub mod sun_vertex_shader {
    vulkano_shaders::shader! {
        ty: "vertex",
        src: r"
            #version 460

            layout(location = 0) in vec3 position;
            layout(location = 1) in vec3 normal;

            layout(set = 0, binding = 0) uniform SunUniforms {
                mat4 model;
                mat4 mvp;
                mat4 normal_matrix;
                vec3 light_color;
                vec3 light_position;
                vec3 ambient_light;
            } u;

            layout(location = 0) out vec3 v_normal;
            layout(location = 1) out vec3 v_position;

            void main() {
                gl_Position = u.mvp * vec4(position, 1.0);
                v_position = vec3(u.model * vec4(position, 1.0));
                v_normal = normalize(mat3(u.normal_matrix) * normal);
            }
        ",
    }
}

pub mod sun_fragment_shader {
    vulkano_shaders::shader! {
        ty: "fragment",
        src: r"
            #version 460

            layout(location = 0) in vec3 v_normal;
            layout(location = 1) in vec3 v_position;

            layout(set = 0, binding = 0) uniform SunUniforms {
                mat4 model;
                mat4 mvp;
                mat4 normal_matrix;
                vec3 light_color;
                vec3 light_position;
                vec3 ambient_light;
            } u;

            layout(location = 0) out vec4 f_color;

            void main() {
                vec3 base_color = vec3(1.0, 0.85, 0.2);

                vec3 n = normalize(v_normal);
                vec3 light_direction = normalize(u.light_position - v_position);
                float n_dot_l = max(dot(light_direction, n), 0.0);

                vec3 diffuse = u.light_color * base_color * n_dot_l;
                vec3 ambient = u.ambient_light * base_color;

                f_color = vec4(diffuse + ambient, 1.0);
            }
        ",
    }
}
