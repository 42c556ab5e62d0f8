use std::sync::Arc;

use glam::{vec3, Mat4, Vec3};
use image::RgbaImage;
use vulkano::buffer::{BufferContents, IndexBuffer};
use vulkano::command_buffer::{
    CopyImageToBufferInfo, RenderPassBeginInfo, SubpassBeginInfo, SubpassContents,
};
use vulkano::descriptor_set::WriteDescriptorSet;
use vulkano::pipeline::{Pipeline, PipelineBindPoint};

use super::buffer::{
    readback_buffer, upload_attribute, upload_indices, AttributeBinding, AttributeSlots,
    IndexBinding, VkBuffer,
};
use super::command::{submit_cmd_buf, VkBuilder};
use super::error::RenderError;
use super::geometry::fundamental::sphere;
use super::pipeline::VkGraphicsPipeline;
use super::shaders::{graphics_pipeline, sun_fragment_shader, sun_vertex_shader};
use super::Vk;

/// Increase to make the sphere more smooth
pub const SPHERE_DIV: u32 = 13;

/// Side length of the square offscreen frame, in pixels.
pub const FRAME_EXTENT: u32 = 800;

type Mat = [[f32; 4]; 4];

/// Uniform block shared by both shader stages. Field order and the vec3
/// padding must match the std140 layout of `SunUniforms` in the GLSL.
#[derive(BufferContents, Clone, Copy)]
#[repr(C)]
pub struct SunUniforms {
    pub model: Mat,
    pub mvp: Mat,
    pub normal_matrix: Mat,
    pub light_color: [f32; 3],
    _pad0: f32,
    pub light_position: [f32; 3],
    _pad1: f32,
    pub ambient_light: [f32; 3],
    _pad2: f32,
}

impl SunUniforms {
    /// Scene state of the original demo: the sun rotated 90 degrees about
    /// +Y, viewed from (0, 0, 6), lit by a white-ish point light with a
    /// small ambient term.
    pub fn scene(aspect: f32) -> Self {
        let model = Mat4::from_rotation_y(90f32.to_radians());

        let view = Mat4::look_at_rh(vec3(0.0, 0.0, 6.0), Vec3::ZERO, Vec3::Y);
        let mut proj = Mat4::perspective_rh(30f32.to_radians(), aspect, 1.0, 100.0);
        proj.y_axis.y *= -1.0; // Vulkan clip space is y-down

        let mvp = proj * view * model;
        let normal_matrix = model.inverse().transpose();

        Self {
            model: model.to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            light_color: [0.8, 0.8, 0.8],
            _pad0: 0.0,
            light_position: [5.0, 8.0, 7.0],
            _pad1: 0.0,
            ambient_light: [0.2, 0.2, 0.2],
            _pad2: 0.0,
        }
    }
}

/// The scene driver: tessellates the sun once, uploads its buffers and
/// uniform state, and issues the single indexed draw into an offscreen
/// frame.
pub struct Renderer {
    pub vk: Arc<Vk>,
    pipeline: VkGraphicsPipeline,
    attributes: Vec<AttributeBinding>,
    indices: IndexBinding,
    uniforms: VkBuffer<SunUniforms>,
}

impl Renderer {
    pub fn new(vk: Arc<Vk>) -> Result<Self, RenderError> {
        let vs = sun_vertex_shader::load(vk.device.clone())
            .map_err(|e| RenderError::ShaderInitFailure(e.to_string()))?;
        let fs = sun_fragment_shader::load(vk.device.clone())
            .map_err(|e| RenderError::ShaderInitFailure(e.to_string()))?;

        let vs_entry = vs
            .entry_point("main")
            .ok_or_else(|| RenderError::ShaderInitFailure("vertex entry point missing".into()))?;
        let slots = AttributeSlots::from_entry_point(&vs_entry);

        let geometry = sphere(SPHERE_DIV, 1.0)?;
        log::debug!(
            "tessellated sun: {} vertices, {} indices",
            geometry.vertex_count(),
            geometry.index_count()
        );

        // The sphere is unit and origin-centered, so the position array is
        // also the normal array.
        let position = upload_attribute(
            &vk.allocators,
            &slots,
            "position",
            &geometry.positions,
            3,
        )?;
        let normal = upload_attribute(&vk.allocators, &slots, "normal", &geometry.positions, 3)?;
        let indices = upload_indices(&vk.allocators, &geometry.indices)?;

        let attributes = vec![position, normal];

        let uniforms = VkBuffer::uniform(&vk.allocators, SunUniforms::scene(1.0))?;

        let pipeline = VkGraphicsPipeline::new(
            vk.clone(),
            vs,
            fs,
            &attributes,
            [FRAME_EXTENT as f32, FRAME_EXTENT as f32],
        )?;

        Ok(Self {
            vk,
            pipeline,
            attributes,
            indices,
            uniforms,
        })
    }

    /// Render the scene once and read the frame back to the host.
    pub fn draw(&self) -> Result<RgbaImage, RenderError> {
        let (framebuffer, color_image) = graphics_pipeline::framebuffer(
            self.vk.clone(),
            self.pipeline.render_pass.clone(),
            FRAME_EXTENT,
        )?;

        let readback = readback_buffer(&self.vk.allocators, FRAME_EXTENT * FRAME_EXTENT * 4)?;

        let descriptor_set = graphics_pipeline::descriptor_set(
            self.vk.clone(),
            self.pipeline.graphics_pipeline.clone(),
            [WriteDescriptorSet::buffer(0, self.uniforms.content.clone())],
        )?;

        let vertex_buffers: Vec<_> = self
            .attributes
            .iter()
            .map(|attribute| attribute.content.clone())
            .collect();

        let mut builder = VkBuilder::new_once(self.vk.clone())?;
        builder
            .0
            .begin_render_pass(
                RenderPassBeginInfo {
                    // Clear to opaque black, depth to the far plane.
                    clear_values: vec![Some([0.0, 0.0, 0.0, 1.0].into()), Some(1f32.into())],
                    ..RenderPassBeginInfo::framebuffer(framebuffer)
                },
                SubpassBeginInfo {
                    contents: SubpassContents::Inline,
                    ..Default::default()
                },
            )?
            .bind_pipeline_graphics(self.pipeline.graphics_pipeline.clone())?
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                self.pipeline.graphics_pipeline.layout().clone(),
                0,
                descriptor_set,
            )?
            .bind_vertex_buffers(0, vertex_buffers)?
            .bind_index_buffer(IndexBuffer::U16(self.indices.content.clone()))?
            .draw_indexed(self.indices.count(), 1, 0, 0, 0)?
            .end_render_pass(Default::default())?
            .copy_image_to_buffer(CopyImageToBufferInfo::image_buffer(
                color_image,
                readback.clone(),
            ))?;

        let cmd_buf = builder.command_buffer()?;
        let future = submit_cmd_buf(self.vk.clone(), cmd_buf)?;
        future
            .wait(None)
            .map_err(|e| RenderError::SubmitFailure(e.to_string()))?;

        let pixels = readback
            .read()
            .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        RgbaImage::from_raw(FRAME_EXTENT, FRAME_EXTENT, pixels.to_vec()).ok_or_else(|| {
            RenderError::ResourceAllocationFailure("frame readback size mismatch".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniforms_are_finite() {
        let uniforms = SunUniforms::scene(1.0);
        for matrix in [uniforms.model, uniforms.mvp, uniforms.normal_matrix] {
            for column in matrix {
                assert!(column.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn normal_matrix_of_a_rotation_is_the_rotation() {
        // A pure rotation is orthonormal, so its inverse-transpose is itself.
        let uniforms = SunUniforms::scene(1.0);
        for (normal_col, model_col) in uniforms.normal_matrix.iter().zip(uniforms.model.iter()) {
            for (a, b) in normal_col.iter().zip(model_col.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn projection_flips_y_for_vulkan() {
        let uniforms = SunUniforms::scene(1.0);
        // The sun's top (+Y in world space) must end up in the upper half of
        // the frame, which is -Y in Vulkan clip space.
        let mvp = Mat4::from_cols_array_2d(&uniforms.mvp);
        let top = mvp * glam::vec4(0.0, 1.0, 0.0, 1.0);
        assert!(top.y / top.w < 0.0);
    }
}
