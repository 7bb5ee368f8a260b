//! Camera-relative 3D render system.
//!
//! Draws lit meshes with the `simple_shader` pipeline. The camera's view and
//! projection live in a uniform buffer per frame slot (set 0, binding 0); the
//! model and normal matrices travel as push constants per object.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::info;

use vista_resources::Vertex;
use vista_rhi::buffer::{Buffer, BufferUsage};
use vista_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, uniform_buffer_binding, uniform_pool_sizes,
    write_uniform_buffer,
};
use vista_rhi::device::Device;
use vista_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use vista_rhi::shader::{Shader, ShaderStage};
use vista_rhi::sync::MAX_FRAMES_IN_FLIGHT;
use vista_scene::GameObject;

use crate::error::RendererResult;
use crate::frame_info::FrameInfo;
use crate::ubo::{GlobalUbo, PUSH_CONSTANT_STAGES, SimplePushConstants, push_constant_range};

/// SPIR-V file names inside the shader directory.
pub const SIMPLE_VERTEX_SHADER: &str = "simple_shader.vert.spv";
pub const SIMPLE_FRAGMENT_SHADER: &str = "simple_shader.frag.spv";

/// 3D pipeline with a per-frame camera uniform.
///
/// Field order is drop order: per-slot buffers and the pool go before the
/// set layout, the pipeline before its layout.
pub struct SimpleRenderSystem {
    global_ubos: Vec<Buffer>,
    global_descriptor_sets: Vec<vk::DescriptorSet>,
    descriptor_pool: DescriptorPool,
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    global_set_layout: DescriptorSetLayout,
}

impl SimpleRenderSystem {
    /// Builds the pipeline for `render_pass` and one uniform buffer and
    /// descriptor set per frame slot.
    ///
    /// # Errors
    ///
    /// Returns an error if a shader cannot be loaded or any pipeline,
    /// descriptor or buffer object cannot be created.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        shader_dir: &Path,
    ) -> RendererResult<Self> {
        let global_set_layout = DescriptorSetLayout::new(
            Arc::clone(&device),
            &[uniform_buffer_binding(0, vk::ShaderStageFlags::VERTEX)],
        )?;

        let pipeline_layout = PipelineLayout::new(
            Arc::clone(&device),
            &[global_set_layout.handle()],
            &[push_constant_range::<SimplePushConstants>()],
        )?;

        let vertex_shader = Shader::from_spirv_file(
            Arc::clone(&device),
            &shader_dir.join(SIMPLE_VERTEX_SHADER),
            ShaderStage::Vertex,
        )?;
        let fragment_shader = Shader::from_spirv_file(
            Arc::clone(&device),
            &shader_dir.join(SIMPLE_FRAGMENT_SHADER),
            ShaderStage::Fragment,
        )?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .render_pass(render_pass, 0)
            .build(Arc::clone(&device), &pipeline_layout)?;

        let descriptor_pool = DescriptorPool::new(
            Arc::clone(&device),
            MAX_FRAMES_IN_FLIGHT as u32,
            &uniform_pool_sizes(MAX_FRAMES_IN_FLIGHT as u32),
        )?;

        let global_ubos = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| {
                Buffer::new(
                    Arc::clone(&device),
                    BufferUsage::Uniform,
                    GlobalUbo::SIZE as vk::DeviceSize,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let layouts = [global_set_layout.handle(); MAX_FRAMES_IN_FLIGHT];
        let global_descriptor_sets = descriptor_pool.allocate(&layouts)?;
        for (set, ubo) in global_descriptor_sets.iter().zip(&global_ubos) {
            write_uniform_buffer(
                &device,
                *set,
                0,
                ubo.handle(),
                GlobalUbo::SIZE as vk::DeviceSize,
            );
        }

        info!("Simple render system created");

        Ok(Self {
            global_ubos,
            global_descriptor_sets,
            descriptor_pool,
            pipeline,
            pipeline_layout,
            global_set_layout,
        })
    }

    /// Records draws for every object that has a model, in slice order.
    ///
    /// The camera uniform of `frame.frame_index` is updated first. That slot
    /// is not in use by the GPU since the frame's acquire waited on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the uniform buffer cannot be written.
    pub fn draw_game_objects(
        &self,
        frame: &FrameInfo<'_>,
        game_objects: &[GameObject],
    ) -> RendererResult<()> {
        let cmd = frame.command_buffer;
        cmd.bind_graphics_pipeline(self.pipeline.handle());

        self.global_ubos[frame.frame_index].write_pod(&GlobalUbo::from_camera(frame.camera))?;
        cmd.bind_graphics_descriptor_sets(
            self.pipeline_layout.handle(),
            0,
            &[self.global_descriptor_sets[frame.frame_index]],
        );

        for object in game_objects {
            let Some(model) = &object.model else {
                continue;
            };

            let push = SimplePushConstants::from_transform(&object.transform);
            cmd.push_constants(self.pipeline_layout.handle(), PUSH_CONSTANT_STAGES, &push);
            model.bind(cmd);
            model.draw(cmd);
        }
        Ok(())
    }
}
