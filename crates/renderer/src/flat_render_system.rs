//! Object-space 2D render system.
//!
//! Uses the `shader_2D` pipeline: no descriptor sets and no camera, just the
//! model matrix pushed per object.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::info;

use vista_resources::Vertex;
use vista_rhi::device::Device;
use vista_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use vista_rhi::shader::{Shader, ShaderStage};
use vista_scene::GameObject;

use crate::error::RendererResult;
use crate::frame_info::FrameInfo;
use crate::ubo::{FlatPushConstants, PUSH_CONSTANT_STAGES, push_constant_range};

pub const FLAT_VERTEX_SHADER: &str = "shader_2D.vert.spv";
pub const FLAT_FRAGMENT_SHADER: &str = "shader_2D.frag.spv";

/// 2D pipeline driven by push constants only.
pub struct FlatRenderSystem {
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
}

impl FlatRenderSystem {
    /// Builds the pipeline for `render_pass`.
    ///
    /// # Errors
    ///
    /// Returns an error if a shader cannot be loaded or pipeline creation
    /// fails.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        shader_dir: &Path,
    ) -> RendererResult<Self> {
        let pipeline_layout = PipelineLayout::new(
            Arc::clone(&device),
            &[],
            &[push_constant_range::<FlatPushConstants>()],
        )?;

        let vertex_shader = Shader::from_spirv_file(
            Arc::clone(&device),
            &shader_dir.join(FLAT_VERTEX_SHADER),
            ShaderStage::Vertex,
        )?;
        let fragment_shader = Shader::from_spirv_file(
            Arc::clone(&device),
            &shader_dir.join(FLAT_FRAGMENT_SHADER),
            ShaderStage::Fragment,
        )?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .render_pass(render_pass, 0)
            .build(device, &pipeline_layout)?;

        info!("Flat render system created");

        Ok(Self {
            pipeline,
            pipeline_layout,
        })
    }

    /// Records draws for every object that has a model, in slice order.
    pub fn draw_game_objects(&self, frame: &FrameInfo<'_>, game_objects: &[GameObject]) {
        let cmd = frame.command_buffer;
        cmd.bind_graphics_pipeline(self.pipeline.handle());

        for object in game_objects {
            let Some(model) = &object.model else {
                continue;
            };

            let push = FlatPushConstants::from_transform(&object.transform);
            cmd.push_constants(self.pipeline_layout.handle(), PUSH_CONSTANT_STAGES, &push);
            model.bind(cmd);
            model.draw(cmd);
        }
    }
}
