// Graphics pipeline creation
//
// One static pipeline: two shader stages, no vertex input, fixed-function
// state tuned for alpha-composited 2D/3D output, and an empty layout. The
// pipeline renders into the swapchain format through dynamic rendering, so
// no render pass object is involved.

use super::bundle::Bundle;
use super::error::{native, BackendResult};
use super::guard::Guarded;
use super::shader::{self, FRAGMENT_SHADER_FILE, VERTEX_SHADER_FILE};
use ash::vk;
use std::ffi::CStr;
use std::path::Path;

const SHADER_ENTRY_POINT: &CStr = c"main";

/// Arrays the viewport state points into.
pub struct ViewportArrays {
    pub viewports: [vk::Viewport; 1],
    pub scissors: [vk::Rect2D; 1],
}

/// Fixed-function descriptors for the pipeline.
///
/// Descriptors that reference arrays are produced from bundles owned here, so
/// the arrays stay put for as long as any descriptor borrows `self`.
pub struct FixedFunctionState {
    viewport: Bundle<ViewportArrays>,
    blend_attachments: Bundle<[vk::PipelineColorBlendAttachmentState; 1]>,
    dynamic_states: Bundle<[vk::DynamicState; 2]>,
}

impl FixedFunctionState {
    pub fn new(extent: vk::Extent2D) -> Self {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        // Standard "over" compositing on color, source alpha kept as is
        let blend_attachment = vk::PipelineColorBlendAttachmentState {
            blend_enable: vk::TRUE,
            src_color_blend_factor: vk::BlendFactor::SRC_ALPHA,
            dst_color_blend_factor: vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::ADD,
            color_write_mask: vk::ColorComponentFlags::RGBA,
        };

        Self {
            viewport: Bundle::new(ViewportArrays {
                viewports: [viewport],
                scissors: [scissor],
            }),
            blend_attachments: Bundle::new([blend_attachment]),
            dynamic_states: Bundle::new([vk::DynamicState::BLEND_CONSTANTS, vk::DynamicState::VIEWPORT]),
        }
    }

    /// No vertex buffers: geometry comes from the vertex shader.
    pub fn vertex_input(&self) -> vk::PipelineVertexInputStateCreateInfoBuilder<'static> {
        vk::PipelineVertexInputStateCreateInfo::builder()
    }

    pub fn input_assembly(&self) -> vk::PipelineInputAssemblyStateCreateInfoBuilder<'static> {
        vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false)
    }

    pub fn viewport_state(&self) -> vk::PipelineViewportStateCreateInfoBuilder<'_> {
        self.viewport.view(|arrays| {
            vk::PipelineViewportStateCreateInfo::builder()
                .viewports(&arrays.viewports)
                .scissors(&arrays.scissors)
        })
    }

    pub fn rasterization(&self) -> vk::PipelineRasterizationStateCreateInfoBuilder<'static> {
        vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false)
    }

    pub fn multisample(&self) -> vk::PipelineMultisampleStateCreateInfoBuilder<'static> {
        vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
    }

    /// Default state: no depth or stencil testing.
    pub fn depth_stencil(&self) -> vk::PipelineDepthStencilStateCreateInfoBuilder<'static> {
        vk::PipelineDepthStencilStateCreateInfo::builder()
    }

    pub fn color_blend(&self) -> vk::PipelineColorBlendStateCreateInfoBuilder<'_> {
        self.blend_attachments.view(|attachments| {
            vk::PipelineColorBlendStateCreateInfo::builder()
                .logic_op_enable(false)
                .attachments(attachments)
        })
    }

    /// Viewport and blend constants can change without rebuilding the pipeline.
    pub fn dynamic_state(&self) -> vk::PipelineDynamicStateCreateInfoBuilder<'_> {
        self.dynamic_states
            .view(|states| vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(states))
    }
}

/// Pipeline and layout, owned for the renderer's lifetime.
pub struct PipelineObjects {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    device: ash::Device,
}

impl Drop for PipelineObjects {
    fn drop(&mut self) {
        log::debug!("Destroying graphics pipeline");
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

/// Build the graphics pipeline from the SPIR-V files in `data_dir`.
///
/// Shader modules are destroyed before returning, on success and on failure.
pub fn build_pipeline(
    device: &ash::Device,
    data_dir: &Path,
    extent: vk::Extent2D,
    color_format: vk::Format,
) -> BackendResult<PipelineObjects> {
    log::info!("Building graphics pipeline from {:?}", data_dir);

    let vert_module = shader::load_shader_module(device, &data_dir.join(VERTEX_SHADER_FILE))?;
    let frag_module = shader::load_shader_module(device, &data_dir.join(FRAGMENT_SHADER_FILE))?;

    let shader_stages = [
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(*vert_module)
            .name(SHADER_ENTRY_POINT)
            .build(),
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(*frag_module)
            .name(SHADER_ENTRY_POINT)
            .build(),
    ];

    // Placeholder layout: no descriptor sets, no push constants yet
    let layout_info = vk::PipelineLayoutCreateInfo::builder();
    let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }
        .map_err(native("vkCreatePipelineLayout"))?;
    let layout = Guarded::new(layout, |layout| unsafe {
        device.destroy_pipeline_layout(layout, None)
    });

    let state = FixedFunctionState::new(extent);
    let vertex_input = state.vertex_input();
    let input_assembly = state.input_assembly();
    let viewport_state = state.viewport_state();
    let rasterization = state.rasterization();
    let multisample = state.multisample();
    let depth_stencil = state.depth_stencil();
    let color_blend = state.color_blend();
    let dynamic_state = state.dynamic_state();

    let color_formats = [color_format];
    let mut rendering_info = vk::PipelineRenderingCreateInfo::builder().color_attachment_formats(&color_formats);

    let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
        .stages(&shader_stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization)
        .multisample_state(&multisample)
        .depth_stencil_state(&depth_stencil)
        .color_blend_state(&color_blend)
        .dynamic_state(&dynamic_state)
        .layout(*layout)
        .push_next(&mut rendering_info)
        .build();

    let pipelines = unsafe { device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None) }
        .map_err(|(_, result)| native("vkCreateGraphicsPipelines")(result))?;

    log::info!("Graphics pipeline created ({}x{}, {:?})", extent.width, extent.height, color_format);

    Ok(PipelineObjects {
        pipeline: pipelines[0],
        layout: layout.into_inner(),
        device: device.clone(),
    })
}
