use crate::gpu::terrain::TerrainVertex;
use crate::gpu::lighting::SHADOW_FORMAT;

use super::bind_groups::BindGroupLayouts;
use super::depth::DEPTH_FORMAT;
use super::mesh_buffers;
use super::shader::ShaderProgram;
use super::uniforms::{UniformLayout, DEPTH_UNIFORMS, LIT_UNIFORMS, SKY_UNIFORMS};

/// Pipeline + раскладка его uniform-блока
pub struct Program {
    pub pipeline: wgpu::RenderPipeline,
    pub uniforms: UniformLayout,
}

/// Все программы сцены. None = шейдер не собрался, объекты с ним не рисуются.
pub struct Pipelines {
    /// Глубина для коробок: отдельный поток позиций (stride 12)
    pub depth_separate: Option<Program>,
    /// Глубина для террейна: interleaved TerrainVertex, только location 0
    pub depth_terrain: Option<Program>,
    pub lit_box: Option<Program>,
    pub lit_terrain: Option<Program>,
    pub sky: Option<Program>,
}

fn load_shader(device: &wgpu::Device, label: &str, source: &str, contract: &[&str]) -> Option<ShaderProgram> {
    match ShaderProgram::new(device, label, source, contract) {
        Ok(program) => Some(program),
        Err(e) => {
            log::error!("{}", e);
            None
        }
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    /// None = depth-only
    color_format: Option<wgpu::TextureFormat>,
    depth: wgpu::DepthStencilState,
    cull_mode: Option<wgpu::Face>,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &ShaderProgram,
    desc: PipelineDesc<'_>,
) -> Program {
    let targets = [desc.color_format.map(|format| wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader.module(),
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: desc.color_format.map(|_| wgpu::FragmentState {
            module: shader.module(),
            entry_point: Some("fs_main"),
            targets: &targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(desc.depth),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    Program {
        pipeline,
        uniforms: shader.uniforms().clone(),
    }
}

fn scene_depth(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn shadow_depth() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: SHADOW_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: wgpu::DepthBiasState {
            constant: 2,
            slope_scale: 2.0,
            clamp: 0.0,
        },
    }
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        layouts: &BindGroupLayouts,
    ) -> Self {
        let depth_shader = load_shader(device, "Depth Shader", include_str!("../lighting/depth.wgsl"), &DEPTH_UNIFORMS);
        let box_shader = load_shader(device, "Box Shader", include_str!("../shaders/box.wgsl"), &LIT_UNIFORMS);
        let terrain_shader = load_shader(device, "Terrain Shader", include_str!("../shaders/terrain.wgsl"), &LIT_UNIFORMS);
        let sky_shader = load_shader(device, "Skybox Shader", include_str!("../shaders/skybox.wgsl"), &SKY_UNIFORMS);

        let depth_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Layout"),
            bind_group_layouts: &[&layouts.object],
            push_constant_ranges: &[],
        });

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Layout"),
            bind_group_layouts: &[&layouts.object, &layouts.texture, &layouts.shadow],
            push_constant_ranges: &[],
        });

        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Layout"),
            bind_group_layouts: &[&layouts.object, &layouts.texture],
            push_constant_ranges: &[],
        });

        let streams = mesh_buffers::stream_layouts();

        // Коробки дерева обходятся в разные стороны, поэтому без culling
        let depth_separate = depth_shader.as_ref().map(|shader| {
            create_pipeline(device, &depth_layout, shader, PipelineDesc {
                label: "Depth Pipeline (Streams)",
                buffers: &[mesh_buffers::position_layout()],
                color_format: None,
                depth: shadow_depth(),
                cull_mode: None,
            })
        });

        let depth_terrain = depth_shader.as_ref().map(|shader| {
            create_pipeline(device, &depth_layout, shader, PipelineDesc {
                label: "Depth Pipeline (Terrain)",
                buffers: &[TerrainVertex::position_desc()],
                color_format: None,
                depth: shadow_depth(),
                cull_mode: None,
            })
        });

        let lit_box = box_shader.as_ref().map(|shader| {
            create_pipeline(device, &lit_layout, shader, PipelineDesc {
                label: "Box Pipeline",
                buffers: &streams,
                color_format: Some(surface_format),
                depth: scene_depth(true, wgpu::CompareFunction::Less),
                cull_mode: None,
            })
        });

        let lit_terrain = terrain_shader.as_ref().map(|shader| {
            create_pipeline(device, &lit_layout, shader, PipelineDesc {
                label: "Terrain Pipeline",
                buffers: &[TerrainVertex::desc()],
                color_format: Some(surface_format),
                depth: scene_depth(true, wgpu::CompareFunction::Less),
                cull_mode: Some(wgpu::Face::Back),
            })
        });

        // Камера внутри куба: без culling, без записи глубины
        let sky = sky_shader.as_ref().map(|shader| {
            create_pipeline(device, &sky_layout, shader, PipelineDesc {
                label: "Skybox Pipeline",
                buffers: &streams,
                color_format: Some(surface_format),
                depth: scene_depth(false, wgpu::CompareFunction::LessEqual),
                cull_mode: None,
            })
        });

        Self {
            depth_separate,
            depth_terrain,
            lit_box,
            lit_terrain,
            sky,
        }
    }
}
