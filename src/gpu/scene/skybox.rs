// ============================================
// Skybox - Фоновый куб
// ============================================
// Рисуется последним, матрица камеры без переноса,
// глубина не пишется (pipeline сам по себе LessEqual + xyww).

use std::path::Path;

use serde::Deserialize;
use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;
use crate::gpu::render::{
    scale_matrix, BindGroupLayouts, CameraMatrices, DepthContext, DrawRole, Drawable, GpuTexture,
    LitContext, MeshBuffers, ObjectBinding, Pipelines, MVP,
};

use super::cube::skybox_mesh;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkyboxSettings {
    pub scale: f32,
    pub texture: String,
}

impl Default for SkyboxSettings {
    fn default() -> Self {
        Self {
            scale: 500.0,
            texture: "textures/sky.png".to_string(),
        }
    }
}

pub struct Skybox {
    model: Mat4,
    mesh: MeshBuffers,
    texture: GpuTexture,
    binding: Option<ObjectBinding>,
}

impl Skybox {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        pipelines: &Pipelines,
        settings: &SkyboxSettings,
    ) -> Self {
        Self {
            model: scale_matrix(Vec3::broadcast(settings.scale)),
            mesh: MeshBuffers::new(device, "Skybox", &skybox_mesh()),
            // Швы развёртки не должны заворачиваться на другую сторону
            texture: GpuTexture::load(
                device,
                queue,
                &layouts.texture,
                Path::new(&settings.texture),
                wgpu::AddressMode::ClampToEdge,
            ),
            binding: ObjectBinding::for_program(device, &layouts.object, pipelines.sky.as_ref(), "Skybox"),
        }
    }
}

impl Drawable for Skybox {
    fn label(&self) -> &str {
        "Skybox"
    }

    fn role(&self) -> DrawRole {
        DrawRole::Background
    }

    fn render_depth(&self, _ctx: &mut DepthContext<'_>, _light_space: &Mat4) {}

    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, _light: &LightFrame) {
        let (Some(program), Some(binding)) = (ctx.pipelines.sky.as_ref(), self.binding.as_ref()) else {
            return;
        };

        let mut block = program.uniforms.block();
        block.set_mat4(MVP, &(camera.sky_view_proj * self.model));
        binding.write(ctx.queue, &block);

        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
        ctx.pass.set_bind_group(1, &self.texture.bind_group, &[]);
        self.mesh.bind_all(ctx.pass);
        self.mesh.draw(ctx.pass);
    }
}
