// ============================================
// Terrain Drawable - Террейн в двух проходах
// ============================================

use std::path::Path;

use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;
use crate::gpu::render::{
    depth_block, lit_block, BindGroupLayouts, CameraMatrices, DepthContext, DrawRole, Drawable,
    GpuTexture, LitContext, ObjectBinding, Pipelines,
};
use crate::gpu::terrain::generation::HeightField;
use crate::gpu::terrain::mesh::TerrainMesh;
use crate::gpu::terrain::settings::TerrainSettings;

use super::buffers::TerrainBuffers;

pub struct Terrain {
    mesh: TerrainMesh,
    field: HeightField,
    buffers: TerrainBuffers,
    texture: GpuTexture,
    depth_binding: Option<ObjectBinding>,
    lit_binding: Option<ObjectBinding>,
}

impl Terrain {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        pipelines: &Pipelines,
        settings: &TerrainSettings,
    ) -> Self {
        let field = HeightField::new(settings.seed, settings.params);
        let mesh = TerrainMesh::build(settings.width, settings.height, &field);
        let buffers = TerrainBuffers::new(device, &mesh);

        let texture = GpuTexture::load(
            device,
            queue,
            &layouts.texture,
            Path::new(&settings.texture),
            wgpu::AddressMode::Repeat,
        );

        log::info!(
            "Terrain {}x{}: {} vertices, {} indices",
            mesh.width(),
            mesh.height(),
            mesh.vertices().len(),
            mesh.indices().len()
        );

        Self {
            depth_binding: ObjectBinding::for_program(device, &layouts.object, pipelines.depth_terrain.as_ref(), "Terrain Depth"),
            lit_binding: ObjectBinding::for_program(device, &layouts.object, pipelines.lit_terrain.as_ref(), "Terrain"),
            mesh,
            field,
            buffers,
            texture,
        }
    }

    /// Ретайлинг вокруг камеры + загрузка вершин при изменении
    pub fn update(&mut self, queue: &wgpu::Queue, viewpoint: Vec3) -> bool {
        let moved = self.mesh.update_around_viewpoint(viewpoint, &self.field);
        if moved {
            self.buffers.sync(queue, &self.mesh);
        }
        moved
    }

    pub fn elevation(&self, x: f32, z: f32) -> f32 {
        self.field.elevation(x, z)
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }
}

impl Drawable for Terrain {
    fn label(&self) -> &str {
        "Terrain"
    }

    fn role(&self) -> DrawRole {
        DrawRole::ShadowCaster
    }

    fn render_depth(&self, ctx: &mut DepthContext<'_>, light_space: &Mat4) {
        let (Some(program), Some(binding)) = (ctx.pipelines.depth_terrain.as_ref(), self.depth_binding.as_ref()) else {
            return;
        };

        // Вершины уже в мировых координатах
        binding.write(ctx.queue, &depth_block(&program.uniforms, &Mat4::identity(), light_space));

        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
        self.buffers.draw(ctx.pass);
    }

    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, light: &LightFrame) {
        let (Some(program), Some(binding)) = (ctx.pipelines.lit_terrain.as_ref(), self.lit_binding.as_ref()) else {
            return;
        };

        let model = Mat4::identity();
        binding.write(ctx.queue, &lit_block(&program.uniforms, &camera.view_proj, &model, light));

        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
        ctx.pass.set_bind_group(1, &self.texture.bind_group, &[]);
        ctx.pass.set_bind_group(2, ctx.shadow_bind_group, &[]);
        self.buffers.draw(ctx.pass);
    }
}
