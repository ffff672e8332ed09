// ============================================
// Tree - Ствол и крона из двух коробок
// ============================================

use serde::Deserialize;
use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;
use crate::gpu::render::{
    depth_block, lit_block, model_matrix, BindGroupLayouts, CameraMatrices, DepthContext, DrawRole,
    Drawable, GpuTexture, LitContext, MeshBuffers, ObjectBinding, Pipelines, FALLBACK_PIXEL,
};

use super::cube::box_mesh;

pub const TRUNK_COLOR: [f32; 3] = [0.55, 0.27, 0.07];
pub const FOLIAGE_COLOR: [f32; 3] = [0.0, 0.4, 0.0];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// y подгоняется под высоту террейна
    pub position: [f32; 3],
    pub trunk_scale: [f32; 3],
    pub foliage_radius: f32,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            position: [20.0, 0.0, -10.0],
            trunk_scale: [1.0, 6.0, 1.0],
            foliage_radius: 5.0,
        }
    }
}

/// Модельные матрицы ствола и кроны (крона на вершине ствола)
pub fn tree_transforms(position: Vec3, trunk_scale: Vec3, foliage_radius: f32) -> (Mat4, Mat4) {
    let trunk = model_matrix(position, trunk_scale);
    let foliage = model_matrix(
        position + Vec3::new(0.0, trunk_scale.y, 0.0),
        Vec3::broadcast(foliage_radius),
    );
    (trunk, foliage)
}

struct TreePart {
    model: Mat4,
    mesh: MeshBuffers,
    depth_binding: Option<ObjectBinding>,
    lit_binding: Option<ObjectBinding>,
}

pub struct Tree {
    label: String,
    trunk: TreePart,
    foliage: TreePart,
    /// Белая 1x1: цвет идёт из вершин
    texture: GpuTexture,
}

impl Tree {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        pipelines: &Pipelines,
        label: &str,
        position: Vec3,
        settings: &TreeSettings,
    ) -> Self {
        let (trunk_model, foliage_model) =
            tree_transforms(position, Vec3::from(settings.trunk_scale), settings.foliage_radius);

        let part = |name: &str, model: Mat4, min: [f32; 3], max: [f32; 3], color: [f32; 3]| {
            let part_label = format!("{} {}", label, name);
            TreePart {
                model,
                mesh: MeshBuffers::new(device, &part_label, &box_mesh(min, max, color)),
                depth_binding: ObjectBinding::for_program(
                    device,
                    &layouts.object,
                    pipelines.depth_separate.as_ref(),
                    &format!("{} Depth", part_label),
                ),
                lit_binding: ObjectBinding::for_program(device, &layouts.object, pipelines.lit_box.as_ref(), &part_label),
            }
        };

        Self {
            label: label.to_string(),
            trunk: part("Trunk", trunk_model, [-0.5, 0.0, -0.5], [0.5, 1.0, 0.5], TRUNK_COLOR),
            foliage: part("Foliage", foliage_model, [-0.5; 3], [0.5; 3], FOLIAGE_COLOR),
            texture: GpuTexture::solid(device, queue, &layouts.texture, &format!("{} Texture", label), FALLBACK_PIXEL),
        }
    }

    fn parts(&self) -> [&TreePart; 2] {
        [&self.trunk, &self.foliage]
    }
}

impl Drawable for Tree {
    fn label(&self) -> &str {
        &self.label
    }

    fn role(&self) -> DrawRole {
        DrawRole::ShadowCaster
    }

    fn render_depth(&self, ctx: &mut DepthContext<'_>, light_space: &Mat4) {
        let Some(program) = ctx.pipelines.depth_separate.as_ref() else {
            return;
        };
        ctx.pass.set_pipeline(&program.pipeline);

        for part in self.parts() {
            let Some(binding) = part.depth_binding.as_ref() else {
                continue;
            };
            binding.write(ctx.queue, &depth_block(&program.uniforms, &part.model, light_space));
            ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
            part.mesh.bind_positions(ctx.pass);
            part.mesh.draw(ctx.pass);
        }
    }

    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, light: &LightFrame) {
        let Some(program) = ctx.pipelines.lit_box.as_ref() else {
            return;
        };
        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(1, &self.texture.bind_group, &[]);
        ctx.pass.set_bind_group(2, ctx.shadow_bind_group, &[]);

        for part in self.parts() {
            let Some(binding) = part.lit_binding.as_ref() else {
                continue;
            };
            let mvp = camera.view_proj * part.model;
            binding.write(ctx.queue, &lit_block(&program.uniforms, &mvp, &part.model, light));
            ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
            part.mesh.bind_all(ctx.pass);
            part.mesh.draw(ctx.pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::Vec4;

    #[test]
    fn test_foliage_sits_on_trunk_top() {
        let (trunk, foliage) = tree_transforms(Vec3::new(2.0, 1.0, 3.0), Vec3::new(1.0, 6.0, 1.0), 5.0);

        let trunk_top = trunk * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(trunk_top, Vec4::new(2.0, 7.0, 3.0, 1.0));

        let foliage_center = foliage * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(foliage_center, trunk_top);

        let foliage_corner = foliage * Vec4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(foliage_corner, Vec4::new(4.5, 9.5, 5.5, 1.0));
    }

    #[test]
    fn test_trunk_base_on_ground() {
        let (trunk, _) = tree_transforms(Vec3::new(0.0, 4.0, 0.0), Vec3::new(2.0, 6.0, 2.0), 3.0);
        let base = trunk * Vec4::new(0.5, 0.0, -0.5, 1.0);
        assert_eq!(base, Vec4::new(1.0, 4.0, -1.0, 1.0));
    }
}
