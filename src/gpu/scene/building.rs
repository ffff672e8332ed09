// ============================================
// Building - Текстурированная коробка здания
// ============================================
// Uniform: весь куб одной текстурой.
// FrontSidesSplit (паб): передняя грань своей текстурой,
// остальные пять граней текстурой стен, V повторяется x5.

use std::ops::Range;
use std::path::Path;

use serde::Deserialize;
use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;
use crate::gpu::render::{
    depth_block, lit_block, model_matrix, BindGroupLayouts, CameraMatrices, DepthContext, DrawRole,
    Drawable, GpuTexture, LitContext, MeshBuffers, ObjectBinding, Pipelines,
};

use super::cube::{building_mesh, INDICES_PER_FACE};

const CUBE_INDEX_COUNT: u32 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacadeStyle {
    Uniform,
    FrontSidesSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadePart {
    Front,
    Sides,
}

impl FacadeStyle {
    pub fn v_repeat(self) -> f32 {
        match self {
            FacadeStyle::Uniform => 1.0,
            FacadeStyle::FrontSidesSplit => 5.0,
        }
    }

    /// Вызовы отрисовки: какой текстурой и какой диапазон индексов
    pub fn draws(self) -> Vec<(FacadePart, Range<u32>)> {
        match self {
            FacadeStyle::Uniform => vec![(FacadePart::Front, 0..CUBE_INDEX_COUNT)],
            FacadeStyle::FrontSidesSplit => vec![
                (FacadePart::Front, 0..INDICES_PER_FACE),
                (FacadePart::Sides, INDICES_PER_FACE..CUBE_INDEX_COUNT),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildingSettings {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub facade: FacadeStyle,
    /// Основная (передняя) текстура
    pub texture: String,
    /// Текстура стен для FrontSidesSplit; по умолчанию = texture
    #[serde(default)]
    pub side_texture: Option<String>,
}

/// Высотка и паб
pub fn default_buildings() -> Vec<BuildingSettings> {
    vec![
        BuildingSettings {
            position: [0.0, 6.0, 0.0],
            scale: [5.0, 40.0, 5.0],
            facade: FacadeStyle::Uniform,
            texture: "textures/alien2.jpg".to_string(),
            side_texture: None,
        },
        BuildingSettings {
            position: [-10.0, 3.0, -35.0],
            scale: [12.0, 16.0, 5.0],
            facade: FacadeStyle::FrontSidesSplit,
            texture: "textures/facade3.jpg".to_string(),
            side_texture: Some("textures/alien2.jpg".to_string()),
        },
    ]
}

pub struct Building {
    label: String,
    style: FacadeStyle,
    model: Mat4,
    mesh: MeshBuffers,
    front: GpuTexture,
    sides: Option<GpuTexture>,
    depth_binding: Option<ObjectBinding>,
    lit_binding: Option<ObjectBinding>,
}

impl Building {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        pipelines: &Pipelines,
        label: &str,
        settings: &BuildingSettings,
    ) -> Self {
        let style = settings.facade;
        let mesh = MeshBuffers::new(device, label, &building_mesh([1.0; 3], style.v_repeat()));

        // Repeat, чтобы повтор по V действительно повторял
        let load = |path: &str| {
            GpuTexture::load(device, queue, &layouts.texture, Path::new(path), wgpu::AddressMode::Repeat)
        };
        let front = load(&settings.texture);
        let sides = match (style, settings.side_texture.as_deref()) {
            (FacadeStyle::FrontSidesSplit, Some(path)) => Some(load(path)),
            _ => None,
        };

        Self {
            label: label.to_string(),
            style,
            model: model_matrix(Vec3::from(settings.position), Vec3::from(settings.scale)),
            mesh,
            front,
            sides,
            depth_binding: ObjectBinding::for_program(
                device,
                &layouts.object,
                pipelines.depth_separate.as_ref(),
                &format!("{} Depth", label),
            ),
            lit_binding: ObjectBinding::for_program(device, &layouts.object, pipelines.lit_box.as_ref(), label),
        }
    }

    pub fn style(&self) -> FacadeStyle {
        self.style
    }

    fn texture(&self, part: FacadePart) -> &GpuTexture {
        match part {
            FacadePart::Front => &self.front,
            FacadePart::Sides => self.sides.as_ref().unwrap_or(&self.front),
        }
    }
}

impl Drawable for Building {
    fn label(&self) -> &str {
        &self.label
    }

    fn role(&self) -> DrawRole {
        DrawRole::ShadowCaster
    }

    fn render_depth(&self, ctx: &mut DepthContext<'_>, light_space: &Mat4) {
        let (Some(program), Some(binding)) = (ctx.pipelines.depth_separate.as_ref(), self.depth_binding.as_ref()) else {
            return;
        };

        binding.write(ctx.queue, &depth_block(&program.uniforms, &self.model, light_space));

        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
        self.mesh.bind_positions(ctx.pass);
        self.mesh.draw(ctx.pass);
    }

    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, light: &LightFrame) {
        let (Some(program), Some(binding)) = (ctx.pipelines.lit_box.as_ref(), self.lit_binding.as_ref()) else {
            return;
        };

        let mvp = camera.view_proj * self.model;
        binding.write(ctx.queue, &lit_block(&program.uniforms, &mvp, &self.model, light));

        ctx.pass.set_pipeline(&program.pipeline);
        ctx.pass.set_bind_group(0, &binding.bind_group, &[]);
        ctx.pass.set_bind_group(2, ctx.shadow_bind_group, &[]);
        self.mesh.bind_all(ctx.pass);

        for (part, range) in self.style.draws() {
            ctx.pass.set_bind_group(1, &self.texture(part).bind_group, &[]);
            self.mesh.draw_range(ctx.pass, range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_draws_whole_cube() {
        assert_eq!(FacadeStyle::Uniform.draws(), vec![(FacadePart::Front, 0..36)]);
    }

    #[test]
    fn test_split_draws_front_then_sides() {
        let draws = FacadeStyle::FrontSidesSplit.draws();
        assert_eq!(draws, vec![(FacadePart::Front, 0..6), (FacadePart::Sides, 6..36)]);

        let total: u32 = draws.iter().map(|(_, r)| r.end - r.start).sum();
        assert_eq!(total, 36);
    }

    #[test]
    fn test_v_repeat() {
        assert_eq!(FacadeStyle::Uniform.v_repeat(), 1.0);
        assert_eq!(FacadeStyle::FrontSidesSplit.v_repeat(), 5.0);
    }

    #[test]
    fn test_settings_parse() {
        let json = r#"{
            "position": [-10, 3, -35],
            "scale": [12, 16, 5],
            "facade": "front_sides_split",
            "texture": "textures/facade3.jpg",
            "side_texture": "textures/alien2.jpg"
        }"#;
        let settings: BuildingSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.facade, FacadeStyle::FrontSidesSplit);
        assert_eq!(settings.side_texture.as_deref(), Some("textures/alien2.jpg"));
        assert_eq!(settings.scale, [12.0, 16.0, 5.0]);
    }

    #[test]
    fn test_default_buildings() {
        let buildings = default_buildings();
        assert_eq!(buildings.len(), 2);
        assert_eq!(buildings[0].facade, FacadeStyle::Uniform);
        assert_eq!(buildings[1].position, [-10.0, 3.0, -35.0]);
    }

    #[test]
    fn test_default_pub_uses_two_textures() {
        let pub_settings = &default_buildings()[1];
        assert_eq!(pub_settings.facade, FacadeStyle::FrontSidesSplit);
        let sides = pub_settings.side_texture.as_deref();
        assert!(sides.is_some());
        assert_ne!(sides, Some(pub_settings.texture.as_str()));
    }
}
