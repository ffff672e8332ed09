// ============================================
// Drawable - Общий контракт объектов сцены
// ============================================
// Каждый объект умеет рисовать себя в двух проходах:
// глубина от света (только позиции) и освещённая сцена.
// Порядок проходов задаёт FramePlan, а не сами объекты.

use ultraviolet::{Mat4, Vec3, Vec4};

use crate::gpu::lighting::LightFrame;
use super::pipelines::Pipelines;

/// Роль объекта в кадре
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRole {
    /// Рисуется в shadow map и в освещённом проходе
    ShadowCaster,
    /// Только освещённый проход (тень не отбрасывает)
    LitOnly,
    /// Фон: последним, без записи глубины
    Background,
}

impl DrawRole {
    pub fn casts_shadow(self) -> bool {
        matches!(self, DrawRole::ShadowCaster)
    }
}

/// Матрицы камеры на кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    /// projection * view
    pub view_proj: Mat4,
    /// projection * view без переноса (скайбокс)
    pub sky_view_proj: Mat4,
    pub position: Vec3,
}

/// Состояние прохода глубины
pub struct DepthContext<'a> {
    pub queue: &'a wgpu::Queue,
    pub pass: &'a mut wgpu::RenderPass<'static>,
    pub pipelines: &'a Pipelines,
}

/// Состояние освещённого прохода (shadow map уже в group 2)
pub struct LitContext<'a> {
    pub queue: &'a wgpu::Queue,
    pub pass: &'a mut wgpu::RenderPass<'static>,
    pub pipelines: &'a Pipelines,
    pub shadow_bind_group: &'a wgpu::BindGroup,
}

pub trait Drawable {
    fn label(&self) -> &str;

    fn role(&self) -> DrawRole;

    /// Проход глубины: позиции + (model, lightSpaceMatrix).
    /// Вызывается только для ShadowCaster.
    fn render_depth(&self, ctx: &mut DepthContext<'_>, light_space: &Mat4);

    /// Освещённый проход
    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, light: &LightFrame);
}

/// Модельная матрица translate * scale
pub fn model_matrix(position: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * scale_matrix(scale)
}

/// Неравномерный масштаб
pub fn scale_matrix(scale: Vec3) -> Mat4 {
    Mat4::new(
        Vec4::new(scale.x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, scale.y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, scale.z, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_matrix_translates_after_scaling() {
        let m = model_matrix(Vec3::new(0.0, 6.0, 0.0), Vec3::new(5.0, 40.0, 5.0));
        let top = m * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(top, Vec4::new(5.0, 46.0, 5.0, 1.0));
        let bottom = m * Vec4::new(-1.0, -1.0, -1.0, 1.0);
        assert_eq!(bottom, Vec4::new(-5.0, -34.0, -5.0, 1.0));
    }

    #[test]
    fn test_only_casters_cast() {
        assert!(DrawRole::ShadowCaster.casts_shadow());
        assert!(!DrawRole::LitOnly.casts_shadow());
        assert!(!DrawRole::Background.casts_shadow());
    }
}
