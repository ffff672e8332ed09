// ============================================
// Light - Точечный свет и матрица light-space
// ============================================
// Один источник света на сцену. Каждый кадр из его позиции
// собирается LightFrame: позиция, интенсивность и матрица
// ortho * lookAt для прохода глубины.

use serde::Deserialize;
use ultraviolet::{projection::orthographic_wgpu_dx, Mat4, Vec3};

/// Параметры источника света
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub position: [f32; 3],
    /// Интенсивность по каналам (RGB)
    pub intensity: [f32; 3],
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            position: [-275.0, 500.0, 800.0],
            intensity: [5.0e6, 5.0e6, 5.0e6],
        }
    }
}

impl LightSettings {
    pub fn position(&self) -> Vec3 {
        self.position.into()
    }

    pub fn intensity(&self) -> Vec3 {
        self.intensity.into()
    }
}

/// Ортографический объём shadow map
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Разрешение квадратной текстуры глубины
    pub resolution: u32,
    /// left, right, bottom, top
    pub bounds: [f32; 4],
    pub near: f32,
    pub far: f32,
    /// Точка, на которую смотрит свет
    pub focus: [f32; 3],
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            resolution: 4096,
            bounds: [-300.0, 300.0, -300.0, 300.0],
            near: 1.0,
            far: 2000.0,
            focus: [-5.0, 0.0, -15.0],
        }
    }
}

impl ShadowSettings {
    pub fn focus(&self) -> Vec3 {
        self.focus.into()
    }

    pub fn projection(&self) -> Mat4 {
        let [left, right, bottom, top] = self.bounds;
        orthographic_wgpu_dx(left, right, bottom, top, self.near, self.far)
    }
}

/// Матрица мир -> clip space света, глубина в [0, 1]
pub fn light_space_matrix(light_position: Vec3, settings: &ShadowSettings) -> Mat4 {
    let focus = settings.focus();
    let to_focus = focus - light_position;

    let view = if to_focus.mag() <= f32::EPSILON {
        // Свет в точке фокуса: смотрим вниз
        Mat4::look_at(light_position, light_position - Vec3::unit_y(), Vec3::unit_z())
    } else {
        // Почти вертикальный свет: up по Z, иначе lookAt вырождается
        let up = if to_focus.normalized().y.abs() > 0.99 {
            Vec3::unit_z()
        } else {
            Vec3::unit_y()
        };
        Mat4::look_at(light_position, focus, up)
    };

    settings.projection() * view
}

/// Состояние света на текущий кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFrame {
    pub position: Vec3,
    pub intensity: Vec3,
    pub light_space: Mat4,
}

impl LightFrame {
    pub fn new(light: &LightSettings, shadow: &ShadowSettings) -> Self {
        let position = light.position();
        Self {
            position,
            intensity: light.intensity(),
            light_space: light_space_matrix(position, shadow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::Vec4;

    fn project(m: &Mat4, p: Vec3) -> Vec3 {
        let v = *m * Vec4::new(p.x, p.y, p.z, 1.0);
        Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    }

    #[test]
    fn test_focus_maps_to_center() {
        let settings = ShadowSettings::default();
        let light = LightSettings::default();
        let m = light_space_matrix(light.position(), &settings);

        let ndc = project(&m, settings.focus());
        assert!(ndc.x.abs() < 1e-3 && ndc.y.abs() < 1e-3, "{:?}", ndc);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{:?}", ndc);
    }

    #[test]
    fn test_depth_grows_away_from_light() {
        let settings = ShadowSettings::default();
        let light_pos = LightSettings::default().position();
        let m = light_space_matrix(light_pos, &settings);

        let focus = settings.focus();
        let dir = (focus - light_pos).normalized();
        let near = project(&m, focus - dir * 50.0);
        let far = project(&m, focus + dir * 50.0);
        assert!(near.z < far.z);
    }

    #[test]
    fn test_outside_bounds_leaves_unit_square() {
        let settings = ShadowSettings::default();
        let light_pos = Vec3::new(0.0, 500.0, 1.0);
        let m = light_space_matrix(light_pos, &settings);

        let ndc = project(&m, Vec3::new(2000.0, 0.0, 0.0));
        assert!(ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0);
    }

    #[test]
    fn test_vertical_light_is_finite() {
        let settings = ShadowSettings::default();
        let above = settings.focus() + Vec3::new(0.0, 800.0, 0.0);
        let m = light_space_matrix(above, &settings);
        let cols: [[f32; 4]; 4] = m.into();
        assert!(cols.iter().flatten().all(|v| v.is_finite()));

        let coincident = light_space_matrix(settings.focus(), &settings);
        let cols: [[f32; 4]; 4] = coincident.into();
        assert!(cols.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_light_frame_defaults() {
        let frame = LightFrame::new(&LightSettings::default(), &ShadowSettings::default());
        assert_eq!(frame.position, Vec3::new(-275.0, 500.0, 800.0));
        assert_eq!(frame.intensity, Vec3::broadcast(5.0e6));
    }
}
