// ============================================
// Camera - Свободная камера yaw/pitch
// ============================================
// Шаговое управление: каждое нажатие (или автоповтор) клавиши
// двигает камеру на фиксированный шаг.

use serde::Deserialize;
use ultraviolet::{projection::perspective_wgpu_dx, Mat4, Vec3, Vec4};
use winit::keyboard::KeyCode;

use crate::gpu::render::CameraMatrices;

/// Ограничение наклона, градусы
pub const PITCH_LIMIT: f32 = 89.0;

/// Раздел "camera" файла сцены
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    /// Градусы; -90 = взгляд вдоль -Z
    pub yaw: f32,
    pub pitch: f32,
    /// Вертикальный FOV, градусы
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Шаг перемещения на нажатие
    pub speed: f32,
    /// Шаг поворота на нажатие, градусы
    pub turn_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, 75.0],
            yaw: -90.0,
            pitch: 0.0,
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
            speed: 1.0,
            turn_step: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Градусы
    yaw: f32,
    /// Градусы, [-89, 89]
    pitch: f32,
    pub aspect: f32,
    /// Радианы
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings, aspect: f32) -> Self {
        Self {
            position: Vec3::from(settings.position),
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            aspect,
            fov: settings.fov.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Направление взгляда
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalized()
    }

    /// Вектор вправо
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::unit_y()).normalized()
    }

    pub fn turn(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.forward(), Vec3::unit_y())
    }

    pub fn projection(&self) -> Mat4 {
        perspective_wgpu_dx(self.fov, self.aspect, self.near, self.far)
    }

    /// view без переноса (только вращение)
    pub fn rotation_only_view(&self) -> Mat4 {
        let mut view = self.view();
        view.cols[3] = Vec4::new(0.0, 0.0, 0.0, 1.0);
        view
    }

    pub fn matrices(&self) -> CameraMatrices {
        let projection = self.projection();
        CameraMatrices {
            view_proj: projection * self.view(),
            sky_view_proj: projection * self.rotation_only_view(),
            position: self.position,
        }
    }
}

/// Клавиатурное управление камерой
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub speed: f32,
    pub turn_step: f32,
}

impl CameraController {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            speed: settings.speed,
            turn_step: settings.turn_step,
        }
    }

    /// Один шаг по нажатию. false: клавиша не управляет камерой.
    pub fn process_key(&self, camera: &mut Camera, key: KeyCode) -> bool {
        match key {
            KeyCode::KeyW => camera.position += camera.forward() * self.speed,
            KeyCode::KeyS => camera.position -= camera.forward() * self.speed,
            KeyCode::KeyA => camera.position -= camera.right() * self.speed,
            KeyCode::KeyD => camera.position += camera.right() * self.speed,
            KeyCode::ArrowUp => camera.turn(0.0, self.turn_step),
            KeyCode::ArrowDown => camera.turn(0.0, -self.turn_step),
            KeyCode::ArrowLeft => camera.turn(-self.turn_step, 0.0),
            KeyCode::ArrowRight => camera.turn(self.turn_step, 0.0),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).mag() < 1e-4
    }

    fn setup() -> (Camera, CameraController) {
        let settings = CameraSettings::default();
        (Camera::new(&settings, 1024.0 / 768.0), CameraController::new(&settings))
    }

    #[test]
    fn test_initial_view_looks_down_negative_z() {
        let (camera, _) = setup();
        assert!(approx(camera.forward(), Vec3::new(0.0, 0.0, -1.0)));
        assert!(approx(camera.right(), Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_wasd_steps() {
        let (mut camera, controller) = setup();

        assert!(controller.process_key(&mut camera, KeyCode::KeyW));
        assert!(approx(camera.position, Vec3::new(0.0, 10.0, 74.0)));

        controller.process_key(&mut camera, KeyCode::KeyD);
        assert!(approx(camera.position, Vec3::new(1.0, 10.0, 74.0)));

        controller.process_key(&mut camera, KeyCode::KeyS);
        controller.process_key(&mut camera, KeyCode::KeyA);
        assert!(approx(camera.position, Vec3::new(0.0, 10.0, 75.0)));

        assert!(!controller.process_key(&mut camera, KeyCode::KeyP));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let (mut camera, controller) = setup();
        for _ in 0..100 {
            controller.process_key(&mut camera, KeyCode::ArrowUp);
        }
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        for _ in 0..200 {
            controller.process_key(&mut camera, KeyCode::ArrowDown);
        }
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_arrows_turn_yaw() {
        let (mut camera, controller) = setup();
        controller.process_key(&mut camera, KeyCode::ArrowRight);
        assert_eq!(camera.yaw(), -88.0);
        controller.process_key(&mut camera, KeyCode::ArrowLeft);
        controller.process_key(&mut camera, KeyCode::ArrowLeft);
        assert_eq!(camera.yaw(), -92.0);
    }

    #[test]
    fn test_sky_view_ignores_position() {
        let (mut camera, _) = setup();
        let before = camera.matrices().sky_view_proj;
        camera.position = Vec3::new(100.0, -20.0, 5.0);
        let after = camera.matrices();
        for (a, b) in before.cols.iter().zip(after.sky_view_proj.cols.iter()) {
            assert!((*a - *b).mag() < 1e-4);
        }
        assert!((before.cols[3] - after.view_proj.cols[3]).mag() > 1.0);
    }

    #[test]
    fn test_projection_depth_range() {
        let (camera, _) = setup();
        let proj = camera.projection();
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }
}
