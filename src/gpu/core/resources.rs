// ============================================
// Resources - Состояние приложения
// ============================================

use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

use crate::gpu::lighting::LightFrame;
use crate::gpu::player::{Camera, CameraController};
use crate::gpu::render::Renderer;
use crate::gpu::scene::Scene;

use super::config::{AnimationSettings, SceneConfig};

/// Состояние кадра: камера, свет и время
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub camera: Camera,
    pub light: LightFrame,
    /// Секунды с запуска
    pub elapsed: f32,
    /// Время анимации персонажей
    pub character_time: f32,
    pub playing: bool,
    pub playback_speed: f32,
}

impl FrameState {
    pub fn new(camera: Camera, light: LightFrame, animation: &AnimationSettings) -> Self {
        Self {
            camera,
            light,
            elapsed: 0.0,
            character_time: 0.0,
            playing: animation.playing,
            playback_speed: animation.playback_speed,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.playing {
            self.character_time += dt * self.playback_speed;
        }
    }

    /// Пауза/продолжение анимации; возвращает новое состояние
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }
}

/// Всё, чем владеет приложение
pub struct AppResources {
    pub config: SceneConfig,

    // Window & Rendering
    pub window: Option<Arc<Window>>,
    pub renderer: Option<Renderer>,
    pub scene: Option<Scene>,

    pub frame: FrameState,
    pub controller: CameraController,

    // Timing
    pub last_frame: Instant,
}
