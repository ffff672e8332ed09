// ============================================
// Core Module - Приложение, конфигурация, состояние кадра
// ============================================

pub mod app;
mod resources;
mod config;

pub use app::{run, App};
pub use resources::{AppResources, FrameState};
pub use config::{AnimationSettings, ConfigError, SceneConfig, WindowSettings, CONFIG_FILE};
