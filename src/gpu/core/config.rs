// ============================================
// Config - Конфигурация сцены (scene.json)
// ============================================
// Каждый раздел необязателен: отсутствующие поля берутся по умолчанию.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::gpu::lighting::{LightSettings, ShadowSettings};
use crate::gpu::player::CameraSettings;
use crate::gpu::scene::{
    default_buildings, default_characters, BuildingSettings, Placement, SkyboxSettings, TreeSettings,
};
use crate::gpu::terrain::TerrainSettings;

/// Файл конфигурации в рабочей директории
pub const CONFIG_FILE: &str = "scene.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Terrain and Buildings".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub playing: bool,
    pub playback_speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            playing: true,
            playback_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowSettings,
    pub terrain: TerrainSettings,
    pub shadow: ShadowSettings,
    pub light: LightSettings,
    pub camera: CameraSettings,
    pub buildings: Vec<BuildingSettings>,
    pub trees: Vec<TreeSettings>,
    /// Места персонажей; меши прикрепляются через `Scene::attach_configured`
    pub characters: Vec<Placement>,
    pub skybox: SkyboxSettings,
    pub animation: AnimationSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            terrain: TerrainSettings::default(),
            shadow: ShadowSettings::default(),
            light: LightSettings::default(),
            camera: CameraSettings::default(),
            buildings: default_buildings(),
            trees: vec![TreeSettings::default()],
            characters: default_characters(),
            skybox: SkyboxSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Нет файла: конфигурация по умолчанию
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No {:?}, using default scene", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Битый файл не мешает запуску
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:?}: {}; using default scene", path, e);
                Self::default()
            }
        }
    }
}
