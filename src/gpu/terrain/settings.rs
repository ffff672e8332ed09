use serde::Deserialize;

use super::generation::HeightParams;

/// Раздел "terrain" файла сцены
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Вершин по X
    pub width: u32,
    /// Вершин по Z
    pub height: u32,
    pub seed: u32,
    pub params: HeightParams,
    pub texture: String,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            seed: 1234,
            params: HeightParams::default(),
            texture: "textures/Grass_01.png".to_string(),
        }
    }
}
