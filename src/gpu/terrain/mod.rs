// ============================================
// Terrain Module - Процедурный террейн
// ============================================
// Шум -> карта высот -> сетка, которая сдвигается вслед за камерой.

pub mod generation;
pub mod mesh;
pub mod gpu;
mod settings;

pub use generation::{HeightField, HeightParams, NoiseField};
pub use mesh::{TerrainMesh, TerrainVertex};
pub use gpu::Terrain;
pub use settings::TerrainSettings;
