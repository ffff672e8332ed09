mod buffers;
mod drawable;

pub use buffers::{needs_upload, TerrainBuffers};
pub use drawable::Terrain;
