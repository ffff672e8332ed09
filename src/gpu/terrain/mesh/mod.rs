mod vertex;
mod grid;

pub use vertex::TerrainVertex;
pub use grid::TerrainMesh;
