// ============================================
// Lighting Module - Точечный свет и shadow map
// ============================================
// Один источник света, одна карта глубины 4096x4096,
// матрица пространства света пересчитывается каждый кадр.

mod light;
mod shadow_map;
mod snapshot;

pub use light::{light_space_matrix, LightFrame, LightSettings, ShadowSettings};
pub use shadow_map::{check_support, BorderMode, ShadowError, ShadowMap, BORDER_DEPTH, SHADOW_FORMAT};
pub use snapshot::{depth_to_gray, DepthSnapshot, SnapshotError, SNAPSHOT_FILE};
