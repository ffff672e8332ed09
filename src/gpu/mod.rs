// ============================================
// GPU Module - Террейн, здания и тени на wgpu
// ============================================
// Двухпроходный рендер: глубина от света, затем сцена с тенями.

pub mod terrain;
pub mod lighting;
pub mod render;
pub mod scene;
pub mod player;

pub mod core;
pub mod systems;

pub use self::core::app::run;
