// ============================================
// GPU Render Module - Двухпроходный рендер с тенями
// ============================================

mod uniforms;
mod shader;
mod mesh_buffers;
mod texture;
mod bind_groups;
mod pipelines;
mod depth;
mod drawable;
mod plan;
mod renderer;

pub use uniforms::{
    depth_block, lit_block, UniformBlock, UniformLayout, UniformSlot, DEPTH_UNIFORMS, LIGHT_INTENSITY,
    LIGHT_POSITION, LIGHT_SPACE_MATRIX, LIT_UNIFORMS, MODEL, MVP, SKY_UNIFORMS,
};
pub use shader::{reflect_uniforms, ShaderError, ShaderProgram};
pub use mesh_buffers::{MeshBuffers, MeshData};
pub use texture::{GpuTexture, RgbaPixels, FALLBACK_PIXEL};
pub use bind_groups::{BindGroupLayouts, ObjectBinding};
pub use pipelines::{Pipelines, Program};
pub use drawable::{model_matrix, scale_matrix, CameraMatrices, DepthContext, DrawRole, Drawable, LitContext};
pub use plan::{FramePlan, PassStep, PassVisitor};
pub use renderer::{GpuContext, InitError, Renderer};
