// ============================================
// Terrain Vertex - Структура вершины
// ============================================
// Раскладка атрибутов общая для всех объектов сцены:
// 0 = позиция, 1 = цвет (у террейна не используется), 2 = UV, 3 = нормаль

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

const NORMAL_OFFSET: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
const UV_OFFSET: wgpu::BufferAddress = std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress;

const LIT_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: UV_OFFSET,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: NORMAL_OFFSET,
        shader_location: 3,
        format: wgpu::VertexFormat::Float32x3,
    },
];

const DEPTH_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 0,
    format: wgpu::VertexFormat::Float32x3,
}];

impl TerrainVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }

    /// Полная раскладка для освещённого прохода
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LIT_ATTRIBUTES,
        }
    }

    /// Только позиция: для прохода глубины (тот же буфер, тот же stride)
    pub fn position_desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &DEPTH_ATTRIBUTES,
        }
    }
}
