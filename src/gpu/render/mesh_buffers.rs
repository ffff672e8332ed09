// ============================================
// Mesh Buffers - Раздельные вершинные потоки
// ============================================
// Общая утилита для коробок (здание, паб, дерево, скайбокс):
// позиции, цвета, UV и нормали лежат в отдельных буферах,
// по одному атрибуту на слот. Проход глубины привязывает только слот 0.

use std::ops::Range;

use wgpu::util::DeviceExt;

/// Слоты = shader locations: 0 позиция, 1 цвет, 2 UV, 3 нормаль
pub const POSITION_SLOT: u32 = 0;
pub const COLOR_SLOT: u32 = 1;
pub const UV_SLOT: u32 = 2;
pub const NORMAL_SLOT: u32 = 3;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

fn stream(stride: usize, attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: stride as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Только позиция (проход глубины)
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    stream(std::mem::size_of::<[f32; 3]>(), &POSITION_ATTRIBUTES)
}

/// Все четыре потока (освещённый проход и скайбокс)
pub fn stream_layouts() -> [wgpu::VertexBufferLayout<'static>; 4] {
    [
        position_layout(),
        stream(std::mem::size_of::<[f32; 3]>(), &COLOR_ATTRIBUTES),
        stream(std::mem::size_of::<[f32; 2]>(), &UV_ATTRIBUTES),
        stream(std::mem::size_of::<[f32; 3]>(), &NORMAL_ATTRIBUTES),
    ]
}

/// CPU-геометрия до загрузки
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Все потоки одной длины и индексы в пределах
    pub fn is_consistent(&self) -> bool {
        let n = self.vertex_count();
        self.colors.len() == n
            && self.uvs.len() == n
            && self.normals.len() == n
            && self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Перекрасить все вершины
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.colors = vec![color; self.positions.len()];
        self
    }
}

/// Обрезать диапазон индексов по фактическому количеству
pub fn clamp_range(range: Range<u32>, index_count: u32) -> Range<u32> {
    let end = range.end.min(index_count);
    let start = range.start.min(end);
    start..end
}

/// GPU буферы меша
pub struct MeshBuffers {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    uvs: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        if !data.is_consistent() {
            log::warn!("{}: vertex streams have mismatched lengths", label);
        }

        let vertex = |name: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} {}", label, name)),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let positions = vertex("Positions", bytemuck::cast_slice(&data.positions));
        let colors = vertex("Colors", bytemuck::cast_slice(&data.colors));
        let uvs = vertex("UVs", bytemuck::cast_slice(&data.uvs));
        let normals = vertex("Normals", bytemuck::cast_slice(&data.normals));

        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            positions,
            colors,
            uvs,
            normals,
            indices,
            index_count: data.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn bind_positions(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(POSITION_SLOT, self.positions.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn bind_all(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(POSITION_SLOT, self.positions.slice(..));
        pass.set_vertex_buffer(COLOR_SLOT, self.colors.slice(..));
        pass.set_vertex_buffer(UV_SLOT, self.uvs.slice(..));
        pass.set_vertex_buffer(NORMAL_SLOT, self.normals.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.draw_range(pass, 0..self.index_count);
    }

    /// Нарисовать поддиапазон индексов (буферы уже привязаны)
    pub fn draw_range(&self, pass: &mut wgpu::RenderPass<'_>, range: Range<u32>) {
        let range = clamp_range(range, self.index_count);
        if !range.is_empty() {
            pass.draw_indexed(range, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(0..6, 36), 0..6);
        assert_eq!(clamp_range(6..36, 36), 6..36);
        assert_eq!(clamp_range(6..40, 36), 6..36);
        assert_eq!(clamp_range(50..60, 36), 36..36);
        assert!(clamp_range(0..6, 0).is_empty());
    }

    #[test]
    fn test_consistency() {
        let mut data = MeshData {
            positions: vec![[0.0; 3]; 3],
            colors: vec![[1.0; 3]; 3],
            uvs: vec![[0.0; 2]; 3],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            indices: vec![0, 1, 2],
        };
        assert!(data.is_consistent());

        data.indices.push(3);
        assert!(!data.is_consistent());

        data.indices.pop();
        data.uvs.pop();
        assert!(!data.is_consistent());
    }

    #[test]
    fn test_stream_layouts_match_locations() {
        let layouts = stream_layouts();
        for (slot, layout) in layouts.iter().enumerate() {
            assert_eq!(layout.attributes.len(), 1);
            assert_eq!(layout.attributes[0].shader_location, slot as u32);
            assert_eq!(layout.attributes[0].offset, 0);
        }
        assert_eq!(layouts[UV_SLOT as usize].array_stride, 8);
        assert_eq!(position_layout().array_stride, 12);
    }
}
