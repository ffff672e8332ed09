// ============================================
// Terrain Buffers - Буферы сетки на GPU
// ============================================
// Индексы загружаются один раз. После ретайлинга
// перезаписывается только содержимое вершинного буфера.

use wgpu::util::DeviceExt;

use crate::gpu::terrain::mesh::TerrainMesh;

/// Нужна ли повторная загрузка вершин
#[inline]
pub fn needs_upload(uploaded_revision: u64, mesh_revision: u64) -> bool {
    uploaded_revision != mesh_revision
}

pub struct TerrainBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    uploaded_revision: u64,
}

impl TerrainBuffers {
    pub fn new(device: &wgpu::Device, mesh: &TerrainMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertices"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Indices"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices().len() as u32,
            uploaded_revision: mesh.revision(),
        }
    }

    /// Перезалить вершины, если сетка сдвинулась. true = была загрузка.
    pub fn sync(&mut self, queue: &wgpu::Queue, mesh: &TerrainMesh) -> bool {
        if !needs_upload(self.uploaded_revision, mesh.revision()) {
            return false;
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(mesh.vertices()));
        self.uploaded_revision = mesh.revision();
        true
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        self.bind(pass);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
