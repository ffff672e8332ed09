// ============================================
// Bind Groups - Раскладки и uniform-буферы объектов
// ============================================
// group 0: uniform-блок объекта (MVP, model, свет...)
// group 1: текстура объекта ("юнит 0")
// group 2: shadow map ("юнит 1")

use super::pipelines::Program;
use super::uniforms::{UniformBlock, UniformLayout};

pub struct BindGroupLayouts {
    pub object: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    pub shadow: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Shadow map читается nearest-сэмплером без сравнения:
        // сравнение глубин делает сам шейдер
        let shadow = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Map Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        Self {
            object,
            texture,
            shadow,
        }
    }
}

/// Uniform-буфер одного вызова отрисовки.
/// Каждый draw за кадр пишет в свой буфер: write_buffer применяется
/// до исполнения всего command buffer, общий буфер перезаписался бы.
pub struct ObjectBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ObjectBinding {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &UniformLayout,
        label: &str,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Uniforms", label)),
            size: uniforms.buffer_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniform BG", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group }
    }

    /// Буфер под раскладку программы; нет программы: нет и буфера
    pub fn for_program(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        program: Option<&Program>,
        label: &str,
    ) -> Option<Self> {
        program.map(|program| Self::new(device, layout, &program.uniforms, label))
    }

    pub fn write(&self, queue: &wgpu::Queue, block: &UniformBlock<'_>) {
        block.write(queue, &self.buffer);
    }
}
