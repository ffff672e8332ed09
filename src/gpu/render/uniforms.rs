// ============================================
// Uniforms - Именованные uniform-переменные
// ============================================
// Раскладка uniform-блока берётся из шейдера (см. shader.rs),
// а не из #[repr(C)] структуры: объект пишет значения по имени,
// отсутствующие в шейдере имена молча пропускаются.

use std::collections::HashMap;

use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;

pub const MVP: &str = "MVP";
pub const MODEL: &str = "model";
pub const LIGHT_POSITION: &str = "lightPosition";
pub const LIGHT_INTENSITY: &str = "lightIntensity";
pub const LIGHT_SPACE_MATRIX: &str = "lightSpaceMatrix";

/// Uniform-контракт освещённого прохода
pub const LIT_UNIFORMS: [&str; 5] = [MVP, MODEL, LIGHT_POSITION, LIGHT_INTENSITY, LIGHT_SPACE_MATRIX];
/// Uniform-контракт прохода глубины
pub const DEPTH_UNIFORMS: [&str; 2] = [MODEL, LIGHT_SPACE_MATRIX];
/// Uniform-контракт скайбокса
pub const SKY_UNIFORMS: [&str; 1] = [MVP];

/// Минимальный размер uniform-буфера (пустой блок всё равно должен быть привязываемым)
pub const MIN_UNIFORM_SIZE: u64 = 16;

/// Положение одного члена в uniform-блоке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u32,
    pub size: u32,
}

/// Кэш "имя -> смещение" для uniform-блока программы
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    size: u32,
    slots: HashMap<String, UniformSlot>,
}

impl UniformLayout {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            slots: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, offset: u32, size: u32) {
        self.slots.insert(name.into(), UniformSlot { offset, size });
    }

    pub fn with_slot(mut self, name: &str, offset: u32, size: u32) -> Self {
        self.insert(name, offset, size);
        self
    }

    /// Размер блока в байтах (span структуры)
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Размер GPU-буфера под этот блок
    pub fn buffer_size(&self) -> u64 {
        (self.size as u64).max(MIN_UNIFORM_SIZE)
    }

    pub fn slot(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Имена из контракта, которых нет в шейдере
    pub fn missing<'n>(&self, names: &[&'n str]) -> Vec<&'n str> {
        names.iter().copied().filter(|n| !self.contains(n)).collect()
    }

    pub fn block(&self) -> UniformBlock<'_> {
        UniformBlock {
            layout: self,
            data: vec![0u8; self.buffer_size() as usize],
        }
    }
}

/// CPU staging для одного uniform-буфера
pub struct UniformBlock<'l> {
    layout: &'l UniformLayout,
    data: Vec<u8>,
}

impl<'l> UniformBlock<'l> {
    /// Записать сырые байты в член `name`. false, если имени нет или размер не влезает.
    pub fn set_bytes(&mut self, name: &str, bytes: &[u8]) -> bool {
        let Some(slot) = self.layout.slot(name) else {
            return false;
        };
        if bytes.len() > slot.size as usize {
            log::debug!("Uniform '{}' too small: {} > {}", name, bytes.len(), slot.size);
            return false;
        }
        let start = slot.offset as usize;
        let end = start + bytes.len();
        if end > self.data.len() {
            return false;
        }
        self.data[start..end].copy_from_slice(bytes);
        true
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) -> bool {
        let cols: [[f32; 4]; 4] = (*value).into();
        self.set_bytes(name, bytemuck::cast_slice(&cols))
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> bool {
        let v: [f32; 3] = value.into();
        self.set_bytes(name, bytemuck::cast_slice(&v))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn write(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, &self.data);
    }
}

/// Заполнить блок освещённого прохода
pub fn lit_block<'l>(
    layout: &'l UniformLayout,
    mvp: &Mat4,
    model: &Mat4,
    light: &LightFrame,
) -> UniformBlock<'l> {
    let mut block = layout.block();
    block.set_mat4(MVP, mvp);
    block.set_mat4(MODEL, model);
    block.set_mat4(LIGHT_SPACE_MATRIX, &light.light_space);
    block.set_vec3(LIGHT_POSITION, light.position);
    block.set_vec3(LIGHT_INTENSITY, light.intensity);
    block
}

/// Заполнить блок прохода глубины
pub fn depth_block<'l>(layout: &'l UniformLayout, model: &Mat4, light_space: &Mat4) -> UniformBlock<'l> {
    let mut block = layout.block();
    block.set_mat4(MODEL, model);
    block.set_mat4(LIGHT_SPACE_MATRIX, light_space);
    block
}
