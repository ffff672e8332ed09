// ============================================
// Height Field - Высота и нормали террейна
// ============================================
// FBM: несколько октав шума с удвоением частоты и
// затуханием амплитуды, нормировка на сумму амплитуд.

use serde::Deserialize;
use ultraviolet::Vec3;

use super::noise::NoiseField;

/// Параметры фрактальной суммы
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeightParams {
    /// Количество октав
    pub octaves: u32,
    /// Начальная частота
    pub scale: f32,
    /// Множитель амплитуды на каждую октаву
    pub persistence: f32,
    /// Начальная амплитуда
    pub amplitude: f32,
    /// Вертикальное преувеличение после нормировки
    pub exaggeration: f32,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            scale: 0.03,
            persistence: 0.5,
            amplitude: 18.0,
            exaggeration: 12.0,
        }
    }
}

/// Карта высот поверх детерминированного шума
#[derive(Debug, Clone)]
pub struct HeightField {
    noise: NoiseField,
    params: HeightParams,
}

impl HeightField {
    pub fn new(seed: u32, params: HeightParams) -> Self {
        Self {
            noise: NoiseField::new(seed),
            params,
        }
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Высота в произвольной точке (координаты не ограничены)
    #[inline]
    pub fn elevation(&self, x: f32, z: f32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = self.params.amplitude;
        let mut frequency = self.params.scale;
        let mut max_value = 0.0;

        for _ in 0..self.params.octaves {
            value += self.noise.sample(x * frequency, z * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.params.persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        value / max_value * self.params.exaggeration
    }

    /// Нормаль центральными разностями по соседям на расстоянии 1
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let height_l = self.elevation(x - 1.0, z);
        let height_r = self.elevation(x + 1.0, z);
        let height_d = self.elevation(x, z - 1.0);
        let height_u = self.elevation(x, z + 1.0);

        let tangent_x = Vec3::new(2.0, height_r - height_l, 0.0);
        let tangent_z = Vec3::new(0.0, height_u - height_d, 2.0);
        let normal = tangent_z.cross(tangent_x);

        let len = normal.mag();
        if !len.is_finite() || len <= f32::EPSILON {
            return Vec3::unit_y();
        }
        normal / len
    }
}
