// ============================================
// Noise Field - Детерминированный 2D шум
// ============================================
// Градиентный (Perlin) шум с таблицей перестановок,
// перемешанной от сида. Один и тот же сид даёт один и тот же
// рельеф между вызовами и между запусками процесса.

const PERM_SIZE: usize = 256;

/// 8 направлений градиента (оси + диагонали)
const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Целочисленный хеш для перемешивания таблицы
#[inline(always)]
fn hash_u32(x: u32) -> u32 {
    let n = x.wrapping_mul(374761393).wrapping_add(668265263);
    let n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    n ^ (n >> 16)
}

/// Quintic fade (6t^5 - 15t^4 + 10t^3): непрерывная вторая производная
#[inline(always)]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Когерентный 2D шум с фиксированным сидом
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    /// Удвоенная таблица перестановок, чтобы не брать остаток на каждом шаге
    perm: [u8; PERM_SIZE * 2],
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let mut table = [0u8; PERM_SIZE];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates на детерминированном хеше
        let mut state = hash_u32(seed ^ 0x9E37_79B9);
        for i in (1..PERM_SIZE).rev() {
            state = hash_u32(state.wrapping_add(i as u32));
            let j = (state % (i as u32 + 1)) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; PERM_SIZE * 2];
        for i in 0..PERM_SIZE * 2 {
            perm[i] = table[i % PERM_SIZE];
        }

        Self { seed, perm }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline(always)]
    fn corner(&self, ix: usize, iz: usize, dx: f32, dz: f32) -> f32 {
        let hash = self.perm[self.perm[ix] as usize + iz] as usize;
        let (gx, gz) = GRADIENTS[hash & 7];
        gx * dx + gz * dz
    }

    /// Значение шума в точке, всегда в диапазоне [-1, 1].
    /// В узлах целочисленной решётки шум равен нулю.
    #[inline]
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let x0 = x.floor();
        let z0 = z.floor();
        let xf = x - x0;
        let zf = z - z0;

        // `& 255` корректно заворачивает и отрицательные координаты
        let ix = (x0 as i32 & 255) as usize;
        let iz = (z0 as i32 & 255) as usize;

        let n00 = self.corner(ix, iz, xf, zf);
        let n10 = self.corner(ix + 1, iz, xf - 1.0, zf);
        let n01 = self.corner(ix, iz + 1, xf, zf - 1.0);
        let n11 = self.corner(ix + 1, iz + 1, xf - 1.0, zf - 1.0);

        let u = fade(xf);
        let v = fade(zf);

        let value = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);
        if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let a = NoiseField::new(1234);
        let b = NoiseField::new(1234);

        for i in -200..200 {
            let x = i as f32 * 0.37;
            let z = i as f32 * -0.91 + 3.3;
            assert_eq!(a.sample(x, z).to_bits(), b.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);

        let differs = (0..100).any(|i| {
            let x = i as f32 * 0.173 + 0.5;
            a.sample(x, x * 0.7) != b.sample(x, x * 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_range_and_finite() {
        let noise = NoiseField::new(99);
        for i in -500..500 {
            for j in [-3.7f32, 0.25, 11.5, 4000.125] {
                let v = noise.sample(i as f32 * 0.31, j + i as f32 * 0.07);
                assert!(v.is_finite());
                assert!((-1.0..=1.0).contains(&v), "out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_zero_on_lattice() {
        let noise = NoiseField::new(7);
        assert_eq!(noise.sample(0.0, 0.0), 0.0);
        assert_eq!(noise.sample(3.0, -7.0), 0.0);
        assert_eq!(noise.sample(-250.0, 125.0), 0.0);
    }

    #[test]
    fn test_pinned_samples_seed_1234() {
        let noise = NoiseField::new(1234);
        let cases: [(f32, f32, u32); 3] = [
            (0.375, 0.625, 0x3e47_2237),
            (-3.75, 12.25, 0x3e1e_3ac0),
            (700.5, -45.875, 0xbe09_3f00),
        ];
        for (x, z, bits) in cases {
            let v = noise.sample(x, z);
            assert_eq!(v.to_bits(), bits, "sample({}, {}) = {}", x, z, v);
        }
    }

    #[test]
    fn test_continuity() {
        let noise = NoiseField::new(42);
        let eps = 1e-3;
        for i in 0..200 {
            let x = i as f32 * 0.113 - 5.0;
            let z = i as f32 * 0.071 + 2.0;
            let d = (noise.sample(x + eps, z) - noise.sample(x, z)).abs();
            assert!(d < 0.05, "jump of {} at ({}, {})", d, x, z);
        }
    }
}
