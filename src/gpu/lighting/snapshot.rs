// ============================================
// Depth Snapshot - Чтение shadow map на CPU
// ============================================
// Отладка: копируем depth-текстуру в буфер, ждём map_async
// и сохраняем в 8-битный PNG (пиксель = round(depth * 255)).

use std::fmt;
use std::path::Path;

use super::shadow_map::{ShadowMap, BORDER_DEPTH};

pub const SNAPSHOT_FILE: &str = "depth_map.png";

#[derive(Debug)]
pub enum SnapshotError {
    Map(String),
    Poll(String),
    SizeMismatch { expected: usize, actual: usize },
    Image(image::ImageError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Map(msg) => write!(f, "failed to map readback buffer: {}", msg),
            SnapshotError::Poll(msg) => write!(f, "device poll failed: {}", msg),
            SnapshotError::SizeMismatch { expected, actual } => {
                write!(f, "depth data has {} texels, expected {}", actual, expected)
            }
            SnapshotError::Image(e) => write!(f, "failed to write image: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::Image(e)
    }
}

/// Строка при копировании текстуры в буфер выравнивается до 256 байт
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * std::mem::size_of::<f32>() as u32;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Глубина в 8-битный серый
#[inline]
pub fn depth_to_gray(depth: f32) -> u8 {
    if !depth.is_finite() {
        return 255;
    }
    (depth.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Копия shadow map в памяти
#[derive(Debug, Clone, PartialEq)]
pub struct DepthSnapshot {
    width: u32,
    height: u32,
    depths: Vec<f32>,
}

impl DepthSnapshot {
    pub fn from_depths(width: u32, height: u32, depths: Vec<f32>) -> Result<Self, SnapshotError> {
        let expected = width as usize * height as usize;
        if depths.len() != expected {
            return Err(SnapshotError::SizeMismatch {
                expected,
                actual: depths.len(),
            });
        }
        Ok(Self { width, height, depths })
    }

    /// Собрать глубины из буфера с выровненными строками
    pub fn from_padded_rows(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SnapshotError> {
        let padded = padded_bytes_per_row(width) as usize;
        let row_bytes = width as usize * 4;
        let mut depths = Vec::with_capacity(width as usize * height as usize);

        for row in 0..height as usize {
            let start = row * padded;
            let Some(row_data) = bytes.get(start..start + row_bytes) else {
                return Err(SnapshotError::SizeMismatch {
                    expected: width as usize * height as usize,
                    actual: depths.len(),
                });
            };
            depths.extend(
                row_data
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }

        Self::from_depths(width, height, depths)
    }

    /// Прочитать текущее содержимое shadow map (блокирует до готовности GPU)
    pub fn capture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shadow: &ShadowMap,
    ) -> Result<Self, SnapshotError> {
        let size = shadow.resolution;
        let padded = padded_bytes_per_row(size);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Depth Snapshot Buffer"),
            size: padded as u64 * size as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Depth Snapshot Encoder"),
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &shadow.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(size),
                },
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );

        queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| SnapshotError::Poll(e.to_string()))?;

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(SnapshotError::Map(e.to_string())),
            Err(e) => return Err(SnapshotError::Map(e.to_string())),
        }

        let snapshot = {
            let data = slice.get_mapped_range();
            Self::from_padded_rows(size, size, &data)
        };
        buffer.unmap();

        snapshot
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    /// Nearest-выборка как у шейдера; вне [0, 1]: глубина границы (1.0)
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) || self.depths.is_empty() {
            return BORDER_DEPTH;
        }
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.depths[(y * self.width + x) as usize]
    }

    pub fn to_gray(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([depth_to_gray(self.depths[(y * self.width + x) as usize])])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), SnapshotError> {
        self.to_gray().save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Depth map saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> DepthSnapshot {
        // 4x2: глубина растёт слева направо
        let depths = vec![0.0, 0.25, 0.5, 0.75, 0.1, 0.35, 0.6, 0.85];
        DepthSnapshot::from_depths(4, 2, depths).unwrap()
    }

    #[test]
    fn test_sample_outside_returns_border() {
        let snap = gradient();
        assert_eq!(snap.sample(-0.01, 0.5), 1.0);
        assert_eq!(snap.sample(0.5, 1.5), 1.0);
        assert_eq!(snap.sample(2.0, -3.0), 1.0);
        assert_eq!(snap.sample(f32::NAN, 0.5), 1.0);
    }

    #[test]
    fn test_sample_inside_is_nearest() {
        let snap = gradient();
        assert_eq!(snap.sample(0.0, 0.0), 0.0);
        assert_eq!(snap.sample(0.3, 0.2), 0.25);
        assert_eq!(snap.sample(1.0, 1.0), 0.85);
        assert_eq!(snap.sample(0.55, 0.9), 0.6);
    }

    #[test]
    fn test_gray_mapping() {
        assert_eq!(depth_to_gray(0.0), 0);
        assert_eq!(depth_to_gray(1.0), 255);
        assert_eq!(depth_to_gray(0.5), 128);
        assert_eq!(depth_to_gray(2.0), 255);
        assert_eq!(depth_to_gray(-1.0), 0);
    }

    #[test]
    fn test_padded_rows() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(4096), 16384);

        // Ширина 2: 8 полезных байт + 248 байт выравнивания на строку
        let mut bytes = vec![0xAAu8; 256 * 2];
        for (row, values) in [[0.1f32, 0.2], [0.3, 0.4]].iter().enumerate() {
            for (col, v) in values.iter().enumerate() {
                let at = row * 256 + col * 4;
                bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
            }
        }
        let snap = DepthSnapshot::from_padded_rows(2, 2, &bytes).unwrap();
        assert_eq!(snap.depths(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            DepthSnapshot::from_depths(3, 3, vec![0.0; 8]),
            Err(SnapshotError::SizeMismatch { expected: 9, actual: 8 })
        ));
        assert!(DepthSnapshot::from_padded_rows(2, 2, &[0u8; 100]).is_err());
    }

    #[test]
    fn test_save_png() {
        let dir = std::env::temp_dir().join("celt_snapshot_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SNAPSHOT_FILE);

        gradient().save_png(&path).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(2, 0).0[0], 128);
        assert_eq!(img.get_pixel(3, 1).0[0], depth_to_gray(0.85));
    }
}
