// ============================================
// Texture - Загрузка текстур объектов
// ============================================
// Декодирование через `image`, загрузка в RGBA8 sRGB.
// Битая или отсутствующая картинка не фатальна: пишем в лог
// и подставляем текстуру 1x1, которая всегда привязываема.

use std::path::Path;

use wgpu::util::DeviceExt;

/// Пиксель текстуры-заглушки
pub const FALLBACK_PIXEL: [u8; 4] = [255, 255, 255, 255];

/// Декодированная картинка, готовая к загрузке
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaPixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaPixels {
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: rgba.to_vec(),
        }
    }

    pub fn decode(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            data: img.into_raw(),
        })
    }

    /// Декодировать или вернуть заглушку (с предупреждением)
    pub fn decode_or_fallback(path: &Path) -> (Self, bool) {
        match Self::decode(path) {
            Ok(pixels) if pixels.width > 0 && pixels.height > 0 => (pixels, false),
            Ok(_) => {
                log::warn!("Texture {:?} is empty, using fallback", path);
                (Self::solid(FALLBACK_PIXEL), true)
            }
            Err(e) => {
                log::warn!("Failed to load texture {:?}: {}, using fallback", path, e);
                (Self::solid(FALLBACK_PIXEL), true)
            }
        }
    }
}

/// Текстура + сэмплер + bind group (группа 1, "юнит 0")
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub is_fallback: bool,
}

impl GpuTexture {
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        pixels: &RgbaPixels,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: pixels.width,
                    height: pixels.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels.data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} BG", label)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
            is_fallback: false,
        }
    }

    /// Однотонная текстура 1x1 (дерево, заглушка)
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        rgba: [u8; 4],
    ) -> Self {
        Self::from_pixels(
            device,
            queue,
            layout,
            label,
            &RgbaPixels::solid(rgba),
            wgpu::AddressMode::Repeat,
        )
    }

    /// Загрузить с диска, при ошибке: заглушка 1x1
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: &Path,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let (pixels, is_fallback) = RgbaPixels::decode_or_fallback(path);
        let label = path.display().to_string();
        let mut texture = Self::from_pixels(device, queue, layout, &label, &pixels, address_mode);
        texture.is_fallback = is_fallback;

        if !is_fallback {
            log::info!("Loaded texture {:?} ({}x{})", path, pixels.width, pixels.height);
        }
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back() {
        let path = Path::new("definitely/not/here/grass.png");
        assert!(RgbaPixels::decode(path).is_err());

        let (pixels, is_fallback) = RgbaPixels::decode_or_fallback(path);
        assert!(is_fallback);
        assert_eq!((pixels.width, pixels.height), (1, 1));
        assert_eq!(pixels.data, FALLBACK_PIXEL.to_vec());
    }

    #[test]
    fn test_decode_roundtrip_through_png() {
        let dir = std::env::temp_dir().join("celt_texture_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.png");

        let img = image::RgbaImage::from_fn(4, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        img.save(&path).unwrap();

        let pixels = RgbaPixels::decode(&path).unwrap();
        assert_eq!((pixels.width, pixels.height), (4, 2));
        assert_eq!(pixels.data.len(), 4 * 2 * 4);
        assert_eq!(&pixels.data[0..4], &[255, 0, 0, 255]);
        assert_eq!(&pixels.data[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = std::env::temp_dir().join("celt_texture_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let (_, is_fallback) = RgbaPixels::decode_or_fallback(&path);
        assert!(is_fallback);
    }
}
