// ============================================
// Shadow Map - GPU текстура глубины для теней
// ============================================
// Одна depth-текстура на всё время работы процесса.
// Проверка при создании фатальна: без валидной цели
// рендер-цикл не запускается.

use std::fmt;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Глубина "вне карты": всегда освещено
pub const BORDER_DEPTH: f32 = 1.0;

#[derive(Debug)]
pub enum ShadowError {
    ZeroResolution,
    ResolutionTooLarge { requested: u32, max: u32 },
    UnsupportedFormat(wgpu::TextureFormat),
    Validation(String),
}

impl fmt::Display for ShadowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowError::ZeroResolution => write!(f, "shadow map resolution is zero"),
            ShadowError::ResolutionTooLarge { requested, max } => {
                write!(f, "shadow map resolution {} exceeds device limit {}", requested, max)
            }
            ShadowError::UnsupportedFormat(format) => {
                write!(f, "depth format {:?} cannot be both rendered to and sampled", format)
            }
            ShadowError::Validation(msg) => write!(f, "shadow target validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ShadowError {}

/// Как сэмплер обрабатывает координаты вне [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// ClampToBorder с белой границей (глубина 1.0)
    Border,
    /// ClampToEdge; шейдер сам отсекает координаты вне карты
    EdgeWithGuard,
}

/// Проверка возможностей устройства до создания ресурсов
pub fn check_support(
    device_features: wgpu::Features,
    format_usages: wgpu::TextureUsages,
    max_dimension: u32,
    resolution: u32,
) -> Result<BorderMode, ShadowError> {
    if resolution == 0 {
        return Err(ShadowError::ZeroResolution);
    }
    if resolution > max_dimension {
        return Err(ShadowError::ResolutionTooLarge {
            requested: resolution,
            max: max_dimension,
        });
    }

    let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    if !format_usages.contains(required) {
        return Err(ShadowError::UnsupportedFormat(SHADOW_FORMAT));
    }

    if device_features.contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER) {
        Ok(BorderMode::Border)
    } else {
        Ok(BorderMode::EdgeWithGuard)
    }
}

/// GPU ресурсы shadow map
pub struct ShadowMap {
    /// Текстура глубины
    pub texture: wgpu::Texture,
    /// View для рендеринга в текстуру
    pub depth_view: wgpu::TextureView,
    /// View для сэмплирования в шейдере
    pub sample_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// group 2 освещённого прохода
    pub bind_group: wgpu::BindGroup,
    pub resolution: u32,
    pub border: BorderMode,
}

impl ShadowMap {
    pub fn new(
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        resolution: u32,
    ) -> Result<Self, ShadowError> {
        let border = check_support(
            device.features(),
            adapter.get_texture_format_features(SHADOW_FORMAT).allowed_usages,
            device.limits().max_texture_dimension_2d,
            resolution,
        )?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map Texture"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                 | wgpu::TextureUsages::TEXTURE_BINDING
                 | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let depth_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Depth View"),
            format: Some(SHADOW_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Sample View"),
            format: Some(SHADOW_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        let (address_mode, border_color) = match border {
            BorderMode::Border => (
                wgpu::AddressMode::ClampToBorder,
                Some(wgpu::SamplerBorderColor::OpaqueWhite),
            ),
            BorderMode::EdgeWithGuard => (wgpu::AddressMode::ClampToEdge, None),
        };

        // Nearest, без сравнения и без PCF
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Map Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            border_color,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Map BG"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sample_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShadowError::Validation(err.to_string()));
        }

        log::info!("Shadow map {}x{} ready ({:?})", resolution, resolution, border);

        Ok(Self {
            texture,
            depth_view,
            sample_view,
            sampler,
            bind_group,
            resolution,
            border,
        })
    }

    /// Начать depth-only проход в shadow map (очистка до 1.0).
    /// Завершение прохода = drop возвращённого RenderPass.
    pub fn begin_pass<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BORDER_DEPTH),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGES: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
        .union(wgpu::TextureUsages::TEXTURE_BINDING)
        .union(wgpu::TextureUsages::COPY_SRC);

    #[test]
    fn test_border_mode_follows_features() {
        let with_border = check_support(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER, USAGES, 8192, 4096);
        assert_eq!(with_border.unwrap(), BorderMode::Border);

        let without = check_support(wgpu::Features::empty(), USAGES, 8192, 4096);
        assert_eq!(without.unwrap(), BorderMode::EdgeWithGuard);
    }

    #[test]
    fn test_resolution_limits() {
        assert!(matches!(
            check_support(wgpu::Features::empty(), USAGES, 2048, 4096),
            Err(ShadowError::ResolutionTooLarge { requested: 4096, max: 2048 })
        ));
        assert!(matches!(
            check_support(wgpu::Features::empty(), USAGES, 8192, 0),
            Err(ShadowError::ZeroResolution)
        ));
        assert!(check_support(wgpu::Features::empty(), USAGES, 4096, 4096).is_ok());
    }

    #[test]
    fn test_format_must_be_renderable_and_sampleable() {
        let result = check_support(
            wgpu::Features::empty(),
            wgpu::TextureUsages::TEXTURE_BINDING,
            8192,
            1024,
        );
        assert!(matches!(result, Err(ShadowError::UnsupportedFormat(f)) if f == SHADOW_FORMAT));
    }
}
