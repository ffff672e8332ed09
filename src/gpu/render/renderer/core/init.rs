use std::fmt;
use std::sync::Arc;

use crate::gpu::lighting::ShadowError;

use super::state::GpuContext;

/// Фатальные ошибки запуска: рендер-цикл не стартует
#[derive(Debug)]
pub enum InitError {
    Surface(wgpu::CreateSurfaceError),
    Adapter(wgpu::RequestAdapterError),
    Device(wgpu::RequestDeviceError),
    NoSurfaceFormat,
    Shadow(ShadowError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Surface(e) => write!(f, "failed to create surface: {}", e),
            InitError::Adapter(e) => write!(f, "no suitable GPU adapter: {}", e),
            InitError::Device(e) => write!(f, "failed to create device: {}", e),
            InitError::NoSurfaceFormat => write!(f, "surface reports no supported formats"),
            InitError::Shadow(e) => write!(f, "shadow map setup failed: {}", e),
        }
    }
}

impl std::error::Error for InitError {}

impl From<wgpu::CreateSurfaceError> for InitError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        InitError::Surface(e)
    }
}

impl From<wgpu::RequestAdapterError> for InitError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        InitError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for InitError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        InitError::Device(e)
    }
}

impl From<ShadowError> for InitError {
    fn from(e: ShadowError) -> Self {
        InitError::Shadow(e)
    }
}

/// Фичи, которые берём, если адаптер их умеет
pub fn optional_features(available: wgpu::Features) -> wgpu::Features {
    available & wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER
}

/// Инициализация GPU устройства и surface
pub async fn init_gpu(window: Arc<winit::window::Window>) -> Result<GpuContext, InitError> {
    let size = window.inner_size();
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance.create_surface(window)?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await?;

    let info = adapter.get_info();
    log::info!("Adapter: {} ({:?})", info.name, info.backend);

    let required_features = optional_features(adapter.features());
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("GPU Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;

    let device = Arc::new(device);
    let queue = Arc::new(queue);

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or(InitError::NoSurfaceFormat)?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    Ok(GpuContext {
        surface,
        adapter,
        device,
        queue,
        config,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_feature_requested_only_when_available() {
        let all = wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER | wgpu::Features::DEPTH_CLIP_CONTROL;
        assert_eq!(optional_features(all), wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        assert_eq!(optional_features(wgpu::Features::empty()), wgpu::Features::empty());
    }

    #[test]
    fn test_shadow_error_is_wrapped() {
        let err: InitError = ShadowError::ZeroResolution.into();
        assert!(matches!(err, InitError::Shadow(ShadowError::ZeroResolution)));
        assert!(err.to_string().starts_with("shadow map setup failed"));
    }
}
