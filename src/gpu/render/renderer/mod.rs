pub mod core;
mod passes;

use std::path::Path;
use std::sync::Arc;

use crate::gpu::lighting::{DepthSnapshot, LightFrame, ShadowMap, ShadowSettings, SnapshotError};
use crate::gpu::render::bind_groups::BindGroupLayouts;
use crate::gpu::render::depth::create_depth_texture;
use crate::gpu::render::drawable::{CameraMatrices, Drawable};
use crate::gpu::render::pipelines::Pipelines;
use crate::gpu::render::plan::FramePlan;

pub use self::core::{GpuContext, InitError};
use passes::{GpuFrame, MainTarget};

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

pub struct Renderer {
    context: GpuContext,
    layouts: BindGroupLayouts,
    pipelines: Pipelines,
    shadow: ShadowMap,
    depth_texture: wgpu::TextureView,
}

impl Renderer {
    /// GPU, раскладки, программы и shadow map. Ошибка shadow map фатальна.
    pub async fn new(window: Arc<winit::window::Window>, shadow_settings: &ShadowSettings) -> Result<Self, InitError> {
        let context = self::core::init_gpu(window).await?;

        let layouts = BindGroupLayouts::new(&context.device);
        let pipelines = Pipelines::new(&context.device, context.config.format, &layouts);
        let shadow = ShadowMap::new(&context.adapter, &context.device, &layouts.shadow, shadow_settings.resolution)?;
        let depth_texture = create_depth_texture(&context.device, &context.config);

        Ok(Self {
            context,
            layouts,
            pipelines,
            shadow,
            depth_texture,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.context.resize(new_size) {
            self.depth_texture = create_depth_texture(&self.context.device, &self.context.config);
        }
    }

    /// Кадр: проход глубины, затем основной проход, фон последним
    pub fn render(
        &mut self,
        drawables: &[&dyn Drawable],
        camera: &CameraMatrices,
        light: &LightFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.context.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let plan = FramePlan::build(drawables.iter().map(|d| d.role()));
        {
            let mut frame = GpuFrame::new(
                &mut encoder,
                &self.context.queue,
                &self.pipelines,
                &self.shadow,
                MainTarget {
                    color: &view,
                    depth: &self.depth_texture,
                    clear_color: CLEAR_COLOR,
                },
                drawables,
                camera,
                light,
            );
            plan.run(&mut frame);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Сохранить shadow map последнего кадра в PNG
    pub fn save_depth_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        DepthSnapshot::capture(&self.context.device, &self.context.queue, &self.shadow)?.save_png(path)
    }

    /// Перенастройка surface после Lost/Outdated
    pub fn reconfigure(&self) {
        self.context.reconfigure();
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.context.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn layouts(&self) -> &BindGroupLayouts {
        &self.layouts
    }

    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }
}
