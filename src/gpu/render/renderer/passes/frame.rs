// ============================================
// GPU Frame - Исполнение FramePlan на GPU
// ============================================
// BeginDepth открывает depth-only проход в shadow map,
// EndDepth его закрывает (drop), после чего shadow map
// можно читать в основном проходе.

use crate::gpu::lighting::{LightFrame, ShadowMap};
use crate::gpu::render::drawable::{CameraMatrices, DepthContext, Drawable, LitContext};
use crate::gpu::render::pipelines::Pipelines;
use crate::gpu::render::plan::{PassStep, PassVisitor};

/// Цели основного прохода
pub struct MainTarget<'f> {
    pub color: &'f wgpu::TextureView,
    pub depth: &'f wgpu::TextureView,
    pub clear_color: wgpu::Color,
}

pub struct GpuFrame<'f> {
    encoder: &'f mut wgpu::CommandEncoder,
    queue: &'f wgpu::Queue,
    pipelines: &'f Pipelines,
    shadow: &'f ShadowMap,
    target: MainTarget<'f>,
    drawables: &'f [&'f dyn Drawable],
    camera: &'f CameraMatrices,
    light: &'f LightFrame,
    /// Открытый проход (глубины или основной)
    pass: Option<wgpu::RenderPass<'static>>,
}

impl<'f> GpuFrame<'f> {
    pub fn new(
        encoder: &'f mut wgpu::CommandEncoder,
        queue: &'f wgpu::Queue,
        pipelines: &'f Pipelines,
        shadow: &'f ShadowMap,
        target: MainTarget<'f>,
        drawables: &'f [&'f dyn Drawable],
        camera: &'f CameraMatrices,
        light: &'f LightFrame,
    ) -> Self {
        Self {
            encoder,
            queue,
            pipelines,
            shadow,
            target,
            drawables,
            camera,
            light,
            pass: None,
        }
    }

    fn begin_main_pass(&mut self) -> wgpu::RenderPass<'static> {
        self.encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.target.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime()
    }
}

impl PassVisitor for GpuFrame<'_> {
    fn visit(&mut self, step: PassStep) {
        match step {
            PassStep::BeginDepth => {
                self.pass = Some(self.shadow.begin_pass(self.encoder).forget_lifetime());
            }
            PassStep::Depth(index) => {
                let (Some(pass), Some(drawable)) = (self.pass.as_mut(), self.drawables.get(index)) else {
                    return;
                };
                let mut ctx = DepthContext {
                    queue: self.queue,
                    pass,
                    pipelines: self.pipelines,
                };
                drawable.render_depth(&mut ctx, &self.light.light_space);
            }
            PassStep::BeginLit => {
                let pass = self.begin_main_pass();
                self.pass = Some(pass);
            }
            PassStep::Lit(index) | PassStep::Background(index) => {
                let (Some(pass), Some(drawable)) = (self.pass.as_mut(), self.drawables.get(index)) else {
                    return;
                };
                let mut ctx = LitContext {
                    queue: self.queue,
                    pass,
                    pipelines: self.pipelines,
                    shadow_bind_group: &self.shadow.bind_group,
                };
                drawable.render(&mut ctx, self.camera, self.light);
            }
            PassStep::EndDepth | PassStep::EndLit => {
                self.pass = None;
            }
        }
    }
}
