// ============================================
// Render System - Система рендеринга
// ============================================

use std::path::Path;

use winit::event_loop::ActiveEventLoop;

use crate::gpu::core::AppResources;
use crate::gpu::lighting::SNAPSHOT_FILE;

/// Система рендеринга
pub struct RenderSystem;

impl RenderSystem {
    pub fn render(resources: &mut AppResources, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(scene)) = (&mut resources.renderer, &resources.scene) else {
            return;
        };

        let camera = resources.frame.camera.matrices();
        let drawables = scene.drawables();

        match renderer.render(&drawables, &camera, &resources.frame.light) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    /// Снимок shadow map в depth_map.png
    pub fn save_depth_snapshot(resources: &AppResources) {
        let Some(renderer) = &resources.renderer else { return };
        if let Err(e) = renderer.save_depth_snapshot(Path::new(SNAPSHOT_FILE)) {
            log::error!("Depth snapshot failed: {}", e);
        }
    }
}
