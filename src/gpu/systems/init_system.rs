// ============================================
// Init System - Инициализация приложения
// ============================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

use crate::gpu::core::{AppResources, FrameState, SceneConfig, CONFIG_FILE};
use crate::gpu::lighting::LightFrame;
use crate::gpu::player::{Camera, CameraController};
use crate::gpu::render::{InitError, Renderer};
use crate::gpu::scene::Scene;

/// Система инициализации
pub struct InitSystem;

impl InitSystem {
    /// Конфигурация и состояние кадра (до создания окна)
    pub fn create_resources() -> AppResources {
        let config = SceneConfig::load_or_default(Path::new(CONFIG_FILE));

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = Camera::new(&config.camera, aspect);
        let light = LightFrame::new(&config.light, &config.shadow);

        AppResources {
            frame: FrameState::new(camera, light, &config.animation),
            controller: CameraController::new(&config.camera),
            window: None,
            renderer: None,
            scene: None,
            last_frame: Instant::now(),
            config,
        }
    }

    /// GPU и сцена (вызывается при resumed). Ошибка фатальна.
    pub fn init_rendering(resources: &mut AppResources, window: Arc<Window>) -> Result<(), InitError> {
        let renderer = pollster::block_on(Renderer::new(window.clone(), &resources.config.shadow))?;

        let mut scene = Scene::new(
            renderer.device(),
            renderer.queue(),
            renderer.layouts(),
            renderer.pipelines(),
            &resources.config,
        );

        // Загрузчика мешей нет: места остаются пустыми, пока хост не передаст меш
        let placements = &resources.config.characters;
        let attached = scene.attach_configured(placements, |_, _| None);
        if attached < placements.len() {
            log::info!(
                "{} of {} character placements have no skinned mesh attached",
                placements.len() - attached,
                placements.len()
            );
        }

        let size = renderer.size();
        resources.frame.camera.set_aspect(size.width, size.height);
        resources.window = Some(window);
        resources.renderer = Some(renderer);
        resources.scene = Some(scene);
        resources.last_frame = Instant::now();
        Ok(())
    }
}
