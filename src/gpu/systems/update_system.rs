// ============================================
// Update System - Обновление состояния кадра
// ============================================

use crate::gpu::core::AppResources;
use crate::gpu::lighting::LightFrame;

/// Система обновления
pub struct UpdateSystem;

impl UpdateSystem {
    /// 1. время  2. террейн вокруг камеры и персонажи  3. свет
    pub fn update(resources: &mut AppResources, dt: f32) {
        resources.frame.advance(dt);

        if let (Some(scene), Some(renderer)) = (&mut resources.scene, &resources.renderer) {
            scene.update(renderer.queue(), &resources.frame);
        }

        resources.frame.light = LightFrame::new(&resources.config.light, &resources.config.shadow);
    }
}
