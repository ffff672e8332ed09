// ============================================
// Input System - Обработка клавиатуры
// ============================================

use winit::{event::ElementState, keyboard::KeyCode};

use crate::gpu::core::AppResources;

/// Действия, которые выполняет приложение, а не камера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Exit,
    SaveDepthSnapshot,
    ToggleAnimation,
}

/// Система обработки клавиатуры
pub struct InputSystem;

impl InputSystem {
    /// Нажатие и автоповтор двигают камеру; отпускание игнорируется
    pub fn process_keyboard(
        resources: &mut AppResources,
        keycode: KeyCode,
        state: ElementState,
    ) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match keycode {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyP => Some(InputAction::SaveDepthSnapshot),
            KeyCode::Space => {
                let playing = resources.frame.toggle_playback();
                log::info!("Animation {}", if playing { "resumed" } else { "paused" });
                Some(InputAction::ToggleAnimation)
            }
            _ => {
                resources.controller.process_key(&mut resources.frame.camera, keycode);
                None
            }
        }
    }
}
