// ============================================
// App - Главный обработчик приложения
// ============================================

use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::gpu::core::AppResources;
use crate::gpu::systems::{InitSystem, InputAction, InputSystem, RenderSystem, UpdateSystem};

/// Главное приложение
pub struct App {
    resources: AppResources,
}

impl App {
    pub fn new() -> Self {
        Self {
            resources: InitSystem::create_resources(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.resources.window.is_some() {
            return;
        }

        let settings = &self.resources.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(settings.width, settings.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = InitSystem::init_rendering(&mut self.resources, window) {
            log::error!("{}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.resources.renderer {
                    renderer.resize(physical_size);
                    self.resources.frame.camera.set_aspect(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(keycode),
                    state,
                    ..
                },
                ..
            } => {
                match InputSystem::process_keyboard(&mut self.resources, keycode, state) {
                    Some(InputAction::Exit) => event_loop.exit(),
                    Some(InputAction::SaveDepthSnapshot) => RenderSystem::save_depth_snapshot(&self.resources),
                    Some(InputAction::ToggleAnimation) | None => {}
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.resources.last_frame).as_secs_f32();
                self.resources.last_frame = now;

                UpdateSystem::update(&mut self.resources, dt);
                RenderSystem::render(&mut self.resources, event_loop);

                if let Some(window) = &self.resources.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.resources.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Сцена держит буферы устройства: освобождаем её раньше рендерера
        self.resources.scene = None;
        self.resources.renderer = None;
        self.resources.window = None;
        log::info!("Resources released");
    }
}

/// Запуск приложения
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Controls ===");
    println!("W/S - Move forward/back");
    println!("A/D - Strafe left/right");
    println!("Arrows - Look around");
    println!("Space - Pause/resume animation");
    println!("P - Save shadow map to depth_map.png");
    println!("Escape - Exit");
    println!("================");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
