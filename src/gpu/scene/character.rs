// ============================================
// Animated Character - Обёртка над скинированным мешем
// ============================================
// Загрузка glTF, скиннинг и анимация живут за трейтом SkinnedMesh.
// Здесь только размещение в мире и время воспроизведения.
// Тень персонаж не отбрасывает (LitOnly).

use serde::Deserialize;
use ultraviolet::{Mat4, Vec3};

use crate::gpu::lighting::LightFrame;
use crate::gpu::render::{scale_matrix, CameraMatrices, DepthContext, DrawRole, Drawable, LitContext};

/// Скинированный меш с анимацией
pub trait SkinnedMesh {
    /// Выставить позу на момент `time` (секунды)
    fn update(&mut self, time: f32);

    fn render(&self, pass: &mut wgpu::RenderPass<'static>, queue: &wgpu::Queue, mvp: &Mat4);
}

/// Положение персонажа в мире
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// y подгоняется под высоту террейна
    pub position: [f32; 3],
    /// Поворот вокруг Y, градусы
    pub yaw: f32,
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            yaw: 45.0,
            scale: 0.05,
        }
    }
}

impl Placement {
    /// translate * rotateY * scale
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.position))
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * scale_matrix(Vec3::broadcast(self.scale))
    }
}

pub fn default_characters() -> Vec<Placement> {
    vec![
        Placement {
            position: [-15.0, 0.0, -15.0],
            ..Default::default()
        },
        Placement {
            position: [-5.0, 0.0, -20.0],
            ..Default::default()
        },
    ]
}

/// Персонажи для сконфигурированных мест. `mesh_for` отдаёт меш
/// для i-го места или None, если меша нет (место пропускается).
pub fn attach_characters<F>(placements: &[Placement], mut mesh_for: F) -> Vec<AnimatedCharacter>
where
    F: FnMut(usize, &Placement) -> Option<Box<dyn SkinnedMesh>>,
{
    placements
        .iter()
        .enumerate()
        .filter_map(|(i, placement)| {
            mesh_for(i, placement)
                .map(|mesh| AnimatedCharacter::new(&format!("Character {}", i), mesh, *placement))
        })
        .collect()
}

pub struct AnimatedCharacter {
    label: String,
    mesh: Box<dyn SkinnedMesh>,
    placement: Placement,
}

impl AnimatedCharacter {
    pub fn new(label: &str, mesh: Box<dyn SkinnedMesh>, placement: Placement) -> Self {
        Self {
            label: label.to_string(),
            mesh,
            placement,
        }
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Поставить на землю
    pub fn snap_to_ground(&mut self, elevation: f32) {
        self.placement.position[1] = elevation;
    }

    pub fn update(&mut self, time: f32) {
        self.mesh.update(time);
    }
}

impl Drawable for AnimatedCharacter {
    fn label(&self) -> &str {
        &self.label
    }

    fn role(&self) -> DrawRole {
        DrawRole::LitOnly
    }

    fn render_depth(&self, _ctx: &mut DepthContext<'_>, _light_space: &Mat4) {}

    fn render(&self, ctx: &mut LitContext<'_>, camera: &CameraMatrices, _light: &LightFrame) {
        let mvp = camera.view_proj * self.placement.model();
        self.mesh.render(ctx.pass, ctx.queue, &mvp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use ultraviolet::Vec4;

    struct RecordingMesh {
        times: Rc<RefCell<Vec<f32>>>,
    }

    impl SkinnedMesh for RecordingMesh {
        fn update(&mut self, time: f32) {
            self.times.borrow_mut().push(time);
        }

        fn render(&self, _pass: &mut wgpu::RenderPass<'static>, _queue: &wgpu::Queue, _mvp: &Mat4) {}
    }

    #[test]
    fn test_update_forwards_time() {
        let times = Rc::new(RefCell::new(Vec::new()));
        let mesh = RecordingMesh { times: Rc::clone(&times) };
        let mut character = AnimatedCharacter::new("Bot", Box::new(mesh), Placement::default());

        character.update(0.5);
        character.update(1.25);

        assert_eq!(*times.borrow(), vec![0.5, 1.25]);
        assert_eq!(character.role(), DrawRole::LitOnly);
        assert!(!character.role().casts_shadow());
    }

    #[test]
    fn test_snap_to_ground() {
        let mesh = RecordingMesh { times: Rc::new(RefCell::new(Vec::new())) };
        let mut character = AnimatedCharacter::new("Bot", Box::new(mesh), default_characters()[0]);
        character.snap_to_ground(7.5);
        assert_eq!(character.placement().position, [-15.0, 7.5, -15.0]);
    }

    #[test]
    fn test_attach_skips_placements_without_mesh() {
        let placements = default_characters();
        let times = Rc::new(RefCell::new(Vec::new()));

        let attached = attach_characters(&placements, |i, _| {
            (i == 1).then(|| Box::new(RecordingMesh { times: Rc::clone(&times) }) as Box<dyn SkinnedMesh>)
        });

        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].label(), "Character 1");
        assert_eq!(attached[0].placement(), &placements[1]);

        assert!(attach_characters(&placements, |_, _| None).is_empty());
    }

    #[test]
    fn test_placement_model() {
        let placement = Placement {
            position: [1.0, 2.0, 3.0],
            yaw: 90.0,
            scale: 2.0,
        };
        let p = placement.model() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        // +X после поворота на 90 градусов уходит в -Z
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
        assert!((p.z - 1.0).abs() < 1e-5);
    }
}
