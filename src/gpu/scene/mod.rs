// ============================================
// Scene Module - Объекты сцены
// ============================================
// Скайбокс, террейн, здания, деревья и персонажи.
// Порядок отрисовки задаёт FramePlan по ролям объектов.

pub mod cube;
mod building;
mod tree;
mod skybox;
mod character;

pub use building::{default_buildings, Building, BuildingSettings, FacadePart, FacadeStyle};
pub use tree::{tree_transforms, Tree, TreeSettings, FOLIAGE_COLOR, TRUNK_COLOR};
pub use skybox::{Skybox, SkyboxSettings};
pub use character::{attach_characters, default_characters, AnimatedCharacter, Placement, SkinnedMesh};

use ultraviolet::Vec3;

use crate::gpu::core::{FrameState, SceneConfig};
use crate::gpu::render::{BindGroupLayouts, Drawable, Pipelines};
use crate::gpu::terrain::Terrain;

pub struct Scene {
    skybox: Skybox,
    terrain: Terrain,
    buildings: Vec<Building>,
    trees: Vec<Tree>,
    characters: Vec<AnimatedCharacter>,
}

impl Scene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        pipelines: &Pipelines,
        config: &SceneConfig,
    ) -> Self {
        let skybox = Skybox::new(device, queue, layouts, pipelines, &config.skybox);
        let terrain = Terrain::new(device, queue, layouts, pipelines, &config.terrain);

        let buildings = config
            .buildings
            .iter()
            .enumerate()
            .map(|(i, settings)| {
                Building::new(device, queue, layouts, pipelines, &format!("Building {}", i), settings)
            })
            .collect();

        let trees = config
            .trees
            .iter()
            .enumerate()
            .map(|(i, settings)| {
                let [x, _, z] = settings.position;
                let ground = Vec3::new(x, terrain.elevation(x, z), z);
                Tree::new(device, queue, layouts, pipelines, &format!("Tree {}", i), ground, settings)
            })
            .collect();

        Self {
            skybox,
            terrain,
            buildings,
            trees,
            characters: Vec::new(),
        }
    }

    /// Добавить персонажа, поставив его на землю
    pub fn add_character(&mut self, mut character: AnimatedCharacter) {
        let [x, _, z] = character.placement().position;
        character.snap_to_ground(self.terrain.elevation(x, z));
        self.characters.push(character);
    }

    /// Персонажи для мест из конфигурации; возвращает число прикреплённых
    pub fn attach_configured<F>(&mut self, placements: &[Placement], mesh_for: F) -> usize
    where
        F: FnMut(usize, &Placement) -> Option<Box<dyn SkinnedMesh>>,
    {
        let attached = attach_characters(placements, mesh_for);
        let count = attached.len();
        for character in attached {
            self.add_character(character);
        }
        count
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Ретайлинг террейна и поза персонажей
    pub fn update(&mut self, queue: &wgpu::Queue, frame: &FrameState) {
        self.terrain.update(queue, frame.camera.position);

        if frame.playing {
            for character in &mut self.characters {
                character.update(frame.character_time);
            }
        }
    }

    /// Все объекты в порядке сцены
    pub fn drawables(&self) -> Vec<&dyn Drawable> {
        let mut list: Vec<&dyn Drawable> = Vec::with_capacity(2 + self.buildings.len() + self.trees.len() + self.characters.len());
        list.push(&self.skybox);
        list.push(&self.terrain);
        list.extend(self.buildings.iter().map(|b| b as &dyn Drawable));
        list.extend(self.trees.iter().map(|t| t as &dyn Drawable));
        list.extend(self.characters.iter().map(|c| c as &dyn Drawable));
        list
    }
}
