// ============================================
// Cube Geometry - Коробки сцены
// ============================================
// 24 вершины (по 4 на грань), порядок граней:
// front (+Z), back (-Z), left (-X), right (+X), top (+Y), bottom (-Y).
// Вершины грани идут: низ-лево, низ-право, верх-право, верх-лево
// (если смотреть на грань снаружи).

use crate::gpu::render::MeshData;

pub const FACE_COUNT: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;
pub const INDICES_PER_FACE: u32 = 6;

const FACE_NORMALS: [[f32; 3]; FACE_COUNT] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// UV одной грани: V = 0 сверху изображения
const FACE_UVS: [[f32; 2]; VERTICES_PER_FACE] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Развёртка скайбокса крестом (4x3)
const SKY_UVS: [[f32; 2]; 24] = [
    // front
    [0.5, 0.666], [0.25, 0.666], [0.25, 0.333], [0.5, 0.333],
    // back
    [1.0, 0.666], [0.75, 0.666], [0.75, 0.333], [1.0, 0.333],
    // left
    [0.75, 0.666], [0.5, 0.666], [0.5, 0.333], [0.75, 0.333],
    // right
    [0.25, 0.666], [0.0, 0.666], [0.0, 0.333], [0.25, 0.333],
    // top
    [0.5, 0.333], [0.25, 0.333], [0.25, 0.0], [0.5, 0.0],
    // bottom
    [0.5, 1.0], [0.25, 1.0], [0.25, 0.666], [0.5, 0.666],
];

/// Позиции коробки min..max в порядке граней
pub fn box_positions(min: [f32; 3], max: [f32; 3]) -> Vec<[f32; 3]> {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;

    vec![
        // front
        [x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1],
        // back
        [x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0],
        // left
        [x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0],
        // right
        [x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1],
        // top
        [x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0],
        // bottom
        [x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1],
    ]
}

/// (0,1,2, 0,2,3) на каждую грань: CCW снаружи
pub fn outward_indices() -> Vec<u32> {
    (0..FACE_COUNT as u32)
        .flat_map(|face| {
            let b = face * VERTICES_PER_FACE as u32;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect()
}

/// Обратный обход: грани смотрят внутрь
pub fn inward_indices() -> Vec<u32> {
    (0..FACE_COUNT as u32)
        .flat_map(|face| {
            let b = face * VERTICES_PER_FACE as u32;
            [b, b + 3, b + 2, b, b + 2, b + 1]
        })
        .collect()
}

fn face_normals() -> Vec<[f32; 3]> {
    FACE_NORMALS
        .iter()
        .flat_map(|n| [*n; VERTICES_PER_FACE])
        .collect()
}

fn face_uvs(v_repeat: f32) -> Vec<[f32; 2]> {
    (0..FACE_COUNT)
        .flat_map(|_| FACE_UVS.iter().map(move |[u, v]| [*u, v * v_repeat]))
        .collect()
}

/// Коробка min..max с нормалями граней и UV 0..1 на каждую грань
pub fn box_mesh(min: [f32; 3], max: [f32; 3], color: [f32; 3]) -> MeshData {
    let positions = box_positions(min, max);
    MeshData {
        colors: vec![color; positions.len()],
        uvs: face_uvs(1.0),
        normals: face_normals(),
        indices: outward_indices(),
        positions,
    }
}

/// Куб здания +-1, текстура повторяется по V `v_repeat` раз
pub fn building_mesh(color: [f32; 3], v_repeat: f32) -> MeshData {
    let mut mesh = box_mesh([-1.0; 3], [1.0; 3], color);
    mesh.uvs = face_uvs(v_repeat);
    mesh
}

/// Куб скайбокса: грани внутрь, UV по кресту
pub fn skybox_mesh() -> MeshData {
    let positions = box_positions([-1.0; 3], [1.0; 3]);
    let normals = face_normals().into_iter().map(|[x, y, z]| [-x, -y, -z]).collect();
    MeshData {
        colors: vec![[1.0; 3]; positions.len()],
        uvs: SKY_UVS.to_vec(),
        normals,
        indices: inward_indices(),
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::Vec3;

    fn face_winding_normal(mesh: &MeshData, face: usize) -> Vec3 {
        let i = face * INDICES_PER_FACE as usize;
        let p = |k: usize| Vec3::from(mesh.positions[mesh.indices[i + k] as usize]);
        (p(1) - p(0)).cross(p(2) - p(0)).normalized()
    }

    #[test]
    fn test_counts() {
        for mesh in [building_mesh([1.0; 3], 5.0), skybox_mesh(), box_mesh([0.0; 3], [1.0; 3], [0.0; 3])] {
            assert_eq!(mesh.vertex_count(), 24);
            assert_eq!(mesh.indices.len(), 36);
            assert!(mesh.is_consistent());
        }
    }

    #[test]
    fn test_building_winding_matches_normals() {
        let mesh = building_mesh([1.0; 3], 1.0);
        for face in 0..FACE_COUNT {
            let from_winding = face_winding_normal(&mesh, face);
            let stored = Vec3::from(mesh.normals[face * VERTICES_PER_FACE]);
            assert!((from_winding - stored).mag() < 1e-5, "face {}", face);
        }
    }

    #[test]
    fn test_skybox_faces_inward() {
        let mesh = skybox_mesh();
        for face in 0..FACE_COUNT {
            let n = face_winding_normal(&mesh, face);
            let center = Vec3::from(mesh.positions[face * VERTICES_PER_FACE]);
            assert!(n.dot(center) < 0.0, "face {}", face);
        }
    }

    #[test]
    fn test_front_face_is_first_six_indices() {
        let mesh = building_mesh([1.0; 3], 5.0);
        for &i in &mesh.indices[..6] {
            assert_eq!(mesh.positions[i as usize][2], 1.0);
        }
        for &i in &mesh.indices[6..] {
            assert!(i >= 4);
        }
    }

    #[test]
    fn test_v_tiling() {
        let mesh = building_mesh([1.0; 3], 5.0);
        assert_eq!(&mesh.uvs[..4], &[[0.0, 5.0], [1.0, 5.0], [1.0, 0.0], [0.0, 0.0]]);
        assert!(mesh.uvs.iter().all(|[u, v]| *u <= 1.0 && *v <= 5.0));
    }

    #[test]
    fn test_trunk_bounds() {
        let trunk = box_mesh([-0.5, 0.0, -0.5], [0.5, 1.0, 0.5], [0.55, 0.27, 0.07]);
        assert!(trunk.positions.iter().all(|p| p[1] >= 0.0 && p[1] <= 1.0));
        assert!(trunk.positions.iter().all(|p| p[0].abs() == 0.5 && p[2].abs() == 0.5));
        assert_eq!(trunk.colors[0], [0.55, 0.27, 0.07]);
    }
}
