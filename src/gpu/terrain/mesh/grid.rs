// ============================================
// Terrain Grid - Сетка террейна и ретайлинг
// ============================================
// Регулярная сетка width x height вокруг начала координат.
// Индексы строятся один раз и больше не меняются; при движении
// камеры сетка целиком сдвигается на кратное своему размеру
// смещение, а высоты и нормали пересчитываются на месте.

use ultraviolet::Vec3;

use crate::gpu::terrain::generation::HeightField;
use super::vertex::TerrainVertex;

/// CPU-сторона меша террейна
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    width: u32,
    height: u32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    /// Накопленный сдвиг сетки в мире
    offset: Vec3,
    /// Растёт при каждом изменении вершин (для ленивой загрузки на GPU)
    revision: u64,
}

impl TerrainMesh {
    /// Построить сетку и вычислить высоты/нормали.
    /// Сетка, чьи индексы не помещаются в u32, не строится (пустой меш).
    pub fn build(width: u32, height: u32, field: &HeightField) -> Self {
        if !Self::fits_u32_indices(width, height) {
            log::error!(
                "Terrain grid {}x{} exceeds the u32 index range, building an empty mesh",
                width, height
            );
            return Self::build(0, 0, field);
        }

        let mut vertices = Vec::with_capacity(width as usize * height as usize);

        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;

        for z in 0..height {
            for x in 0..width {
                let x_pos = x as f32 - half_w;
                let z_pos = z as f32 - half_h;

                let y = field.elevation(x_pos, z_pos);
                let normal = field.normal(x_pos, z_pos);

                vertices.push(TerrainVertex::new(
                    [x_pos, y, z_pos],
                    normal.into(),
                    [x as f32 / width as f32, z as f32 / height as f32],
                ));
            }
        }

        let indices = Self::build_indices(width, height);

        Self {
            width,
            height,
            vertices,
            indices,
            offset: Vec3::zero(),
            revision: 0,
        }
    }

    /// Число вершин и число индексов помещаются в u32
    pub fn fits_u32_indices(width: u32, height: u32) -> bool {
        let cells = width.saturating_sub(1) as u64 * height.saturating_sub(1) as u64;
        width.checked_mul(height).is_some() && cells * 6 <= u32::MAX as u64
    }

    /// Два треугольника на ячейку: (TL, BL, TR) и (TR, BL, BR)
    fn build_indices(width: u32, height: u32) -> Vec<u32> {
        let cells_x = width.saturating_sub(1);
        let cells_z = height.saturating_sub(1);
        let mut indices = Vec::with_capacity(cells_x as usize * cells_z as usize * 6);

        for z in 0..cells_z {
            for x in 0..cells_x {
                let top_left = z * width + x;
                let top_right = top_left + 1;
                let bottom_left = (z + 1) * width + x;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left, bottom_left, top_right,
                    top_right, bottom_left, bottom_right,
                ]);
            }
        }

        indices
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Порог срабатывания ретайлинга
    pub fn threshold(&self) -> f32 {
        self.width as f32 / 2.0
    }

    /// Сдвиг (x, z), который нужен для точки обзора, или None
    pub fn retile_shift(&self, viewpoint: Vec3) -> Option<(f32, f32)> {
        let threshold = self.threshold();
        let delta_x = viewpoint.x - self.offset.x;
        let delta_z = viewpoint.z - self.offset.z;

        if delta_x.abs() <= threshold && delta_z.abs() <= threshold {
            return None;
        }

        let shift_x = Self::snap(delta_x, self.width);
        let shift_z = Self::snap(delta_z, self.height);

        if shift_x == 0.0 && shift_z == 0.0 {
            return None;
        }
        Some((shift_x, shift_z))
    }

    #[inline]
    fn snap(delta: f32, dimension: u32) -> f32 {
        if dimension == 0 {
            return 0.0;
        }
        let dimension = dimension as f32;
        (delta / dimension).round() * dimension
    }

    /// Сдвинуть сетку вслед за точкой обзора.
    /// Возвращает true, если вершины изменились и их нужно перезалить.
    pub fn update_around_viewpoint(&mut self, viewpoint: Vec3, field: &HeightField) -> bool {
        let Some((shift_x, shift_z)) = self.retile_shift(viewpoint) else {
            return false;
        };

        for vertex in &mut self.vertices {
            let x = vertex.position[0] + shift_x;
            let z = vertex.position[2] + shift_z;

            vertex.position = [x, field.elevation(x, z), z];
            vertex.normal = field.normal(x, z).into();
        }

        self.offset += Vec3::new(shift_x, 0.0, shift_z);
        self.revision += 1;

        log::debug!(
            "Terrain retiled by ({}, {}), offset now ({}, {})",
            shift_x, shift_z, self.offset.x, self.offset.z
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::terrain::generation::HeightParams;

    fn field() -> HeightField {
        HeightField::new(1234, HeightParams::default())
    }

    #[test]
    fn test_topology_counts() {
        let hf = field();
        for (w, h) in [(2u32, 2u32), (10, 10), (7, 3), (32, 17)] {
            let mesh = TerrainMesh::build(w, h, &hf);
            assert_eq!(mesh.vertices().len(), (w * h) as usize);
            assert_eq!(mesh.indices().len(), (6 * (w - 1) * (h - 1)) as usize);
            assert!(mesh.indices().iter().all(|&i| i < w * h));
        }
    }

    #[test]
    fn test_degenerate_grids_have_no_triangles() {
        let hf = field();
        for (w, h) in [(0u32, 0u32), (1, 1), (1, 10), (10, 1), (0, 5)] {
            let mesh = TerrainMesh::build(w, h, &hf);
            assert!(mesh.indices().is_empty(), "{}x{}", w, h);
            assert_eq!(mesh.vertices().len(), (w * h) as usize);
        }
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        assert!(TerrainMesh::fits_u32_indices(500, 500));
        assert!(TerrainMesh::fits_u32_indices(u32::MAX, 1));
        assert!(!TerrainMesh::fits_u32_indices(65_536, 65_536));
        assert!(!TerrainMesh::fits_u32_indices(u32::MAX, 2));
        // Вершины влезают, а 6 индексов на ячейку уже нет
        assert!(!TerrainMesh::fits_u32_indices(30_000, 30_000));

        let mesh = TerrainMesh::build(70_000, 70_000, &field());
        assert_eq!((mesh.width(), mesh.height()), (0, 0));
        assert!(mesh.vertices().is_empty());
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn test_first_cell_winding() {
        let mesh = TerrainMesh::build(3, 3, &field());
        assert_eq!(&mesh.indices()[..6], &[0, 3, 1, 1, 3, 4]);
    }

    #[test]
    fn test_grid_centered_on_origin() {
        let mesh = TerrainMesh::build(10, 10, &field());
        let first = mesh.vertices()[0].position;
        let last = mesh.vertices()[99].position;
        assert_eq!((first[0], first[2]), (-5.0, -5.0));
        assert_eq!((last[0], last[2]), (4.0, 4.0));
    }

    #[test]
    fn test_vertices_match_height_field() {
        let hf = field();
        let mesh = TerrainMesh::build(16, 12, &hf);
        for v in mesh.vertices() {
            let [x, y, z] = v.position;
            assert_eq!(y.to_bits(), hf.elevation(x, z).to_bits());
            let n: [f32; 3] = hf.normal(x, z).into();
            assert_eq!(v.normal, n);
        }
    }

    #[test]
    fn test_no_retile_inside_threshold() {
        let hf = field();
        let mut mesh = TerrainMesh::build(20, 20, &hf);
        let before = mesh.vertices().to_vec();
        let revision = mesh.revision();

        for vp in [
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(-9.5, 100.0, 3.0),
            Vec3::new(10.0, 0.0, 10.0),
        ] {
            assert!(!mesh.update_around_viewpoint(vp, &hf));
        }

        assert_eq!(mesh.revision(), revision);
        assert_eq!(mesh.offset(), Vec3::zero());
        let unchanged = mesh
            .vertices()
            .iter()
            .zip(&before)
            .all(|(a, b)| bytemuck::bytes_of(a) == bytemuck::bytes_of(b));
        assert!(unchanged);
    }

    #[test]
    fn test_retile_shift_width_500() {
        let hf = field();
        let mut mesh = TerrainMesh::build(500, 6, &hf);
        let before = mesh.vertices().to_vec();
        let indices = mesh.indices().to_vec();

        let viewpoint = Vec3::new(400.0, 30.0, 0.0);
        assert_eq!(mesh.retile_shift(viewpoint), Some((500.0, 0.0)));
        assert!(mesh.update_around_viewpoint(viewpoint, &hf));

        assert_eq!(mesh.offset(), Vec3::new(500.0, 0.0, 0.0));
        assert_eq!(mesh.revision(), 1);
        assert_eq!(mesh.indices(), &indices[..]);

        for (after, prev) in mesh.vertices().iter().zip(&before) {
            assert_eq!(after.position[0], prev.position[0] + 500.0);
            assert_eq!(after.position[2], prev.position[2]);
            let [x, y, z] = after.position;
            assert_eq!(y.to_bits(), hf.elevation(x, z).to_bits());
            assert_eq!(after.tex_coord, prev.tex_coord);
        }

        // Повторный вызов с той же точкой: уже внутри порога
        assert!(!mesh.update_around_viewpoint(viewpoint, &hf));
        assert_eq!(mesh.revision(), 1);
    }

    #[test]
    fn test_retile_negative_and_both_axes() {
        let hf = field();
        let mut mesh = TerrainMesh::build(8, 8, &hf);

        // threshold = 4, delta = (-13, 9) -> round(-1.625)*8 = -16, round(1.125)*8 = 8
        let viewpoint = Vec3::new(-13.0, 0.0, 9.0);
        assert_eq!(mesh.retile_shift(viewpoint), Some((-16.0, 8.0)));
        assert!(mesh.update_around_viewpoint(viewpoint, &hf));
        assert_eq!(mesh.offset(), Vec3::new(-16.0, 0.0, 8.0));

        let first = mesh.vertices()[0].position;
        assert_eq!((first[0], first[2]), (-20.0, 4.0));
    }
}
