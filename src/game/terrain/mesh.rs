use glam::{Vec2, Vec3};

use crate::{
    engine::mesh::Vertex,
    game::{error::TerrainError, height_map::HeightField},
};

/// Where the height of each vertex is applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Displacement {
    /// Heights are baked into the vertex positions.
    #[default]
    Cpu,
    /// Vertices are emitted flat and a vertex shader displaces them.
    Gpu,
}

/// The full resolution terrain grid, with indices still in cell order.
pub struct TerrainMesh {
    /// Amount of vertices along each side.
    pub size: u32,
    /// One vertex per height sample, row major.
    pub vertices: Vec<Vertex>,
    /// Six indices per cell, cells in row major order.
    pub indices: Vec<u32>,
    /// Mean position of all vertices.
    pub centre_of_gravity: Vec3,
}

impl TerrainMesh {
    /// Amount of cells along each side.
    #[inline]
    pub fn cells_per_side(&self) -> u32 {
        self.size.saturating_sub(1)
    }
}

/// Turns a [HeightField] into a vertex grid with two triangles per cell.
#[derive(Clone, Copy, Debug)]
pub struct MeshBuilder {
    pub stride: f32,
    pub height_scale: f32,
    pub displacement: Displacement,
}

impl MeshBuilder {
    pub fn new(stride: f32, height_scale: f32) -> Self {
        Self {
            stride,
            height_scale,
            displacement: Displacement::Cpu,
        }
    }

    pub fn with_displacement(mut self, displacement: Displacement) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn build(&self, height_field: &HeightField) -> Result<TerrainMesh, TerrainError> {
        let size = height_field.size();
        check_size(size)?;

        if !(self.stride.is_finite() && self.stride > 0.0) {
            return Err(TerrainError::invalid_input(format!(
                "vertex stride must be greater than 0, got {}",
                self.stride
            )));
        }

        let (vertices, centre_of_gravity) = self.build_vertices(height_field);
        let indices = build_cell_indices(size);

        Ok(TerrainMesh {
            size,
            vertices,
            indices,
            centre_of_gravity,
        })
    }

    fn build_vertices(&self, height_field: &HeightField) -> (Vec<Vertex>, Vec3) {
        let size = height_field.size() as i32;
        let stride = self.stride;

        // Centre the grid around the world origin.
        let origin = Vec3::new(size as f32, 0.0, size as f32) * stride * -0.5;

        let height = |row: i32, col: i32| height_field.get(row, col) * self.height_scale;

        let mut vertices = Vec::with_capacity(size as usize * size as usize);
        let mut sum = Vec3::ZERO;

        for row in 0..size {
            for col in 0..size {
                let elevation = match self.displacement {
                    Displacement::Cpu => height(row, col),
                    Displacement::Gpu => 0.0,
                };

                let position =
                    origin + Vec3::new(col as f32 * stride, elevation, row as f32 * stride);

                // Central finite difference. Edge neighbours are clamped by the height field.
                // Left unnormalized, lighting has to normalize.
                let normal = Vec3::new(
                    (height(row, col - 1) - height(row, col + 1)) * 0.5,
                    stride,
                    (height(row - 1, col) - height(row + 1, col)) * 0.5,
                );

                let tex_coord = Vec2::new(col as f32, row as f32) / size as f32;

                sum += position;
                vertices.push(Vertex::new(position, normal, tex_coord));
            }
        }

        let centre_of_gravity = sum / vertices.len() as f32;

        (vertices, centre_of_gravity)
    }
}

/// Largest amount of vertices per side that can be addressed with u32 indices.
pub const MAX_SIZE: u32 = 1 << 16;

fn check_size(size: u32) -> Result<(), TerrainError> {
    if size == 0 {
        return Err(TerrainError::invalid_input(
            "no heights loaded, could not generate terrain",
        ));
    }

    if size > MAX_SIZE {
        return Err(TerrainError::invalid_input(format!(
            "height field of size {size} exceeds the maximum of {MAX_SIZE}"
        )));
    }

    Ok(())
}

/// The six vertex indices of the cell at `row`, `col` in a grid with `size` vertices per side.
///
/// ```text
/// tl --- tr
///  |   / |
///  |  /  |
///  | /   |
/// bl --- br
/// ```
#[inline]
pub fn cell_indices(size: u32, row: u32, col: u32) -> [u32; 6] {
    let tl = row * size + col;
    let tr = tl + 1;
    let bl = tl + size;
    let br = bl + 1;

    [tl, bl, tr, tr, bl, br]
}

fn build_cell_indices(size: u32) -> Vec<u32> {
    let cells = size.saturating_sub(1);

    let mut indices = Vec::with_capacity(cells as usize * cells as usize * 6);
    for row in 0..cells {
        for col in 0..cells {
            indices.extend_from_slice(&cell_indices(size, row, col));
        }
    }

    indices
}
