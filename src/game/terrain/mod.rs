pub mod chunks;
pub mod draw_plan;
pub mod mesh;
pub mod visibility;

use std::path::Path;

use glam::Vec3;
use tracing::info;

use crate::{
    engine::{
        mesh::{INDEX_FORMAT, Mesh, Vertex},
        tracked::Tracked,
        vertex_layouts::{AsVertexLayout, VertexBufferLayout},
    },
    game::{
        camera::Camera, config::TerrainSettings, error::TerrainError, height_map::HeightField,
    },
};

use chunks::{ChunkTable, partition};
use draw_plan::DrawPlan;
use mesh::{Displacement, MeshBuilder};
use visibility::{VisibleChunks, select_visible_chunks};

/// A height field turned into a chunked mesh, along with the settings it was built with.
pub struct Terrain {
    height_field: HeightField,
    /// Settings as last edited by the user.
    settings: Tracked<TerrainSettings>,
    /// Settings the current mesh and chunks were built with.
    applied: TerrainSettings,
    /// Vertices and the chunk ordered index buffer.
    mesh: Mesh,
    chunks: ChunkTable,
    centre_of_gravity: Vec3,
}

impl Terrain {
    pub fn new(height_field: HeightField, settings: TerrainSettings) -> Result<Self, TerrainError> {
        settings.validate()?;

        let (mesh, chunks, centre_of_gravity) = build_geometry(&height_field, &settings)?;

        let mut settings = Tracked::new(settings);
        settings.reset();
        let applied = (*settings).clone();

        Ok(Self {
            height_field,
            settings,
            applied,
            mesh,
            chunks,
            centre_of_gravity,
        })
    }

    /// Load the height map named in the settings and build the terrain from it.
    pub fn load(settings: TerrainSettings) -> Result<Self, TerrainError> {
        let Some(path) = settings.height_map.clone() else {
            return Err(TerrainError::invalid_input("no height map specified"));
        };

        Self::load_from(&path, settings)
    }

    pub fn load_from(path: &Path, settings: TerrainSettings) -> Result<Self, TerrainError> {
        let height_field = HeightField::load(path)?;
        Self::new(height_field, settings)
    }

    #[inline]
    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    #[inline]
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Edit the settings. Changes take effect on the next [Terrain::update].
    #[inline]
    pub fn settings_mut(&mut self) -> &mut TerrainSettings {
        &mut self.settings
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[inline]
    pub fn chunks(&self) -> &ChunkTable {
        &self.chunks
    }

    #[inline]
    pub fn centre_of_gravity(&self) -> Vec3 {
        self.centre_of_gravity
    }

    /// Apply edited settings. The mesh and chunks are only rebuilt when a setting that affects
    /// geometry changed. Returns true if they were rebuilt.
    ///
    /// Invalid settings are rejected and the terrain keeps the settings it was built with.
    pub fn update(&mut self) -> Result<bool, TerrainError> {
        let Some(settings) = self.settings.if_changed(TerrainSettings::clone) else {
            return Ok(false);
        };

        settings.validate()?;

        let rebuild = settings.geometry_differs(&self.applied);
        if rebuild {
            let (mesh, chunks, centre_of_gravity) =
                build_geometry(&self.height_field, &settings)?;
            self.mesh = mesh;
            self.chunks = chunks;
            self.centre_of_gravity = centre_of_gravity;
        }

        self.applied = settings;

        Ok(rebuild)
    }

    /// Work out which parts of the index buffer to draw for the camera. `visible` is filled with
    /// the chunks that passed the visibility test when binning is enabled, and left empty
    /// otherwise.
    pub fn draw_plan(&self, camera: &Camera, visible: &mut VisibleChunks) -> DrawPlan {
        if !self.applied.apply_binning {
            visible.clear();
            return DrawPlan::all(&self.chunks);
        }

        select_visible_chunks(
            self.chunks.chunks(),
            camera.position,
            camera.forward(),
            self.applied.tolerance,
            self.applied.vertex_stride,
            visible,
        );

        DrawPlan::visible(&self.chunks, visible)
    }

    /// Layout of the vertices in [Terrain::vertex_buffer_descriptor].
    #[inline]
    pub fn vertex_buffer_layout(&self) -> VertexBufferLayout {
        Vertex::vertex_buffer_layout()
    }

    /// Format of the indices in [Terrain::index_buffer_descriptor].
    #[inline]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        INDEX_FORMAT
    }

    pub fn vertex_buffer_descriptor(&self) -> wgpu::util::BufferInitDescriptor<'_> {
        self.mesh.vertex_buffer_descriptor("terrain_vertex_buffer")
    }

    pub fn index_buffer_descriptor(&self) -> wgpu::util::BufferInitDescriptor<'_> {
        self.mesh.index_buffer_descriptor("terrain_index_buffer")
    }
}

fn build_geometry(
    height_field: &HeightField,
    settings: &TerrainSettings,
) -> Result<(Mesh, ChunkTable, Vec3), TerrainError> {
    let displacement = if settings.on_gpu {
        Displacement::Gpu
    } else {
        Displacement::Cpu
    };

    let terrain_mesh = MeshBuilder::new(settings.vertex_stride, settings.height_scale)
        .with_displacement(displacement)
        .build(height_field)?;

    let (indices, chunks) = partition(
        &terrain_mesh.indices,
        terrain_mesh.size,
        settings.num_chunks,
    )?;

    info!(
        "Built terrain of {size} x {size} vertices in {dim} x {dim} chunks",
        size = terrain_mesh.size,
        dim = chunks.chunk_dim(),
    );

    let mesh = Mesh {
        vertices: terrain_mesh.vertices,
        indices,
    };

    Ok((mesh, chunks, terrain_mesh.centre_of_gravity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hills(size: u32) -> HeightField {
        let samples = (0..size * size)
            .map(|i| ((i / size) + (i % size)) as f32)
            .collect();
        HeightField::new(size, samples).unwrap()
    }

    fn settings(num_chunks: u32) -> TerrainSettings {
        TerrainSettings {
            num_chunks,
            vertex_stride: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn builds_chunked_mesh() {
        let terrain = Terrain::new(hills(5), settings(2)).unwrap();

        assert_eq!(terrain.mesh().vertices.len(), 25);
        assert_eq!(terrain.mesh().indices.len(), 96);
        assert_eq!(terrain.chunks().len(), 4);
        assert_eq!(terrain.chunks().index_count(), 96);

        // Chunk ordered, so the first chunk starts with the first cell.
        assert_eq!(&terrain.mesh().indices[0..6], &[0, 5, 1, 1, 5, 6]);

        let layout = terrain.vertex_buffer_layout();
        assert_eq!(
            terrain.vertex_buffer_descriptor().contents.len() as u64,
            25 * layout.array_stride
        );
        assert_eq!(layout.wgpu_attributes().len(), 3);
        assert_eq!(terrain.index_format(), wgpu::IndexFormat::Uint32);
        assert_eq!(terrain.index_buffer_descriptor().contents.len(), 96 * 4);
    }

    #[test]
    fn binning_can_be_disabled() {
        let mut terrain = Terrain::new(hills(5), settings(2)).unwrap();
        let camera = Camera::looking_at(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 10.0, 10.0));
        let mut visible = VisibleChunks::default();

        let plan = terrain.draw_plan(&camera, &mut visible);
        assert_eq!(visible.ids(), &[2, 3]);
        assert_eq!(plan.len(), 2);

        terrain.settings_mut().apply_binning = false;
        assert!(!terrain.update().unwrap());
        let plan = terrain.draw_plan(&camera, &mut visible);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.total_index_count(), 96);
        // Nothing is carried over from the previous frame.
        assert!(visible.is_empty());
    }

    #[test]
    fn update_rebuilds_only_on_geometry_changes() {
        let mut terrain = Terrain::new(hills(9), settings(4)).unwrap();
        assert!(!terrain.update().unwrap());

        terrain.settings_mut().tolerance = 0.5;
        assert!(!terrain.update().unwrap());
        assert_eq!(terrain.chunks().len(), 16);

        terrain.settings_mut().num_chunks = 2;
        assert!(terrain.update().unwrap());
        assert_eq!(terrain.chunks().len(), 4);
        assert_eq!(terrain.chunks().index_count(), 6 * 8 * 8);

        terrain.settings_mut().height_scale = 2.0;
        let before = terrain.centre_of_gravity();
        assert!(terrain.update().unwrap());
        assert!((terrain.centre_of_gravity().y - before.y * 2.0).abs() < 1e-4);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            Terrain::new(hills(5), settings(0)),
            Err(TerrainError::InvalidInput(_))
        ));

        let mut terrain = Terrain::new(hills(5), settings(2)).unwrap();
        terrain.settings_mut().vertex_stride = -1.0;
        assert!(terrain.update().is_err());
        assert_eq!(terrain.chunks().len(), 4);
    }

    #[test]
    fn load_requires_a_height_map() {
        assert!(matches!(
            Terrain::load(TerrainSettings::default()),
            Err(TerrainError::InvalidInput(_))
        ));

        let settings = TerrainSettings {
            height_map: Some("does/not/exist.png".into()),
            ..Default::default()
        };
        assert!(matches!(
            Terrain::load(settings),
            Err(TerrainError::ResourceLoad { .. })
        ));
    }
}
