use std::path::{Path, PathBuf};

use chunked_terrain::game::{
    camera::{Camera, CameraMovement},
    config::TerrainSettings,
    error::TerrainError,
    height_map::{HeightMapFormat, find_height_maps},
    terrain::{Terrain, visibility::VisibleChunks},
};
use clap::Parser;
use glam::Vec3;
use strum::IntoEnumIterator;
use tracing::{error, info};

#[derive(clap::Parser)]
struct Opts {
    /// Path to a height map, or a directory to search for height maps. Overrides the
    /// `HEIGHT_MAP` in the settings file.
    path: Option<PathBuf>,

    /// Terrain settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Amount of chunks along each side of the terrain.
    #[arg(long)]
    chunks: Option<u32>,

    /// Distance between two adjacent height samples.
    #[arg(long)]
    stride: Option<f32>,

    #[arg(long)]
    height_scale: Option<f32>,

    /// Cosine threshold for chunk visibility, in -1..=1.
    #[arg(long, allow_negative_numbers = true)]
    tolerance: Option<f32>,

    /// Draw every chunk regardless of the camera.
    #[arg(long)]
    no_binning: bool,

    /// Leave height displacement to the vertex shader.
    #[arg(long)]
    on_gpu: bool,

    /// Amount of frames to simulate.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Camera input applied every frame (e.g. "yaw_left", "forward").
    #[arg(long, default_value = "yaw_left")]
    movement: CameraMovement,
}

impl Opts {
    fn settings(&self) -> Result<TerrainSettings, TerrainError> {
        let mut settings = match self.config {
            Some(ref config) => TerrainSettings::load(config)?,
            None => TerrainSettings::default(),
        };

        if let Some(chunks) = self.chunks {
            settings.num_chunks = chunks;
        }
        if let Some(stride) = self.stride {
            settings.vertex_stride = stride;
        }
        if let Some(height_scale) = self.height_scale {
            settings.height_scale = height_scale;
        }
        if let Some(tolerance) = self.tolerance {
            settings.tolerance = tolerance;
        }
        if self.no_binning {
            settings.apply_binning = false;
        }
        if self.on_gpu {
            settings.on_gpu = true;
        }

        settings.validate()?;

        Ok(settings)
    }
}

fn resolve_height_map(path: &Path) -> Result<PathBuf, TerrainError> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let height_maps = find_height_maps(path)?;
    for height_map in height_maps.iter() {
        info!("Found height map: {}", height_map.display());
    }

    height_maps.into_iter().next().ok_or_else(|| {
        TerrainError::invalid_input(format!("no height maps found in {}", path.display()))
    })
}

fn run(opts: &Opts) -> Result<(), TerrainError> {
    let supported = HeightMapFormat::iter()
        .map(|format| format.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    info!("Supported height map formats: {supported}");

    let mut settings = opts.settings()?;

    let Some(path) = opts.path.as_ref().or(settings.height_map.as_ref()) else {
        return Err(TerrainError::invalid_input(
            "no height map given on the command line or in the settings",
        ));
    };
    let height_map = resolve_height_map(path)?;
    settings.height_map = Some(height_map);

    let terrain = Terrain::load(settings)?;

    let layout = terrain.vertex_buffer_layout();
    info!(
        "Vertex buffer: {} bytes ({} byte stride, {} attributes), index buffer: {} bytes ({:?})",
        terrain.vertex_buffer_descriptor().contents.len(),
        layout.array_stride,
        layout.wgpu_attributes().len(),
        terrain.index_buffer_descriptor().contents.len(),
        terrain.index_format(),
    );

    // Hover above the middle of the terrain.
    let centre = terrain.centre_of_gravity();
    let mut camera = Camera::looking_at(
        centre + Vec3::Y * 50.0,
        centre + Vec3::new(0.0, 40.0, 100.0),
    );

    let mut visible = VisibleChunks::default();
    let total_chunks = terrain.chunks().len();
    let delta_time = 1.0 / 60.0;

    for frame in 0..opts.frames {
        camera.process_input(opts.movement, delta_time);

        let plan = terrain.draw_plan(&camera, &mut visible);
        info!(
            "Frame {frame}: {} of {total_chunks} chunks, {} indices",
            plan.len(),
            plan.total_index_count()
        );
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt().init();

    let opts = Opts::parse();

    if let Err(err) = run(&opts) {
        error!("{err}");
        std::process::exit(1);
    }
}
