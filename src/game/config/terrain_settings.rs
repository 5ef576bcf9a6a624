use std::path::{Path, PathBuf};

use crate::game::{config::parser::ConfigLines, error::TerrainError};

/// Runtime tunable values that control how the terrain is built and culled.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Height map to load, relative to the config file.
    pub height_map: Option<PathBuf>,
    /// Requested amount of chunks along each side of the terrain.
    pub num_chunks: u32,
    /// World space distance between two adjacent height samples.
    pub vertex_stride: f32,
    /// Multiplier applied to each height sample.
    pub height_scale: f32,
    /// Cosine threshold a chunk has to exceed to be considered visible. -1 draws everything.
    pub tolerance: f32,
    /// Only draw chunks that pass the visibility test.
    pub apply_binning: bool,
    /// Leave height displacement to the vertex shader.
    pub on_gpu: bool,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            height_map: None,
            num_chunks: 8,
            vertex_stride: 2.0,
            height_scale: 1.0,
            tolerance: 0.0,
            apply_binning: true,
            on_gpu: false,
        }
    }
}

impl From<ConfigLines> for TerrainSettings {
    fn from(value: ConfigLines) -> Self {
        let mut settings = Self::default();

        for line in value.iter() {
            match line.key.as_str() {
                "SET" => match line.string(0).as_str() {
                    "num_chunks" => {
                        let num_chunks: i32 = line.param(1);
                        // Negative values are rejected by `validate`.
                        settings.num_chunks = num_chunks.max(0) as u32;
                    }
                    "vertex_stride" => settings.vertex_stride = line.param(1),
                    "height_scale" => settings.height_scale = line.param(1),
                    "tolerance" => settings.tolerance = line.param(1),
                    "apply_binning" => settings.apply_binning = line.param(1),
                    "on_gpu" => settings.on_gpu = line.param(1),
                    _ => tracing::warn!(
                        "Unknown TerrainSettings SET key on line {}: {}",
                        line.line_number,
                        line.string(0)
                    ),
                },

                "HEIGHT_MAP" => settings.height_map = Some(PathBuf::from(line.string(0))),

                _ => tracing::warn!(
                    "Unknown TerrainSettings key on line {}: {}",
                    line.line_number,
                    line.key
                ),
            }
        }

        settings
    }
}

impl TerrainSettings {
    pub fn parse(s: &str) -> Self {
        Self::from(ConfigLines::parse(s))
    }

    /// Read settings from a config file. A relative `HEIGHT_MAP` is resolved against the
    /// directory of the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        tracing::info!("Loading terrain settings: {}", path.display());

        let data =
            std::fs::read_to_string(path).map_err(|err| TerrainError::from_io_error(err, path))?;

        let mut settings = Self::parse(&data);
        if let (Some(height_map), Some(parent)) = (settings.height_map.as_mut(), path.parent()) {
            if height_map.is_relative() {
                *height_map = parent.join(&*height_map);
            }
        }

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.num_chunks == 0 {
            return Err(TerrainError::invalid_input("num_chunks must be greater than 0"));
        }

        if !(self.vertex_stride.is_finite() && self.vertex_stride > 0.0) {
            return Err(TerrainError::invalid_input(format!(
                "vertex_stride must be greater than 0, got {}",
                self.vertex_stride
            )));
        }

        if !self.height_scale.is_finite() {
            return Err(TerrainError::invalid_input("height_scale must be finite"));
        }

        if !(-1.0..=1.0).contains(&self.tolerance) {
            return Err(TerrainError::invalid_input(format!(
                "tolerance must be in -1..=1, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }

    /// Returns true if switching from `other` to `self` requires the mesh and chunks to be
    /// built again.
    pub fn geometry_differs(&self, other: &Self) -> bool {
        self.num_chunks != other.num_chunks
            || self.vertex_stride != other.vertex_stride
            || self.height_scale != other.height_scale
            || self.on_gpu != other.on_gpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_keys() {
        let settings = TerrainSettings::parse(
            r#"
; Terrain settings
HEIGHT_MAP "maps/HeightMap.png"
SET num_chunks 12
SET vertex_stride 4
SET height_scale 0.25
SET tolerance -0.5
SET apply_binning false
SET on_gpu TRUE
SET unknown_key 1
"#,
        );

        assert_eq!(
            settings,
            TerrainSettings {
                height_map: Some(PathBuf::from("maps/HeightMap.png")),
                num_chunks: 12,
                vertex_stride: 4.0,
                height_scale: 0.25,
                tolerance: -0.5,
                apply_binning: false,
                on_gpu: true,
            }
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_keys_use_defaults() {
        let settings = TerrainSettings::parse("SET tolerance 0.75");
        assert_eq!(settings.tolerance, 0.75);
        assert_eq!(settings.num_chunks, TerrainSettings::default().num_chunks);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let invalid = [
            TerrainSettings {
                num_chunks: 0,
                ..Default::default()
            },
            TerrainSettings {
                vertex_stride: 0.0,
                ..Default::default()
            },
            TerrainSettings {
                vertex_stride: f32::NAN,
                ..Default::default()
            },
            TerrainSettings {
                height_scale: f32::INFINITY,
                ..Default::default()
            },
            TerrainSettings {
                tolerance: 1.5,
                ..Default::default()
            },
        ];

        for settings in invalid {
            assert!(
                matches!(settings.validate(), Err(TerrainError::InvalidInput(_))),
                "{settings:?}"
            );
        }

        let negative = TerrainSettings::parse("SET num_chunks -3");
        assert!(negative.validate().is_err());
    }

    #[test]
    fn geometry_changes() {
        let base = TerrainSettings::default();

        let culling_only = TerrainSettings {
            tolerance: 0.9,
            apply_binning: false,
            ..base.clone()
        };
        assert!(!culling_only.geometry_differs(&base));

        let restrided = TerrainSettings {
            vertex_stride: 3.0,
            ..base.clone()
        };
        assert!(restrided.geometry_differs(&base));
    }

    #[test]
    fn load_resolves_height_map_relative_to_config() {
        let dir = std::env::temp_dir().join(format!(
            "chunked_terrain_settings_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("terrain.cfg");
        std::fs::write(&path, "HEIGHT_MAP heights.png\nSET num_chunks 3\n").unwrap();

        let settings = TerrainSettings::load(&path).unwrap();
        assert_eq!(settings.height_map, Some(dir.join("heights.png")));
        assert_eq!(settings.num_chunks, 3);

        std::fs::write(&path, "SET num_chunks 0\n").unwrap();
        assert!(matches!(
            TerrainSettings::load(&path),
            Err(TerrainError::InvalidInput(_))
        ));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
