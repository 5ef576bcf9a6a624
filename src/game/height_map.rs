use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::TerrainError;

/// File formats a height map can be loaded from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::EnumString, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HeightMapFormat {
    Pcx,
    Png,
    #[strum(serialize = "ppm", serialize = "pgm", serialize = "pnm")]
    Pnm,
    Bmp,
    #[strum(serialize = "jpg", serialize = "jpeg")]
    Jpeg,
}

impl HeightMapFormat {
    /// Determine the format from the extension of the path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| extension.parse().ok())
    }

    fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Pcx => None,
            Self::Png => Some(image::ImageFormat::Png),
            Self::Pnm => Some(image::ImageFormat::Pnm),
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
        }
    }
}

/// A square grid of elevation samples.
///
/// Samples are addressed by `[row, col]` and stored row major. Images are loaded in raw byte
/// scale, so each sample is in `0.0..=255.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    /// Amount of samples along each side.
    size: u32,
    samples: Vec<f32>,
}

impl HeightField {
    pub fn new(size: u32, samples: Vec<f32>) -> Result<Self, TerrainError> {
        if size == 0 {
            return Err(TerrainError::invalid_input("height field must not be empty"));
        }

        let expected = size as usize * size as usize;
        if samples.len() != expected {
            return Err(TerrainError::invalid_input(format!(
                "height field of size {size} needs {expected} samples, got {}",
                samples.len()
            )));
        }

        Ok(Self { size, samples })
    }

    /// Build a height field from a row major buffer of intensities. Only the top left square of
    /// `min(width, height)` is kept.
    pub fn from_image(width: u32, height: u32, intensities: &[u8]) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::invalid_input(format!(
                "invalid image dimensions: {width} x {height}"
            )));
        }

        if intensities.len() != width as usize * height as usize {
            return Err(TerrainError::invalid_input(format!(
                "image of {width} x {height} has {} intensities",
                intensities.len()
            )));
        }

        let size = width.min(height);
        let samples = intensities
            .chunks_exact(width as usize)
            .take(size as usize)
            .flat_map(|row| row[..size as usize].iter().map(|&i| i as f32))
            .collect();

        Self::new(size, samples)
    }

    /// Load a height map from disk, selecting the decoder from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();

        let format = HeightMapFormat::from_path(path)
            .ok_or_else(|| TerrainError::UnsupportedFormat(path.to_path_buf()))?;

        info!("Loading height map ({format}): {}", path.display());

        let data = std::fs::read(path).map_err(|err| TerrainError::from_io_error(err, path))?;

        let height_field = match format.image_format() {
            Some(image_format) => Self::from_encoded_image(&data, image_format)?,
            None => Self::from_pcx(&data).map_err(|err| TerrainError::from_io_error(err, path))?,
        };

        debug!("Height map size: {0} x {0}", height_field.size);

        Ok(height_field)
    }

    fn from_encoded_image(
        data: &[u8],
        format: image::ImageFormat,
    ) -> Result<Self, TerrainError> {
        let image = image::load_from_memory_with_format(data, format)?.into_luma8();
        Self::from_image(image.width(), image.height(), image.as_raw())
    }

    fn from_pcx(data: &[u8]) -> Result<Self, std::io::Error> {
        let mut reader = pcx::Reader::from_mem(data)?;

        if !reader.is_paletted() {
            return Err(std::io::ErrorKind::InvalidData.into());
        }

        let width = reader.width() as usize;
        let height = reader.height() as usize;

        let mut intensities = vec![0_u8; width * height];
        for row in intensities.chunks_exact_mut(width) {
            reader.next_row_paletted(row)?;
        }

        Self::from_image(width as u32, height as u32, &intensities)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()))
    }

    /// Amount of samples along each side of the grid.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the sample at the given row and column.
    ///
    /// NOTE: Coordinates outside the grid are clamped to the nearest edge, so neighbours of edge
    /// samples repeat the edge.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> f32 {
        let last = self.size as i32 - 1;
        let row = row.clamp(0, last) as usize;
        let col = col.clamp(0, last) as usize;

        self.samples[row * self.size as usize + col]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Recursively collect every file in `dir` that can be loaded as a height map, sorted by path.
pub fn find_height_maps(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, TerrainError> {
    let dir = dir.as_ref();

    let mut height_maps = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            TerrainError::from_io_error(err.into(), &path)
        })?;

        if entry.file_type().is_file() && HeightMapFormat::from_path(entry.path()).is_some() {
            height_maps.push(entry.into_path());
        }
    }

    height_maps.sort();

    Ok(height_maps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chunked_terrain_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn ramp(size: u32) -> HeightField {
        let samples = (0..size * size).map(|i| i as f32).collect();
        HeightField::new(size, samples).unwrap()
    }

    #[test]
    fn get_inside_returns_samples() {
        let height_field = ramp(4);
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(height_field.get(row, col), (row * 4 + col) as f32);
            }
        }
    }

    #[test]
    fn get_outside_clamps_to_edge() {
        let height_field = ramp(4);
        assert_eq!(height_field.get(-1, 2), height_field.get(0, 2));
        assert_eq!(height_field.get(2, -7), height_field.get(2, 0));
        assert_eq!(height_field.get(4, 1), height_field.get(3, 1));
        assert_eq!(height_field.get(1, 100), height_field.get(1, 3));
        assert_eq!(height_field.get(-5, 99), height_field.get(0, 3));
    }

    #[test]
    fn new_rejects_bad_sizes() {
        assert!(matches!(
            HeightField::new(0, vec![]),
            Err(TerrainError::InvalidInput(_))
        ));
        assert!(matches!(
            HeightField::new(3, vec![0.0; 8]),
            Err(TerrainError::InvalidInput(_))
        ));
    }

    #[test]
    fn from_image_crops_to_square() {
        // 3 wide, 2 high.
        let height_field = HeightField::from_image(3, 2, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(height_field.size(), 2);
        assert_eq!(height_field.samples(), &[1.0, 2.0, 4.0, 5.0]);

        // 2 wide, 3 high.
        let height_field = HeightField::from_image(2, 3, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(height_field.size(), 2);
        assert_eq!(height_field.samples(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn from_image_rejects_bad_input() {
        assert!(matches!(
            HeightField::from_image(0, 4, &[]),
            Err(TerrainError::InvalidInput(_))
        ));
        assert!(matches!(
            HeightField::from_image(2, 2, &[0, 1, 2]),
            Err(TerrainError::InvalidInput(_))
        ));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            HeightMapFormat::from_path(Path::new("maps/training.pcx")),
            Some(HeightMapFormat::Pcx)
        );
        assert_eq!(
            HeightMapFormat::from_path(Path::new("HeightMap.PNG")),
            Some(HeightMapFormat::Png)
        );
        assert_eq!(
            HeightMapFormat::from_path(Path::new("heights.ppm")),
            Some(HeightMapFormat::Pnm)
        );
        assert_eq!(
            HeightMapFormat::from_path(Path::new("photo.jpeg")),
            Some(HeightMapFormat::Jpeg)
        );
        assert_eq!(HeightMapFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(HeightMapFormat::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn load_png() {
        let dir = temp_dir("load_png");
        let path = dir.join("ramp.png");

        let image = image::GrayImage::from_fn(5, 4, |x, y| image::Luma([(y * 5 + x) as u8]));
        image.save(&path).unwrap();

        let height_field = HeightField::load(&path).unwrap();
        assert_eq!(height_field.size(), 4);
        assert_eq!(height_field.get(1, 2), 7.0);
        assert_eq!(height_field.get(3, 3), 18.0);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_paletted_pcx() {
        let dir = temp_dir("load_pcx");
        let path = dir.join("heights.pcx");

        // 4 wide, 3 high. Palette indices are the heights.
        let rows: [[u8; 4]; 3] = [[0, 1, 2, 3], [10, 11, 12, 13], [20, 21, 22, 23]];
        let mut writer = pcx::WriterPaletted::create_file(&path, (4, 3), (300, 300)).unwrap();
        for row in rows.iter() {
            writer.write_row(row).unwrap();
        }
        let palette: Vec<u8> = (0..=255).flat_map(|i| [i, i, i]).collect();
        writer.write_palette(&palette).unwrap();

        let height_field = HeightField::load(&path).unwrap();
        assert_eq!(height_field.size(), 3);
        assert_eq!(
            height_field.samples(),
            &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0]
        );

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_rgb_pcx_is_rejected() {
        let dir = temp_dir("load_rgb_pcx");
        let path = dir.join("colour.pcx");

        let mut writer = pcx::WriterRgb::create_file(&path, (2, 2), (300, 300)).unwrap();
        writer.write_row(&[255, 0, 0, 0, 255, 0]).unwrap();
        writer.write_row(&[0, 0, 255, 255, 255, 255]).unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            HeightField::load(&path),
            Err(TerrainError::ResourceLoad { source, .. })
                if source.kind() == std::io::ErrorKind::InvalidData
        ));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_failures() {
        let dir = temp_dir("load_failures");

        assert!(matches!(
            HeightField::load(dir.join("missing.png")),
            Err(TerrainError::ResourceLoad { .. })
        ));

        assert!(matches!(
            HeightField::load(dir.join("heights.txt")),
            Err(TerrainError::UnsupportedFormat(_))
        ));

        let garbage = dir.join("garbage.png");
        std::fs::write(&garbage, b"definitely not a png").unwrap();
        assert!(matches!(
            HeightField::load(&garbage),
            Err(TerrainError::Image(_))
        ));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn find_height_maps_filters_and_sorts() {
        let dir = temp_dir("find_height_maps");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("b.png"), b"").unwrap();
        std::fs::write(dir.join("a.ppm"), b"").unwrap();
        std::fs::write(dir.join("readme.txt"), b"").unwrap();
        std::fs::write(dir.join("nested").join("c.PCX"), b"").unwrap();

        let found = find_height_maps(&dir).unwrap();
        assert_eq!(
            found,
            vec![
                dir.join("a.ppm"),
                dir.join("b.png"),
                dir.join("nested").join("c.PCX"),
            ]
        );

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn find_height_maps_missing_dir() {
        let dir = std::env::temp_dir().join("chunked_terrain_does_not_exist_at_all");
        assert!(matches!(
            find_height_maps(&dir),
            Err(TerrainError::ResourceLoad { .. })
        ));
    }
}
