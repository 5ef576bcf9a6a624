use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not load resource {}: {source}", path.display())]
    ResourceLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Image load error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported height map format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl TerrainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn from_io_error(source: std::io::Error, path: &Path) -> Self {
        Self::ResourceLoad {
            path: path.to_path_buf(),
            source,
        }
    }
}
