pub mod camera;
pub mod config;
pub mod error;
pub mod height_map;
pub mod terrain;
