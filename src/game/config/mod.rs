pub mod parser;
mod terrain_settings;

pub use terrain_settings::*;
