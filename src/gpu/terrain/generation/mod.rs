pub mod noise;
pub mod height;

pub use noise::NoiseField;
pub use height::{HeightField, HeightParams};
