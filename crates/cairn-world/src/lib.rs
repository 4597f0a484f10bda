//! Procedural terrain: noise, configuration, terrain sampling, features and chunk generation.
#![forbid(unsafe_code)]

pub mod config;
pub mod feature;
pub mod generator;
pub mod noise;
pub mod terrain;
pub mod trees;

pub use config::WorldConfig;
pub use feature::{TerrainContext, TerrainFeature};
pub use generator::{ChunkGenerator, FlatGenerator, WorldGenerator, fix_floating_water};
pub use noise::NoiseField;
pub use terrain::{ColumnInfo, TerrainSampler};
pub use trees::TreeFeature;
