//! Chunk lifecycle: background generation, streaming and main-thread meshing.
#![forbid(unsafe_code)]

mod gpu;
mod store;
pub mod streaming;
mod voxel_chunk;
mod world;

pub use gpu::{ChunkGpuMesh, ChunkRenderer, MeshUploader};
pub use store::{ChunkStore, StoreConfig};
pub use voxel_chunk::{ChunkState, VoxelChunk};
pub use world::{PLACEHOLDER_BUDGET, UpdateStats, World, WorldSettings};
