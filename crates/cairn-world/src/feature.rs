use cairn_chunk::{ChunkBuf, ChunkCoord};

/// Surface position handed to features; built per column and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainContext {
    pub chunk: ChunkCoord,
    pub terrain_height: i32,
    pub is_lake: bool,
    pub water_level: i32,
    pub world_x: i32,
    pub world_y: i32,
    pub world_z: i32,
}

impl TerrainContext {
    /// Position relative to the chunk being generated. May fall outside the
    /// grid for overhanging features stamped from neighbouring columns.
    #[inline]
    pub fn local(&self) -> (i32, i32, i32) {
        let (ox, oz) = self.chunk.origin();
        (self.world_x - ox, self.world_y, self.world_z - oz)
    }
}

/// Structure stamped onto finished base terrain.
pub trait TerrainFeature: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> i32;

    fn should_generate(&self, ctx: &TerrainContext) -> bool;

    fn generate(&self, chunk: &mut ChunkBuf, ctx: &TerrainContext);

    /// Horizontal overhang past the origin column.
    fn reach(&self) -> i32 {
        0
    }

    /// Chunk-wide fix-up run after every column has been offered to features.
    fn post_process(&self, _chunk: &mut ChunkBuf) {}
}
