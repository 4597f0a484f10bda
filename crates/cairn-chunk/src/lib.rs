//! Chunk coordinates and the fixed-size voxel grid.
#![forbid(unsafe_code)]

mod coord;

use cairn_blocks::BlockKind;

pub use coord::{
    CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, ChunkCoord, MAX_CHUNK_COORD, local_to_world,
    world_to_local,
};

/// Voxel grid for one chunk column, laid out `x + z*sx + y*sx*sz`.
/// Reads outside the grid return air; writes outside it are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub blocks: Vec<BlockKind>,
}

impl ChunkBuf {
    /// All-air grid of the standard chunk size.
    pub fn new(coord: ChunkCoord) -> Self {
        Self::with_size(coord, CHUNK_SIZE_X, CHUNK_HEIGHT, CHUNK_SIZE_Z)
    }

    pub fn with_size(coord: ChunkCoord, sx: usize, sy: usize, sz: usize) -> Self {
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            blocks: vec![BlockKind::Air; sx * sy * sz],
        }
    }

    pub fn from_blocks_local(
        coord: ChunkCoord,
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<BlockKind>,
    ) -> Self {
        let mut b = blocks;
        let expect = sx * sy * sz;
        if b.len() != expect {
            b.resize(expect, BlockKind::Air);
        }
        ChunkBuf {
            coord,
            sx,
            sy,
            sz,
            blocks: b,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.sx + y * self.sx * self.sz
    }

    #[inline]
    pub fn contains_local(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    /// Unchecked-by-contract read; callers guarantee in-range coordinates.
    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockKind {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockKind {
        if !self.contains_local(x, y, z) {
            return BlockKind::Air;
        }
        self.get_local(x as usize, y as usize, z as usize)
    }

    /// Returns true when the voxel changed.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, kind: BlockKind) -> bool {
        if !self.contains_local(x, y, z) {
            return false;
        }
        let i = self.idx(x as usize, y as usize, z as usize);
        let prev = std::mem::replace(&mut self.blocks[i], kind);
        prev != kind
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let (bx, bz) = self.base();
        if wy < 0 || wy >= self.sy as i32 {
            return false;
        }
        wx >= bx
            && wx < bx.saturating_add(self.sx as i32)
            && wz >= bz
            && wz < bz.saturating_add(self.sz as i32)
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockKind> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let (bx, bz) = self.base();
        Some(self.get_local((wx - bx) as usize, wy as usize, (wz - bz) as usize))
    }

    #[inline]
    fn base(&self) -> (i32, i32) {
        (
            self.coord.cx.saturating_mul(self.sx as i32),
            self.coord.cz.saturating_mul(self.sz as i32),
        )
    }

    /// Highest non-air y in the column, if any.
    pub fn top_solid_y(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.sy).rev().find(|&y| !self.get_local(x, y, z).is_air())
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| **b == kind).count()
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_air())
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }
}
