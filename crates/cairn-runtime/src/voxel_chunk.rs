use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use cairn_blocks::BlockKind;
use cairn_chunk::{ChunkBuf, ChunkCoord};
use cairn_world::{ChunkGenerator, FlatGenerator};

/// Lifecycle of a stored chunk. Absence from the store is the implicit first state.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ChunkState {
    /// Created on the main thread, no terrain yet.
    Placeholder = 0,
    /// Waiting in the generation queue.
    Queued = 1,
    /// Claimed by exactly one worker.
    Generating = 2,
    /// Voxels filled, waiting for a main-thread mesh build.
    TerrainReady = 3,
    Meshed = 4,
    /// Edited since the last mesh build.
    Stale = 5,
}

impl ChunkState {
    fn from_u8(v: u8) -> ChunkState {
        match v {
            1 => ChunkState::Queued,
            2 => ChunkState::Generating,
            3 => ChunkState::TerrainReady,
            4 => ChunkState::Meshed,
            5 => ChunkState::Stale,
            _ => ChunkState::Placeholder,
        }
    }

    #[inline]
    pub fn is_generated(self) -> bool {
        self >= ChunkState::TerrainReady
    }

    #[inline]
    pub fn needs_mesh(self) -> bool {
        matches!(self, ChunkState::TerrainReady | ChunkState::Stale)
    }
}

/// A chunk shared between the store, its worker and the main thread.
///
/// The atomic state is the only arbitration point: a worker must win the
/// claim before writing voxels, and the main thread only reads or edits
/// voxels once the state says terrain is ready.
#[derive(Debug)]
pub struct VoxelChunk {
    coord: ChunkCoord,
    state: AtomicU8,
    voxels: RwLock<ChunkBuf>,
}

impl VoxelChunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            state: AtomicU8::new(ChunkState::Placeholder as u8),
            voxels: RwLock::new(ChunkBuf::new(coord)),
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.state().is_generated()
    }

    #[inline]
    pub fn needs_mesh(&self) -> bool {
        self.state().needs_mesh()
    }

    fn transition(&self, from: ChunkState, to: ChunkState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Placeholder -> Queued. False if the chunk is past the placeholder stage.
    pub fn mark_queued(&self) -> bool {
        self.transition(ChunkState::Placeholder, ChunkState::Queued)
    }

    /// Claims the chunk for generation. Only one caller ever gets `true`.
    pub fn try_claim(&self) -> bool {
        self.transition(ChunkState::Queued, ChunkState::Generating)
            || self.transition(ChunkState::Placeholder, ChunkState::Generating)
    }

    /// Generating -> Placeholder, for a claim whose generation never finished.
    pub fn release_claim(&self) -> bool {
        self.transition(ChunkState::Generating, ChunkState::Placeholder)
    }

    /// Generates terrain if this caller wins the claim.
    ///
    /// Without a generator the flat fallback is used. Returns whether this
    /// call did the work; losing the claim is not an error.
    pub fn generate_terrain_only(&self, generator: Option<&dyn ChunkGenerator>) -> bool {
        if !self.try_claim() {
            return false;
        }
        let mut buf = ChunkBuf::new(self.coord);
        match generator {
            Some(g) => g.generate(&mut buf),
            None => FlatGenerator.generate(&mut buf),
        }
        *self.voxels.write().unwrap_or_else(PoisonError::into_inner) = buf;
        self.state
            .store(ChunkState::TerrainReady as u8, Ordering::Release);
        true
    }

    /// TerrainReady or Stale -> Meshed.
    pub fn mark_meshed(&self) -> bool {
        self.transition(ChunkState::TerrainReady, ChunkState::Meshed)
            || self.transition(ChunkState::Stale, ChunkState::Meshed)
    }

    /// Meshed -> Stale. Chunks still waiting for their first mesh stay as they are.
    pub fn mark_stale(&self) -> bool {
        self.transition(ChunkState::Meshed, ChunkState::Stale)
    }

    /// Read access to the voxel grid. Air everywhere until terrain is ready.
    pub fn voxels(&self) -> RwLockReadGuard<'_, ChunkBuf> {
        self.voxels.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Out-of-range local coordinates read as air.
    pub fn get_block(&self, lx: i32, ly: i32, lz: i32) -> BlockKind {
        self.voxels().get(lx, ly, lz)
    }

    /// Writes one voxel and marks the chunk for remeshing.
    ///
    /// A no-op before terrain is ready or for out-of-range coordinates.
    pub fn set_block(&self, lx: i32, ly: i32, lz: i32, kind: BlockKind) -> bool {
        if !self.is_generated() {
            return false;
        }
        let changed = self
            .voxels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(lx, ly, lz, kind);
        if changed {
            self.mark_stale();
        }
        changed
    }
}
