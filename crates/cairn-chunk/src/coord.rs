use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE_X: usize = 16;
pub const CHUNK_HEIGHT: usize = 64;
pub const CHUNK_SIZE_Z: usize = 16;

/// Largest chunk index a world position maps to. Leaves headroom so ring and
/// preload offsets around it, and their voxel origins, stay inside `i32`.
pub const MAX_CHUNK_COORD: i32 = i32::MAX / CHUNK_SIZE_X as i32 - 1024;

/// Column coordinate of a chunk; chunks span the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx.saturating_add(dx),
            cz: self.cz.saturating_add(dz),
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx) - i64::from(other.cx);
        let dz = i64::from(self.cz) - i64::from(other.cz);
        dx * dx + dz * dz
    }

    /// Euclidean distance in chunk units.
    #[inline]
    pub fn distance(self, other: ChunkCoord) -> f32 {
        (self.distance_sq(other) as f64).sqrt() as f32
    }

    /// Ring index around `other` (max of the axis deltas).
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        let d = self.cx.abs_diff(other.cx).max(self.cz.abs_diff(other.cz));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// World-space x/z of the chunk's (0, 0) corner.
    #[inline]
    pub fn origin(self) -> (i32, i32) {
        (
            self.cx.saturating_mul(CHUNK_SIZE_X as i32),
            self.cz.saturating_mul(CHUNK_SIZE_Z as i32),
        )
    }

    /// Chunk containing world column (wx, wz); floor division for negatives.
    #[inline]
    pub fn containing(wx: i32, wz: i32) -> Self {
        Self {
            cx: wx.div_euclid(CHUNK_SIZE_X as i32),
            cz: wz.div_euclid(CHUNK_SIZE_Z as i32),
        }
    }

    /// Chunk containing a floating-point world position, clamped to
    /// `±MAX_CHUNK_COORD`. NaN maps to chunk 0.
    #[inline]
    pub fn from_world_f32(x: f32, z: f32) -> Self {
        let axis = |v: f32, size: usize| {
            ((v / size as f32).floor() as i32).clamp(-MAX_CHUNK_COORD, MAX_CHUNK_COORD)
        };
        Self {
            cx: axis(x, CHUNK_SIZE_X),
            cz: axis(z, CHUNK_SIZE_Z),
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Splits a world position into its chunk and the local x/z inside it.
#[inline]
pub fn world_to_local(wx: i32, wz: i32) -> (ChunkCoord, usize, usize) {
    let coord = ChunkCoord::containing(wx, wz);
    let lx = wx.rem_euclid(CHUNK_SIZE_X as i32) as usize;
    let lz = wz.rem_euclid(CHUNK_SIZE_Z as i32) as usize;
    (coord, lx, lz)
}

#[inline]
pub fn local_to_world(coord: ChunkCoord, lx: i32, lz: i32) -> (i32, i32) {
    let (ox, oz) = coord.origin();
    (ox.saturating_add(lx), oz.saturating_add(lz))
}
