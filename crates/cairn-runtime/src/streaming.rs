//! Which chunks to want, in what order, and which to let go.

use cairn_chunk::ChunkCoord;
use cairn_geom::Vec3;

/// Minimum horizontal movement per update before preloading kicks in.
pub const PRELOAD_MIN_MOVEMENT: f32 = 0.01;
/// How many chunk-lengths ahead of the movement direction are preloaded.
pub const PRELOAD_STEPS: i32 = 3;
/// Extra distance beyond render distance a preloaded chunk may sit at.
pub const PRELOAD_SLACK: f32 = 2.0;

/// Every coordinate within Chebyshev distance `range` of `center`, ring by ring.
pub fn chunks_in_range(center: ChunkCoord, range: i32) -> Vec<ChunkCoord> {
    let range = range.max(0);
    let side = (2 * range + 1) as usize;
    let mut out = Vec::with_capacity(side * side);
    for r in 0..=range {
        for dx in -r..=r {
            for dz in -r..=r {
                if dx.abs().max(dz.abs()) == r {
                    out.push(center.offset(dx, dz));
                }
            }
        }
    }
    out
}

/// Nearest first; coordinates in the same half-chunk distance band go by `cx + cz`.
pub fn sort_by_priority(coords: &mut [ChunkCoord], center: ChunkCoord) {
    coords.sort_by_key(|c| {
        let band = (c.distance(center) * 2.0).floor() as i64;
        (band, i64::from(c.cx) + i64::from(c.cz), c.cx)
    });
}

/// Chunks up to three lengths ahead along the horizontal movement direction.
///
/// Empty when the viewer barely moved. Targets further than
/// `render_distance + 2` from `current` are dropped; duplicates are removed.
pub fn preload_targets(
    current: ChunkCoord,
    movement: Vec3,
    render_distance: i32,
) -> Vec<ChunkCoord> {
    if movement.length() <= PRELOAD_MIN_MOVEMENT {
        return Vec::new();
    }
    let flat = Vec3::new(movement.x, 0.0, movement.z);
    if flat.length_xz() <= f32::EPSILON {
        return Vec::new();
    }
    let dir = flat.normalized();
    let limit = render_distance as f32 + PRELOAD_SLACK;
    let mut out: Vec<ChunkCoord> = Vec::new();
    for step in 1..=PRELOAD_STEPS {
        let s = step as f32;
        let target = current.offset((dir.x * s) as i32, (dir.z * s) as i32);
        if target.distance(current) <= limit && !out.contains(&target) {
            out.push(target);
        }
    }
    out
}

/// Euclidean chunk distance beyond which loaded chunks are dropped.
#[inline]
pub fn unload_distance(render_distance: i32, multiplier: f64) -> f32 {
    (f64::from(render_distance) * multiplier) as f32
}

#[inline]
pub fn should_unload(coord: ChunkCoord, viewer: ChunkCoord, unload_distance: f32) -> bool {
    coord.distance(viewer) > unload_distance
}
