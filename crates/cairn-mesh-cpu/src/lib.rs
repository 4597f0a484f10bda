//! CPU mesher: turns a chunk's voxel grid into per-material face buffers.
#![forbid(unsafe_code)]

mod chunk;
pub mod cull;
mod face;
mod mesh_build;

pub use chunk::ChunkMeshCPU;
pub use face::Face;
pub use mesh_build::MeshBuild;

use cairn_blocks::{BlockKind, BlockRegistry, MeshBucket};
use cairn_chunk::ChunkBuf;
use cairn_geom::{Aabb, Vec3};

/// Knobs for a mesh build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshOptions {
    /// Drops faces of interior voxels buried in solid formations.
    pub skip_buried_faces: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            skip_buried_faces: true,
        }
    }
}

/// World-space bounds of a chunk column.
pub fn chunk_bounds(buf: &ChunkBuf) -> Aabb {
    let (ox, oz) = buf.coord.origin();
    let min = Vec3::new(ox as f32, 0.0, oz as f32);
    let max = min + Vec3::new(buf.sx as f32, buf.sy as f32, buf.sz as f32);
    Aabb::new(min, max)
}

/// Emits the visible faces of every voxel in `buf`, bucketed by material.
///
/// Only this chunk's voxels are consulted; faces on the chunk walls are always kept.
/// Culling reads transparency and solidity from `reg`.
pub fn build_chunk_mesh(buf: &ChunkBuf, reg: &BlockRegistry, opts: &MeshOptions) -> ChunkMeshCPU {
    let mut out = ChunkMeshCPU {
        coord: buf.coord,
        bbox: chunk_bounds(buf),
        ..Default::default()
    };
    let (ox, oz) = buf.coord.origin();
    let (sx, sy, sz) = (buf.sx as i32, buf.sy as i32, buf.sz as i32);

    let mut exposed: Vec<(i32, i32, i32, BlockKind)> = Vec::new();
    let mut per_bucket = [0usize; MeshBucket::COUNT];
    for y in 0..sy {
        for z in 0..sz {
            for x in 0..sx {
                let me = buf.get(x, y, z);
                if me.is_air() || cull::is_fully_hidden(reg, buf, x, y, z) {
                    continue;
                }
                let edge = x == 0 || x == sx - 1 || z == 0 || z == sz - 1;
                if opts.skip_buried_faces && !edge && cull::in_solid_formation(reg, buf, x, y, z) {
                    continue;
                }
                per_bucket[me.bucket().index()] += 1;
                exposed.push((x, y, z, me));
            }
        }
    }
    // Exposed voxels mostly show one or two faces.
    for bucket in MeshBucket::ALL {
        out.part_mut(bucket).reserve_quads(per_bucket[bucket.index()] * 2);
    }

    for (x, y, z, me) in exposed {
        let origin = Vec3::new((ox + x) as f32, y as f32, (oz + z) as f32);
        let part = out.part_mut(me.bucket());
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            let neighbor = buf.contains_local(nx, ny, nz).then(|| buf.get(nx, ny, nz));
            if cull::face_visible(reg, me, neighbor, face, y) {
                part.add_face(face, origin);
            }
        }
    }
    log::trace!(target: "mesh", "chunk {:?}: {} quads", buf.coord, out.quad_count());
    out
}
