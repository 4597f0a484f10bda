//! Face visibility rules for the per-voxel mesher.

use cairn_blocks::{BlockKind, BlockRegistry};
use cairn_chunk::ChunkBuf;

use crate::face::Face;

/// Below this height faces between similar earthy materials are dropped.
pub const SIMILAR_MATERIAL_MAX_Y: i32 = 40;
/// Below this height interior voxels in fully solid surroundings lose all faces.
pub const SOLID_FORMATION_MAX_Y: i32 = 60;

/// Materials that blend together underground.
#[inline]
pub fn is_similar_pair(a: BlockKind, b: BlockKind) -> bool {
    use BlockKind::*;
    matches!(
        (a, b),
        (Stone, Dirt)
            | (Dirt, Stone)
            | (Stone, Gravel)
            | (Gravel, Stone)
            | (Dirt, Gravel)
            | (Gravel, Dirt)
            | (Sand, Dirt)
            | (Dirt, Sand)
            | (Sand, Stone)
            | (Stone, Sand)
    )
}

/// Decides whether `me` shows its `face` toward `neighbor`.
///
/// `neighbor` is `None` when the face points out of the chunk grid. Such faces
/// are drawn, except the underside of the world floor. Transparency and
/// solidity come from `reg`, so catalog overrides change the result.
pub fn face_visible(
    reg: &BlockRegistry,
    me: BlockKind,
    neighbor: Option<BlockKind>,
    face: Face,
    y: i32,
) -> bool {
    let Some(n) = neighbor else {
        return !(face == Face::NegY && y == 0);
    };
    if n.is_air() {
        return true;
    }
    if n == me {
        return false;
    }
    if reg.is_see_through(me) || !reg.is_opaque(n) {
        return true;
    }
    let distinct = |k: BlockKind| matches!(k, BlockKind::OakLog | BlockKind::Grass);
    if distinct(me) || distinct(n) {
        return true;
    }
    !(y < SIMILAR_MATERIAL_MAX_Y && is_similar_pair(me, n))
}

/// True when the voxel and all six face neighbours are opaque.
///
/// Only checked away from the chunk walls, floor and ceiling.
pub fn is_fully_hidden(reg: &BlockRegistry, buf: &ChunkBuf, x: i32, y: i32, z: i32) -> bool {
    let (sx, sy, sz) = (buf.sx as i32, buf.sy as i32, buf.sz as i32);
    if !(x > 0 && x < sx - 1 && y > 1 && y < sy - 2 && z > 0 && z < sz - 1) {
        return false;
    }
    if !reg.is_opaque(buf.get(x, y, z)) {
        return false;
    }
    Face::ALL.iter().all(|f| {
        let (dx, dy, dz) = f.delta();
        reg.is_opaque(buf.get(x + dx, y + dy, z + dz))
    })
}

/// True for opaque interior voxels whose whole 3x3x3 neighbourhood is opaque.
///
/// Any face such a voxel would still emit sits against another opaque voxel.
pub fn in_solid_formation(reg: &BlockRegistry, buf: &ChunkBuf, x: i32, y: i32, z: i32) -> bool {
    let (sx, sz) = (buf.sx as i32, buf.sz as i32);
    if y >= SOLID_FORMATION_MAX_Y || x <= 1 || x >= sx - 2 || z <= 1 || z >= sz - 2 {
        return false;
    }
    if !reg.is_opaque(buf.get(x, y, z)) {
        return false;
    }
    for dy in -1..=1 {
        for dz in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 && dz == 0 {
                    continue;
                }
                if !buf.contains_local(x + dx, y + dy, z + dz) {
                    return false;
                }
                if !reg.is_opaque(buf.get(x + dx, y + dy, z + dz)) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_precedence() {
        use BlockKind::*;
        let reg = BlockRegistry::with_defaults();
        let face_visible = |me, n, face, y| face_visible(&reg, me, n, face, y);
        assert!(face_visible(Stone, None, Face::PosX, 10));
        assert!(!face_visible(Stone, None, Face::NegY, 0));
        assert!(face_visible(Stone, None, Face::NegY, 5));
        assert!(face_visible(Stone, Some(Air), Face::PosY, 10));
        assert!(!face_visible(Leaves, Some(Leaves), Face::PosY, 50));
        assert!(face_visible(Water, Some(Stone), Face::NegY, 10));
        assert!(face_visible(Sand, Some(Water), Face::PosY, 10));
        assert!(face_visible(Stone, Some(Leaves), Face::PosX, 10));
        assert!(!face_visible(Stone, Some(Dirt), Face::PosX, 10));
        assert!(face_visible(Stone, Some(Dirt), Face::PosX, 45));
        assert!(face_visible(Dirt, Some(Grass), Face::PosY, 10));
        assert!(face_visible(Stone, Some(OakLog), Face::PosX, 10));
        assert!(face_visible(Stone, Some(Wood), Face::PosX, 10));
    }

    #[test]
    fn catalog_overrides_reach_the_table() {
        let glassy = BlockRegistry::from_toml_str("[blocks.stone]\ntransparent = true\n").unwrap();
        assert!(face_visible(&glassy, BlockKind::Stone, Some(BlockKind::Dirt), Face::PosX, 10));
        assert!(face_visible(&glassy, BlockKind::Dirt, Some(BlockKind::Stone), Face::NegX, 10));
        assert!(!face_visible(&glassy, BlockKind::Stone, Some(BlockKind::Stone), Face::PosX, 10));
        let soft = BlockRegistry::from_toml_str("[blocks.gravel]\nsolid = false\n").unwrap();
        assert!(face_visible(&soft, BlockKind::Stone, Some(BlockKind::Gravel), Face::PosY, 10));
    }

    #[test]
    fn similar_pairs_are_symmetric() {
        for a in BlockKind::ALL {
            for b in BlockKind::ALL {
                assert_eq!(is_similar_pair(a, b), is_similar_pair(b, a));
            }
        }
    }
}
