use cairn_blocks::BlockKind;
use cairn_chunk::{
    CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z, ChunkBuf, ChunkCoord, MAX_CHUNK_COORD, local_to_world,
    world_to_local,
};
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=8
}

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

fn kind() -> impl Strategy<Value = BlockKind> {
    (0u8..BlockKind::COUNT as u8).prop_map(|c| BlockKind::from_code(c).unwrap_or_default())
}

fn patterned(coord: ChunkCoord) -> ChunkBuf {
    let mut buf = ChunkBuf::new(coord);
    for (i, b) in buf.blocks.iter_mut().enumerate() {
        *b = BlockKind::from_code((i % BlockKind::COUNT) as u8).unwrap_or_default();
    }
    buf
}

#[test]
fn standard_size_and_layout() {
    let buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    assert_eq!(buf.blocks.len(), CHUNK_SIZE_X * CHUNK_HEIGHT * CHUNK_SIZE_Z);
    assert_eq!(buf.idx(1, 0, 0), 1);
    assert_eq!(buf.idx(0, 0, 1), 16);
    assert_eq!(buf.idx(0, 1, 0), 256);
    assert!(buf.is_all_air());
}

#[test]
fn set_reports_changes() {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    assert!(buf.set(3, 10, 4, BlockKind::Stone));
    assert!(!buf.set(3, 10, 4, BlockKind::Stone));
    assert_eq!(buf.get(3, 10, 4), BlockKind::Stone);
    assert_eq!(buf.top_solid_y(3, 4), Some(10));
    assert_eq!(buf.count(BlockKind::Stone), 1);
}

#[test]
fn negative_world_coords_map_to_floor_chunks() {
    let (c, lx, lz) = world_to_local(-1, -17);
    assert_eq!(c, ChunkCoord::new(-1, -2));
    assert_eq!((lx, lz), (15, 15));
    assert_eq!(local_to_world(c, lx as i32, lz as i32), (-1, -17));
    assert_eq!(ChunkCoord::from_world_f32(-0.5, 15.9), ChunkCoord::new(-1, 0));
}

#[test]
fn extreme_positions_clamp_instead_of_overflowing() {
    let far = ChunkCoord::from_world_f32(f32::MAX, f32::MIN);
    assert_eq!(far, ChunkCoord::new(MAX_CHUNK_COORD, -MAX_CHUNK_COORD));
    assert_eq!(ChunkCoord::from_world_f32(f32::NAN, 1e30), ChunkCoord::new(0, MAX_CHUNK_COORD));
    let (ox, oz) = far.offset(40, -40).origin();
    assert!(ox > 0 && oz < 0);
    assert!(far.distance(ChunkCoord::new(-MAX_CHUNK_COORD, MAX_CHUNK_COORD)).is_finite());

    let edge = ChunkCoord::new(i32::MAX, i32::MIN);
    assert_eq!(edge.offset(1, -1), edge);
    assert_eq!(edge.origin(), (i32::MAX, i32::MIN));
    assert_eq!(edge.chebyshev(ChunkCoord::new(i32::MIN, 0)), i32::MAX);
    assert_eq!(local_to_world(edge, 15, -15), (i32::MAX, i32::MIN));
    let buf = ChunkBuf::new(edge);
    assert_eq!(buf.get_world(0, 10, 0), None);
}

proptest! {
    #[test]
    fn idx_is_unique_and_in_range(cx in small_i32(), cz in small_i32(), sx in dim(), sy in dim(), sz in dim()) {
        let expect = sx * sy * sz;
        let buf = ChunkBuf::from_blocks_local(ChunkCoord::new(cx, cz), sx, sy, sz, Vec::new());
        prop_assert_eq!(buf.blocks.len(), expect);
        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..sz { for x in 0..sx {
            let i = buf.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // Out-of-grid reads are air and out-of-grid writes change nothing.
    #[test]
    fn out_of_bounds_is_air_and_write_is_noop(
        x in -100i32..100, y in -100i32..200, z in -100i32..100, k in kind(),
    ) {
        prop_assume!(!(0..16).contains(&x) || !(0..64).contains(&y) || !(0..16).contains(&z));
        let mut buf = patterned(ChunkCoord::new(2, -3));
        let before = buf.clone();
        prop_assert_eq!(buf.get(x, y, z), BlockKind::Air);
        prop_assert!(!buf.set(x, y, z, k));
        prop_assert_eq!(buf, before);
    }

    #[test]
    fn in_bounds_set_then_get(x in 0i32..16, y in 0i32..64, z in 0i32..16, k in kind()) {
        let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
        buf.set(x, y, z, k);
        prop_assert_eq!(buf.get(x, y, z), k);
        prop_assert_eq!(buf.blocks[buf.idx(x as usize, y as usize, z as usize)], k);
    }

    #[test]
    fn get_world_agrees_with_local(cx in -1000i32..1000, cz in -1000i32..1000, lx in 0usize..16, ly in 0usize..64, lz in 0usize..16) {
        let coord = ChunkCoord::new(cx, cz);
        let buf = patterned(coord);
        let (wx, wz) = local_to_world(coord, lx as i32, lz as i32);
        prop_assert_eq!(buf.get_world(wx, ly as i32, wz), Some(buf.get_local(lx, ly, lz)));
        prop_assert_eq!(buf.get_world(wx - lx as i32 - 1, ly as i32, wz), None);
        prop_assert_eq!(buf.get_world(wx, -1, wz), None);
        let (c2, lx2, lz2) = world_to_local(wx, wz);
        prop_assert_eq!(c2, coord);
        prop_assert_eq!((lx2, lz2), (lx, lz));
    }

    #[test]
    fn chebyshev_bounds_euclid(ax in small_i32(), az in small_i32(), dx in -50i32..50, dz in -50i32..50) {
        let a = ChunkCoord::new(ax, az);
        let b = a.offset(dx, dz);
        let cheb = a.chebyshev(b) as f32;
        let d = a.distance(b);
        prop_assert!(d + 1e-3 >= cheb);
        prop_assert!(d <= cheb * 1.5 + 1e-3);
    }
}
