use std::sync::{Arc, Mutex};

use cairn_blocks::{BlockKind, BlockRegistry};
use cairn_chunk::{ChunkBuf, ChunkCoord};
use cairn_world::{
    ChunkGenerator, FlatGenerator, TerrainContext, TerrainFeature, TreeFeature, WorldConfig,
    WorldGenerator, fix_floating_water,
};
use proptest::prelude::*;

fn generated(cfg: &WorldConfig, coord: ChunkCoord) -> ChunkBuf {
    let g = WorldGenerator::new(cfg);
    let mut buf = ChunkBuf::new(coord);
    g.generate(&mut buf);
    buf
}

fn flat_chunk() -> ChunkBuf {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    FlatGenerator.generate(&mut buf);
    buf
}

fn tree_config() -> WorldConfig {
    let mut cfg = WorldConfig::default();
    cfg.trees.min_height = 5;
    cfg.trees.max_height = 5;
    cfg
}

#[test]
fn flat_generator_layers() {
    let buf = flat_chunk();
    for (x, z) in [(0, 0), (15, 15), (7, 3)] {
        assert_eq!(buf.get(x, 0, z), BlockKind::Stone);
        assert_eq!(buf.get(x, 2, z), BlockKind::Dirt);
        assert_eq!(buf.get(x, 4, z), BlockKind::Grass);
        assert_eq!(buf.get(x, 5, z), BlockKind::Air);
    }
}

#[test]
fn generation_is_deterministic() {
    let cfg = WorldConfig::default();
    for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 5)] {
        assert_eq!(generated(&cfg, coord), generated(&cfg, coord));
    }
}

#[test]
fn columns_are_solid_below_the_surface() {
    let cfg = WorldConfig::default();
    let g = WorldGenerator::new(&cfg);
    let coord = ChunkCoord::new(2, -1);
    let mut buf = ChunkBuf::new(coord);
    g.generate(&mut buf);
    let (ox, oz) = coord.origin();
    for lz in 0..16 {
        for lx in 0..16 {
            let h = g.sampler().height_at(ox + lx, oz + lz).min(63);
            assert_ne!(buf.get(lx, 0, lz), BlockKind::Air);
            assert!(!buf.get(lx, h, lz).is_air());
            for y in 0..h {
                let k = buf.get(lx, y, lz);
                assert!(!k.is_air() && !k.is_water(), "hole at ({lx}, {y}, {lz})");
            }
        }
    }
}

#[test]
fn water_fills_up_to_sea_level() {
    let cfg = WorldConfig::default();
    let g = WorldGenerator::new(&cfg);
    let wl = g.sampler().water_level();
    // Scan a strip until a column below sea level turns up.
    for cx in -40..40 {
        let coord = ChunkCoord::new(cx * 7, cx * 3);
        let (ox, oz) = coord.origin();
        let h = g.sampler().height_at(ox, oz);
        if h < wl {
            let mut buf = ChunkBuf::new(coord);
            g.generate(&mut buf);
            for y in h + 1..=wl {
                assert_eq!(buf.get(0, y, 0), BlockKind::Water);
            }
            assert_eq!(buf.get(0, wl + 1, 0), BlockKind::Air);
            return;
        }
    }
}

struct Recording {
    name: &'static str,
    priority: i32,
    accept: bool,
    calls: Mutex<Vec<&'static str>>,
    log: &'static Mutex<Vec<&'static str>>,
}

impl TerrainFeature for Recording {
    fn name(&self) -> &'static str {
        self.name
    }
    fn priority(&self) -> i32 {
        self.priority
    }
    fn should_generate(&self, ctx: &TerrainContext) -> bool {
        assert_eq!(ctx.world_y, ctx.terrain_height + 1);
        self.log.lock().unwrap().push(self.name);
        self.accept
    }
    fn generate(&self, _chunk: &mut ChunkBuf, _ctx: &TerrainContext) {
        self.calls.lock().unwrap().push(self.name);
    }
}

#[test]
fn first_eligible_feature_wins_per_column() {
    static LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
    let mut cfg = WorldConfig::default();
    cfg.trees.enabled = false;
    let mut g = WorldGenerator::without_features(&cfg, Arc::new(BlockRegistry::with_defaults()));
    g.add_feature(Box::new(Recording {
        name: "late",
        priority: 50,
        accept: true,
        calls: Mutex::new(Vec::new()),
        log: &LOG,
    }));
    g.add_feature(Box::new(Recording {
        name: "early",
        priority: 1,
        accept: true,
        calls: Mutex::new(Vec::new()),
        log: &LOG,
    }));
    assert_eq!(g.feature_names(), vec!["early", "late"]);
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    g.generate(&mut buf);
    let log = LOG.lock().unwrap();
    assert!(!log.is_empty() && log.len() <= 256);
    assert!(log.iter().all(|n| *n == "early"));
}

#[test]
fn tree_stamps_trunk_and_canopy() {
    let cfg = tree_config();
    let tree = TreeFeature::new(&cfg);
    let mut buf = flat_chunk();
    let ctx = TerrainContext {
        chunk: buf.coord,
        terrain_height: 4,
        is_lake: false,
        water_level: 0,
        world_x: 8,
        world_y: 5,
        world_z: 8,
    };
    tree.generate(&mut buf, &ctx);
    for y in 5..10 {
        assert_eq!(buf.get(8, y, 8), BlockKind::OakLog);
    }
    let leaf_start = 5 + 5 - 2;
    assert_eq!(buf.get(8, leaf_start + 2, 8), BlockKind::Leaves);
    assert_eq!(buf.get(9, leaf_start + 1, 8), BlockKind::Leaves);
    assert_eq!(buf.get(10, leaf_start, 8), BlockKind::Leaves);
    assert_eq!(buf.get(7, leaf_start - 1, 7), BlockKind::Leaves);
    assert_eq!(buf.get(8, leaf_start - 1, 8), BlockKind::OakLog);
    assert!(TreeFeature::count_leaves(&buf, 8, leaf_start, 8) >= 8);
}

#[test]
fn canopy_never_replaces_logs() {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    buf.set(9, 10, 8, BlockKind::OakLog);
    TreeFeature::stamp_canopy(&mut buf, 8, 10, 8, 8, 8);
    assert_eq!(buf.get(9, 10, 8), BlockKind::OakLog);
}

#[test]
fn bare_trunk_gets_a_canopy() {
    let cfg = tree_config();
    let tree = TreeFeature::new(&cfg);
    let mut buf = flat_chunk();
    for y in 5..10 {
        buf.set(3, y, 3, BlockKind::OakLog);
    }
    assert_eq!(TreeFeature::count_leaves(&buf, 3, 8, 3), 0);
    assert_eq!(tree.ensure_all_trees(&mut buf), 1);
    assert!(TreeFeature::count_leaves(&buf, 3, 8, 3) >= 8);
    assert_eq!(tree.ensure_all_trees(&mut buf), 0);
}

#[test]
fn edge_trunk_is_repaired_as_far_as_the_grid_allows() {
    let mut cfg = tree_config();
    cfg.trees.leaves.min_leaves_per_tree = 1;
    let tree = TreeFeature::new(&cfg);
    let mut buf = flat_chunk();
    for y in 5..10 {
        buf.set(0, y, 0, BlockKind::OakLog);
    }
    tree.ensure_all_trees(&mut buf);
    assert!(TreeFeature::count_leaves(&buf, 0, 8, 0) >= 1);
}

#[test]
fn tree_requires_margin_above_water() {
    let tree = TreeFeature::new(&WorldConfig::default());
    let ctx = TerrainContext {
        chunk: ChunkCoord::new(0, 0),
        terrain_height: 33,
        is_lake: false,
        water_level: 32,
        world_x: 0,
        world_y: 34,
        world_z: 0,
    };
    assert!(!tree.should_generate(&ctx));
    let off_surface = TerrainContext {
        terrain_height: 40,
        world_y: 45,
        ..ctx
    };
    assert!(!tree.should_generate(&off_surface));
    let lake = TerrainContext {
        terrain_height: 40,
        world_y: 41,
        is_lake: true,
        ..ctx
    };
    assert!(!tree.should_generate(&lake));
}

#[test]
fn floating_water_is_removed_and_pooled_water_kept() {
    let mut buf = flat_chunk();
    // Pool resting on grass.
    buf.set(5, 5, 5, BlockKind::Water);
    buf.set(5, 6, 5, BlockKind::Water);
    // Sheet hanging in the air.
    buf.set(10, 30, 10, BlockKind::Water);
    let removed = fix_floating_water(&mut buf, &BlockRegistry::with_defaults());
    assert_eq!(removed, 1);
    assert_eq!(buf.get(5, 5, 5), BlockKind::Water);
    assert_eq!(buf.get(5, 6, 5), BlockKind::Water);
    assert_eq!(buf.get(10, 30, 10), BlockKind::Air);
}

#[test]
fn enclosed_water_survives() {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    buf.set(5, 20, 5, BlockKind::Water);
    buf.set(4, 20, 5, BlockKind::Stone);
    buf.set(6, 20, 5, BlockKind::Stone);
    assert_eq!(fix_floating_water(&mut buf, &BlockRegistry::with_defaults()), 0);
}

#[test]
fn water_support_follows_the_catalog() {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    buf.set(10, 29, 10, BlockKind::Stone);
    buf.set(10, 30, 10, BlockKind::Water);
    let mut kept = buf.clone();
    assert_eq!(fix_floating_water(&mut kept, &BlockRegistry::with_defaults()), 0);

    let hollow = BlockRegistry::from_toml_str("[blocks.stone]\nsolid = false\n").unwrap();
    assert_eq!(fix_floating_water(&mut buf, &hollow), 1);
    assert_eq!(buf.get(10, 30, 10), BlockKind::Air);
}

#[test]
fn generator_shares_the_injected_catalog() {
    let reg = Arc::new(BlockRegistry::with_defaults());
    let g = WorldGenerator::with_registry(&WorldConfig::default(), Arc::clone(&reg));
    assert!(std::ptr::eq(g.registry(), &*reg));
    assert_eq!(g.feature_names(), vec!["trees"]);
}

#[test]
fn cross_chunk_leaves_only_add_leaves() {
    let mut cfg = WorldConfig::default();
    let plain = generated(&cfg, ChunkCoord::new(1, 1));
    cfg.trees.leaves.enable_cross_chunk_leaves = true;
    let spill = generated(&cfg, ChunkCoord::new(1, 1));
    for (a, b) in plain.blocks.iter().zip(spill.blocks.iter()) {
        if a != b {
            assert_eq!(*b, BlockKind::Leaves);
        }
    }
}

proptest! {
    // Never two tree origins inside one spacing cell.
    #[test]
    fn at_most_one_origin_per_cell(gx in -200i32..200, gz in -200i32..200, spacing in 2i32..12) {
        let mut cfg = WorldConfig::default();
        cfg.trees.min_spacing = spacing;
        let tree = TreeFeature::new(&cfg);
        let mut origins = 0;
        for dz in 0..spacing {
            for dx in 0..spacing {
                if tree.is_spacing_origin(gx * spacing + dx, gz * spacing + dz) {
                    origins += 1;
                }
            }
        }
        prop_assert!(origins <= 1);
    }

    #[test]
    fn tree_height_is_in_bounds(x in -10_000i32..10_000, z in -10_000i32..10_000) {
        let cfg = WorldConfig::default();
        let tree = TreeFeature::new(&cfg);
        let h = tree.tree_height(x, z);
        prop_assert!((cfg.trees.min_height..=cfg.trees.max_height).contains(&h));
    }
}
