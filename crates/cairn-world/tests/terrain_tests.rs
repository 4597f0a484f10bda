use cairn_blocks::BlockKind;
use cairn_world::{TerrainSampler, WorldConfig};
use proptest::prelude::*;

/// Lake noise always passes so only the containment rule decides.
fn always_lake_noise() -> TerrainSampler {
    let mut cfg = WorldConfig::default();
    cfg.terrain.lakes.threshold = -1.5;
    TerrainSampler::new(&cfg)
}

#[test]
fn leaky_candidate_is_rejected() {
    let s = always_lake_noise();
    // Slope falling away to +x: 8 of 12 ring samples (66%) are at or above the centre.
    let slope = |x: i32, _z: i32| if x > 0 { 0 } else if x < 0 { 20 } else { 10 };
    assert!(!s.should_generate_lake_with(0, 0, slope));
}

#[test]
fn enclosed_basin_without_rim_is_rejected() {
    let s = always_lake_noise();
    let flat = |_x: i32, _z: i32| 30;
    assert!(!s.should_generate_lake_with(0, 0, flat));
}

#[test]
fn bowl_is_accepted() {
    let s = always_lake_noise();
    let bowl = |x: i32, z: i32| if x == 0 && z == 0 { 20 } else { 25 };
    assert!(s.should_generate_lake_with(0, 0, bowl));
}

#[test]
fn ratio_just_below_seventy_percent_is_rejected() {
    let s = always_lake_noise();
    // Eight of twelve neighbours (66%) are higher, the four far cardinals are lower.
    let h = |x: i32, z: i32| match (x, z) {
        (0, 0) => 20,
        (dx, dz) if dx.abs() == 2 || dz.abs() == 2 => 10,
        _ => 30,
    };
    assert!(!s.should_generate_lake_with(0, 0, h));
}

#[test]
fn disabled_lakes_never_generate() {
    let mut cfg = WorldConfig::default();
    cfg.terrain.lakes.enabled = false;
    let s = TerrainSampler::new(&cfg);
    let bowl = |x: i32, z: i32| if x == 0 && z == 0 { 20 } else { 25 };
    assert!(!s.should_generate_lake_with(0, 0, bowl));
}

#[test]
fn layers_follow_surface() {
    let s = TerrainSampler::new(&WorldConfig::default());
    let wl = s.water_level();
    let surface = wl + 10;
    assert_eq!(s.block_type_at(100, surface + 1, 100, surface), BlockKind::Air);
    assert_eq!(s.block_type_at(100, 0, 100, surface), BlockKind::Stone);
    let low = wl - 5;
    assert_eq!(s.block_type_at(100, wl, 100, low), BlockKind::Water);
    assert_eq!(s.block_type_at(100, low + 1, 100, low), BlockKind::Water);
    assert_eq!(s.block_type_at(100, wl + 1, 100, low), BlockKind::Air);
}

#[test]
fn surface_block_is_a_top_material() {
    let s = TerrainSampler::new(&WorldConfig::default());
    for i in 0..64 {
        let (x, z) = (i * 37 - 1000, i * 53 - 700);
        let h = s.height_at(x, z);
        let top = s.block_type_at(x, h, z, h);
        assert!(
            matches!(top, BlockKind::Grass | BlockKind::Sand | BlockKind::Dirt),
            "unexpected surface {top:?} at ({x}, {z})"
        );
    }
}

#[test]
fn plains_influence_is_bounded_by_strength() {
    let s = TerrainSampler::new(&WorldConfig::default());
    let strength = s.config().plains.flatness_strength;
    for i in 0..500 {
        let v = s.plains_influence(i * 13, -i * 7);
        assert!((0.0..=strength + 1e-9).contains(&v));
        if v > 0.0 {
            assert!(s.should_generate_plains(i * 13, -i * 7));
        }
    }
}

#[test]
fn tree_candidates_sit_on_the_stride_grid() {
    let s = TerrainSampler::new(&WorldConfig::default());
    for x in -64..64 {
        for z in -64..64 {
            if s.should_generate_tree(x, z) {
                assert_eq!(x.rem_euclid(4), 0);
                assert_eq!(z.rem_euclid(4), 0);
            }
        }
    }
}

#[test]
fn inverted_height_bounds_do_not_panic() {
    let mut cfg = WorldConfig::default();
    cfg.terrain.min_height = 50;
    cfg.terrain.max_height = 20;
    let s = TerrainSampler::new(&cfg);
    for i in 0..200 {
        let h = s.height_at(i * 31 - 3000, i * 17 - 1500);
        assert!(h <= 50 || h == s.water_level() - 8 || h == s.water_level() - 3);
    }
}

proptest! {
    #[test]
    fn height_stays_in_band_or_on_ocean_floor(x in -50_000i32..50_000, z in -50_000i32..50_000) {
        let s = TerrainSampler::new(&WorldConfig::default());
        let cfg = s.config();
        let wl = s.water_level();
        let h = s.height_at(x, z);
        let in_band = h >= cfg.min_height.min(wl - 2) && h <= cfg.max_height;
        prop_assert!(in_band || h == wl - 8 || h == wl - 3, "height {} at ({}, {})", h, x, z);
    }

    #[test]
    fn base_height_is_clamped(x in -50_000i32..50_000, z in -50_000i32..50_000) {
        let s = TerrainSampler::new(&WorldConfig::default());
        let h = s.base_height(x, z);
        prop_assert!((25..=55).contains(&h));
    }

    #[test]
    fn sampler_is_deterministic(seed in any::<u32>(), x in -5000i32..5000, z in -5000i32..5000) {
        let mut cfg = WorldConfig::default();
        cfg.terrain.seed = i64::from(seed);
        let a = TerrainSampler::new(&cfg);
        let b = TerrainSampler::new(&cfg);
        prop_assert_eq!(a.height_at(x, z), b.height_at(x, z));
        prop_assert_eq!(a.should_generate_lake(x, z), b.should_generate_lake(x, z));
    }

    #[test]
    fn gravel_only_near_the_surface(x in -2000i32..2000, z in -2000i32..2000, dy in -20i32..20) {
        let s = TerrainSampler::new(&WorldConfig::default());
        let surface = 30;
        let y = surface + dy;
        if s.should_generate_gravel(x, y, z, surface) {
            prop_assert!((surface - 4..=surface + 1).contains(&y));
        }
    }
}
