//! Per-column terrain height and per-voxel block selection.

use cairn_blocks::BlockKind;

use crate::config::{TerrainConfig, TreesConfig, WorldConfig};
use crate::noise::NoiseField;

const CONTINENT_FREQUENCY: f64 = 0.0008;
const DEEP_OCEAN: f64 = -0.3;
const SHALLOW_OCEAN: f64 = -0.1;
const SHORE_EDGE: f64 = 0.4;
const INLAND: f64 = 0.1;

const RIDGE_SELECT_FREQUENCY: f64 = 0.003;
const RIDGE_SELECT_THRESHOLD: f64 = 0.3;

const BASE_HEIGHT_MIN: i32 = 25;
const BASE_HEIGHT_MAX: i32 = 55;

const COAST_SEARCH_RADIUS: i32 = 6;

/// Neighbour offsets sampled for lake containment.
const LAKE_RING: [(i32, i32); 12] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
];
const LAKE_ENCLOSED_RATIO: f64 = 0.7;
const LAKE_RIM_RATIO: f64 = 0.2;
const LAKE_RIM_MARGIN: i32 = 2;

const GRAVEL_SEARCH_RADIUS: i32 = 6;
const GRAVEL_DIAGONAL_RADIUS: i32 = 4;

/// Derived facts about one column, computed once and reused for every voxel in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnInfo {
    pub x: i32,
    pub z: i32,
    pub surface: i32,
    pub is_lake: bool,
    pub is_ocean: bool,
    pub is_coastal: bool,
    /// Distance to the nearest lake column, when one is in range.
    pub lake_distance: Option<f64>,
}

/// Stateless terrain evaluator built from seeded noise fields.
#[derive(Clone, Debug)]
pub struct TerrainSampler {
    cfg: TerrainConfig,
    trees: TreesConfig,
    height: NoiseField,
    detail: NoiseField,
    lake: NoiseField,
    tree: NoiseField,
    plains: NoiseField,
    continent: NoiseField,
}

impl TerrainSampler {
    pub fn new(cfg: &WorldConfig) -> Self {
        let seed = cfg.terrain.seed as u64;
        Self {
            cfg: cfg.terrain.clone(),
            trees: cfg.trees.clone(),
            height: NoiseField::new(seed),
            detail: NoiseField::new(seed.wrapping_add(1000)),
            lake: NoiseField::new(seed.wrapping_add(3000)),
            tree: NoiseField::new(seed.wrapping_add(4000)),
            plains: NoiseField::new(seed.wrapping_add(5000)),
            continent: NoiseField::new(seed.wrapping_add(6000)),
        }
    }

    #[inline]
    pub fn config(&self) -> &TerrainConfig {
        &self.cfg
    }

    #[inline]
    pub fn water_level(&self) -> i32 {
        self.cfg.sea_level
    }

    #[inline]
    pub fn continental(&self, x: i32, z: i32) -> f64 {
        self.continent.octave(
            x as f64 * CONTINENT_FREQUENCY,
            z as f64 * CONTINENT_FREQUENCY,
            3,
            0.5,
        )
    }

    #[inline]
    pub fn is_in_ocean_area(&self, x: i32, z: i32) -> bool {
        self.continental(x, z) < SHALLOW_OCEAN
    }

    /// Base FBM plus a selectively applied ridge layer plus fine detail.
    pub fn height_noise(&self, x: i32, z: i32) -> f64 {
        let hn = &self.cfg.height_noise;
        let (fx, fz) = (x as f64, z as f64);
        let f = hn.frequency;
        let base = self.height.fbm(
            fx * f,
            fz * f,
            hn.octaves.max(1) as u32,
            hn.persistence,
            hn.lacunarity,
        );
        let selector = self
            .height
            .noise2(fx * RIDGE_SELECT_FREQUENCY, fz * RIDGE_SELECT_FREQUENCY);
        let ridge = if selector > RIDGE_SELECT_THRESHOLD {
            self.height.ridged(fx * f * 0.5, fz * f * 0.5, 2, 0.6) * 0.2
        } else {
            0.0
        };
        let detail = self.detail.octave(fx * f * 3.0, fz * f * 3.0, 2, 0.3);
        base * 0.75 + ridge + detail * 0.15
    }

    /// Raw plains field; plains exist where it exceeds the threshold.
    #[inline]
    fn plains_value(&self, x: i32, z: i32) -> f64 {
        let f = self.cfg.plains.frequency;
        self.plains.octave(x as f64 * f, z as f64 * f, 3, 0.5)
    }

    pub fn should_generate_plains(&self, x: i32, z: i32) -> bool {
        self.cfg.plains.enabled && self.plains_value(x, z) > self.cfg.plains.threshold
    }

    /// Blend weight toward the plains target height, in `[0, flatnessStrength]`.
    pub fn plains_influence(&self, x: i32, z: i32) -> f64 {
        let p = &self.cfg.plains;
        if !p.enabled {
            return 0.0;
        }
        let n = self.plains_value(x, z);
        if n <= p.threshold {
            return 0.0;
        }
        let span = (1.0 - p.threshold).max(1e-6);
        ((n - p.threshold) / span).clamp(0.0, 1.0) * p.flatness_strength
    }

    #[inline]
    fn land_height(&self, x: i32, z: i32) -> i32 {
        let wl = self.water_level();
        let mut h =
            (self.cfg.base_height as f64 + self.height_noise(x, z) * self.cfg.height_noise.amplitude)
                as i32;
        let influence = self.plains_influence(x, z);
        if influence > 0.0 {
            h = (h as f64 * (1.0 - influence) + (wl + 3) as f64 * influence) as i32;
        }
        h
    }

    /// Surface height of the column at (x, z).
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let wl = self.water_level();
        let continental = self.continental(x, z);
        if continental < DEEP_OCEAN {
            return wl - 8;
        }
        if continental < SHALLOW_OCEAN {
            return wl - 3;
        }
        let mut h = self.land_height(x, z);
        if continental < SHORE_EDGE {
            let shore = (continental + 0.3).max(0.0) / 0.7;
            h = (h as f64 * shore + (wl + 2) as f64 * (1.0 - shore)) as i32;
        }
        h = h.clamp(self.cfg.min_height, self.cfg.max_height.max(self.cfg.min_height));
        if continental > INLAND && self.should_generate_lake(x, z) {
            h = (h - 3).max(wl - 2);
        }
        h
    }

    /// Height without continental shaping or lakes; used for containment tests.
    pub fn base_height(&self, x: i32, z: i32) -> i32 {
        self.land_height(x, z).clamp(BASE_HEIGHT_MIN, BASE_HEIGHT_MAX)
    }

    #[inline]
    fn lake_noise_passes(&self, x: i32, z: i32) -> bool {
        let l = &self.cfg.lakes;
        l.enabled && self.lake.octave(x as f64 * l.frequency, z as f64 * l.frequency, 3, 0.6) > l.threshold
    }

    pub fn should_generate_lake(&self, x: i32, z: i32) -> bool {
        self.should_generate_lake_with(x, z, |sx, sz| self.base_height(sx, sz))
    }

    /// Lake test against an arbitrary height function.
    ///
    /// The candidate must sit in a basin: at least 70% of the ring at or above
    /// its height and at least 20% higher by the rim margin.
    pub fn should_generate_lake_with(&self, x: i32, z: i32, height: impl Fn(i32, i32) -> i32) -> bool {
        if !self.lake_noise_passes(x, z) {
            return false;
        }
        let centre = height(x, z);
        let mut enclosed = 0usize;
        let mut rim = 0usize;
        for (dx, dz) in LAKE_RING {
            let h = height(x + dx, z + dz);
            if h >= centre {
                enclosed += 1;
            }
            if h >= centre + LAKE_RIM_MARGIN {
                rim += 1;
            }
        }
        let n = LAKE_RING.len() as f64;
        enclosed as f64 / n >= LAKE_ENCLOSED_RATIO && rim as f64 / n >= LAKE_RIM_RATIO
    }

    /// Land near sea level that borders an ocean gets a sand beach.
    pub fn is_coastal(&self, x: i32, z: i32, surface: i32) -> bool {
        let wl = self.water_level();
        if surface > wl + 3 {
            return false;
        }
        if self.continental(x, z) <= -0.2 {
            return false;
        }
        let variation = self.lake.octave(x as f64 * 0.04, z as f64 * 0.04, 2, 0.5);
        if variation <= -0.2 {
            return false;
        }
        for dz in -COAST_SEARCH_RADIUS..=COAST_SEARCH_RADIUS {
            for dx in -COAST_SEARCH_RADIUS..=COAST_SEARCH_RADIUS {
                if (dx, dz) != (0, 0) && self.is_in_ocean_area(x + dx, z + dz) {
                    return true;
                }
            }
        }
        false
    }

    /// Column facts for a surface height already known to the caller.
    pub fn column_with_surface(&self, x: i32, z: i32, surface: i32, is_lake: bool) -> ColumnInfo {
        let is_ocean = self.is_in_ocean_area(x, z);
        let is_coastal = !is_ocean && !is_lake && self.is_coastal(x, z, surface);
        let lake_distance = if self.cfg.gravel.enabled {
            self.nearest_lake_distance(x, z)
        } else {
            None
        };
        ColumnInfo {
            x,
            z,
            surface,
            is_lake,
            is_ocean,
            is_coastal,
            lake_distance,
        }
    }

    /// Distance to the nearest lake column within the search pattern.
    fn nearest_lake_distance(&self, x: i32, z: i32) -> Option<f64> {
        let mut best: Option<f64> = None;
        for r in 1..=GRAVEL_SEARCH_RADIUS {
            let cardinals = [(r, 0), (-r, 0), (0, r), (0, -r)];
            let diagonals = [(r, r), (-r, r), (r, -r), (-r, -r)];
            let n_diag = if r <= GRAVEL_DIAGONAL_RADIUS { 4 } else { 0 };
            for (dx, dz) in cardinals.into_iter().chain(diagonals.into_iter().take(n_diag)) {
                if self.should_generate_lake(x + dx, z + dz) {
                    let d = ((dx * dx + dz * dz) as f64).sqrt();
                    if best.is_none_or(|b| d < b) {
                        best = Some(d);
                    }
                }
            }
            if best.is_some_and(|b| b <= 1.0) {
                break;
            }
        }
        best
    }

    /// Gravel near lake shores, strongest at the waterline and the surface.
    pub fn should_generate_gravel(&self, x: i32, y: i32, z: i32, surface: i32) -> bool {
        if !self.gravel_in_band(y, surface) {
            return false;
        }
        self.gravel_with_distance(x, y, z, surface, self.nearest_lake_distance(x, z))
    }

    #[inline]
    fn gravel_in_band(&self, y: i32, surface: i32) -> bool {
        self.cfg.gravel.enabled && y >= surface - 4 && y <= surface + 1
    }

    fn gravel_with_distance(
        &self,
        x: i32,
        y: i32,
        z: i32,
        surface: i32,
        lake_distance: Option<f64>,
    ) -> bool {
        let g = &self.cfg.gravel;
        let Some(dist) = lake_distance else {
            return false;
        };
        if dist > g.max_distance {
            return false;
        }
        let falloff = 1.0 - dist / g.max_distance;
        let dist_factor = falloff * falloff;

        let (fx, fz) = (x as f64, z as f64);
        let primary = self.detail.octave(fx * g.frequency, fz * g.frequency, 3, 0.65);
        let texture = self.lake.octave(fx * g.frequency * 3.0, fz * g.frequency * 3.0, 2, 0.35);
        let breakup = self.height.octave(fx * g.frequency * 2.0, fz * g.frequency * 2.0, 2, 0.4);

        let depth = (y - surface).abs();
        let depth_factor = if depth <= 1 {
            1.0
        } else {
            (1.0 - (depth - 1) as f64 / 3.0).max(0.0)
        };

        let combined = 0.5 * primary + 0.3 * texture + 0.2 * breakup;
        let threshold = 0.15 - g.density * dist_factor * depth_factor;
        if dist <= 1.5 && (surface - 1..=surface).contains(&y) {
            combined > -g.edge_bonus
        } else if dist <= 3.0 {
            combined > threshold * 0.8
        } else {
            combined > threshold
        }
    }

    /// Block at (x, y, z) given the column's surface height.
    pub fn block_type_at(&self, x: i32, y: i32, z: i32, surface: i32) -> BlockKind {
        if y > surface {
            return if y <= self.water_level() {
                BlockKind::Water
            } else {
                BlockKind::Air
            };
        }
        let is_lake = self.should_generate_lake(x, z);
        let col = self.column_with_surface(x, z, surface, is_lake);
        self.block_in_column(&col, y)
    }

    /// Block at height `y` inside a precomputed column.
    pub fn block_in_column(&self, col: &ColumnInfo, y: i32) -> BlockKind {
        let surface = col.surface;
        let wl = self.water_level();
        if y > surface {
            return if y <= wl { BlockKind::Water } else { BlockKind::Air };
        }
        if y < 0 {
            return BlockKind::Air;
        }
        if y == surface {
            return if col.is_ocean {
                if surface < wl - 3 {
                    BlockKind::Dirt
                } else {
                    BlockKind::Sand
                }
            } else if col.is_lake {
                BlockKind::Dirt
            } else if col.is_coastal {
                BlockKind::Sand
            } else {
                BlockKind::Grass
            };
        }
        let dirt_depth = self.cfg.dirt_depth;
        if y > surface - dirt_depth {
            if col.is_coastal && y > surface - 2 {
                return BlockKind::Sand;
            }
            if self.column_has_gravel(col, y) {
                return BlockKind::Gravel;
            }
            return BlockKind::Dirt;
        }
        if y > surface - dirt_depth - self.cfg.stone_depth {
            if self.column_has_gravel(col, y) {
                return BlockKind::Gravel;
            }
            return BlockKind::Stone;
        }
        BlockKind::Stone
    }

    #[inline]
    fn column_has_gravel(&self, col: &ColumnInfo, y: i32) -> bool {
        self.gravel_in_band(y, col.surface)
            && self.gravel_with_distance(col.x, y, col.z, col.surface, col.lake_distance)
    }

    /// Sparse tree candidates: noise, a stride-4 grid and a coordinate hash.
    pub fn should_generate_tree(&self, x: i32, z: i32) -> bool {
        if !self.trees.enabled {
            return false;
        }
        let f = 0.03;
        if self.tree.octave(x as f64 * f, z as f64 * f, 2, 0.5) <= self.trees.threshold {
            return false;
        }
        if x.rem_euclid(4) != 0 || z.rem_euclid(4) != 0 {
            return false;
        }
        spatial_hash(x, z) % 3 == 0
    }
}

/// Coordinate hash shared by tree placement rules.
#[inline]
pub fn spatial_hash(x: i32, z: i32) -> u32 {
    (x as u32).wrapping_mul(73_856_093) ^ (z as u32).wrapping_mul(19_349_663)
}
