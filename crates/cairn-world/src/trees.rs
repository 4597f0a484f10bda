//! Oak trees: trunk plus a layered leaf canopy.

use cairn_blocks::BlockKind;
use cairn_chunk::ChunkBuf;

use crate::config::{TreesConfig, WorldConfig};
use crate::feature::{TerrainContext, TerrainFeature};
use crate::noise::NoiseField;
use crate::terrain::spatial_hash;

const TREE_PRIORITY: i32 = 10;
const WATER_MARGIN: i32 = 2;
const CANOPY_RADIUS: i32 = 2;

#[derive(Clone, Debug)]
pub struct TreeFeature {
    cfg: TreesConfig,
    noise: NoiseField,
    log_trees: bool,
}

impl TreeFeature {
    pub fn new(cfg: &WorldConfig) -> Self {
        Self {
            cfg: cfg.trees.clone(),
            noise: NoiseField::new((cfg.terrain.seed as u64).wrapping_add(4000)),
            log_trees: cfg.debug.log_tree_generation,
        }
    }

    /// At most one origin per `minSpacing`-sized cell, picked by a cell hash
    /// from the cell's central 3x3 window.
    pub fn is_spacing_origin(&self, x: i32, z: i32) -> bool {
        let gs = self.cfg.min_spacing.max(2);
        let h = spatial_hash(x.div_euclid(gs), z.div_euclid(gs));
        if h % 4 != 0 {
            return false;
        }
        let cs = gs / 2 - 1;
        let ox = (cs + ((h / 4) % 3) as i32).min(gs - 1);
        let oz = (cs + ((h / 12) % 3) as i32).min(gs - 1);
        x.rem_euclid(gs) == ox && z.rem_euclid(gs) == oz
    }

    #[inline]
    fn density_passes(&self, x: i32, z: i32) -> bool {
        let f = self.cfg.frequency;
        self.noise.octave(x as f64 * f, z as f64 * f, 2, 0.5) > self.cfg.threshold
    }

    /// Trunk height in `[minHeight, maxHeight]`.
    pub fn tree_height(&self, x: i32, z: i32) -> i32 {
        let (lo, hi) = (self.cfg.min_height, self.cfg.max_height.max(self.cfg.min_height));
        let n = self.noise.noise3(x as f64 * 0.1, z as f64 * 0.1, 42.0);
        let h = lo + ((n + 1.0) * 0.5 * (hi - lo) as f64) as i32;
        h.clamp(lo, hi)
    }

    /// Stamps the canopy whose widest layer is at `leaf_start`. `(wx, wz)` is
    /// the trunk's world column, used to vary the corner leaves.
    pub fn stamp_canopy(chunk: &mut ChunkBuf, lx: i32, leaf_start: i32, lz: i32, wx: i32, wz: i32) {
        place_leaf(chunk, lx, leaf_start + 2, lz);

        let plus_y = leaf_start + 1;
        for (dx, dz) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            place_leaf(chunk, lx + dx, plus_y, lz + dz);
        }

        for layer in 0..=1 {
            let y = leaf_start + layer;
            for dx in -CANOPY_RADIUS..=CANOPY_RADIUS {
                for dz in -CANOPY_RADIUS..=CANOPY_RADIUS {
                    if dx.abs() == CANOPY_RADIUS && dz.abs() == CANOPY_RADIUS {
                        if (dx + dz + wx + wz).rem_euclid(3) == 0 {
                            place_leaf(chunk, lx + dx, y, lz + dz);
                        }
                        continue;
                    }
                    if dx == 0 && dz == 0 && layer == 0 {
                        continue;
                    }
                    place_leaf(chunk, lx + dx, y, lz + dz);
                }
            }
        }

        let bottom = leaf_start - 1;
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx != 0 || dz != 0 {
                    place_leaf(chunk, lx + dx, bottom, lz + dz);
                }
            }
        }
    }

    /// Leaves in the 5x5 box spanning `leaf_start - 1 ..= leaf_start + 3`.
    pub fn count_leaves(chunk: &ChunkBuf, lx: i32, leaf_start: i32, lz: i32) -> usize {
        let mut n = 0;
        for y in leaf_start - 1..=leaf_start + 3 {
            for dz in -CANOPY_RADIUS..=CANOPY_RADIUS {
                for dx in -CANOPY_RADIUS..=CANOPY_RADIUS {
                    if chunk.get(lx + dx, y, lz + dz) == BlockKind::Leaves {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    /// Re-stamps canopies on trunks that ended up with too few leaves.
    /// Returns the number of trees repaired.
    pub fn ensure_all_trees(&self, chunk: &mut ChunkBuf) -> usize {
        let min_leaves = self.cfg.leaves.min_leaves_per_tree.max(1) as usize;
        let (ox, oz) = chunk.coord.origin();
        let top = chunk.sy as i32 - 3;
        let mut repaired = 0;
        for lz in 0..chunk.sz as i32 {
            for lx in 0..chunk.sx as i32 {
                let mut y = 1;
                while y < top {
                    let is_base = chunk.get(lx, y, lz) == BlockKind::OakLog
                        && chunk.get(lx, y - 1, lz) != BlockKind::OakLog;
                    if !is_base {
                        y += 1;
                        continue;
                    }
                    let mut height = 0;
                    while chunk.get(lx, y + height, lz) == BlockKind::OakLog {
                        height += 1;
                    }
                    let leaf_start = y + height - 2;
                    let leaves = Self::count_leaves(chunk, lx, leaf_start, lz);
                    if leaves < min_leaves {
                        Self::stamp_canopy(chunk, lx, leaf_start, lz, ox + lx, oz + lz);
                        repaired += 1;
                        if self.log_trees {
                            log::debug!(
                                target: "trees",
                                "repaired canopy at ({}, {}, {}) with {} leaves",
                                ox + lx,
                                y,
                                oz + lz,
                                leaves
                            );
                        }
                    }
                    y += height;
                }
            }
        }
        repaired
    }
}

#[inline]
fn place_leaf(chunk: &mut ChunkBuf, x: i32, y: i32, z: i32) {
    match chunk.get(x, y, z) {
        BlockKind::Air | BlockKind::Leaves => {
            chunk.set(x, y, z, BlockKind::Leaves);
        }
        _ => {}
    }
}

impl TerrainFeature for TreeFeature {
    fn name(&self) -> &'static str {
        "trees"
    }

    fn priority(&self) -> i32 {
        TREE_PRIORITY
    }

    fn reach(&self) -> i32 {
        CANOPY_RADIUS
    }

    fn should_generate(&self, ctx: &TerrainContext) -> bool {
        if !self.cfg.enabled {
            return false;
        }
        if ctx.is_lake && !self.cfg.generate_in_lakes {
            return false;
        }
        if ctx.world_y != ctx.terrain_height + 1 {
            return false;
        }
        if ctx.terrain_height < ctx.water_level + WATER_MARGIN {
            return false;
        }
        self.density_passes(ctx.world_x, ctx.world_z) && self.is_spacing_origin(ctx.world_x, ctx.world_z)
    }

    fn generate(&self, chunk: &mut ChunkBuf, ctx: &TerrainContext) {
        let (lx, base_y, lz) = ctx.local();
        let height = self.tree_height(ctx.world_x, ctx.world_z);
        for dy in 0..height {
            chunk.set(lx, base_y + dy, lz, BlockKind::OakLog);
        }
        let leaf_start = base_y + height - 2;
        Self::stamp_canopy(chunk, lx, leaf_start, lz, ctx.world_x, ctx.world_z);
        if self.log_trees {
            log::debug!(
                target: "trees",
                "tree at ({}, {}, {}) height {}",
                ctx.world_x,
                base_y,
                ctx.world_z,
                height
            );
        }
    }

    fn post_process(&self, chunk: &mut ChunkBuf) {
        if self.cfg.enabled && self.cfg.leaves.enable_post_processing {
            self.ensure_all_trees(chunk);
        }
    }
}
