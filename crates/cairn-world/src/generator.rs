//! Whole-chunk population: base terrain, features, then fix-up passes.

use std::sync::Arc;
use std::time::Instant;

use cairn_blocks::{BlockKind, BlockRegistry};
use cairn_chunk::ChunkBuf;

use crate::config::WorldConfig;
use crate::feature::{TerrainContext, TerrainFeature};
use crate::terrain::TerrainSampler;
use crate::trees::TreeFeature;

/// Fills a chunk's voxel grid. Implementations are shared across worker threads.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, chunk: &mut ChunkBuf);
}

/// Stone floor, three dirt layers and grass at y = 4.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatGenerator;

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, chunk: &mut ChunkBuf) {
        for z in 0..chunk.sz as i32 {
            for x in 0..chunk.sx as i32 {
                chunk.set(x, 0, z, BlockKind::Stone);
                for y in 1..=3 {
                    chunk.set(x, y, z, BlockKind::Dirt);
                }
                chunk.set(x, 4, z, BlockKind::Grass);
            }
        }
    }
}

pub struct WorldGenerator {
    sampler: TerrainSampler,
    registry: Arc<BlockRegistry>,
    features: Vec<Box<dyn TerrainFeature>>,
    cross_chunk_features: bool,
    fix_floating_water: bool,
    log_chunks: bool,
}

impl std::fmt::Debug for WorldGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.features.iter().map(|ft| ft.name()).collect();
        f.debug_struct("WorldGenerator")
            .field("features", &names)
            .field("cross_chunk_features", &self.cross_chunk_features)
            .field("fix_floating_water", &self.fix_floating_water)
            .finish()
    }
}

impl WorldGenerator {
    /// Terrain plus the standard tree feature, over the default block catalog.
    pub fn new(cfg: &WorldConfig) -> Self {
        Self::with_registry(cfg, Arc::new(BlockRegistry::with_defaults()))
    }

    /// Terrain plus the standard tree feature, over a shared block catalog.
    pub fn with_registry(cfg: &WorldConfig, registry: Arc<BlockRegistry>) -> Self {
        let mut g = Self::without_features(cfg, registry);
        g.add_feature(Box::new(TreeFeature::new(cfg)));
        g
    }

    pub fn without_features(cfg: &WorldConfig, registry: Arc<BlockRegistry>) -> Self {
        Self {
            sampler: TerrainSampler::new(cfg),
            registry,
            features: Vec::new(),
            cross_chunk_features: cfg.trees.leaves.enable_cross_chunk_leaves,
            fix_floating_water: cfg.terrain.lakes.fix_floating_water,
            log_chunks: cfg.debug.log_chunk_generation,
        }
    }

    /// Registers a feature, keeping the list ordered by priority.
    pub fn add_feature(&mut self, feature: Box<dyn TerrainFeature>) {
        self.features.push(feature);
        self.features.sort_by_key(|f| f.priority());
    }

    #[inline]
    pub fn sampler(&self) -> &TerrainSampler {
        &self.sampler
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    pub fn generate_chunk(&self, chunk: &mut ChunkBuf) {
        let start = Instant::now();
        let (sx, sz) = (chunk.sx, chunk.sz);
        let (ox, oz) = chunk.coord.origin();
        let wl = self.sampler.water_level();

        let mut heights = vec![0i32; sx * sz];
        let mut lakes = vec![false; sx * sz];
        for lz in 0..sz {
            for lx in 0..sx {
                let (wx, wz) = (ox + lx as i32, oz + lz as i32);
                heights[lz * sx + lx] = self.sampler.height_at(wx, wz);
                lakes[lz * sx + lx] = self.sampler.should_generate_lake(wx, wz);
            }
        }

        self.fill_terrain(chunk, &heights, &lakes);

        for lz in 0..sz {
            for lx in 0..sx {
                let i = lz * sx + lx;
                self.offer_column(chunk, ox + lx as i32, oz + lz as i32, heights[i], lakes[i], wl);
            }
        }
        if self.cross_chunk_features {
            self.offer_border_columns(chunk, wl);
        }

        for f in &self.features {
            f.post_process(chunk);
        }
        if self.fix_floating_water {
            let removed = fix_floating_water(chunk, &self.registry);
            if removed > 0 && self.log_chunks {
                log::debug!(target: "gen", "chunk {:?}: removed {} floating water", chunk.coord, removed);
            }
        }

        if self.log_chunks {
            let ms = start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
            log::debug!(target: "gen", "chunk {:?} generated in {}ms", chunk.coord, ms);
        }
    }

    fn fill_terrain(&self, chunk: &mut ChunkBuf, heights: &[i32], lakes: &[bool]) {
        let (sx, sz) = (chunk.sx, chunk.sz);
        let (ox, oz) = chunk.coord.origin();
        let wl = self.sampler.water_level();
        let top_limit = chunk.sy as i32 - 1;
        for lz in 0..sz {
            for lx in 0..sx {
                let i = lz * sx + lx;
                let (wx, wz) = (ox + lx as i32, oz + lz as i32);
                let col = self.sampler.column_with_surface(wx, wz, heights[i], lakes[i]);
                // Nothing but air above the higher of surface and water.
                let top = heights[i].max(wl).min(top_limit);
                for y in 0..=top {
                    let kind = self.sampler.block_in_column(&col, y);
                    if !kind.is_air() {
                        chunk.set(lx as i32, y, lz as i32, kind);
                    }
                }
            }
        }
    }

    fn offer_column(&self, chunk: &mut ChunkBuf, wx: i32, wz: i32, height: i32, is_lake: bool, wl: i32) {
        let surface_y = height + 1;
        if surface_y >= chunk.sy as i32 {
            return;
        }
        let ctx = TerrainContext {
            chunk: chunk.coord,
            terrain_height: height,
            is_lake,
            water_level: wl,
            world_x: wx,
            world_y: surface_y,
            world_z: wz,
        };
        if let Some(f) = self.features.iter().find(|f| f.should_generate(&ctx)) {
            f.generate(chunk, &ctx);
        }
    }

    /// Columns just outside the chunk whose features may overhang into it.
    fn offer_border_columns(&self, chunk: &mut ChunkBuf, wl: i32) {
        let reach = self.features.iter().map(|f| f.reach()).max().unwrap_or(0);
        if reach <= 0 {
            return;
        }
        let (ox, oz) = chunk.coord.origin();
        let (sx, sz) = (chunk.sx as i32, chunk.sz as i32);
        for lz in -reach..sz + reach {
            for lx in -reach..sx + reach {
                if (0..sx).contains(&lx) && (0..sz).contains(&lz) {
                    continue;
                }
                let (wx, wz) = (ox + lx, oz + lz);
                let h = self.sampler.height_at(wx, wz);
                let lake = self.sampler.should_generate_lake(wx, wz);
                self.offer_column(chunk, wx, wz, h, lake, wl);
            }
        }
    }
}

impl ChunkGenerator for WorldGenerator {
    fn generate(&self, chunk: &mut ChunkBuf) {
        self.generate_chunk(chunk);
    }
}

/// Removes water that is neither supported from below nor enclosed.
///
/// Runs bottom-up so water resting on kept water counts as supported.
/// Support means a block `reg` marks solid. Returns the number of voxels cleared.
pub fn fix_floating_water(chunk: &mut ChunkBuf, reg: &BlockRegistry) -> usize {
    let is_solid = |kind: BlockKind| reg.is_solid(kind);
    let mut removed = 0;
    for y in 0..chunk.sy as i32 {
        for z in 0..chunk.sz as i32 {
            for x in 0..chunk.sx as i32 {
                if chunk.get(x, y, z) != BlockKind::Water {
                    continue;
                }
                if y == 0 {
                    continue;
                }
                let below = chunk.get(x, y - 1, z);
                if is_solid(below) || below.is_water() {
                    continue;
                }
                if (2..=4).any(|d| is_solid(chunk.get(x, y - d, z))) {
                    continue;
                }
                let mut inside = 0;
                let mut solid = 0;
                for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    if chunk.contains_local(x + dx, y, z + dz) {
                        inside += 1;
                        if is_solid(chunk.get(x + dx, y, z + dz)) {
                            solid += 1;
                        }
                    }
                }
                if inside > 0 && solid * 2 >= inside {
                    continue;
                }
                chunk.set(x, y, z, BlockKind::Air);
                removed += 1;
            }
        }
    }
    removed
}
