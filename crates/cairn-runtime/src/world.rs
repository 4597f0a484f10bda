//! Streaming world: chunk lifecycle around a moving viewer.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cairn_blocks::{BlockKind, BlockRegistry, BlockType};
use cairn_chunk::{CHUNK_HEIGHT, ChunkCoord, world_to_local};
use cairn_geom::{Frustum, IVec3, Mat4, Vec3};
use cairn_mesh_cpu::{MeshOptions, build_chunk_mesh};
use cairn_world::{ChunkGenerator, WorldConfig, WorldGenerator};
use hashbrown::HashMap;

use crate::gpu::{ChunkGpuMesh, ChunkRenderer, MeshUploader};
use crate::store::{ChunkStore, StoreConfig};
use crate::streaming;
use crate::voxel_chunk::VoxelChunk;

/// Wall-clock budget for placeholder creation in one update.
pub const PLACEHOLDER_BUDGET: Duration = Duration::from_millis(16);

/// Runtime knobs taken from [`WorldConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSettings {
    pub render_distance: i32,
    pub unload_multiplier: f64,
    pub max_chunks_per_frame: usize,
    pub max_meshes_per_frame: usize,
    pub frustum_culling: bool,
    pub mesh: MeshOptions,
    pub store: StoreConfig,
    pub log_chunks: bool,
}

impl WorldSettings {
    pub fn from_config(cfg: &WorldConfig) -> Self {
        let perf = &cfg.performance;
        Self {
            render_distance: cfg.rendering.render_distance.max(1),
            unload_multiplier: cfg.rendering.unload_multiplier,
            max_chunks_per_frame: perf.max_chunks_per_frame.max(1) as usize,
            max_meshes_per_frame: perf.max_chunk_updates_per_frame.max(1) as usize,
            frustum_culling: cfg.rendering.enable_frustum_culling,
            mesh: MeshOptions {
                skip_buried_faces: perf.enable_mesh_optimization,
            },
            store: StoreConfig {
                threads: perf.generation_threads.max(1) as usize,
                batch_size: perf.generation_batch_size.max(1) as usize,
            },
            log_chunks: cfg.debug.log_chunk_generation,
        }
    }
}

/// What one [`World::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub created: usize,
    pub preloaded: usize,
    pub enqueued: usize,
    pub evicted: usize,
    pub meshed: usize,
    pub completed: usize,
}

/// Chunk store plus the main-thread mesh state, generic over the backend mesh type.
pub struct World<M> {
    settings: WorldSettings,
    store: ChunkStore,
    meshes: HashMap<ChunkCoord, ChunkGpuMesh<M>>,
    last_viewer_chunk: Option<ChunkCoord>,
    last_viewer_pos: Option<Vec3>,
}

impl<M> World<M> {
    /// World backed by the standard terrain generator for `cfg`.
    ///
    /// `cfg` is validated first, so out-of-range values are clamped rather
    /// than reaching the generator.
    pub fn from_config(cfg: &WorldConfig, registry: Arc<BlockRegistry>) -> io::Result<Self> {
        let mut cfg = cfg.clone();
        cfg.validate();
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(WorldGenerator::with_registry(&cfg, Arc::clone(&registry)));
        Self::new(WorldSettings::from_config(&cfg), registry, generator)
    }

    pub fn new(
        settings: WorldSettings,
        registry: Arc<BlockRegistry>,
        generator: Arc<dyn ChunkGenerator>,
    ) -> io::Result<Self> {
        let store =
            ChunkStore::with_logging(generator, registry, settings.store, settings.log_chunks)?;
        Ok(Self {
            settings,
            store,
            meshes: HashMap::new(),
            last_viewer_chunk: None,
            last_viewer_pos: None,
        })
    }

    #[inline]
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        self.store.registry()
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn render_distance(&self) -> i32 {
        self.settings.render_distance
    }

    pub fn set_render_distance(&mut self, distance: i32) {
        self.settings.render_distance = distance.clamp(1, 32);
    }

    /// Chunk column containing a world position.
    #[inline]
    pub fn world_to_chunk(pos: Vec3) -> ChunkCoord {
        ChunkCoord::from_world_f32(pos.x, pos.z)
    }

    /// Chunk plus the local voxel position inside it.
    pub fn world_to_local(pos: IVec3) -> (ChunkCoord, IVec3) {
        let (coord, lx, lz) = world_to_local(pos.x, pos.z);
        (coord, IVec3::new(lx as i32, pos.y, lz as i32))
    }

    /// Advances streaming for a viewer at `viewer`: placeholders, queueing,
    /// preloading, eviction and a bounded number of mesh uploads.
    pub fn update<U>(&mut self, viewer: Vec3, uploader: &mut U) -> UpdateStats
    where
        U: MeshUploader<Mesh = M> + ?Sized,
    {
        let mut stats = UpdateStats::default();
        let center = Self::world_to_chunk(viewer);

        stats.created = self.create_wanted(center);
        if let Some(last) = self.last_viewer_pos {
            let targets =
                streaming::preload_targets(center, viewer - last, self.settings.render_distance);
            stats.preloaded = targets
                .into_iter()
                .filter(|c| self.store.create_placeholder(*c).is_some())
                .count();
            if stats.preloaded > 0 {
                log::trace!(target: "stream", "preloaded {} chunks ahead of {:?}", stats.preloaded, center);
            }
        }
        self.last_viewer_pos = Some(viewer);
        if stats.created + stats.preloaded > 0 {
            stats.enqueued = self.enqueue_placeholders(center);
        }

        if self.last_viewer_chunk != Some(center) {
            stats.evicted = self.unload_distant_chunks(center);
            self.last_viewer_chunk = Some(center);
        }

        stats.meshed = self.build_meshes(center, uploader);
        stats.completed = self.store.drain_completed().len();
        stats
    }

    fn create_wanted(&self, center: ChunkCoord) -> usize {
        let mut wanted = streaming::chunks_in_range(center, self.settings.render_distance);
        streaming::sort_by_priority(&mut wanted, center);
        let start = Instant::now();
        let mut created = 0;
        for coord in wanted {
            if created >= self.settings.max_chunks_per_frame || start.elapsed() > PLACEHOLDER_BUDGET {
                break;
            }
            if self.store.create_placeholder(coord).is_some() {
                created += 1;
            }
        }
        if created > 0 {
            log::trace!(target: "stream", "created {} placeholders around {:?}", created, center);
        }
        created
    }

    fn enqueue_placeholders(&self, center: ChunkCoord) -> usize {
        let mut pending = self.store.placeholders();
        streaming::sort_by_priority(&mut pending, center);
        self.store.enqueue(&pending)
    }

    /// Drops chunks beyond `render_distance * unload_multiplier` and their GPU meshes.
    pub fn unload_distant_chunks(&mut self, center: ChunkCoord) -> usize {
        let limit =
            streaming::unload_distance(self.settings.render_distance, self.settings.unload_multiplier);
        let evicted = self
            .store
            .evict_where(|c| streaming::should_unload(c, center, limit));
        for c in &evicted {
            self.meshes.remove(c);
        }
        if !evicted.is_empty() {
            log::info!(target: "stream", "unloaded {} distant chunks", evicted.len());
        }
        evicted.len()
    }

    fn build_meshes<U>(&mut self, center: ChunkCoord, uploader: &mut U) -> usize
    where
        U: MeshUploader<Mesh = M> + ?Sized,
    {
        let mut ready = self.store.needing_mesh();
        if ready.is_empty() {
            return 0;
        }
        ready.sort_by_key(|c| c.coord().distance_sq(center));
        let mut built = 0;
        for chunk in ready.into_iter().take(self.settings.max_meshes_per_frame) {
            self.upload_chunk(&chunk, uploader);
            built += 1;
        }
        log::debug!(target: "mesh", "built {} chunk meshes", built);
        built
    }

    fn upload_chunk<U>(&mut self, chunk: &VoxelChunk, uploader: &mut U)
    where
        U: MeshUploader<Mesh = M> + ?Sized,
    {
        let cpu = build_chunk_mesh(&chunk.voxels(), self.store.registry(), &self.settings.mesh);
        let gpu = ChunkGpuMesh::upload(uploader, &cpu);
        // Replacing the entry frees the previous GPU mesh.
        self.meshes.insert(chunk.coord(), gpu);
        chunk.mark_meshed();
    }

    /// Rebuilds and uploads one chunk's mesh now, outside the per-frame budget.
    pub fn rebuild_mesh<U>(&mut self, coord: ChunkCoord, uploader: &mut U) -> bool
    where
        U: MeshUploader<Mesh = M> + ?Sized,
    {
        match self.store.get(coord) {
            Some(chunk) if chunk.is_generated() => {
                self.upload_chunk(&chunk, uploader);
                true
            }
            _ => false,
        }
    }

    /// Draws every uploaded chunk within render distance, nearest first.
    ///
    /// Returns the number of chunks handed to the renderer.
    pub fn render<R>(&self, renderer: &mut R, view: &Mat4, proj: &Mat4) -> usize
    where
        R: ChunkRenderer<M> + ?Sized,
    {
        let camera = view.view_origin();
        let cam_chunk = Self::world_to_chunk(camera);
        let frustum = Frustum::from_view_projection(&(*proj * *view));
        let max = self.settings.render_distance as f32;
        let mut visible: Vec<(f32, &ChunkGpuMesh<M>)> = self
            .meshes
            .iter()
            .filter_map(|(coord, mesh)| {
                let d = coord.distance(cam_chunk);
                if d > max {
                    return None;
                }
                if self.settings.frustum_culling && !frustum.is_box_visible(&mesh.bbox) {
                    return None;
                }
                Some((d, mesh))
            })
            .collect();
        visible.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, mesh) in &visible {
            renderer.render_chunk(mesh, view, proj);
        }
        visible.len()
    }

    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<Arc<VoxelChunk>> {
        self.store.get(coord)
    }

    /// Air for unloaded chunks and heights outside the world.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockKind {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return BlockKind::Air;
        }
        let (coord, lx, lz) = world_to_local(x, z);
        self.store
            .get(coord)
            .map_or(BlockKind::Air, |c| c.get_block(lx as i32, y, lz as i32))
    }

    #[inline]
    pub fn get_block_type(&self, pos: IVec3) -> BlockKind {
        self.get_block(pos.x, pos.y, pos.z)
    }

    /// Catalog entry of the voxel at a world position.
    pub fn block_props(&self, pos: IVec3) -> &BlockType {
        self.registry().props(self.get_block_type(pos))
    }

    /// Edits a loaded, generated chunk and marks it for remeshing.
    ///
    /// Returns whether a voxel changed.
    pub fn set_block(&self, x: i32, y: i32, z: i32, kind: BlockKind) -> bool {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return false;
        }
        let (coord, lx, lz) = world_to_local(x, z);
        self.store
            .get(coord)
            .is_some_and(|c| c.set_block(lx as i32, y, lz as i32, kind))
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.store.len()
    }

    pub fn meshed_chunk_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn required_chunk_count(&self, viewer: Vec3) -> usize {
        streaming::chunks_in_range(Self::world_to_chunk(viewer), self.settings.render_distance).len()
    }

    /// True once three quarters of the chunks around the viewer have terrain.
    pub fn is_initial_loading_complete(&self, viewer: Vec3) -> bool {
        let required =
            streaming::chunks_in_range(Self::world_to_chunk(viewer), self.settings.render_distance);
        let generated = required
            .iter()
            .filter(|c| self.store.get(**c).is_some_and(|chunk| chunk.is_generated()))
            .count();
        generated >= required.len() * 3 / 4
    }
}
