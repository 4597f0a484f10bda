//! Chunk map plus the background generation pool.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use cairn_blocks::BlockRegistry;
use cairn_chunk::ChunkCoord;
use cairn_world::ChunkGenerator;
use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};

use crate::voxel_chunk::{ChunkState, VoxelChunk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub threads: usize,
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            batch_size: 8,
        }
    }
}

#[derive(Default)]
struct GenQueue {
    pending: VecDeque<ChunkCoord>,
    queued: HashSet<ChunkCoord>,
}

struct Shared {
    chunks: Mutex<HashMap<ChunkCoord, Arc<VoxelChunk>>>,
    queue: Mutex<GenQueue>,
    wake: Condvar,
    stop: AtomicBool,
    generated: AtomicUsize,
    generator: Arc<dyn ChunkGenerator>,
    log_timing: bool,
}

#[inline]
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn new(generator: Arc<dyn ChunkGenerator>, log_timing: bool) -> Self {
        Self {
            chunks: Mutex::new(HashMap::new()),
            queue: Mutex::new(GenQueue::default()),
            wake: Condvar::new(),
            stop: AtomicBool::new(false),
            generated: AtomicUsize::new(0),
            generator,
            log_timing,
        }
    }

    fn get(&self, coord: ChunkCoord) -> Option<Arc<VoxelChunk>> {
        lock(&self.chunks).get(&coord).cloned()
    }

    /// Blocks until work arrives or the store stops; `None` means stop.
    fn next_batch(&self, batch_size: usize) -> Option<Vec<ChunkCoord>> {
        let mut q = lock(&self.queue);
        loop {
            if self.stop.load(Ordering::Acquire) {
                return None;
            }
            if !q.pending.is_empty() {
                break;
            }
            q = self.wake.wait(q).unwrap_or_else(PoisonError::into_inner);
        }
        let n = batch_size.max(1).min(q.pending.len());
        let batch: Vec<ChunkCoord> = q.pending.drain(..n).collect();
        for c in &batch {
            q.queued.remove(c);
        }
        Some(batch)
    }
}

fn worker_loop(shared: Arc<Shared>, batch_size: usize, done: Sender<ChunkCoord>) {
    while let Some(batch) = shared.next_batch(batch_size) {
        for coord in batch {
            if shared.stop.load(Ordering::Acquire) {
                return;
            }
            // Handle pins the chunk even if it is evicted meanwhile.
            let Some(chunk) = shared.get(coord) else {
                continue;
            };
            let t0 = Instant::now();
            let generated = panic::catch_unwind(AssertUnwindSafe(|| {
                chunk.generate_terrain_only(Some(shared.generator.as_ref()))
            }));
            match generated {
                Ok(true) => {
                    shared.generated.fetch_add(1, Ordering::Relaxed);
                    if shared.log_timing {
                        let ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
                        log::debug!(target: "gen", "worker generated {:?} in {}ms", coord, ms);
                    }
                    if done.send(coord).is_err() {
                        log::debug!(target: "gen", "completion channel closed; worker exiting");
                        return;
                    }
                }
                Ok(false) => {}
                Err(_) => {
                    // Back to placeholder so it can be queued again or evicted.
                    chunk.release_claim();
                    log::error!(target: "gen", "generator panicked on chunk {:?}", coord);
                }
            }
        }
    }
}

/// Owns every loaded chunk and the workers that fill them.
///
/// The chunk map and the generation queue have separate locks and neither
/// is held while terrain is generated.
pub struct ChunkStore {
    shared: Arc<Shared>,
    registry: Arc<BlockRegistry>,
    workers: Vec<JoinHandle<()>>,
    done_rx: Receiver<ChunkCoord>,
}

impl ChunkStore {
    pub fn new(
        generator: Arc<dyn ChunkGenerator>,
        registry: Arc<BlockRegistry>,
        cfg: StoreConfig,
    ) -> io::Result<Self> {
        Self::with_logging(generator, registry, cfg, false)
    }

    pub fn with_logging(
        generator: Arc<dyn ChunkGenerator>,
        registry: Arc<BlockRegistry>,
        cfg: StoreConfig,
        log_timing: bool,
    ) -> io::Result<Self> {
        let shared = Arc::new(Shared::new(generator, log_timing));
        let (done_tx, done_rx) = unbounded::<ChunkCoord>();
        let mut store = Self {
            shared,
            registry,
            workers: Vec::new(),
            done_rx,
        };
        for i in 0..cfg.threads.max(1) {
            let shared = Arc::clone(&store.shared);
            let tx = done_tx.clone();
            let batch = cfg.batch_size;
            // On failure the store drops here and joins what already started.
            let handle = thread::Builder::new()
                .name(format!("cairn-gen-{i}"))
                .spawn(move || worker_loop(shared, batch, tx))?;
            store.workers.push(handle);
        }
        log::info!(target: "gen", "started {} generation workers", store.workers.len());
        Ok(store)
    }

    /// Block catalog the stored chunks are meshed and queried against.
    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<VoxelChunk>> {
        self.shared.get(coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        lock(&self.shared.chunks).contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.chunks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coords(&self) -> Vec<ChunkCoord> {
        lock(&self.shared.chunks).keys().copied().collect()
    }

    /// Shared handles to every stored chunk.
    pub fn snapshot(&self) -> Vec<Arc<VoxelChunk>> {
        lock(&self.shared.chunks).values().cloned().collect()
    }

    /// Inserts an empty placeholder. `None` if the coordinate is already present.
    pub fn create_placeholder(&self, coord: ChunkCoord) -> Option<Arc<VoxelChunk>> {
        let mut map = lock(&self.shared.chunks);
        if map.contains_key(&coord) {
            return None;
        }
        let chunk = Arc::new(VoxelChunk::new(coord));
        map.insert(coord, Arc::clone(&chunk));
        Some(chunk)
    }

    /// Placeholders not yet handed to the workers.
    pub fn placeholders(&self) -> Vec<ChunkCoord> {
        lock(&self.shared.chunks)
            .iter()
            .filter(|(_, c)| c.state() == ChunkState::Placeholder)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Queues coordinates for generation in the given order.
    ///
    /// Coordinates already queued, absent, or past the placeholder stage are
    /// skipped. Returns how many were added.
    pub fn enqueue(&self, coords: &[ChunkCoord]) -> usize {
        let fresh: Vec<ChunkCoord> = {
            let map = lock(&self.shared.chunks);
            coords
                .iter()
                .copied()
                .filter(|c| map.get(c).is_some_and(|chunk| chunk.mark_queued()))
                .collect()
        };
        if fresh.is_empty() {
            return 0;
        }
        let added = {
            let mut q = lock(&self.shared.queue);
            let mut added = 0;
            for c in fresh {
                if q.queued.insert(c) {
                    q.pending.push_back(c);
                    added += 1;
                }
            }
            added
        };
        if added > 0 {
            self.shared.wake.notify_all();
        }
        added
    }

    pub fn queue_len(&self) -> usize {
        lock(&self.shared.queue).pending.len()
    }

    /// Chunks whose terrain is ready and whose mesh is missing or out of date.
    pub fn needing_mesh(&self) -> Vec<Arc<VoxelChunk>> {
        lock(&self.shared.chunks)
            .values()
            .filter(|c| c.needs_mesh())
            .cloned()
            .collect()
    }

    /// Removes chunks matching `evict`, skipping any a worker is generating.
    pub fn evict_where(&self, mut evict: impl FnMut(ChunkCoord) -> bool) -> Vec<ChunkCoord> {
        let mut map = lock(&self.shared.chunks);
        let doomed: Vec<ChunkCoord> = map
            .iter()
            .filter(|(k, c)| c.state() != ChunkState::Generating && evict(**k))
            .map(|(k, _)| *k)
            .collect();
        for k in &doomed {
            map.remove(k);
        }
        doomed
    }

    /// Total chunks generated by the workers since start.
    pub fn generated_total(&self) -> usize {
        self.shared.generated.load(Ordering::Relaxed)
    }

    /// Coordinates finished since the last call.
    pub fn drain_completed(&self) -> Vec<ChunkCoord> {
        self.done_rx.try_iter().collect()
    }

    /// Stops and joins every worker. Idempotent.
    pub fn shutdown(&mut self) {
        {
            let _q = lock(&self.shared.queue);
            self.shared.stop.store(true, Ordering::Release);
        }
        self.shared.wake.notify_all();
        let n = self.workers.len();
        for h in self.workers.drain(..) {
            if h.join().is_err() {
                log::error!(target: "gen", "generation worker panicked");
            }
        }
        if n > 0 {
            log::info!(target: "gen", "stopped {} generation workers", n);
        }
    }
}

impl Drop for ChunkStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
