//! Main-thread boundary to the graphics backend.

use cairn_blocks::MeshBucket;
use cairn_chunk::ChunkCoord;
use cairn_geom::{Aabb, Mat4};
use cairn_mesh_cpu::{ChunkMeshCPU, MeshBuild};

/// Turns CPU mesh data into backend meshes. Only ever called on the main thread.
pub trait MeshUploader {
    /// Backend mesh handle; dropping it must free the GPU resources.
    type Mesh;

    /// `None` when the build is empty or the upload failed.
    fn upload_mesh(&mut self, bucket: MeshBucket, build: &MeshBuild) -> Option<Self::Mesh>;
}

/// Draws one uploaded chunk, binding each bucket's material in turn.
pub trait ChunkRenderer<M> {
    fn render_chunk(&mut self, chunk: &ChunkGpuMesh<M>, view: &Mat4, proj: &Mat4);
}

/// Uploaded meshes of one chunk, one optional handle per bucket.
pub struct ChunkGpuMesh<M> {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    parts: [Option<M>; MeshBucket::COUNT],
}

impl<M> ChunkGpuMesh<M> {
    pub fn upload<U>(uploader: &mut U, cpu: &ChunkMeshCPU) -> Self
    where
        U: MeshUploader<Mesh = M> + ?Sized,
    {
        let mut parts: [Option<M>; MeshBucket::COUNT] = std::array::from_fn(|_| None);
        for (bucket, build) in cpu.buckets() {
            parts[bucket.index()] = uploader.upload_mesh(bucket, build);
        }
        Self {
            coord: cpu.coord,
            bbox: cpu.bbox,
            parts,
        }
    }

    #[inline]
    pub fn bucket(&self, bucket: MeshBucket) -> Option<&M> {
        self.parts[bucket.index()].as_ref()
    }

    /// Uploaded buckets in draw order: opaque first, water last.
    pub fn buckets(&self) -> impl Iterator<Item = (MeshBucket, &M)> + '_ {
        MeshBucket::ALL
            .into_iter()
            .filter_map(|b| self.bucket(b).map(|m| (b, m)))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Option::is_none)
    }
}

impl<M> std::fmt::Debug for ChunkGpuMesh<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buckets: Vec<&str> = self.buckets().map(|(b, _)| b.name()).collect();
        f.debug_struct("ChunkGpuMesh")
            .field("coord", &self.coord)
            .field("buckets", &buckets)
            .finish()
    }
}
