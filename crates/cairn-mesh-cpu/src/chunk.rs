use cairn_blocks::MeshBucket;
use cairn_chunk::ChunkCoord;
use cairn_geom::Aabb;

use crate::mesh_build::MeshBuild;

/// CPU-side mesh of one chunk, one build per material bucket.
#[derive(Clone, Debug, Default)]
pub struct ChunkMeshCPU {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub parts: [MeshBuild; MeshBucket::COUNT],
}

impl ChunkMeshCPU {
    #[inline]
    pub fn part(&self, bucket: MeshBucket) -> &MeshBuild {
        &self.parts[bucket.index()]
    }

    #[inline]
    pub fn part_mut(&mut self, bucket: MeshBucket) -> &mut MeshBuild {
        &mut self.parts[bucket.index()]
    }

    pub fn quad_count(&self) -> usize {
        self.parts.iter().map(MeshBuild::quad_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(MeshBuild::is_empty)
    }

    /// Non-empty buckets in draw order.
    pub fn buckets(&self) -> impl Iterator<Item = (MeshBucket, &MeshBuild)> + '_ {
        MeshBucket::ALL
            .into_iter()
            .map(|b| (b, self.part(b)))
            .filter(|(_, m)| !m.is_empty())
    }
}
