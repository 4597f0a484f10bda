use cairn_geom::Vec3;

use crate::face::Face;

/// Growable vertex/index arrays for one material bucket.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    /// Room for `n_quads` more faces without reallocating.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends one unit face of the voxel whose minimum corner is `origin`.
    pub fn add_face(&mut self, face: Face, origin: Vec3) {
        let base = self.vertex_count() as u32;
        let n = face.normal();
        for (corner, uv) in face.corners() {
            let p = origin + Vec3::new(corner[0], corner[1], corner[2]);
            self.pos.extend_from_slice(&[p.x, p.y, p.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(uv);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
}
