//! Raylib backend: chunk mesh upload, per-bucket textures and chunk drawing.
// Unsafe is required for Raylib mesh/model upload operations in this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cairn_blocks::MeshBucket;
use cairn_geom::Mat4;
use cairn_mesh_cpu::MeshBuild;
use cairn_runtime::{ChunkGpuMesh, ChunkRenderer, MeshUploader};
use raylib::prelude::*;

/// raylib meshes index with u16.
const MAX_VERTS_PER_MODEL: usize = 65000;

pub mod conv {
    use cairn_geom::{Aabb, Mat4, Vec3};

    pub fn vec3_to_rl(v: Vec3) -> raylib::prelude::Vector3 {
        raylib::prelude::Vector3::new(v.x, v.y, v.z)
    }

    pub fn vec3_from_rl(v: raylib::prelude::Vector3) -> Vec3 {
        Vec3::new(v.x, v.y, v.z)
    }

    pub fn aabb_to_rl(bb: Aabb) -> raylib::core::math::BoundingBox {
        raylib::core::math::BoundingBox::new(vec3_to_rl(bb.min), vec3_to_rl(bb.max))
    }

    /// Same look-at and projection raylib uses for a perspective `Camera3D`.
    pub fn camera_matrices(cam: &raylib::prelude::Camera3D, aspect: f32) -> (Mat4, Mat4) {
        let view = Mat4::look_at(
            vec3_from_rl(cam.position),
            vec3_from_rl(cam.target),
            vec3_from_rl(cam.up),
        );
        let proj = Mat4::perspective(cam.fovy.to_radians(), aspect, 0.01, 1000.0);
        (view, proj)
    }
}

/// Fallback colour for buckets whose texture file is missing.
pub fn bucket_color(bucket: MeshBucket) -> Color {
    match bucket {
        MeshBucket::Default => Color::new(96, 160, 72, 255),
        MeshBucket::OakLog => Color::new(110, 80, 48, 255),
        MeshBucket::Leaves => Color::new(58, 120, 40, 230),
        MeshBucket::Stone => Color::new(128, 128, 128, 255),
        MeshBucket::Gravel => Color::new(140, 132, 124, 255),
        MeshBucket::Sand => Color::new(220, 206, 150, 255),
        MeshBucket::Water => Color::new(48, 96, 200, 160),
    }
}

pub struct TextureCache {
    base: PathBuf,
    map: HashMap<MeshBucket, Texture2D>,
    missing: Vec<MeshBucket>,
}

impl TextureCache {
    /// Textures are looked up as `<base>/assets/blocks/<bucket>.png`.
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            map: HashMap::new(),
            missing: Vec::new(),
        }
    }

    pub fn path_for(&self, bucket: MeshBucket) -> PathBuf {
        self.base
            .join("assets/blocks")
            .join(format!("{}.png", bucket.name()))
    }

    /// Loads the bucket's texture on first use. `None` if the file is absent or unreadable.
    pub fn get_or_load(
        &mut self,
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        bucket: MeshBucket,
    ) -> Option<&Texture2D> {
        if !self.map.contains_key(&bucket) && !self.missing.contains(&bucket) {
            let path = self.path_for(bucket);
            match rl.load_texture(thread, &path.to_string_lossy()) {
                Ok(t) => {
                    t.set_texture_filter(
                        thread,
                        raylib::consts::TextureFilter::TEXTURE_FILTER_POINT,
                    );
                    t.set_texture_wrap(thread, raylib::consts::TextureWrap::TEXTURE_WRAP_REPEAT);
                    self.map.insert(bucket, t);
                }
                Err(e) => {
                    log::warn!(target: "mesh", "no texture for {} at {}: {}", bucket.name(), path.display(), e);
                    self.missing.push(bucket);
                }
            }
        }
        self.map.get(&bucket)
    }
}

/// One bucket of one chunk on the GPU, split into models of at most 65000 vertices.
pub struct BucketModels {
    pub models: Vec<Model>,
    pub tint: Color,
}

/// Uploads chunk meshes through a live raylib handle.
pub struct RaylibUploader<'a> {
    pub rl: &'a mut RaylibHandle,
    pub thread: &'a RaylibThread,
    pub textures: &'a mut TextureCache,
}

fn upload_slice(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    mb: &MeshBuild,
    first_quad: usize,
    quads: usize,
) -> Option<Model> {
    let v_start = first_quad * 4;
    let v_count = quads * 4;
    let mut raw: raylib::ffi::Mesh = unsafe { std::mem::zeroed() };
    raw.vertexCount = v_count as i32;
    raw.triangleCount = (quads * 2) as i32;
    unsafe {
        let vbytes = (v_count * 3 * std::mem::size_of::<f32>()) as u32;
        let tbytes = (v_count * 2 * std::mem::size_of::<f32>()) as u32;
        let ibytes = (quads * 6 * std::mem::size_of::<u16>()) as u32;
        raw.vertices = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        raw.normals = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        raw.texcoords = raylib::ffi::MemAlloc(tbytes) as *mut f32;
        raw.indices = raylib::ffi::MemAlloc(ibytes) as *mut u16;
        std::ptr::copy_nonoverlapping(
            mb.pos[v_start * 3..(v_start + v_count) * 3].as_ptr(),
            raw.vertices,
            v_count * 3,
        );
        std::ptr::copy_nonoverlapping(
            mb.norm[v_start * 3..(v_start + v_count) * 3].as_ptr(),
            raw.normals,
            v_count * 3,
        );
        std::ptr::copy_nonoverlapping(
            mb.uv[v_start * 2..(v_start + v_count) * 2].as_ptr(),
            raw.texcoords,
            v_count * 2,
        );
        for i in 0..quads {
            let base = (i * 4) as u16;
            let tri = [base, base + 1, base + 2, base + 2, base + 3, base];
            std::ptr::copy_nonoverlapping(tri.as_ptr(), raw.indices.add(i * 6), 6);
        }
    }
    let mut mesh = unsafe { raylib::core::models::Mesh::from_raw(raw) };
    unsafe {
        mesh.upload(false);
    }
    rl.load_model_from_mesh(thread, unsafe { mesh.make_weak() }).ok()
}

impl MeshUploader for RaylibUploader<'_> {
    type Mesh = BucketModels;

    fn upload_mesh(&mut self, bucket: MeshBucket, build: &MeshBuild) -> Option<BucketModels> {
        let total_quads = build.vertex_count() / 4;
        if total_quads == 0 {
            return None;
        }
        let max_quads = MAX_VERTS_PER_MODEL / 4;
        let mut models = Vec::with_capacity(total_quads.div_ceil(max_quads));
        let mut q = 0usize;
        while q < total_quads {
            let take = (total_quads - q).min(max_quads);
            match upload_slice(self.rl, self.thread, build, q, take) {
                Some(m) => models.push(m),
                None => {
                    log::error!(target: "mesh", "model upload failed for bucket {}", bucket.name());
                    return None;
                }
            }
            q += take;
        }
        let tint = match self.textures.get_or_load(self.rl, self.thread, bucket) {
            Some(tex) => {
                for model in &mut models {
                    if let Some(mat) = model.materials_mut().get_mut(0) {
                        mat.set_material_texture(
                            raylib::consts::MaterialMapIndex::MATERIAL_MAP_ALBEDO,
                            tex,
                        );
                    }
                }
                if bucket == MeshBucket::Water {
                    Color::new(255, 255, 255, 180)
                } else {
                    Color::WHITE
                }
            }
            None => bucket_color(bucket),
        };
        Some(BucketModels { models, tint })
    }
}

/// Draws chunks inside an active 3D mode.
pub struct ModelRenderer<'a, D: RaylibDraw3D> {
    pub d: &'a mut D,
    pub chunks_drawn: usize,
}

impl<'a, D: RaylibDraw3D> ModelRenderer<'a, D> {
    pub fn new(d: &'a mut D) -> Self {
        Self { d, chunks_drawn: 0 }
    }
}

impl<D: RaylibDraw3D> ChunkRenderer<BucketModels> for ModelRenderer<'_, D> {
    fn render_chunk(&mut self, chunk: &ChunkGpuMesh<BucketModels>, _view: &Mat4, _proj: &Mat4) {
        for (_, part) in chunk.buckets() {
            for model in &part.models {
                self.d.draw_model(model, Vector3::zero(), 1.0, part.tint);
            }
        }
        self.chunks_drawn += 1;
    }
}
