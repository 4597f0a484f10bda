use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cairn_blocks::{BlockKind, BlockRegistry};
use cairn_chunk::{ChunkBuf, ChunkCoord};
use cairn_mesh_cpu::{MeshOptions, build_chunk_mesh};

fn layered_chunk() -> ChunkBuf {
    let mut buf = ChunkBuf::new(ChunkCoord::new(0, 0));
    for z in 0..16 {
        for x in 0..16 {
            let top = 30 + ((x * 7 + z * 3) % 9);
            for y in 0..=top {
                let kind = match top - y {
                    0 => BlockKind::Grass,
                    1..=3 => BlockKind::Dirt,
                    _ => BlockKind::Stone,
                };
                buf.set(x, y, z, kind);
            }
            for y in top + 1..=32 {
                buf.set(x, y, z, BlockKind::Water);
            }
        }
    }
    buf
}

fn bench_build_chunk_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_mesh");
    let buf = layered_chunk();
    let reg = BlockRegistry::with_defaults();
    group.bench_function("terrain_16x64x16", |b| {
        b.iter(|| black_box(build_chunk_mesh(&buf, &reg, &MeshOptions::default())))
    });
    group.bench_function("terrain_16x64x16_no_skip", |b| {
        let opts = MeshOptions {
            skip_buried_faces: false,
        };
        b.iter(|| black_box(build_chunk_mesh(&buf, &reg, &opts)))
    });
    group.finish();
}

criterion_group!(benches, bench_build_chunk_mesh);
criterion_main!(benches);
