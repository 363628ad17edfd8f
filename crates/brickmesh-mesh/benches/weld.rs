//! Benchmarks for vertex welding.
//!
//! Run with: cargo bench -p brickmesh-mesh

#![allow(missing_docs)]

use brickmesh_math::Point3;
use brickmesh_mesh::{weld, MeshBuffers, WeldOptions, MAIN_COLOR};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A flat `n` x `n` grid of quads, one vertex per triangle corner.
fn unwelded_grid(n: usize) -> MeshBuffers {
    let mut mesh = MeshBuffers::new();
    for j in 0..n {
        for i in 0..n {
            let (x, y) = (i as f64, j as f64);
            let p = [
                Point3::new(x, y, 0.0),
                Point3::new(x + 1.0, y, 0.0),
                Point3::new(x + 1.0, y + 1.0, 0.0),
                Point3::new(x, y + 1.0, 0.0),
            ];
            for tri in [[0, 1, 2], [0, 2, 3]] {
                let a = mesh.push_vertex(p[tri[0]], MAIN_COLOR);
                let b = mesh.push_vertex(p[tri[1]], MAIN_COLOR);
                let c = mesh.push_vertex(p[tri[2]], MAIN_COLOR);
                mesh.push_triangle([a, b, c]);
            }
        }
    }
    mesh
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld");
    let options = WeldOptions::default();
    for n in [8usize, 32, 64] {
        let mesh = unwelded_grid(n);
        group.throughput(Throughput::Elements(mesh.num_vertices() as u64));
        group.bench_with_input(BenchmarkId::new("grid", n), &mesh, |b, mesh| {
            b.iter(|| weld(black_box(mesh), &options));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_weld);
criterion_main!(benches);
