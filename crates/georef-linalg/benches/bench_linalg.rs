use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use georef_linalg::{least_squares, DenseMatrix};

fn random_matrix(rows: usize, cols: usize) -> DenseMatrix {
    let mut rng = rand::rng();
    let data: Vec<f64> = (0..rows * cols).map(|_| rng.random_range(-1.0..1.0)).collect();
    DenseMatrix::from_row_slice(rows, cols, &data).unwrap()
}

fn bench_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert");
    for n in [3, 6, 12].iter() {
        let m = random_matrix(*n, *n).add(&DenseMatrix::identity(*n).scale(4.0)).unwrap();
        group.bench_with_input(BenchmarkId::new("partial_piv_lu", n), &m, |b, m| {
            b.iter(|| black_box(m.invert()))
        });
    }
    group.finish();
}

fn bench_least_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("least_squares");
    for num_points in [3, 10, 100].iter() {
        let u = random_matrix(2 * num_points, 6);
        let v = random_matrix(2 * num_points, 1);
        group.bench_with_input(
            BenchmarkId::new("normal_equations", num_points),
            &(u, v),
            |b, (u, v)| b.iter(|| black_box(least_squares(v, u))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_invert, bench_least_squares);
criterion_main!(benches);
