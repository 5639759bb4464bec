// In benches/encode_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bincif::pipeline::classifier::classify;
use bincif::pipeline::decoder::decode;
use bincif::{
    BinaryEncoder, Category, CategoryInstance, EncoderConfig, Field, SourceShard, TypedArray,
};

// --- Mock Data Generation ---

const BENCH_ROWS: usize = 100_000;

/// Ascending atom ids with occasional gaps.
fn generate_ids(rng: &mut StdRng) -> Vec<i32> {
    let mut current = 1;
    (0..BENCH_ROWS)
        .map(|_| {
            current += if rng.random_range(0..100) == 0 { 5 } else { 1 };
            current
        })
        .collect()
}

/// Coordinates with three decimals, as found in deposited structures.
fn generate_coords(rng: &mut StdRng) -> Vec<f64> {
    (0..BENCH_ROWS)
        .map(|_| (rng.random_range(-100_000..100_000) as f64) / 1000.0)
        .collect()
}

fn generate_residues(rng: &mut StdRng) -> Vec<String> {
    const NAMES: [&str; 6] = ["ALA", "GLY", "SER", "LYS", "HOH", "NAG"];
    let mut out = Vec::with_capacity(BENCH_ROWS);
    while out.len() < BENCH_ROWS {
        let name = NAMES[rng.random_range(0..NAMES.len())];
        for _ in 0..rng.random_range(5..15) {
            out.push(name.to_string());
        }
    }
    out.truncate(BENCH_ROWS);
    out
}

struct Atoms {
    ids: Vec<i32>,
    xs: Vec<f64>,
    residues: Vec<String>,
}

impl Category for Atoms {
    type Key = usize;
    type Data = ();

    fn name(&self) -> &str {
        "atom_site"
    }

    fn instance(&self, _ctx: &()) -> CategoryInstance<usize, ()> {
        let ids = self.ids.clone();
        let xs = self.xs.clone();
        let residues = self.residues.clone();
        CategoryInstance::new(
            vec![
                Field::int("id", move |k: &usize, _: &(), _| ids[*k]),
                Field::float("Cartn_x", move |k: &usize, _: &(), _| xs[*k]),
                Field::str("label_comp_id", move |k: &usize, _: &(), _| residues[*k].clone()),
            ],
            vec![SourceShard::indexed((), BENCH_ROWS)],
        )
    }
}

// --- Benchmark Suite ---

fn bench_classifier(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2024);
    let ids = TypedArray::Int32(generate_ids(&mut rng));
    let coords = TypedArray::Float64(generate_coords(&mut rng));
    let residues = TypedArray::Str(generate_residues(&mut rng));
    let config = EncoderConfig::default();

    let mut group = c.benchmark_group("Classifier");
    for (label, data) in [("ids", &ids), ("coords", &coords), ("residues", &residues)] {
        group.bench_function(format!("classify+encode {}", label), |b| {
            b.iter(|| {
                let encoder = classify(black_box(data), &config);
                black_box(encoder.encode(data).unwrap())
            })
        });

        let encoded = classify(data, &config).encode(data).unwrap();
        group.bench_function(format!("decode {}", label), |b| {
            b.iter(|| black_box(decode(black_box(&encoded)).unwrap()))
        });
    }
    group.finish();
}

fn bench_write_category(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let atoms = Atoms {
        ids: generate_ids(&mut rng),
        xs: generate_coords(&mut rng),
        residues: generate_residues(&mut rng),
    };

    c.bench_function("BinaryEncoder atom_site", |b| {
        b.iter(|| {
            let mut encoder = BinaryEncoder::default();
            encoder.start_data_block("bench").unwrap();
            encoder.write_category(black_box(&atoms), &()).unwrap();
            black_box(encoder.into_bytes().unwrap())
        })
    });
}

criterion_group!(benches, bench_classifier, bench_write_category);
criterion_main!(benches);
