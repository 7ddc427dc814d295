use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{Rng, SeedableRng};

/// Random bytes drawn from a skewed distribution, so the codes differ in length
fn skewed_data(len: usize) -> Vec<u8> {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0xDEADBEEF);
    (0..len)
        .map(|_| {
            let roll: u32 = rng.gen_range(0..100);
            match roll {
                0..=49 => b'e',
                50..=79 => rng.gen_range(b'a'..=b'z'),
                _ => rng.gen(),
            }
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    const DATA_SIZE: usize = 1024 * 1024;

    let data = skewed_data(DATA_SIZE);
    let (archive, _) = huffarc::compress_to_vec(&data).unwrap();

    let mut group = c.benchmark_group("archive");
    group.throughput(Throughput::Bytes(DATA_SIZE as u64));
    group.bench_function("compress", |b| {
        b.iter(|| huffarc::compress_to_vec(black_box(&data)).unwrap())
    });
    group.bench_function("decompress", |b| {
        b.iter(|| huffarc::decompress_to_vec(black_box(&archive)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
