use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rug::Integer;

fn bench_pow_mod_2048(c: &mut Criterion) {
    // 2048-bit exponent and modulus, the RSA-sized case
    let modulus = (Integer::from(1u32) << 2048u32) - 159u32;
    let exp = (Integer::from(1u32) << 2047u32) + 12345u32;
    let base = Integer::from(65537u32);
    c.bench_function("pow_mod(65537, 2^2047+k, 2^2048-159)", |b| {
        b.iter(|| bigmath::pow_mod(black_box(&base), black_box(&exp), black_box(&modulus)));
    });
}

fn bench_pow_default_modulus(c: &mut Criterion) {
    let math = bigmath::BigMath::default();
    let base = Integer::from(3u32);
    let exp = Integer::from(10_000u32);
    c.bench_function("BigMath::pow(3, 10000)", |b| {
        b.iter(|| math.pow(black_box(&base), black_box(&exp), None));
    });
}

fn bench_random_float(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let min = Integer::from(50u32);
    let max = Integer::from(1_000_000u32);
    c.bench_function("random(50, 1e6)", |b| {
        b.iter(|| bigmath::random(&mut rng, black_box(&min), black_box(&max)));
    });
}

fn bench_random_bytes_2048(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let min = (Integer::from(1u32) << 1024u32) - 1u32;
    let max = Integer::from(min.square_ref()) - 1u32;
    c.bench_function("random_bytes(2^1024-1, (2^1024-1)^2-1)", |b| {
        b.iter(|| bigmath::random_bytes(&mut rng, black_box(&min), black_box(&max)));
    });
}

fn bench_random_exact_2048(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let min = (Integer::from(1u32) << 1024u32) - 1u32;
    let max = Integer::from(min.square_ref()) - 1u32;
    c.bench_function("random_exact(2^1024-1, (2^1024-1)^2-1)", |b| {
        b.iter(|| bigmath::random_exact(&mut rng, black_box(&min), black_box(&max)));
    });
}

fn bench_chi_squared_1000(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let max = Integer::from(1u32) << 512u32;
    let seq: Vec<Integer> = (0..1000)
        .map(|_| bigmath::random_exact(&mut rng, &Integer::new(), &max).unwrap())
        .collect();
    let bins = bigmath::bin_count(seq.len());
    c.bench_function("chi_squared(1000 x 512-bit, 32 bins)", |b| {
        b.iter(|| bigmath::chi_squared(black_box(&seq), black_box(bins)));
    });
}

fn bench_constant_cache_hit(c: &mut Criterion) {
    let cache = bigmath::ConstantCache::with_keys(&[0, 1, 2, 128]);
    c.bench_function("ConstantCache::get(hit)", |b| {
        b.iter(|| cache.get(black_box(128)));
    });
}

criterion_group!(
    benches,
    bench_pow_mod_2048,
    bench_pow_default_modulus,
    bench_random_float,
    bench_random_bytes_2048,
    bench_random_exact_2048,
    bench_chi_squared_1000,
    bench_constant_cache_hit,
);
criterion_main!(benches);
