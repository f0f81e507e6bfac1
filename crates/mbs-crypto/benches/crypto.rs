use mbs_crypto::{
    decrypt_data, derive_key, encrypt_data, CipherAlgorithm, FormatHint, FormatVersion,
    KeyMaterial,
};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bench_key() -> KeyMaterial {
    KeyMaterial::from_vec(vec![0xABu8; 32])
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_v1(bencher: divan::Bencher, size: usize) {
    let key = bench_key();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt_data(
                divan::black_box(&data),
                CipherAlgorithm::AesGcm,
                Some(FormatVersion::V1),
                divan::black_box(&key),
            )
            .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_detect(bencher: divan::Bencher, size: usize) {
    let key = bench_key();
    let data = make_data(size);
    let blob = encrypt_data(&data, CipherAlgorithm::AesGcm, Some(FormatVersion::V1), &key).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt_data(
                divan::black_box(&blob),
                CipherAlgorithm::AesGcm,
                Some(FormatHint::Detect),
                divan::black_box(&key),
            )
            .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_chacha_v0(bencher: divan::Bencher, size: usize) {
    let key = bench_key();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt_data(
                divan::black_box(&data),
                CipherAlgorithm::ChaCha20Poly1305,
                None,
                divan::black_box(&key),
            )
            .unwrap()
        });
}

#[divan::bench]
fn bench_derive_key(bencher: divan::Bencher) {
    let master = bench_key();
    bencher.bench(|| {
        derive_key(
            divan::black_box(&master),
            "bench.encryption",
            "user-data",
            None,
            None,
        )
        .unwrap()
    });
}

fn main() {
    divan::main();
}
