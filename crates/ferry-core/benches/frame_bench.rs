use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ferry_core::{Frame, Metadata};
use std::hint::black_box;

fn bench_metadata_encode(c: &mut Criterion) {
    let meta = Metadata::new("testdata/large-img.jpg", 1000, 65536);

    let mut group = c.benchmark_group("metadata_encode");
    group.throughput(Throughput::Bytes(meta.encoded_len() as u64));
    group.bench_function("encode", |b| b.iter(|| black_box(&meta).encode()));
    group.finish();
}

fn bench_metadata_decode(c: &mut Criterion) {
    let meta = Metadata::new("testdata/large-img.jpg", 1000, 65536);
    let encoded = meta.encode().unwrap();

    let mut group = c.benchmark_group("metadata_decode");
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("decode", |b| b.iter(|| Metadata::decode(black_box(&encoded))));
    group.finish();
}

fn bench_frame_encode_sizes(c: &mut Criterion) {
    let sizes: Vec<(usize, &str)> = vec![
        (128, "128_bytes"),
        (1024, "1_kib"),
        (4 * 1024, "4_kib"),
        (64 * 1024, "64_kib"),
        (1024 * 1024, "1_mib"),
    ];

    let mut group = c.benchmark_group("frame_encode_by_payload");

    for (size, name) in sizes {
        let frame = Frame::new("testdata/large-img.jpg", 42, vec![0xAB; size]).unwrap();
        group.throughput(Throughput::Bytes(frame.encoded_len() as u64));
        group.bench_function(name, |b| b.iter(|| black_box(&frame).encode()));
    }

    group.finish();
}

fn bench_frame_decode_sizes(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let sizes: Vec<(usize, &str)> = vec![
        (128, "128_bytes"),
        (4 * 1024, "4_kib"),
        (64 * 1024, "64_kib"),
    ];

    let mut group = c.benchmark_group("frame_decode_by_payload");

    for (size, name) in sizes {
        let wire = Frame::new("testdata/large-img.jpg", 42, vec![0xCD; size])
            .unwrap()
            .encode()
            .unwrap();
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                rt.block_on(async {
                    let mut source: &[u8] = black_box(&wire);
                    Frame::read_from(&mut source).await
                })
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_metadata_encode,
    bench_metadata_decode,
    bench_frame_encode_sizes,
    bench_frame_decode_sizes
);
criterion_main!(benches);
