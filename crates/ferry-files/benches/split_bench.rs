use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ferry_files::{SplitOptions, Splitter};
use std::hint::black_box;

const SOURCE_LEN: usize = 4 * 1024 * 1024;

fn bench_write_framed(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let source = vec![0x5A_u8; SOURCE_LEN];

    let batch_sizes: Vec<(usize, &str)> = vec![
        (1024, "1_kib"),
        (4 * 1024, "4_kib"),
        (64 * 1024, "64_kib"),
        (1024 * 1024, "1_mib"),
    ];

    let mut group = c.benchmark_group("write_framed");
    group.throughput(Throughput::Bytes(SOURCE_LEN as u64));

    for (batch_size, name) in batch_sizes {
        let splitter = Splitter::new(SplitOptions::new("bench/source.bin", batch_size)).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                rt.block_on(async {
                    let mut rd: &[u8] = black_box(&source);
                    let mut wire: Vec<u8> = Vec::with_capacity(SOURCE_LEN + SOURCE_LEN / 8);
                    splitter.write_framed(&mut rd, &mut wire).await.unwrap();
                    wire
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_write_framed);
criterion_main!(benches);
