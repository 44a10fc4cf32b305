use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use deltapatch::description;
use deltapatch::vcdiff::{FileHeader, HeaderIndicator};

fn gen_text(size: usize, seed: u64) -> String {
    let mut s = seed;
    let mut out = String::with_capacity(size);
    for i in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        if i % 61 == 60 {
            out.push_str(if (s >> 40) & 1 == 0 { "\r\n" } else { "\r" });
        } else {
            out.push((b'a' + ((s >> 33) % 26) as u8) as char);
        }
    }
    out
}

fn described_patch(text: &str) -> Vec<u8> {
    let hdr = FileHeader {
        indicator: HeaderIndicator::SECONDARY | HeaderIndicator::APPHEADER,
        secondary_id: Some(2),
        code_table: None,
        app_header: Some(description::encode_token(text).into_bytes()),
    };
    let mut out = Vec::new();
    hdr.encode(&mut out).expect("encode header");
    out.extend_from_slice(&[0u8; 4096]);
    out
}

fn bench_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe");
    for size in [64usize, 4 * 1024, 256 * 1024] {
        let patch = described_patch(&gen_text(size, 7));
        group.throughput(Throughput::Bytes(patch.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &patch, |b, patch| {
            b.iter(|| description::probe(&mut black_box(patch.as_slice())).expect("probe"));
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let text = gen_text(256 * 1024, 11);
    let mut group = c.benchmark_group("normalize_line_endings");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("mixed_256k", |b| {
        b.iter(|| description::normalize_line_endings(black_box(&text)).len());
    });
    group.finish();
}

criterion_group!(benches, bench_probe, bench_normalize);
criterion_main!(benches);
