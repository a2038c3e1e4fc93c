extern crate criterion;
extern crate lzwords;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lzwords::{decode::Decoder, encode::Encoder, Configuration, LzwStatus};

fn sample(name: &str) -> Vec<u8> {
    match name {
        "source" => include_bytes!("../src/encode.rs").repeat(16),
        "noise" => {
            let mut state = 0x9e37_79b9_7f4a_7c15u64;
            (0..1 << 18)
                .map(|_| {
                    state ^= state << 7;
                    state ^= state >> 9;
                    state as u8
                })
                .collect()
        }
        _ => vec![0; 1 << 18],
    }
}

fn criterion_benchmark(c: &mut Criterion, name: &str) {
    let data = sample(name);
    let codes = {
        let mut encoder = Encoder::new();
        encoder.codes(data.iter().copied()).collect::<Result<Vec<_>, _>>().unwrap()
    };

    let mut group = c.benchmark_group(name);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for &width in &[9u8, 12, 16] {
        let config = Configuration::new(width).unwrap();
        group.bench_with_input(format!("encode-{}", width), &data, |b, data| {
            b.iter(|| {
                let mut encoder = Encoder::with_config(config);
                let mut outbuf = vec![0; 1 << 12];
                let mut data = data.as_slice();
                encoder.finish();
                loop {
                    let result = encoder.encode_bytes(data, &mut outbuf[..]);
                    let done = result.status.expect("Error");
                    data = &data[result.consumed_in..];
                    black_box(&outbuf[..result.consumed_out]);
                    if let LzwStatus::Done = done {
                        break;
                    }
                }
            })
        });
    }

    group.bench_with_input("decode-12", &codes, |b, codes| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            let mut outbuf = vec![0; 1 << 12];
            let mut codes = codes.as_slice();
            decoder.finish();
            loop {
                let result = decoder.decode_codes(codes, &mut outbuf[..]);
                let done = result.status.expect("Error");
                codes = &codes[result.consumed_in..];
                black_box(&outbuf[..result.consumed_out]);
                if let LzwStatus::Done = done {
                    break;
                }
            }
        })
    });

    group.finish();
}

pub fn bench_source(c: &mut Criterion) {
    criterion_benchmark(c, "source");
}

pub fn bench_noise(c: &mut Criterion) {
    criterion_benchmark(c, "noise");
}

pub fn bench_zeros(c: &mut Criterion) {
    criterion_benchmark(c, "zeros");
}

criterion_group!(benches, bench_source, bench_noise, bench_zeros);
criterion_main!(benches);
