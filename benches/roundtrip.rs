//! Round-trip throughput of the one-shot API and the session layer.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use zstream::buffer::OutBuf;
use zstream::{
    compress_bound, compress_one_shot, decompress_one_shot, Mode, Params, Session,
};

/// Mixed text-like corpus: compressible but not degenerate.
fn corpus(len: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "stream", "session", "chunk", "drain", "feed", "window", "marker", "budget",
    ];
    let mut data = Vec::with_capacity(len);
    let mut x = 0x2545_F491u32;
    while data.len() < len {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        data.extend_from_slice(WORDS[(x >> 28) as usize % WORDS.len()].as_bytes());
        data.push(b' ');
    }
    data.truncate(len);
    data
}

fn bench_oneshot(c: &mut Criterion) {
    let data = corpus(64 * 1024);
    // Separate buffers: the level sweep scribbles over scratch, while the
    // decompress bench needs a stream whose length matches its slice.
    let mut scratch = vec![0u8; compress_bound(data.len())];
    let mut compressed = vec![0u8; compress_bound(data.len())];
    let written = compress_one_shot(&mut compressed, &data, &Params::default()).unwrap();

    let mut group = c.benchmark_group("oneshot");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [1, 6, 10] {
        let params = Params {
            level,
            ..Params::default()
        };
        group.bench_with_input(BenchmarkId::new("compress", level), &params, |b, params| {
            b.iter(|| compress_one_shot(&mut scratch, &data, params).unwrap())
        });
    }
    let mut plain = vec![0u8; data.len()];
    group.bench_function("decompress", |b| {
        b.iter(|| decompress_one_shot(&mut plain, &compressed[..written]).unwrap())
    });
    group.finish();
}

fn bench_session_chunked(c: &mut Criterion) {
    let data = corpus(256 * 1024);

    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for chunk in [4 * 1024usize, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::new("encode_chunked", chunk),
            &chunk,
            |b, &chunk| {
                b.iter(|| {
                    let mut session = Session::open(Mode::Encode, &Params::default()).unwrap();
                    let mut out = OutBuf::new();
                    for piece in data.chunks(chunk) {
                        session.feed(piece).unwrap();
                        session.drain_growing(&mut out, 16 * 1024).unwrap();
                    }
                    session.finish().unwrap();
                    session.drain_growing(&mut out, 16 * 1024).unwrap();
                    session.end();
                    out.len()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_oneshot, bench_session_chunked);
criterion_main!(benches);
