use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vmap_parser::tokenizer::{TokenSource, XmlTokenizer};
use vmap_parser::{Decoder, DecoderConfig, decode_vast, decode_vmap};

static VMAP_DOC: &[u8] = include_bytes!("../samples/testVmap.xml");
static VAST_DOC: &[u8] = include_bytes!("../samples/testVast.xml");

fn bench_tokenize_vmap(c: &mut Criterion) {
    c.bench_function("bench_tokenize_vmap", |b| {
        b.iter(|| {
            let mut tok = XmlTokenizer::new(black_box(VMAP_DOC));
            let mut count = 0usize;
            while let Ok(Some(_)) = tok.next_token() {
                count += 1;
            }
            black_box(count);
        });
    });
}

fn bench_decode_vmap(c: &mut Criterion) {
    c.bench_function("bench_decode_vmap", |b| {
        b.iter(|| {
            let vmap = decode_vmap(black_box(VMAP_DOC));
            black_box(vmap.is_ok());
        });
    });
}

fn bench_decode_vmap_unpooled(c: &mut Criterion) {
    let decoder = Decoder::new(DecoderConfig::without_pooling());
    c.bench_function("bench_decode_vmap_unpooled", |b| {
        b.iter(|| {
            let vmap = decoder.decode_vmap(black_box(VMAP_DOC));
            black_box(vmap.is_ok());
        });
    });
}

fn bench_decode_vast(c: &mut Criterion) {
    c.bench_function("bench_decode_vast", |b| {
        b.iter(|| {
            let vast = decode_vast(black_box(VAST_DOC));
            black_box(vast.is_ok());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize_vmap,
    bench_decode_vmap,
    bench_decode_vmap_unpooled,
    bench_decode_vast
);
criterion_main!(benches);
