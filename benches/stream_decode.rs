//! Benchmarks for incremental stream decoding
//!
//! Measures SSE (cloud) and NDJSON (generic v2) decoding throughput, with the
//! body delivered whole and in small network-sized chunks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sambanova_client::pipeline::{DecodeStep, StreamDecoder};
use sambanova_client::ProtocolVariant;

const DELTAS: usize = 500;

fn cloud_body() -> String {
    let mut body = String::new();
    for i in 0..DELTAS {
        body.push_str(&format!(
            "data: {{\"id\":\"cmpl\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"tok{} \"}},\"finish_reason\":null}}]}}\n\n",
            i
        ));
    }
    body.push_str("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: {\"choices\":[],\"usage\":{\"total_tokens\":512}}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

fn v2_body() -> String {
    (0..DELTAS)
        .map(|i| {
            format!(
                "{{\"result\":{{\"items\":[{{\"id\":\"item0\",\"value\":{{\"stream_token\":\"tok{} \"}}}}]}}}}\n",
                i
            )
        })
        .collect()
}

fn decode(variant: ProtocolVariant, body: &[u8], chunk: usize) -> usize {
    let mut decoder = StreamDecoder::new(variant, 200);
    let mut chunks = body.chunks(chunk);
    let mut chars = 0;
    loop {
        match decoder.step() {
            Ok(DecodeStep::Delta(delta)) => chars += delta.text.len(),
            Ok(DecodeStep::NeedInput) => match chunks.next() {
                Some(c) => decoder.feed(c),
                None => decoder.finish_input(),
            },
            Ok(DecodeStep::End) | Err(_) => return chars,
        }
    }
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_decode");
    let bodies = [
        ("cloud_sse", ProtocolVariant::Cloud, cloud_body()),
        ("generic_v2_ndjson", ProtocolVariant::GenericV2, v2_body()),
    ];

    for (name, variant, body) in &bodies {
        group.throughput(Throughput::Bytes(body.len() as u64));
        for chunk in [64usize, body.len()] {
            group.bench_with_input(BenchmarkId::new(*name, chunk), &chunk, |b, &chunk| {
                b.iter(|| decode(*variant, black_box(body.as_bytes()), chunk))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
