//! 판단 파이프라인 벤치마크.
//!
//! 분류는 프레임/조각마다 실행되므로 한 번의 비용이 전체
//! 지연의 하한을 정한다.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hunsu_advisor::classifier::classify;
use hunsu_advisor::fields::scan_fields;

const FULL_RESPONSE: &str = "ACTION: RAISE 120\n\
HAND: Ah Kd\n\
BOARD: Kc 9h 2s\n\
STAGE: flop\n\
POSITION: BTN\n\
POT: 80\n\
TO CALL: 20\n\
POT ODDS: 4:1\n\
RATIONALE: top pair with the best kicker, betting for value against draws";

fn bench_scan_fields(c: &mut Criterion) {
    c.bench_function("scan_fields_full_response", |b| {
        b.iter(|| scan_fields(black_box(FULL_RESPONSE)))
    });
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_full_response", |b| {
        b.iter(|| classify(black_box(FULL_RESPONSE)))
    });

    c.bench_function("classify_unlabeled_text", |b| {
        b.iter(|| classify(black_box("the opponent is still thinking, wait for now")))
    });
}

criterion_group!(benches, bench_scan_fields, bench_classify);
criterion_main!(benches);
