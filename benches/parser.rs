use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gnss_water::{parse_header, parse_station};
use std::fmt::Write;

fn station_file(rows: usize) -> String {
    let mut raw = String::from(
        "# Station: cam4\n# Latitude: 4.05\n# Longitude: 9.70\n# Units: m\n#\nDateTime,Height\n",
    );
    for i in 0..rows {
        let _ = writeln!(
            raw,
            "2025-06-{:02}T{:02}:{:02}:00,{:.3}",
            1 + (i / 1440) % 28,
            (i / 60) % 24,
            i % 60,
            47.0 + (i % 1000) as f64 / 1000.0
        );
    }
    raw
}

fn bench_parser(c: &mut Criterion) {
    let raw = station_file(20_000);
    c.bench_function("parse_station", |b| b.iter(|| parse_station(black_box(&raw))));
    c.bench_function("parse_header", |b| b.iter(|| parse_header(black_box(&raw))));
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
