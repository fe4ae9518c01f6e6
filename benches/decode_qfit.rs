use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use iceflow::atm1b::RawFile;
use iceflow::iceflow::Iceflow;
use iceflow::qfit::record::decode_qfit;
use iceflow::qfit::sniffer::sniff_layout;

const RECORDS: usize = 100_000;

/// A big-endian 14-word QFIT file: size record, one header record, then
/// `RECORDS` data records along a synthetic flight line.
fn synthetic_qfit(records: usize) -> Vec<u8> {
    let words = 14;
    let mut bytes = Vec::with_capacity((records + 2) * words * 4);

    bytes.extend_from_slice(&((words * 4) as i32).to_be_bytes());
    bytes.resize(words * 4, 0);

    bytes.extend_from_slice(&(-9_000_000i32).to_be_bytes());
    bytes.extend_from_slice(b"ATM QFIT output, itrf2008");
    bytes.resize(2 * words * 4, 0);

    for i in 0..records as i32 {
        let mut record = [0i32; 14];
        record[0] = i;
        record[1] = 69_000_000 + i;
        record[2] = 310_000_000 + 2 * i;
        record[3] = 1_500_000 + (i % 1000);
        // 12:00:00.000 plus one millisecond per shot, capped below the minute
        record[13] = 120_000_000 + (i % 60_000);
        for word in record {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
    }
    bytes
}

fn bench_decode(c: &mut Criterion) {
    let bytes = synthetic_qfit(RECORDS);
    let layout = sniff_layout(&bytes).unwrap();

    c.bench_function("qfit/sniff_layout", |b| {
        b.iter(|| sniff_layout(black_box(&bytes)).unwrap())
    });

    c.bench_function("qfit/decode_qfit/100k", |b| {
        b.iter(|| decode_qfit(black_box(&bytes), layout).unwrap())
    });
}

fn bench_read(c: &mut Criterion) {
    let iceflow = Iceflow::new();
    let bytes = synthetic_qfit(RECORDS);

    c.bench_function("atm1b/read/100k", |b| {
        b.iter_batched(
            || RawFile::new("ILATM1B_20120315_120000.ATM4BT4.qi", bytes.clone()),
            |file| iceflow.read(black_box(&file)).unwrap(),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_decode, bench_read);
criterion_main!(benches);
