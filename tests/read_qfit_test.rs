mod common;

use chrono::NaiveDate;
use common::QfitBuilder;
use iceflow::atm1b::{Atm1bProduct, Container, RawFile};
use iceflow::qfit::{Endian, QfitFamily, RecordLayout};
use iceflow::{Iceflow, IceflowError};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> chrono::DateTime<chrono::Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_milli_opt(h, min, s, ms)
        .unwrap()
        .and_utc()
}

#[test]
fn test_fourteen_word_file_drops_invalid_records() {
    let builder = QfitBuilder::new(14, true)
        .header("ATM QFIT output, coordinates in itrf2008, WGS84 ellipsoid")
        .record(69_123_456, 310_000_000, 1_234_567, 153_000_000)
        .record(69_123_457, 310_000_001, -9_999, 153_000_001)
        .record(0, 310_000_002, 1_000, 153_000_002)
        .record(69_123_459, 170_500_000, 2_500, 153_000_500);
    let total_records = builder.header_records() + 4;
    let file = RawFile::new("ILATM1B_20120315_150000.ATM4BT4.qi", builder.build());

    let iceflow = Iceflow::new();
    let granule = iceflow.read(&file).unwrap();

    assert_eq!(granule.product, Atm1bProduct::Ilatm1bV1);
    assert_eq!(
        granule.container,
        Container::Flat(RecordLayout::new(QfitFamily::Words14, Endian::Big))
    );
    assert_eq!(granule.reference_frame.as_str(), "ITRF2008");
    assert_eq!(
        granule.points.len(),
        total_records - builder.header_records() - 2
    );

    let first = &granule.points[0];
    assert_eq!(first.latitude, 69.123456);
    assert_eq!(first.longitude, 310.0 - 360.0);
    assert_eq!(first.elevation, f64::from(1234.567f64 as f32));
    // 2012-03-15: GPS−UTC = 15 s
    assert_eq!(first.utc_datetime, utc(2012, 3, 15, 15, 29, 45, 0));
    assert_eq!(first.instrument.passive_signal, Some(9.0));
    assert_eq!(first.instrument.gps_pdop, None);

    let last = &granule.points[1];
    assert_eq!(last.longitude, 170.5);
    assert_eq!(last.utc_datetime, utc(2012, 3, 15, 15, 29, 45, 500));
}

#[test]
fn test_ten_word_little_endian_blatm1b() {
    let builder = QfitBuilder::new(10, false)
        .record(72_000_000, 320_000_000, 3_000_000, 120_000_000)
        .record(72_000_001, 320_000_001, 3_000_001, 120_000_001);
    let file = RawFile::new("BLATM1B_940701_1.qi", builder.build());

    let iceflow = Iceflow::new().with_leap_seconds(|_: NaiveDate| 9i64);
    let granule = iceflow.read(&file).unwrap();

    assert_eq!(granule.product, Atm1bProduct::Blatm1bV1);
    assert_eq!(granule.file_date, NaiveDate::from_ymd_opt(1994, 7, 1).unwrap());
    // no header token: date table
    assert_eq!(granule.reference_frame.as_str(), "ITRF93");
    assert_eq!(granule.points.len(), 2);
    assert!(granule.points.iter().all(|p| p
        .instrument
        .family_specific_fields()
        .iter()
        .all(Option::is_none)));
    assert_eq!(granule.points[0].utc_datetime, utc(1994, 7, 1, 11, 59, 51, 0));
}

#[test]
fn test_header_frame_overrides_date_table() {
    let builder = QfitBuilder::new(12, true)
        .header("itrf97")
        .record(60_000_000, 300_000_000, 0, 100_000_000);
    let file = RawFile::new("BLATM1B_20020301_1.qi", builder.build());

    let granule = Iceflow::new().read(&file).unwrap();
    assert_eq!(granule.reference_frame.as_str(), "ITRF97");
    assert_eq!(granule.points[0].instrument.gps_pdop, Some(9.0));
}

#[test]
fn test_unresolvable_frame() {
    let builder = QfitBuilder::new(12, true).record(60_000_000, 300_000_000, 0, 100_000_000);
    // between the ITRF2005 and ITRF2008 ranges
    let file = RawFile::new("ILATM1B_20110601_120000.ATM4BT4.qi", builder.build());

    assert_eq!(
        Iceflow::new().read(&file),
        Err(IceflowError::ItrfNotFoundForDate(
            NaiveDate::from_ymd_opt(2011, 6, 1).unwrap()
        ))
    );
}

#[test]
fn test_invalid_record_size() {
    let mut bytes = 400i32.to_be_bytes().to_vec();
    bytes.resize(400, 0);
    let file = RawFile::new("ILATM1B_20111104_181304.ATM4BT4.qi", bytes);

    assert!(matches!(
        Iceflow::new().read(&file),
        Err(IceflowError::QfitDecodeError(_))
    ));
}

#[test]
fn test_all_records_filtered() {
    let builder = QfitBuilder::new(14, false)
        .record(0, 1, 1, 100_000_000)
        .record(1, 1, -9_999, 100_000_000);
    let file = RawFile::new("ILATM1B_20111104_181304.ATM4BT4.qi", builder.build());

    let granule = Iceflow::new().read(&file).unwrap();
    assert!(granule.points.is_empty());
    assert_eq!(granule.reference_frame.as_str(), "ITRF2008");
}
