#![allow(dead_code)]

use approx::assert_relative_eq;
use iceflow::PointMeasurement;

/// Synthesizes QFIT byte buffers: a record-size record, optional header text
/// records with negative type words, then data records.
pub struct QfitBuilder {
    words: usize,
    big_endian: bool,
    header_text: String,
    records: Vec<Vec<i32>>,
}

impl QfitBuilder {
    pub fn new(words: usize, big_endian: bool) -> Self {
        QfitBuilder {
            words,
            big_endian,
            header_text: String::new(),
            records: Vec::new(),
        }
    }

    pub fn header(mut self, text: &str) -> Self {
        self.header_text.push_str(text);
        self
    }

    /// A data record: coordinates in micro-degrees and millimeters, the packed
    /// time in the last word, every other word set to its index.
    pub fn record(mut self, lat_udeg: i32, lon_udeg: i32, elev_mm: i32, gps_time: i32) -> Self {
        let mut words: Vec<i32> = (0..self.words as i32).collect();
        words[0] = 1_000 + self.records.len() as i32;
        words[1] = lat_udeg;
        words[2] = lon_udeg;
        words[3] = elev_mm;
        words[self.words - 1] = gps_time;
        self.records.push(words);
        self
    }

    fn encode(&self, word: i32) -> [u8; 4] {
        if self.big_endian {
            word.to_be_bytes()
        } else {
            word.to_le_bytes()
        }
    }

    pub fn record_size(&self) -> usize {
        self.words * 4
    }

    /// Number of records written before the first data record.
    pub fn header_records(&self) -> usize {
        let text_len = self.record_size() - 4;
        1 + self.header_text.len().div_ceil(text_len)
    }

    pub fn build(&self) -> Vec<u8> {
        let size = self.record_size();
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.encode(size as i32));
        bytes.resize(size, 0);

        for (i, chunk) in self.header_text.as_bytes().chunks(size - 4).enumerate() {
            let start = bytes.len();
            bytes.extend_from_slice(&self.encode(-9_000_000 - i as i32));
            bytes.extend_from_slice(chunk);
            bytes.resize(start + size, 0);
        }

        for record in &self.records {
            for word in record {
                bytes.extend_from_slice(&self.encode(*word));
            }
        }

        bytes
    }
}

pub fn assert_points_close<T>(
    actual: &[PointMeasurement<T>],
    expected: &[PointMeasurement<T>],
    epsilon: f64,
) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(a.longitude, e.longitude, epsilon = epsilon);
        assert_relative_eq!(a.latitude, e.latitude, epsilon = epsilon);
        assert_relative_eq!(a.elevation, e.elevation, epsilon = epsilon);
        assert_eq!(a.utc_datetime, e.utc_datetime);
        assert_eq!(a.reference_frame, e.reference_frame);
    }
}
