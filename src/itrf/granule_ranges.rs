//! ATM1B granule date → reference frame fallback table.
//!
//! Used only for QFIT files whose header does not name a single frame. The
//! ranges were derived from the frames written in the headers of the archived
//! granules; no formal documentation exists for them. Two single-day entries
//! for `ITRF97` sit between `ITRF2000` ranges. They are kept as literal,
//! distinct entries.

use std::sync::LazyLock;

use chrono::NaiveDate;

use crate::iceflow_errors::IceflowError;

use super::ItrfFrame;

/// `(start, end, frame)`, both ends inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct GranuleItrfRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub itrf: ItrfFrame,
}

type RawRange = ((i32, u32, u32), (i32, u32, u32), &'static str);

const RAW_ATM1B_GRANULE_ITRFS: [RawRange; 11] = [
    ((1993, 6, 23), (1996, 6, 5), "ITRF93"),
    ((1997, 4, 25), (1997, 5, 28), "ITRF94"),
    ((1998, 6, 27), (1999, 5, 25), "ITRF96"),
    ((2000, 5, 12), (2001, 5, 27), "ITRF97"),
    ((2001, 12, 18), (2002, 11, 21), "ITRF2000"),
    ((2002, 11, 22), (2002, 11, 22), "ITRF97"),
    ((2002, 11, 23), (2002, 12, 13), "ITRF2000"),
    ((2002, 12, 14), (2002, 12, 14), "ITRF97"),
    ((2002, 12, 15), (2007, 5, 11), "ITRF2000"),
    ((2007, 9, 10), (2011, 5, 16), "ITRF2005"),
    ((2011, 10, 12), (2018, 5, 1), "ITRF2008"),
];

fn build_table(raw: &[RawRange]) -> Vec<GranuleItrfRange> {
    let table: Vec<GranuleItrfRange> = raw
        .iter()
        .map(|&((sy, sm, sd), (ey, em, ed), itrf)| {
            let start = NaiveDate::from_ymd_opt(sy, sm, sd);
            let end = NaiveDate::from_ymd_opt(ey, em, ed);
            match (start, end, itrf.parse::<ItrfFrame>()) {
                (Some(start), Some(end), Ok(itrf)) => GranuleItrfRange { start, end, itrf },
                _ => panic!("invalid compiled-in granule ITRF range: {itrf}"),
            }
        })
        .collect();

    for range in &table {
        assert!(range.start <= range.end, "inverted range for {}", range.itrf);
    }
    for pair in table.windows(2) {
        assert!(
            pair[0].end < pair[1].start,
            "granule ITRF ranges must be sorted and disjoint"
        );
    }

    table
}

/// The fallback table, validated once on first use.
pub static ATM1B_GRANULE_ITRFS: LazyLock<Vec<GranuleItrfRange>> =
    LazyLock::new(|| build_table(&RAW_ATM1B_GRANULE_ITRFS));

/// Halving search of a sorted, disjoint range table.
///
/// The search window is `[lower, upper)`. A date before the start of the middle
/// entry narrows to the lower half, a date after its end to the upper half.
///
/// Return
/// ----------
/// * The index of the range containing `date`, `None` once the window is empty.
pub fn search_ranges(table: &[GranuleItrfRange], date: NaiveDate) -> Option<usize> {
    let (mut lower, mut upper) = (0, table.len());

    while lower < upper {
        let i = lower + (upper - lower) / 2;
        let range = &table[i];
        if date < range.start {
            upper = i;
        } else if date <= range.end {
            return Some(i);
        } else {
            lower = i + 1;
        }
    }

    None
}

/// Reference frame of an ATM1B granule acquired on `date`.
///
/// Return
/// ----------
/// * The frame of the covering range, or [`IceflowError::ItrfNotFoundForDate`]
///   when `date` falls outside every range.
pub fn resolve_frame_by_date(date: NaiveDate) -> Result<ItrfFrame, IceflowError> {
    search_ranges(&ATM1B_GRANULE_ITRFS, date)
        .map(|i| ATM1B_GRANULE_ITRFS[i].itrf.clone())
        .ok_or(IceflowError::ItrfNotFoundForDate(date))
}

#[cfg(test)]
mod granule_ranges_test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_table_is_valid() {
        assert_eq!(ATM1B_GRANULE_ITRFS.len(), 11);
    }

    #[test]
    fn test_valid_dates() {
        let cases = [
            (date(1994, 7, 1), "ITRF93"),
            (date(1997, 5, 1), "ITRF94"),
            (date(1998, 9, 1), "ITRF96"),
            (date(2000, 12, 1), "ITRF97"),
            (date(2002, 1, 1), "ITRF2000"),
            (date(2002, 11, 22), "ITRF97"),
            (date(2002, 12, 14), "ITRF97"),
            (date(2007, 5, 11), "ITRF2000"),
            (date(2010, 1, 1), "ITRF2005"),
            (date(2015, 1, 1), "ITRF2008"),
        ];
        for (d, expected) in cases {
            assert_eq!(resolve_frame_by_date(d).unwrap().as_str(), expected, "{d}");
        }
    }

    #[test]
    fn test_every_boundary_resolves() {
        for range in ATM1B_GRANULE_ITRFS.iter() {
            assert_eq!(resolve_frame_by_date(range.start).unwrap(), range.itrf);
            assert_eq!(resolve_frame_by_date(range.end).unwrap(), range.itrf);
        }
    }

    #[test]
    fn test_override_neighbours() {
        assert_eq!(
            resolve_frame_by_date(date(2002, 11, 21)).unwrap().as_str(),
            "ITRF2000"
        );
        assert_eq!(
            resolve_frame_by_date(date(2002, 11, 23)).unwrap().as_str(),
            "ITRF2000"
        );
        assert_eq!(
            resolve_frame_by_date(date(2002, 12, 15)).unwrap().as_str(),
            "ITRF2000"
        );
    }

    #[test]
    fn test_invalid_dates() {
        for d in [date(1990, 1, 1), date(2020, 1, 1)] {
            assert_eq!(
                resolve_frame_by_date(d),
                Err(IceflowError::ItrfNotFoundForDate(d))
            );
        }
    }

    #[test]
    fn test_gaps_between_ranges() {
        for d in [date(1996, 12, 1), date(2001, 8, 1), date(2007, 7, 1)] {
            assert!(resolve_frame_by_date(d).is_err());
        }
    }

    #[test]
    fn test_search_window_edges() {
        let table = &ATM1B_GRANULE_ITRFS;
        assert_eq!(search_ranges(table, date(1993, 6, 23)), Some(0));
        assert_eq!(search_ranges(table, date(2018, 5, 1)), Some(10));
        assert_eq!(search_ranges(&table[..0], date(2000, 1, 1)), None);
        assert_eq!(search_ranges(&table[5..6], date(2002, 11, 22)), Some(0));
    }
}
