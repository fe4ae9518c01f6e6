//! QFIT header block reassembly.
//!
//! Header records start with a negative type word followed by ASCII text. The
//! text of consecutive header records is concatenated into one string, in which
//! the survey's reference frame is sometimes spelled out (e.g. `itrf2005`).

use crate::constants::QFIT_WORD_SIZE;

/// Raw header records of a QFIT file, record 0 excluded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QfitHeader<'a> {
    records: Vec<&'a [u8]>,
}

impl<'a> QfitHeader<'a> {
    pub fn new(records: Vec<&'a [u8]>) -> Self {
        QfitHeader { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenated header text, type words dropped and NUL padding removed.
    pub fn text(&self) -> String {
        self.records
            .iter()
            .filter(|r| r.len() > QFIT_WORD_SIZE)
            .map(|r| String::from_utf8_lossy(&r[QFIT_WORD_SIZE..]).replace('\0', ""))
            .collect()
    }
}
