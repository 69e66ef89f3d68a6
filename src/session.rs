//! Per-run accumulation of lookup results

use crate::lens::ip::LookupRecord;

/// Ordered, append-only list of the records looked up during one run
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<LookupRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LookupRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LookupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
