use serde::Serialize;

use crate::analyzers::types::{EmptyReason, View};
use crate::model::CriticalSegmentRecord;

/// Critical-segment bars plus the capacity reference line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalSeries {
    pub segments: Vec<CriticalSegmentRecord>,
    pub capacity_line: f64,
}

/// Orders the filtered critical-segment rows by time bin, keeping table
/// order within a bin.
pub fn critical_series(critical: &[CriticalSegmentRecord], capacity: f64) -> View<CriticalSeries> {
    if critical.is_empty() {
        return View::Empty(EmptyReason::EmptyFilterResult);
    }

    let mut segments = critical.to_vec();
    segments.sort_by(|a, b| a.time_bin.cmp(&b.time_bin));

    View::Ready(CriticalSeries {
        segments,
        capacity_line: capacity,
    })
}
