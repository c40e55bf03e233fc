use serde::Serialize;

use crate::analyzers::occupancy::occupancy_pct;
use crate::model::{CriticalSegmentRecord, LoadRecord, TimeBin};

/// The highest critical-segment load under the current filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakMetric {
    pub peak_load: f64,
    pub peak_station: String,
    pub time_bin: TimeBin,
    pub occupancy_pct: f64,
}

/// Headline operating figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub boardings: f64,
    pub alightings: f64,
    pub trip_count: u64,
    /// `None` means unavailable: no critical-segment rows survived the filters.
    pub peak: Option<PeakMetric>,
}

/// Sums the load table and picks the peak from the critical-segment table.
///
/// Ties on `peak_load` resolve to the first row in table order.
pub fn summarize(
    load: &[LoadRecord],
    critical: &[CriticalSegmentRecord],
    capacity: f64,
) -> Summary {
    let boardings = load.iter().map(|r| r.boardings).sum();
    let alightings = load.iter().map(|r| r.alightings).sum();
    let trip_count = load.iter().map(|r| r.trip_count).sum();

    let peak = critical
        .iter()
        .fold(None::<&CriticalSegmentRecord>, |best, row| match best {
            Some(b) if b.peak_load >= row.peak_load => Some(b),
            _ => Some(row),
        })
        .map(|row| PeakMetric {
            peak_load: row.peak_load,
            peak_station: row.peak_station.clone(),
            time_bin: row.time_bin.clone(),
            occupancy_pct: occupancy_pct(row.peak_load, capacity),
        });

    Summary {
        boardings,
        alightings,
        trip_count,
        peak,
    }
}
