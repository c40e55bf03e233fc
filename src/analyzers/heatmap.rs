use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::{EmptyReason, Matrix, View};
use crate::analyzers::utility::MeanAccumulator;
use crate::model::{LoadRecord, TimeBin};

/// Pivots mean onboard load into a station × time bin matrix.
///
/// Rows are station names in lexicographic order, columns are the time bins
/// present in canonical order. Missing cells are 0.
pub fn heatmap_matrix(load: &[LoadRecord]) -> View<Matrix> {
    if load.is_empty() {
        return View::Empty(EmptyReason::EmptyFilterResult);
    }

    let mut cells: BTreeMap<(&str, &TimeBin), MeanAccumulator> = BTreeMap::new();
    let mut stations: BTreeSet<&str> = BTreeSet::new();
    let mut bins: BTreeSet<&TimeBin> = BTreeSet::new();
    for row in load {
        stations.insert(&row.station_name);
        bins.insert(&row.time_bin);
        cells
            .entry((row.station_name.as_str(), &row.time_bin))
            .or_default()
            .push(row.onboard_load);
    }

    let values = stations
        .iter()
        .map(|station| {
            bins.iter()
                .map(|bin| cells.get(&(*station, *bin)).map_or(0.0, MeanAccumulator::mean))
                .collect()
        })
        .collect();

    View::Ready(Matrix {
        rows: stations.iter().map(|s| s.to_string()).collect(),
        columns: bins.iter().map(|b| b.label().to_string()).collect(),
        values,
    })
}
