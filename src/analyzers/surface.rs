//! Time bin × station matrix of mean onboard load, stations in route order.

use std::collections::HashMap;

use crate::analyzers::types::{EmptyReason, Matrix, View};
use crate::analyzers::utility::MeanAccumulator;
use crate::model::{LoadRecord, TimeBin, TimeBinDomain};

/// Station names ordered by their first observed sequence order, ties by name.
pub fn stations_in_route_order(load: &[LoadRecord]) -> Vec<String> {
    let mut first_order: HashMap<&str, i64> = HashMap::new();
    for row in load {
        first_order
            .entry(row.station_name.as_str())
            .or_insert(row.station_sequence_order);
    }

    let mut stations: Vec<(&str, i64)> = first_order.into_iter().collect();
    stations.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    stations.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Builds the surface matrix: one row per bin of `domain` in canonical order,
/// columns are stations in route order. Bins or stations without rows are 0.
pub fn surface_matrix(domain: &TimeBinDomain, load: &[LoadRecord]) -> View<Matrix> {
    if load.is_empty() {
        return View::Empty(EmptyReason::EmptyFilterResult);
    }

    let mut cells: HashMap<(&TimeBin, &str), MeanAccumulator> = HashMap::new();
    for row in load {
        cells
            .entry((&row.time_bin, row.station_name.as_str()))
            .or_default()
            .push(row.onboard_load);
    }

    let bins: Vec<TimeBin> = domain.iter().collect();
    let columns = stations_in_route_order(load);
    let values = bins
        .iter()
        .map(|bin| {
            columns
                .iter()
                .map(|station| {
                    cells
                        .get(&(bin, station.as_str()))
                        .map_or(0.0, MeanAccumulator::mean)
                })
                .collect()
        })
        .collect();

    View::Ready(Matrix {
        rows: bins.iter().map(|b| b.label().to_string()).collect(),
        columns,
        values,
    })
}
