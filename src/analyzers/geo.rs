//! Per-station load joined with coordinates for the map.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::analyzers::occupancy::{Severity, classify, occupancy_pct};
use crate::analyzers::types::{EmptyReason, View};
use crate::analyzers::utility::{MeanAccumulator, mean};
use crate::model::{LoadRecord, StationIndex};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationLoad {
    pub station_name: String,
    pub mean_load: f64,
    pub boardings: f64,
    pub alightings: f64,
    pub order: i64,
    pub location: GeoPoint,
    pub lines: Option<String>,
    pub occupancy_pct: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoView {
    /// Mean of all included station coordinates.
    pub center: GeoPoint,
    /// Stations with coordinates, sorted by name.
    pub stations: Vec<StationLoad>,
    /// Stations with load data but no coordinates in the station table.
    pub missing_coordinates: Vec<String>,
}

struct StationTotals {
    load: MeanAccumulator,
    boardings: f64,
    alightings: f64,
    order: i64,
}

/// Aggregates load per station and places each on the map.
///
/// Stations without metadata or coordinates are excluded and reported in
/// [`GeoView::missing_coordinates`]. If none remain the view is
/// [`EmptyReason::NoUsableData`].
pub fn geo_view(load: &[LoadRecord], stations: &StationIndex, capacity: f64) -> View<GeoView> {
    if load.is_empty() {
        return View::Empty(EmptyReason::EmptyFilterResult);
    }

    let mut totals: BTreeMap<&str, StationTotals> = BTreeMap::new();
    for row in load {
        let entry = totals
            .entry(row.station_name.as_str())
            .or_insert_with(|| StationTotals {
                load: MeanAccumulator::default(),
                boardings: 0.0,
                alightings: 0.0,
                order: row.station_sequence_order,
            });
        entry.load.push(row.onboard_load);
        entry.boardings += row.boardings;
        entry.alightings += row.alightings;
    }

    let mut included = Vec::new();
    let mut missing_coordinates = Vec::new();
    for (name, t) in totals {
        let Some(meta) = stations.get(name) else {
            missing_coordinates.push(name.to_string());
            continue;
        };
        let Some((latitude, longitude)) = meta.coordinates() else {
            missing_coordinates.push(name.to_string());
            continue;
        };

        let mean_load = t.load.mean();
        let pct = occupancy_pct(mean_load, capacity);
        included.push(StationLoad {
            station_name: name.to_string(),
            mean_load,
            boardings: t.boardings,
            alightings: t.alightings,
            order: t.order,
            location: GeoPoint {
                latitude,
                longitude,
            },
            lines: meta.lines.clone(),
            occupancy_pct: pct,
            severity: classify(pct),
        });
    }

    if !missing_coordinates.is_empty() {
        warn!(
            count = missing_coordinates.len(),
            stations = ?missing_coordinates,
            "Stations without coordinates excluded from map"
        );
    }

    if included.is_empty() {
        return View::Empty(EmptyReason::NoUsableData);
    }

    let lats: Vec<f64> = included.iter().map(|s| s.location.latitude).collect();
    let lons: Vec<f64> = included.iter().map(|s| s.location.longitude).collect();

    View::Ready(GeoView {
        center: GeoPoint {
            latitude: mean(&lats),
            longitude: mean(&lons),
        },
        stations: included,
        missing_coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StationMetadata, TimeBinDomain};
    use chrono::NaiveDate;

    fn row(station: &str, order: i64, load: f64, boardings: f64) -> LoadRecord {
        let domain = TimeBinDomain::from_labels(["08:00"]);
        LoadRecord {
            route_group: "B1-ida".into(),
            date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            time_bin: domain.get("08:00").unwrap(),
            station_name: station.into(),
            station_sequence_order: order,
            boardings,
            alightings: 1.0,
            onboard_load: load,
            trip_count: 1,
        }
    }

    fn meta(name: &str, lat: Option<f64>, lon: Option<f64>) -> StationMetadata {
        StationMetadata {
            station_name: name.into(),
            latitude: lat,
            longitude: lon,
            lines: Some("B1, B2".into()),
        }
    }

    #[test]
    fn test_two_station_scenario() {
        let index = StationIndex::from_rows([
            meta("A", Some(-12.0), Some(-38.0)),
            meta("B", Some(-13.0), Some(-39.0)),
        ]);
        let rows = vec![row("A", 1, 50.0, 5.0), row("B", 2, 100.0, 7.0)];
        let view = geo_view(&rows, &index, 90.0).into_ready().unwrap();

        assert_eq!(view.stations.len(), 2);
        assert_eq!(view.stations[0].severity, Severity::Normal);
        assert_eq!(view.stations[1].severity, Severity::Critical);
        assert_eq!(view.center.latitude, -12.5);
        assert_eq!(view.center.longitude, -38.5);
        assert!(view.missing_coordinates.is_empty());
    }

    #[test]
    fn test_aggregates_per_station() {
        let index = StationIndex::from_rows([meta("A", Some(-12.0), Some(-38.0))]);
        let rows = vec![row("A", 4, 40.0, 5.0), row("A", 9, 80.0, 7.0)];
        let view = geo_view(&rows, &index, 100.0).into_ready().unwrap();
        let a = &view.stations[0];
        assert_eq!(a.mean_load, 60.0);
        assert_eq!(a.boardings, 12.0);
        assert_eq!(a.alightings, 2.0);
        assert_eq!(a.order, 4);
        assert_eq!(a.occupancy_pct, 60.0);
    }

    #[test]
    fn test_stations_without_coordinates_are_excluded() {
        let index = StationIndex::from_rows([
            meta("A", Some(-12.0), Some(-38.0)),
            meta("B", None, Some(-39.0)),
        ]);
        let rows = vec![
            row("A", 1, 10.0, 1.0),
            row("B", 2, 10.0, 1.0),
            row("C", 3, 10.0, 1.0),
        ];
        let view = geo_view(&rows, &index, 90.0).into_ready().unwrap();
        assert_eq!(view.stations.len(), 1);
        assert_eq!(view.missing_coordinates, vec!["B", "C"]);
        assert_eq!(view.center.latitude, -12.0);
    }

    #[test]
    fn test_no_coordinates_at_all() {
        let rows = vec![row("A", 1, 10.0, 1.0)];
        assert_eq!(
            geo_view(&rows, &StationIndex::default(), 90.0),
            View::Empty(EmptyReason::NoUsableData)
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            geo_view(&[], &StationIndex::default(), 90.0),
            View::Empty(EmptyReason::EmptyFilterResult)
        );
    }
}
