//! Normalized, immutable tables loaded once per session.
//!
//! Column names of the input files survive only in the serde renames used
//! for the raw-table export; everything else uses the names below.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies one of the three input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Load,
    CriticalSegment,
    Stations,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Load => "load table",
            Table::CriticalSegment => "critical-segment table",
            Table::Stations => "station table",
        };
        f.write_str(name)
    }
}

/// A 15-minute bin label with its rank in the dataset's canonical ordering.
///
/// Equality, hashing and ordering use the rank only, so bins from the same
/// [`TimeBinDomain`] sort consistently across tables.
#[derive(Debug, Clone)]
pub struct TimeBin {
    ordinal: usize,
    label: Arc<str>,
}

impl TimeBin {
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for TimeBin {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal == other.ordinal
    }
}

impl Eq for TimeBin {}

impl Hash for TimeBin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordinal.hash(state);
    }
}

impl PartialOrd for TimeBin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeBin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl fmt::Display for TimeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for TimeBin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// The sorted set of distinct time-bin labels observed in the load table.
#[derive(Debug, Clone, Default)]
pub struct TimeBinDomain {
    labels: Vec<Arc<str>>,
}

impl TimeBinDomain {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            labels: distinct.into_iter().map(Arc::from).collect(),
        }
    }

    /// Looks up a label; `None` when the label is outside the domain.
    pub fn get(&self, label: &str) -> Option<TimeBin> {
        self.labels
            .binary_search_by(|probe| probe.as_ref().cmp(label))
            .ok()
            .map(|ordinal| TimeBin {
                ordinal,
                label: Arc::clone(&self.labels[ordinal]),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeBin> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(ordinal, label)| TimeBin {
                ordinal,
                label: Arc::clone(label),
            })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Load along the route for one station, time bin and route group/date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRecord {
    #[serde(rename = "grupo_linha")]
    pub route_group: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "faixa_15")]
    pub time_bin: TimeBin,
    #[serde(rename = "stop_name")]
    pub station_name: String,
    #[serde(rename = "ordem")]
    pub station_sequence_order: i64,
    pub boardings: f64,
    pub alightings: f64,
    #[serde(rename = "carga_abordo")]
    pub onboard_load: f64,
    #[serde(rename = "qtd_partidas")]
    pub trip_count: u64,
}

/// Highest load seen for one route group, date and time bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalSegmentRecord {
    #[serde(rename = "grupo_linha")]
    pub route_group: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "faixa_15")]
    pub time_bin: TimeBin,
    #[serde(rename = "carga_maxima")]
    pub peak_load: f64,
    #[serde(rename = "estacao_pico")]
    pub peak_station: String,
    #[serde(rename = "qtd_partidas")]
    pub trip_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMetadata {
    #[serde(rename = "stop_name")]
    pub station_name: String,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
    #[serde(rename = "linha")]
    pub lines: Option<String>,
}

impl StationMetadata {
    /// Latitude and longitude, if both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Station metadata de-duplicated by name, first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: Vec<StationMetadata>,
    by_name: HashMap<String, usize>,
}

impl StationIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = StationMetadata>) -> Self {
        let mut index = StationIndex::default();
        for row in rows {
            if index.by_name.contains_key(&row.station_name) {
                continue;
            }
            index
                .by_name
                .insert(row.station_name.clone(), index.stations.len());
            index.stations.push(row);
        }
        index
    }

    pub fn get(&self, station_name: &str) -> Option<&StationMetadata> {
        self.by_name.get(station_name).map(|&i| &self.stations[i])
    }

    pub fn rows(&self) -> &[StationMetadata] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// The three normalized tables of a session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub time_bins: TimeBinDomain,
    pub load: Vec<LoadRecord>,
    pub critical: Vec<CriticalSegmentRecord>,
    pub stations: StationIndex,
}

impl Dataset {
    /// Distinct route groups of the load table, sorted.
    pub fn route_groups(&self) -> Vec<String> {
        let groups: BTreeSet<&str> = self.load.iter().map(|r| r.route_group.as_str()).collect();
        groups.into_iter().map(str::to_string).collect()
    }

    /// Distinct dates of the load table, sorted.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self.load.iter().map(|r| r.date).collect();
        dates.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_sorts_and_dedups() {
        let domain = TimeBinDomain::from_labels(["08:15", "08:00", "08:15", "07:45"]);
        let labels: Vec<String> = domain.iter().map(|b| b.label().to_string()).collect();
        assert_eq!(labels, vec!["07:45", "08:00", "08:15"]);
        assert_eq!(domain.len(), 3);
    }

    #[test]
    fn test_domain_lookup() {
        let domain = TimeBinDomain::from_labels(["08:00", "07:45"]);
        let bin = domain.get("08:00").unwrap();
        assert_eq!(bin.ordinal(), 1);
        assert_eq!(bin.label(), "08:00");
        assert!(domain.get("09:00").is_none());
    }

    #[test]
    fn test_time_bin_orders_by_rank() {
        let domain = TimeBinDomain::from_labels(["10:00", "09:45"]);
        let early = domain.get("09:45").unwrap();
        let late = domain.get("10:00").unwrap();
        assert!(early < late);
        assert_eq!(early, domain.get("09:45").unwrap());
    }

    #[test]
    fn test_station_index_first_occurrence_wins() {
        let index = StationIndex::from_rows([
            StationMetadata {
                station_name: "Lapa".into(),
                latitude: Some(-12.98),
                longitude: Some(-38.51),
                lines: Some("B1".into()),
            },
            StationMetadata {
                station_name: "Lapa".into(),
                latitude: Some(0.0),
                longitude: Some(0.0),
                lines: Some("B2".into()),
            },
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Lapa").unwrap().lines.as_deref(), Some("B1"));
    }

    #[test]
    fn test_coordinates_require_both() {
        let station = StationMetadata {
            station_name: "Iguatemi".into(),
            latitude: Some(-12.97),
            longitude: None,
            lines: None,
        };
        assert!(station.coordinates().is_none());
    }
}
