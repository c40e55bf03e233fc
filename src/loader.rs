//! CSV parsing and normalization of the three input tables.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{BrtError, Result};
use crate::model::{
    CriticalSegmentRecord, Dataset, LoadRecord, StationIndex, StationMetadata, Table,
    TimeBinDomain,
};

/// Raw bytes of the three sources, already fetched and decompressed.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub load: Vec<u8>,
    pub critical: Vec<u8>,
    pub stations: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct LoadRow {
    data: String,
    faixa_15: String,
    grupo_linha: String,
    stop_name: String,
    #[serde(deserialize_with = "whole_number")]
    ordem: i64,
    boardings: f64,
    alightings: f64,
    carga_abordo: f64,
    #[serde(deserialize_with = "whole_number")]
    qtd_partidas: i64,
}

#[derive(Debug, Deserialize)]
struct CriticalRow {
    data: String,
    faixa_15: String,
    grupo_linha: String,
    carga_maxima: f64,
    estacao_pico: String,
    #[serde(deserialize_with = "whole_number")]
    qtd_partidas: i64,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    stop_name: String,
    lat: Option<f64>,
    lon: Option<f64>,
    linha: Option<String>,
}

/// Accepts `3` as well as `3.0`, which is how exported frames often write counts.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(D::Error::custom(format!("expected a whole number, got {value}")));
    }
    Ok(value as i64)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a date column value, discarding any time-of-day component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn read_rows<T: DeserializeOwned>(bytes: &[u8], table: Table) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let row: T = result.map_err(|e| BrtError::data_format(table, e.to_string()))?;
        rows.push(row);
    }

    debug!(%table, rows = rows.len(), "Parsed CSV rows");
    Ok(rows)
}

fn date_column(value: &str, table: Table, row: usize) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| {
        BrtError::data_format(table, format!("row {}: unparsable date '{}'", row + 1, value))
    })
}

fn non_negative(value: i64, column: &str, table: Table, row: usize) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        BrtError::data_format(
            table,
            format!("row {}: {} must not be negative, got {}", row + 1, column, value),
        )
    })
}

fn non_negative_amount(value: f64, column: &str, table: Table, row: usize) -> Result<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(BrtError::data_format(
            table,
            format!("row {}: {} must not be negative, got {}", row + 1, column, value),
        ))
    }
}

/// Parses and normalizes the three tables.
///
/// The time-bin domain is the sorted set of labels in the load table; the
/// critical-segment table is mapped onto that same domain.
///
/// # Errors
///
/// Returns [`BrtError::DataFormat`] for malformed rows, unparsable dates or
/// negative counts and loads,
/// and [`BrtError::UnknownTimeBin`] for critical-segment bins outside the
/// load table's domain.
#[tracing::instrument(skip_all, fields(
    load_bytes = raw.load.len(),
    critical_bytes = raw.critical.len(),
    stations_bytes = raw.stations.len(),
))]
pub fn normalize(raw: &RawSources) -> Result<Dataset> {
    let load_rows: Vec<LoadRow> = read_rows(&raw.load, Table::Load)?;
    let critical_rows: Vec<CriticalRow> = read_rows(&raw.critical, Table::CriticalSegment)?;
    let station_rows: Vec<StationRow> = read_rows(&raw.stations, Table::Stations)?;

    let time_bins = TimeBinDomain::from_labels(load_rows.iter().map(|r| r.faixa_15.as_str()));

    let mut load = Vec::with_capacity(load_rows.len());
    for (i, row) in load_rows.into_iter().enumerate() {
        let date = date_column(&row.data, Table::Load, i)?;
        let time_bin = time_bins
            .get(&row.faixa_15)
            .ok_or_else(|| BrtError::UnknownTimeBin {
                table: Table::Load,
                label: row.faixa_15.clone(),
            })?;
        load.push(LoadRecord {
            route_group: row.grupo_linha,
            date,
            time_bin,
            station_name: row.stop_name,
            station_sequence_order: row.ordem,
            boardings: non_negative_amount(row.boardings, "boardings", Table::Load, i)?,
            alightings: non_negative_amount(row.alightings, "alightings", Table::Load, i)?,
            onboard_load: non_negative_amount(row.carga_abordo, "carga_abordo", Table::Load, i)?,
            trip_count: non_negative(row.qtd_partidas, "qtd_partidas", Table::Load, i)?,
        });
    }

    let mut critical = Vec::with_capacity(critical_rows.len());
    for (i, row) in critical_rows.into_iter().enumerate() {
        let date = date_column(&row.data, Table::CriticalSegment, i)?;
        let time_bin = time_bins
            .get(&row.faixa_15)
            .ok_or_else(|| BrtError::UnknownTimeBin {
                table: Table::CriticalSegment,
                label: row.faixa_15.clone(),
            })?;
        critical.push(CriticalSegmentRecord {
            route_group: row.grupo_linha,
            date,
            time_bin,
            peak_load: row.carga_maxima,
            peak_station: row.estacao_pico,
            trip_count: non_negative(
                row.qtd_partidas,
                "qtd_partidas",
                Table::CriticalSegment,
                i,
            )?,
        });
    }

    let stations = StationIndex::from_rows(station_rows.into_iter().map(|row| StationMetadata {
        station_name: row.stop_name,
        latitude: row.lat,
        longitude: row.lon,
        lines: row.linha,
    }));

    info!(
        load_rows = load.len(),
        critical_rows = critical.len(),
        stations = stations.len(),
        time_bins = time_bins.len(),
        "Dataset normalized"
    );

    Ok(Dataset {
        time_bins,
        load,
        critical,
        stations,
    })
}
