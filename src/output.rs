//! Output formatting and persistence for derived views.
//!
//! Supports pretty-printed JSON and CSV export of tables and matrices.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::geo::StationLoad;
use crate::analyzers::occupancy::Severity;
use crate::analyzers::types::{Matrix, View};
use crate::error::Result;
use crate::session::DashboardViews;

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes serializable rows as CSV with a header line.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a matrix as CSV: a header of column labels, then one line per row
/// starting with the row label.
pub fn write_matrix<W: Write>(writer: W, corner: &str, matrix: &Matrix) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec![corner.to_string()];
    header.extend(matrix.columns.iter().cloned());
    writer.write_record(&header)?;

    for (label, values) in matrix.rows.iter().zip(&matrix.values) {
        let mut record = vec![label.clone()];
        record.extend(values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, fs::File)> {
    let path = dir.join(name);
    let file = fs::File::create(&path)?;
    Ok((path, file))
}

/// Writes every ready view of `views` into `dir` as CSV and returns the
/// files written. Empty views are skipped.
pub fn export_views(dir: impl AsRef<Path>, views: &DashboardViews) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let (path, file) = create(dir, "summary.json")?;
    write_json(file, &views.summary)?;
    written.push(path);

    if let View::Ready(matrix) = &views.surface {
        let (path, file) = create(dir, "surface.csv")?;
        write_matrix(file, "faixa_15", matrix)?;
        written.push(path);
    }
    if let View::Ready(matrix) = &views.heatmap {
        let (path, file) = create(dir, "heatmap.csv")?;
        write_matrix(file, "stop_name", matrix)?;
        written.push(path);
    }
    if let View::Ready(grid) = &views.animation {
        let (path, file) = create(dir, "animation.csv")?;
        write_rows(file, &grid.points)?;
        written.push(path);
    }
    if let View::Ready(geo) = &views.geo {
        let rows: Vec<GeoRow<'_>> = geo.stations.iter().map(GeoRow::from).collect();
        let (path, file) = create(dir, "stations.csv")?;
        write_rows(file, &rows)?;
        written.push(path);
    }
    if let View::Ready(series) = &views.critical {
        let (path, file) = create(dir, "critical.csv")?;
        write_rows(file, &series.segments)?;
        written.push(path);
    }

    for path in &written {
        debug!(path = %path.display(), "View exported");
    }
    info!(dir = %dir.display(), files = written.len(), "Export complete");
    Ok(written)
}

/// Flat CSV row for a station on the map; csv cannot serialize nested structs.
#[derive(Serialize)]
struct GeoRow<'a> {
    stop_name: &'a str,
    ordem: i64,
    carga_media: f64,
    boardings: f64,
    alightings: f64,
    lat: f64,
    lon: f64,
    linha: Option<&'a str>,
    lotacao_pct: f64,
    severity: Severity,
}

impl<'a> From<&'a StationLoad> for GeoRow<'a> {
    fn from(s: &'a StationLoad) -> Self {
        Self {
            stop_name: &s.station_name,
            ordem: s.order,
            carga_media: s.mean_load,
            boardings: s.boardings,
            alightings: s.alightings,
            lat: s.location.latitude,
            lon: s.location.longitude,
            linha: s.lines.as_deref(),
            lotacao_pct: s.occupancy_pct,
            severity: s.severity,
        }
    }
}
