//! Chart and map input schemas built from the derived views.
//!
//! These only reshape already-aggregated values; rendering is up to the
//! consumer of the JSON.

use serde::Serialize;

use crate::analyzers::animation::AnimationGrid;
use crate::analyzers::critical::CriticalSeries;
use crate::analyzers::geo::{GeoPoint, GeoView};
use crate::analyzers::occupancy::Severity;
use crate::analyzers::summary::Summary;
use crate::analyzers::types::{Matrix, View};
use crate::config::{AnimationSettings, DashboardConfig, MapSettings};
use crate::session::DashboardViews;

#[derive(Debug, Clone, Serialize)]
pub struct SurfaceChart {
    /// Station axis, in route order.
    pub x: Vec<String>,
    /// Time-bin axis.
    pub y: Vec<String>,
    pub z: Vec<Vec<f64>>,
}

pub fn surface_chart(matrix: &Matrix) -> SurfaceChart {
    SurfaceChart {
        x: matrix.columns.clone(),
        y: matrix.rows.clone(),
        z: matrix.values.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinePoint {
    pub x: i64,
    pub y: f64,
    pub series: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineFrame {
    pub name: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineAnimation {
    pub frames: Vec<LineFrame>,
    pub y_range: (f64, f64),
    pub frame_duration_ms: u64,
}

pub fn line_animation(grid: &AnimationGrid, settings: &AnimationSettings) -> LineAnimation {
    let frames = grid
        .time_bins
        .iter()
        .map(|bin| LineFrame {
            name: bin.label().to_string(),
            points: grid
                .frame(bin)
                .iter()
                .map(|p| LinePoint {
                    x: p.order,
                    y: p.onboard_load,
                    series: p.station_name.clone(),
                })
                .collect(),
        })
        .collect();

    LineAnimation {
        frames,
        y_range: grid.y_range(),
        frame_duration_ms: settings.frame_duration_ms,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub location: GeoPoint,
    pub radius: f64,
    pub color: &'static str,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    pub center: GeoPoint,
    pub zoom_start: u8,
    pub tiles: String,
    pub markers: Vec<MapMarker>,
}

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "red",
        Severity::Warning => "orange",
        Severity::Normal => "green",
    }
}

pub fn marker_radius(load: f64, settings: &MapSettings) -> f64 {
    (load / settings.marker_load_divisor).max(settings.min_marker_radius)
}

pub fn map_layer(view: &GeoView, settings: &MapSettings) -> MapLayer {
    let markers = view
        .stations
        .iter()
        .map(|s| MapMarker {
            location: s.location,
            radius: marker_radius(s.mean_load, settings),
            color: severity_color(s.severity),
            popup: format!(
                "<b>{}</b><br>Lines: {}<br>Load: {:.0}<br>Occupancy: {:.1}%",
                s.station_name,
                s.lines.as_deref().unwrap_or("-"),
                s.mean_load,
                s.occupancy_pct
            ),
        })
        .collect();

    MapLayer {
        center: view.center,
        zoom_start: settings.zoom_start,
        tiles: settings.tiles.clone(),
        markers,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub x: String,
    pub y: f64,
    pub color_group: String,
    pub trip_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub dash: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    pub reference_line: ReferenceLine,
}

pub fn critical_bar_chart(series: &CriticalSeries) -> BarChart {
    BarChart {
        bars: series
            .segments
            .iter()
            .map(|s| Bar {
                x: s.time_bin.label().to_string(),
                y: s.peak_load,
                color_group: s.peak_station.clone(),
                trip_count: s.trip_count,
            })
            .collect(),
        reference_line: ReferenceLine {
            y: series.capacity_line,
            dash: "dash",
            color: "red",
        },
    }
}

/// Every view in its chart input form.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardCharts {
    pub summary: Summary,
    pub surface: View<SurfaceChart>,
    pub animation: View<LineAnimation>,
    pub map: View<MapLayer>,
    pub heatmap: View<SurfaceChart>,
    pub critical: View<BarChart>,
}

pub fn dashboard_charts(views: &DashboardViews, config: &DashboardConfig) -> DashboardCharts {
    DashboardCharts {
        summary: views.summary.clone(),
        surface: views.surface.as_ref().map(surface_chart),
        animation: views
            .animation
            .as_ref()
            .map(|g| line_animation(g, &config.animation)),
        map: views.geo.as_ref().map(|g| map_layer(g, &config.map)),
        heatmap: views.heatmap.as_ref().map(surface_chart),
        critical: views.critical.as_ref().map(critical_bar_chart),
    }
}
