//! Per-operator state: a shared dataset plus this session's own selection.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::analyzers::animation::{AnimationGrid, animation_grid};
use crate::analyzers::critical::{CriticalSeries, critical_series};
use crate::analyzers::geo::{GeoView, geo_view};
use crate::analyzers::heatmap::heatmap_matrix;
use crate::analyzers::summary::{Summary, summarize};
use crate::analyzers::surface::surface_matrix;
use crate::analyzers::types::{Matrix, View};
use crate::config::DashboardConfig;
use crate::filter::{FilterSelection, apply_filters};
use crate::model::{CriticalSegmentRecord, Dataset, LoadRecord};

/// The two time-series tables after filtering.
#[derive(Debug, Clone)]
pub struct FilteredTables {
    pub load: Vec<LoadRecord>,
    pub critical: Vec<CriticalSegmentRecord>,
}

/// Every derived view for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardViews {
    pub selection: FilterSelection,
    pub summary: Summary,
    pub surface: View<Matrix>,
    pub animation: View<AnimationGrid>,
    pub geo: View<GeoView>,
    pub heatmap: View<Matrix>,
    pub critical: View<CriticalSeries>,
}

/// Values the operator can pick from.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub route_groups: Vec<String>,
    /// Formatted `dd/mm/YYYY`.
    pub dates: Vec<String>,
    pub directions: Vec<String>,
    pub capacity_min: u32,
    pub capacity_max: u32,
    pub default_capacity: u32,
}

pub struct Session {
    dataset: Arc<Dataset>,
    selection: FilterSelection,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, selection: FilterSelection) -> Self {
        Self { dataset, selection }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Replaces the selection; views computed afterwards use the new one.
    pub fn select(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    pub fn filtered(&self) -> FilteredTables {
        let load = apply_filters(&self.dataset.load, &self.selection);
        let critical = apply_filters(&self.dataset.critical, &self.selection);
        debug!(
            load_rows = load.len(),
            critical_rows = critical.len(),
            "Filters applied"
        );
        FilteredTables { load, critical }
    }

    pub fn views(&self) -> DashboardViews {
        let tables = self.filtered();
        let capacity = self.selection.capacity();

        DashboardViews {
            selection: self.selection.clone(),
            summary: summarize(&tables.load, &tables.critical, capacity),
            surface: surface_matrix(&self.dataset.time_bins, &tables.load),
            animation: animation_grid(&tables.load),
            geo: geo_view(&tables.load, &self.dataset.stations, capacity),
            heatmap: heatmap_matrix(&tables.load),
            critical: critical_series(&tables.critical, capacity),
        }
    }

    pub fn filter_options(&self, config: &DashboardConfig) -> FilterOptions {
        FilterOptions {
            route_groups: self.dataset.route_groups(),
            dates: self
                .dataset
                .dates()
                .iter()
                .map(|d| d.format("%d/%m/%Y").to_string())
                .collect(),
            directions: config.direction_tokens.clone(),
            capacity_min: config.capacity_min,
            capacity_max: config.capacity_max,
            default_capacity: config.default_capacity,
        }
    }
}
