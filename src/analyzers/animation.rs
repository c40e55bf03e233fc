//! Dense (time bin × sequence order) grid of mean load for the animated line chart.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::analyzers::types::{EmptyReason, View};
use crate::analyzers::utility::{MeanAccumulator, round1};
use crate::model::{LoadRecord, TimeBin};

/// Headroom above the largest load for the chart's y axis.
const Y_RANGE_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationPoint {
    pub time_bin: TimeBin,
    pub order: i64,
    pub station_name: String,
    pub onboard_load: f64,
}

/// One point per (time bin, order) pair, sorted by time bin then order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationGrid {
    pub time_bins: Vec<TimeBin>,
    pub orders: Vec<i64>,
    pub points: Vec<AnimationPoint>,
    pub max_load: f64,
}

impl AnimationGrid {
    /// The points of one animation frame, in route order.
    pub fn frame(&self, time_bin: &TimeBin) -> &[AnimationPoint] {
        match self.time_bins.binary_search(time_bin) {
            Ok(i) => {
                let width = self.orders.len();
                &self.points[i * width..(i + 1) * width]
            }
            Err(_) => &[],
        }
    }

    pub fn y_range(&self) -> (f64, f64) {
        (0.0, self.max_load * Y_RANGE_HEADROOM)
    }
}

fn placeholder_name(order: i64) -> String {
    format!("Order {order}")
}

/// Builds the grid from every distinct time bin and order in `load`.
///
/// Each cell holds the mean load of its (time bin, order) rounded to one
/// decimal, or 0 when no row supplies it. A grid whose largest value is 0
/// reports [`EmptyReason::NoUsableData`].
pub fn animation_grid(load: &[LoadRecord]) -> View<AnimationGrid> {
    if load.is_empty() {
        return View::Empty(EmptyReason::EmptyFilterResult);
    }

    let mut names: HashMap<i64, &str> = HashMap::new();
    let mut means: HashMap<(&TimeBin, i64), MeanAccumulator> = HashMap::new();
    let mut bins: BTreeSet<&TimeBin> = BTreeSet::new();
    let mut orders: BTreeSet<i64> = BTreeSet::new();
    for row in load {
        let order = row.station_sequence_order;
        names.entry(order).or_insert(&row.station_name);
        bins.insert(&row.time_bin);
        orders.insert(order);
        means
            .entry((&row.time_bin, order))
            .or_default()
            .push(row.onboard_load);
    }

    let mut points = Vec::with_capacity(bins.len() * orders.len());
    for bin in &bins {
        for &order in &orders {
            let station_name = names
                .get(&order)
                .map_or_else(|| placeholder_name(order), |name| name.to_string());
            let onboard_load = means
                .get(&(*bin, order))
                .map_or(0.0, |acc| round1(acc.mean()));
            points.push(AnimationPoint {
                time_bin: (*bin).clone(),
                order,
                station_name,
                onboard_load,
            });
        }
    }

    let max_load = points.iter().map(|p| p.onboard_load).fold(0.0, f64::max);
    if max_load == 0.0 {
        return View::Empty(EmptyReason::NoUsableData);
    }

    View::Ready(AnimationGrid {
        time_bins: bins.into_iter().cloned().collect(),
        orders: orders.into_iter().collect(),
        points,
        max_load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeBinDomain;
    use chrono::NaiveDate;

    fn domain() -> TimeBinDomain {
        TimeBinDomain::from_labels(["08:00", "08:15", "08:30"])
    }

    fn row(bin: &str, station: &str, order: i64, load: f64) -> LoadRecord {
        LoadRecord {
            route_group: "B1-ida".into(),
            date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            time_bin: domain().get(bin).unwrap(),
            station_name: station.into(),
            station_sequence_order: order,
            boardings: 0.0,
            alightings: 0.0,
            onboard_load: load,
            trip_count: 1,
        }
    }

    #[test]
    fn test_grid_is_dense() {
        // 3 bins × 3 orders, only 3 cells supplied
        let rows = vec![
            row("08:00", "A", 1, 10.0),
            row("08:15", "B", 2, 20.0),
            row("08:30", "C", 3, 30.0),
        ];
        let grid = animation_grid(&rows).into_ready().unwrap();
        assert_eq!(grid.points.len(), 9);
        assert_eq!(grid.time_bins.len() * grid.orders.len(), grid.points.len());

        let frame = grid.frame(&domain().get("08:00").unwrap());
        let loads: Vec<f64> = frame.iter().map(|p| p.onboard_load).collect();
        assert_eq!(loads, vec![10.0, 0.0, 0.0]);
        let names: Vec<&str> = frame.iter().map(|p| p.station_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_points_sorted_by_bin_then_order() {
        let rows = vec![
            row("08:15", "B", 2, 5.0),
            row("08:00", "A", 1, 5.0),
        ];
        let grid = animation_grid(&rows).into_ready().unwrap();
        let keys: Vec<(&str, i64)> = grid
            .points
            .iter()
            .map(|p| (p.time_bin.label(), p.order))
            .collect();
        assert_eq!(
            keys,
            vec![("08:00", 1), ("08:00", 2), ("08:15", 1), ("08:15", 2)]
        );
    }

    #[test]
    fn test_means_are_rounded() {
        let rows = vec![
            row("08:00", "A", 1, 10.0),
            row("08:00", "A", 1, 10.0),
            row("08:00", "A", 1, 11.0),
        ];
        let grid = animation_grid(&rows).into_ready().unwrap();
        assert_eq!(grid.points[0].onboard_load, 10.3);
        assert_eq!(grid.max_load, 10.3);
    }

    #[test]
    fn test_all_zero_load_is_no_usable_data() {
        let rows = vec![row("08:00", "A", 1, 0.0), row("08:15", "B", 2, 0.0)];
        assert_eq!(
            animation_grid(&rows),
            View::Empty(EmptyReason::NoUsableData)
        );
    }

    #[test]
    fn test_no_rows_is_empty_filter_result() {
        assert_eq!(
            animation_grid(&[]),
            View::Empty(EmptyReason::EmptyFilterResult)
        );
    }

    #[test]
    fn test_y_range_has_headroom() {
        let grid = animation_grid(&[row("08:00", "A", 1, 50.0)])
            .into_ready()
            .unwrap();
        assert_eq!(grid.y_range(), (0.0, 60.0));
    }

    #[test]
    fn test_placeholder_name() {
        assert_eq!(placeholder_name(7), "Order 7");
    }
}
