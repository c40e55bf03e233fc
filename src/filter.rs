//! Route-group, date and direction predicates shared by both time-series tables.

use chrono::NaiveDate;
use serde::Serialize;
use std::num::NonZeroU32;

use crate::error::{BrtError, Result};
use crate::loader::parse_date;
use crate::model::{CriticalSegmentRecord, LoadRecord};

/// Either every value or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T> Choice<T> {
    pub fn as_only(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl Choice<String> {
    /// Treats `None`, an empty value and `"all"` (any case) as [`Choice::All`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Choice::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Choice::All,
            Some(v) => Choice::Only(v.to_string()),
        }
    }
}

/// The operator's current filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub route_group: Choice<String>,
    pub date: Choice<NaiveDate>,
    /// Matched as a substring of the route-group name, e.g. "ida" in "12-ida".
    pub direction: Choice<String>,
    /// Occupancy denominator; never alters the data itself.
    pub capacity: NonZeroU32,
}

impl FilterSelection {
    pub const DEFAULT_CAPACITY: u32 = 90;

    pub fn all(capacity: NonZeroU32) -> Self {
        Self {
            route_group: Choice::All,
            date: Choice::All,
            direction: Choice::All,
            capacity,
        }
    }

    /// Builds a selection from operator input.
    ///
    /// `date` accepts `dd/mm/YYYY` or `YYYY-MM-DD`. `direction` must be one
    /// of `direction_tokens` unless it selects all directions.
    pub fn from_input(
        route_group: Option<&str>,
        date: Option<&str>,
        direction: Option<&str>,
        capacity: u32,
        direction_tokens: &[String],
    ) -> Result<Self> {
        let capacity = NonZeroU32::new(capacity)
            .ok_or_else(|| BrtError::InvalidSelection("capacity must be positive".into()))?;

        let date = match Choice::parse(date) {
            Choice::All => Choice::All,
            Choice::Only(value) => Choice::Only(parse_date(&value).ok_or_else(|| {
                BrtError::InvalidSelection(format!("unparsable date '{value}'"))
            })?),
        };

        let direction = Choice::parse(direction);
        if let Some(token) = direction.as_only() {
            if !direction_tokens.iter().any(|t| t == token) {
                return Err(BrtError::InvalidSelection(format!(
                    "unknown direction '{}', expected one of: {}",
                    token,
                    direction_tokens.join(", ")
                )));
            }
        }

        Ok(Self {
            route_group: Choice::parse(route_group),
            date,
            direction,
            capacity,
        })
    }

    pub fn capacity(&self) -> f64 {
        f64::from(self.capacity.get())
    }

    pub fn matches<R: Filterable>(&self, row: &R) -> bool {
        let group = self.route_group.as_only();
        let date = self.date.as_only();
        let direction = self.direction.as_only();

        group.is_none_or(|g| row.route_group() == g)
            && date.is_none_or(|d| row.date() == *d)
            && direction.is_none_or(|t| row.route_group().contains(t.as_str()))
    }
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::all(NonZeroU32::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroU32::MIN))
    }
}

/// Rows that carry the fields the filters look at.
pub trait Filterable {
    fn route_group(&self) -> &str;
    fn date(&self) -> NaiveDate;
}

impl Filterable for LoadRecord {
    fn route_group(&self) -> &str {
        &self.route_group
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Filterable for CriticalSegmentRecord {
    fn route_group(&self) -> &str {
        &self.route_group
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Returns the rows of `table` that match `selection`, in input order.
pub fn apply_filters<R: Filterable + Clone>(table: &[R], selection: &FilterSelection) -> Vec<R> {
    table
        .iter()
        .filter(|row| selection.matches(*row))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeBinDomain;

    fn record(group: &str, day: u32) -> LoadRecord {
        let domain = TimeBinDomain::from_labels(["08:00"]);
        LoadRecord {
            route_group: group.into(),
            date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            time_bin: domain.get("08:00").unwrap(),
            station_name: "Lapa".into(),
            station_sequence_order: 1,
            boardings: 1.0,
            alightings: 0.0,
            onboard_load: 10.0,
            trip_count: 1,
        }
    }

    fn tokens() -> Vec<String> {
        vec!["ida".into(), "volta".into()]
    }

    fn table() -> Vec<LoadRecord> {
        vec![
            record("B1-ida", 1),
            record("B1-volta", 1),
            record("B2-ida", 2),
            record("B2-volta", 3),
        ]
    }

    #[test]
    fn test_all_is_identity() {
        let rows = table();
        assert_eq!(apply_filters(&rows, &FilterSelection::default()), rows);
    }

    #[test]
    fn test_route_group_is_exact() {
        let mut selection = FilterSelection::default();
        selection.route_group = Choice::Only("B1".into());
        assert!(apply_filters(&table(), &selection).is_empty());

        selection.route_group = Choice::Only("B1-ida".into());
        assert_eq!(apply_filters(&table(), &selection).len(), 1);
    }

    #[test]
    fn test_date_filter() {
        let selection =
            FilterSelection::from_input(None, Some("01/10/2025"), None, 90, &tokens()).unwrap();
        let rows = apply_filters(&table(), &selection);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.date.to_string() == "2025-10-01"));
    }

    #[test]
    fn test_direction_is_substring_of_group() {
        let selection =
            FilterSelection::from_input(Some("all"), None, Some("volta"), 90, &tokens()).unwrap();
        let rows = apply_filters(&table(), &selection);
        let groups: Vec<&str> = rows.iter().map(|r| r.route_group.as_str()).collect();
        assert_eq!(groups, vec!["B1-volta", "B2-volta"]);
    }

    #[test]
    fn test_direction_is_case_sensitive() {
        let rows = vec![record("B1-IDA", 1)];
        let selection =
            FilterSelection::from_input(None, None, Some("ida"), 90, &tokens()).unwrap();
        assert!(apply_filters(&rows, &selection).is_empty());
    }

    #[test]
    fn test_combined_filters() {
        let selection = FilterSelection::from_input(
            Some("B2-ida"),
            Some("2025-10-02"),
            Some("ida"),
            90,
            &tokens(),
        )
        .unwrap();
        assert_eq!(apply_filters(&table(), &selection).len(), 1);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let rows = table();
        let mut selection = FilterSelection::default();
        selection.route_group = Choice::Only("none".into());
        let filtered = apply_filters(&rows, &selection);
        assert!(filtered.is_empty());
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_invalid_input() {
        assert!(FilterSelection::from_input(None, None, None, 0, &tokens()).is_err());
        assert!(FilterSelection::from_input(None, Some("32/13/2025"), None, 90, &tokens()).is_err());
        assert!(FilterSelection::from_input(None, None, Some("norte"), 90, &tokens()).is_err());
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse(None), Choice::All);
        assert_eq!(Choice::parse(Some("All")), Choice::All);
        assert_eq!(Choice::parse(Some(" ")), Choice::All);
        assert_eq!(Choice::parse(Some("B1")), Choice::Only("B1".to_string()));
    }
}
