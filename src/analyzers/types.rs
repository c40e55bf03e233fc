//! Data types shared by the derived views.

use serde::Serialize;

/// Why a view has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The filters left zero rows.
    EmptyFilterResult,
    /// Rows remain, but every derived value is zero or absent.
    NoUsableData,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::EmptyFilterResult => "No data for the selected filters.",
            EmptyReason::NoUsableData => "No load data found. Check the filters.",
        }
    }
}

/// Result of one aggregation: either the view or an explicit empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum View<T> {
    Ready(T),
    Empty(EmptyReason),
}

impl<T> View<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            View::Ready(value) => Some(value),
            View::Empty(_) => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            View::Ready(value) => Some(value),
            View::Empty(_) => None,
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            View::Ready(_) => None,
            View::Empty(reason) => Some(*reason),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, View::Ready(_))
    }

    pub fn as_ref(&self) -> View<&T> {
        match self {
            View::Ready(value) => View::Ready(value),
            View::Empty(reason) => View::Empty(*reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> View<U> {
        match self {
            View::Ready(value) => View::Ready(f(value)),
            View::Empty(reason) => View::Empty(reason),
        }
    }
}

/// A dense labelled matrix; `values[r][c]` belongs to `rows[r]` and `columns[c]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.values[r][c])
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_with_status() {
        let ready: View<u32> = View::Ready(3);
        assert_eq!(
            serde_json::to_string(&ready).unwrap(),
            r#"{"status":"ready","data":3}"#
        );

        let empty: View<u32> = View::Empty(EmptyReason::NoUsableData);
        assert_eq!(
            serde_json::to_string(&empty).unwrap(),
            r#"{"status":"empty","data":"no_usable_data"}"#
        );
    }

    #[test]
    fn test_empty_messages_differ() {
        assert_ne!(
            EmptyReason::EmptyFilterResult.message(),
            EmptyReason::NoUsableData.message()
        );
    }

    #[test]
    fn test_matrix_lookup() {
        let m = Matrix {
            rows: vec!["A".into(), "B".into()],
            columns: vec!["08:00".into()],
            values: vec![vec![50.0], vec![100.0]],
        };
        assert_eq!(m.get("B", "08:00"), Some(100.0));
        assert_eq!(m.get("C", "08:00"), None);
        assert_eq!(m.shape(), (2, 1));
    }
}
