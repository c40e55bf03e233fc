use serde::Serialize;

/// Ratios strictly above this are critical.
pub const CRITICAL_PCT: f64 = 100.0;
/// Ratios strictly above this (and not critical) are a warning.
pub const WARNING_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Load as a percentage of vehicle capacity.
pub fn occupancy_pct(load: f64, capacity: f64) -> f64 {
    load / capacity * 100.0
}

/// Converts an occupancy percentage into a severity level.
///
/// | Range       | Severity |
/// |-------------|----------|
/// | > 100       | Critical |
/// | > 80        | Warning  |
/// | otherwise   | Normal   |
pub fn classify(pct: f64) -> Severity {
    match pct {
        p if p > CRITICAL_PCT => Severity::Critical,
        p if p > WARNING_PCT => Severity::Warning,
        _ => Severity::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(150.0), Severity::Critical);
        assert_eq!(classify(100.01), Severity::Critical);
        assert_eq!(classify(100.0), Severity::Warning);
        assert_eq!(classify(80.01), Severity::Warning);
        assert_eq!(classify(80.0), Severity::Normal);
        assert_eq!(classify(0.0), Severity::Normal);
    }

    #[test]
    fn test_occupancy_pct() {
        assert_eq!(occupancy_pct(90.0, 90.0), 100.0);
        assert_eq!(occupancy_pct(45.0, 90.0), 50.0);
        assert!(occupancy_pct(100.0, 90.0) > CRITICAL_PCT);
    }
}
