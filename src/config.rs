use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::Path;

use crate::error::{BrtError, Result};

pub const DEFAULT_LOAD_SOURCE: &str = "05_carga_por_estacao_10_2025_UTIL.csv";
pub const DEFAULT_CRITICAL_SOURCE: &str = "06_trecho_critico_10_2025_UTIL.csv";
pub const DEFAULT_STATIONS_SOURCE: &str = "brt_stations.csv";

/// Dashboard settings, loadable from a JSON file. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Tokens searched for inside route-group names by the direction filter.
    #[serde(default = "DashboardConfig::default_direction_tokens")]
    pub direction_tokens: Vec<String>,
    #[serde(default = "DashboardConfig::default_capacity")]
    pub default_capacity: u32,
    #[serde(default = "DashboardConfig::default_capacity_min")]
    pub capacity_min: u32,
    #[serde(default = "DashboardConfig::default_capacity_max")]
    pub capacity_max: u32,
    /// Number of normalized datasets kept in memory
    #[serde(default = "DashboardConfig::default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub map: MapSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            direction_tokens: Self::default_direction_tokens(),
            default_capacity: Self::default_capacity(),
            capacity_min: Self::default_capacity_min(),
            capacity_max: Self::default_capacity_max(),
            cache_capacity: Self::default_cache_capacity(),
            animation: AnimationSettings::default(),
            map: MapSettings::default(),
        }
    }
}

impl DashboardConfig {
    fn default_direction_tokens() -> Vec<String> {
        vec!["ida".to_string(), "volta".to_string()]
    }
    fn default_capacity() -> u32 {
        90
    }
    fn default_capacity_min() -> u32 {
        50
    }
    fn default_capacity_max() -> u32 {
        200
    }
    fn default_cache_capacity() -> usize {
        4
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Checks an operator-supplied capacity against the configured bounds.
    pub fn check_capacity(&self, capacity: u32) -> Result<NonZeroU32> {
        if !(self.capacity_min..=self.capacity_max).contains(&capacity) {
            return Err(BrtError::InvalidSelection(format!(
                "capacity {} outside {}..={}",
                capacity, self.capacity_min, self.capacity_max
            )));
        }
        NonZeroU32::new(capacity)
            .ok_or_else(|| BrtError::InvalidSelection("capacity must be positive".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default = "AnimationSettings::default_frame_duration_ms")]
    pub frame_duration_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: Self::default_frame_duration_ms(),
        }
    }
}

impl AnimationSettings {
    fn default_frame_duration_ms() -> u64 {
        700
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default = "MapSettings::default_zoom_start")]
    pub zoom_start: u8,
    #[serde(default = "MapSettings::default_tiles")]
    pub tiles: String,
    /// Marker radius is `max(min_marker_radius, load / marker_load_divisor)`.
    #[serde(default = "MapSettings::default_min_marker_radius")]
    pub min_marker_radius: f64,
    #[serde(default = "MapSettings::default_marker_load_divisor")]
    pub marker_load_divisor: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom_start: Self::default_zoom_start(),
            tiles: Self::default_tiles(),
            min_marker_radius: Self::default_min_marker_radius(),
            marker_load_divisor: Self::default_marker_load_divisor(),
        }
    }
}

impl MapSettings {
    fn default_zoom_start() -> u8 {
        13
    }
    fn default_tiles() -> String {
        "CartoDB positron".to_string()
    }
    fn default_min_marker_radius() -> f64 {
        8.0
    }
    fn default_marker_load_divisor() -> f64 {
        15.0
    }
}
