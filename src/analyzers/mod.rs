//! Aggregation and reshaping of the filtered tables.
//!
//! Each submodule builds one derived view. Every view checks for an empty
//! input first and reports it as [`types::EmptyReason::EmptyFilterResult`]
//! instead of aggregating over zero rows.

pub mod animation;
pub mod critical;
pub mod geo;
pub mod heatmap;
pub mod occupancy;
pub mod summary;
pub mod surface;
pub mod types;
pub mod utility;
