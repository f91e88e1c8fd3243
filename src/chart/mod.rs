//! Chart rendering.
//!
//! The contract with the aggregation engine is one-way: an ordered numeric
//! series comes in, a self-contained artifact string goes out. SVG is the
//! default artifact; text renders straight to the terminal and JSON exports
//! the series itself.

pub mod svg;
pub mod text;

use anyhow::Result;

use crate::models::ViewData;

/// Export a computed series as pretty-printed JSON.
pub fn to_json(data: &ViewData) -> Result<String> {
    match data {
        ViewData::Monthly(series) => serde_json::to_string_pretty(series).map_err(Into::into),
        ViewData::Stacked(series) => serde_json::to_string_pretty(series).map_err(Into::into),
        ViewData::Area(series) => serde_json::to_string_pretty(series).map_err(Into::into),
        ViewData::Scatter(series) => serde_json::to_string_pretty(series).map_err(Into::into),
    }
}
