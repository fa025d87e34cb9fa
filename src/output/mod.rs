//! Output formatting for resource graphs.
//!
//! This module handles rendering a finished graph for humans and tools:
//! - [`csv`] - CSV node table
//! - [`terminal`] - Field formatting helpers

mod csv;
mod terminal;

pub use csv::{graph_print, graph_rows, GraphPrintRow};
pub use terminal::format_field;

use crate::models::ResourceGraph;

/// Pretty JSON rendering of the whole graph.
pub fn graph_json(graph: &ResourceGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(graph)
}
