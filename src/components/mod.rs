//! Reusable view components.

pub mod integration_graph;
