//! Quest dependency graph and its exports.

mod export;
mod quest_graph;

pub use export::{EdgeExport, GraphExport, NodeExport};
pub use quest_graph::{DependencyKind, GraphAnalysis, QuestGraph};
