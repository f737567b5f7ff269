//! Graph export: Graphviz DOT for humans, serde structs for machines.

use serde::{Deserialize, Serialize};

use crate::ids::QuestId;

use super::quest_graph::{DependencyKind, QuestGraph};

/// Serializable snapshot of a quest graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExport {
    pub id: QuestId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeExport {
    pub from: QuestId,
    pub to: QuestId,
    pub kind: DependencyKind,
}

impl QuestGraph {
    /// Snapshot the graph for serialization.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self
                .quest_ids()
                .map(|id| NodeExport {
                    id,
                    title: self.title_of(id).unwrap_or_default().to_string(),
                })
                .collect(),
            edges: self
                .dependencies()
                .map(|(from, to, kind)| EdgeExport { from, to, kind })
                .collect(),
        }
    }

    /// Render the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph quests {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n");

        for id in self.quest_ids() {
            let title = self.title_of(id).unwrap_or_default().replace('"', "\\\"");
            out.push_str(&format!("    \"{}\" [label=\"{}\"];\n", id, title));
        }
        for (from, to, kind) in self.dependencies() {
            let attrs = match kind {
                DependencyKind::Prerequisite => "",
                DependencyKind::Exclusive => " [style=dashed, color=red, dir=both]",
                DependencyKind::Narrative => " [style=dotted, color=gray]",
            };
            out.push_str(&format!("    \"{}\" -> \"{}\"{};\n", from, to, attrs));
        }

        out.push_str("}\n");
        out
    }
}
