//! Quest dependency graph.
//!
//! An arena-backed adjacency graph keyed by opaque `QuestId`s. Nodes live in
//! a `Vec` and edges reference arena indices; the indices never escape the
//! module, so callers only ever see quest IDs.
//!
//! Edge semantics:
//! - `Prerequisite`: the source must be completed before the target unlocks.
//! - `Exclusive`: completing either side locks the other out.
//! - `Narrative`: a story link with no gating effect.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::QuestId;

/// How one quest depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    Prerequisite,
    Exclusive,
    Narrative,
}

/// Arena index. Never exposed outside the graph module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeIx(usize);

#[derive(Debug, Clone)]
struct Node {
    quest_id: QuestId,
    title: String,
    /// Outgoing edges
    edges: Vec<Edge>,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: NodeIx,
    kind: DependencyKind,
}

/// Dependency graph over registered quests.
#[derive(Debug, Clone, Default)]
pub struct QuestGraph {
    nodes: Vec<Node>,
    index: HashMap<QuestId, NodeIx>,
}

impl QuestGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quest as a graph node.
    pub fn add_quest(
        &mut self,
        quest_id: QuestId,
        title: impl Into<String>,
    ) -> Result<(), DomainError> {
        if self.index.contains_key(&quest_id) {
            return Err(DomainError::constraint(format!(
                "Quest {} already registered",
                quest_id
            )));
        }
        let ix = NodeIx(self.nodes.len());
        self.nodes.push(Node {
            quest_id,
            title: title.into(),
            edges: Vec::new(),
        });
        self.index.insert(quest_id, ix);
        Ok(())
    }

    pub fn contains(&self, quest_id: QuestId) -> bool {
        self.index.contains_key(&quest_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn quest_ids(&self) -> impl Iterator<Item = QuestId> + '_ {
        self.nodes.iter().map(|n| n.quest_id)
    }

    pub fn title_of(&self, quest_id: QuestId) -> Option<&str> {
        self.ix_of(quest_id)
            .map(|ix| self.nodes[ix.0].title.as_str())
    }

    fn ix_of(&self, quest_id: QuestId) -> Option<NodeIx> {
        self.index.get(&quest_id).copied()
    }

    fn require_ix(&self, quest_id: QuestId) -> Result<NodeIx, DomainError> {
        self.ix_of(quest_id)
            .ok_or(DomainError::UnknownQuest(quest_id))
    }

    /// Add a dependency edge. Rejects self-edges, unknown endpoints, and
    /// duplicate (from, to, kind) triples.
    pub fn add_dependency(
        &mut self,
        from: QuestId,
        to: QuestId,
        kind: DependencyKind,
    ) -> Result<(), DomainError> {
        if from == to {
            return Err(DomainError::constraint(
                "A quest cannot depend on itself".to_string(),
            ));
        }
        let from_ix = self.require_ix(from)?;
        let to_ix = self.require_ix(to)?;

        let duplicate = self.nodes[from_ix.0]
            .edges
            .iter()
            .any(|e| e.to == to_ix && e.kind == kind);
        if duplicate {
            return Err(DomainError::constraint(format!(
                "Dependency {} -> {} ({:?}) already exists",
                from, to, kind
            )));
        }

        self.nodes[from_ix.0].edges.push(Edge { to: to_ix, kind });
        Ok(())
    }

    /// All dependency edges as (from, to, kind) triples.
    pub fn dependencies(&self) -> impl Iterator<Item = (QuestId, QuestId, DependencyKind)> + '_ {
        self.nodes.iter().flat_map(move |node| {
            node.edges
                .iter()
                .map(move |e| (node.quest_id, self.nodes[e.to.0].quest_id, e.kind))
        })
    }

    /// Quests that must be completed before the given quest unlocks.
    pub fn prerequisites_of(&self, quest_id: QuestId) -> Result<Vec<QuestId>, DomainError> {
        let target = self.require_ix(quest_id)?;
        Ok(self
            .nodes
            .iter()
            .filter(|node| {
                node.edges
                    .iter()
                    .any(|e| e.kind == DependencyKind::Prerequisite && e.to == target)
            })
            .map(|node| node.quest_id)
            .collect())
    }

    /// Quests the given quest unlocks (its prerequisite children).
    pub fn unlocks(&self, quest_id: QuestId) -> Result<Vec<QuestId>, DomainError> {
        let ix = self.require_ix(quest_id)?;
        Ok(self.nodes[ix.0]
            .edges
            .iter()
            .filter(|e| e.kind == DependencyKind::Prerequisite)
            .map(|e| self.nodes[e.to.0].quest_id)
            .collect())
    }

    /// Quests locked out when the given quest completes. Exclusive edges
    /// cut both ways regardless of direction.
    pub fn excluded_by(&self, quest_id: QuestId) -> Result<Vec<QuestId>, DomainError> {
        let ix = self.require_ix(quest_id)?;
        let mut partners: Vec<QuestId> = self.nodes[ix.0]
            .edges
            .iter()
            .filter(|e| e.kind == DependencyKind::Exclusive)
            .map(|e| self.nodes[e.to.0].quest_id)
            .collect();
        for node in &self.nodes {
            if node
                .edges
                .iter()
                .any(|e| e.kind == DependencyKind::Exclusive && e.to == ix)
            {
                partners.push(node.quest_id);
            }
        }
        partners.sort();
        partners.dedup();
        Ok(partners)
    }

    /// Whether a quest's gates are open given the set of completed quests:
    /// every prerequisite is completed and no exclusive partner is.
    pub fn is_available(
        &self,
        quest_id: QuestId,
        completed: &HashSet<QuestId>,
    ) -> Result<bool, DomainError> {
        if completed.contains(&quest_id) {
            return Ok(false);
        }
        let prerequisites = self.prerequisites_of(quest_id)?;
        if !prerequisites.iter().all(|p| completed.contains(p)) {
            return Ok(false);
        }
        let excluded = self.excluded_by(quest_id)?;
        Ok(!excluded.iter().any(|e| completed.contains(e)))
    }

    /// All quests currently available given the completed set.
    pub fn available(&self, completed: &HashSet<QuestId>) -> Vec<QuestId> {
        self.nodes
            .iter()
            .filter(|node| {
                // Every node id comes from the arena, so the lookup cannot fail
                self.is_available(node.quest_id, completed)
                    .unwrap_or(false)
            })
            .map(|node| node.quest_id)
            .collect()
    }

    /// Find cycles in the prerequisite subgraph. Exclusive and narrative
    /// edges never gate progression, so they are ignored here.
    pub fn cycles(&self) -> Vec<Vec<QuestId>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut in_stack = vec![false; self.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..self.nodes.len() {
            if !visited[start] {
                let mut path = Vec::new();
                self.cycle_dfs(NodeIx(start), &mut visited, &mut in_stack, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn cycle_dfs(
        &self,
        node: NodeIx,
        visited: &mut [bool],
        in_stack: &mut [bool],
        path: &mut Vec<NodeIx>,
        cycles: &mut Vec<Vec<QuestId>>,
    ) {
        if in_stack[node.0] {
            if let Some(start) = path.iter().position(|&ix| ix == node) {
                let mut cycle: Vec<QuestId> =
                    path[start..].iter().map(|ix| self.nodes[ix.0].quest_id).collect();
                cycle.push(self.nodes[node.0].quest_id);
                cycles.push(cycle);
            }
            return;
        }
        if visited[node.0] {
            return;
        }

        visited[node.0] = true;
        in_stack[node.0] = true;
        path.push(node);

        let targets: Vec<NodeIx> = self.nodes[node.0]
            .edges
            .iter()
            .filter(|e| e.kind == DependencyKind::Prerequisite)
            .map(|e| e.to)
            .collect();
        for next in targets {
            self.cycle_dfs(next, visited, in_stack, path, cycles);
        }

        path.pop();
        in_stack[node.0] = false;
    }

    /// Fail with the first cycle found, if any.
    pub fn ensure_acyclic(&self) -> Result<(), DomainError> {
        match self.cycles().into_iter().next() {
            Some(cycle) => Err(DomainError::DependencyCycle(cycle)),
            None => Ok(()),
        }
    }
}

/// Structural analysis of a quest graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAnalysis {
    pub total_quests: usize,
    pub total_dependencies: usize,
    /// Quests with no edges in either direction
    pub orphaned: Vec<QuestId>,
    pub cycles: Vec<Vec<QuestId>>,
    /// Quests by connection count, most connected first (top five)
    pub most_connected: Vec<(QuestId, usize)>,
    /// Linear prerequisite runs of two or more quests
    pub chains: Vec<Vec<QuestId>>,
    /// False when cycles exist
    pub healthy: bool,
}

impl QuestGraph {
    /// Analyze the graph for structural issues and narrative shape.
    pub fn analyze(&self) -> GraphAnalysis {
        let cycles = self.cycles();

        let mut degree: HashMap<QuestId, usize> = HashMap::new();
        for node in &self.nodes {
            degree.entry(node.quest_id).or_insert(0);
        }
        for (from, to, _) in self.dependencies() {
            *degree.entry(from).or_insert(0) += 1;
            *degree.entry(to).or_insert(0) += 1;
        }

        let orphaned: Vec<QuestId> = self
            .nodes
            .iter()
            .map(|n| n.quest_id)
            .filter(|id| degree.get(id).copied().unwrap_or(0) == 0)
            .collect();

        let mut most_connected: Vec<(QuestId, usize)> = degree
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&id, &count)| (id, count))
            .collect();
        most_connected.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        most_connected.truncate(5);

        GraphAnalysis {
            total_quests: self.nodes.len(),
            total_dependencies: self.dependencies().count(),
            orphaned,
            healthy: cycles.is_empty(),
            chains: self.narrative_chains(),
            cycles,
            most_connected,
        }
    }

    /// Linear prerequisite runs: start from quests with no prerequisite
    /// parents and follow while exactly one child continues the line.
    fn narrative_chains(&self) -> Vec<Vec<QuestId>> {
        let mut has_parent = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for edge in &node.edges {
                if edge.kind == DependencyKind::Prerequisite {
                    has_parent[edge.to.0] = true;
                }
            }
        }

        let mut chains = Vec::new();
        for (start, node) in self.nodes.iter().enumerate() {
            if has_parent[start] {
                continue;
            }
            let mut chain = vec![node.quest_id];
            let mut seen: HashSet<NodeIx> = HashSet::from([NodeIx(start)]);
            let mut current = NodeIx(start);
            loop {
                let successors: Vec<NodeIx> = self.nodes[current.0]
                    .edges
                    .iter()
                    .filter(|e| e.kind == DependencyKind::Prerequisite)
                    .map(|e| e.to)
                    .collect();
                match successors.as_slice() {
                    [next] if !seen.contains(next) => {
                        seen.insert(*next);
                        chain.push(self.nodes[next.0].quest_id);
                        current = *next;
                    }
                    _ => break,
                }
            }
            if chain.len() >= 2 {
                chains.push(chain);
            }
        }
        chains
    }
}
