//! Directed multigraph used for district topology planning.
//!
//! Nodes are string ids with a type tag and an opaque data bag; edges are
//! directed, may be parallel, and may self-loop. Reachability queries treat
//! the graph as simple. An explicit insertion-order list backs every
//! traversal so identical build sequences always observe identical
//! iteration order.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum GraphError {
    DuplicateNode(String),
    MissingNode(String),
}

fn default_node_type() -> String {
    "room".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub data: Value,
}

/// Lossless wire form: `{ nodes: [{id, type, data}], edges: [{from, to, data}] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Clone, Debug, Default)]
pub struct LayoutGraph {
    nodes: HashMap<String, GraphNode>,
    edges: HashMap<String, Vec<GraphEdge>>,
    insertion_order: Vec<String>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails if the id is already present.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        node_type: impl Into<String>,
        data: Value,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.edges.insert(id.clone(), Vec::new());
        self.insertion_order.push(id.clone());
        self.nodes
            .insert(id.clone(), GraphNode { id, node_type: node_type.into(), data });
        Ok(())
    }

    /// Add a directed edge. Parallel edges and self-loops are allowed; both
    /// endpoints must exist.
    pub fn add_edge(&mut self, from: &str, to: &str, data: Value) -> Result<(), GraphError> {
        if !self.nodes.contains_key(from) {
            return Err(GraphError::MissingNode(from.to_string()));
        }
        if !self.nodes.contains_key(to) {
            return Err(GraphError::MissingNode(to.to_string()));
        }
        let edge = GraphEdge { from: from.to_string(), to: to.to_string(), data };
        self.edges.get_mut(from).expect("edge list exists for every node").push(edge);
        Ok(())
    }

    /// Remove a node, its outgoing edges, and every edge targeting it.
    /// Returns whether the node existed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_none() {
            return false;
        }
        self.edges.remove(id);
        self.insertion_order.retain(|existing| existing != id);
        for edge_list in self.edges.values_mut() {
            edge_list.retain(|edge| edge.to != id);
        }
        true
    }

    /// Remove every edge between the ordered pair. Returns whether any
    /// edge was removed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let Some(edge_list) = self.edges.get_mut(from) else {
            return false;
        };
        let initial_len = edge_list.len();
        edge_list.retain(|edge| edge.to != to);
        edge_list.len() != initial_len
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Outgoing edges of a node; empty for unknown ids.
    pub fn edges_from(&self, id: &str) -> &[GraphEdge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing neighbor ids, in edge insertion order (duplicates kept).
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges_from(id).iter().map(|edge| edge.to.as_str()).collect()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.insertion_order
            .iter()
            .map(|id| self.nodes.get(id).expect("ordered id always resolves"))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.insertion_order.iter().map(String::as_str)
    }

    pub fn nodes_by_type(&self, node_type: &str) -> Vec<&GraphNode> {
        self.nodes().filter(|node| node.node_type == node_type).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Whether `to` is reachable from `from`. Trivially true when the two
    /// ids are equal (and present); false when either id is unknown.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if !self.contains_node(from) || !self.contains_node(to) {
            return false;
        }
        if from == to {
            return true;
        }

        let mut visited = HashSet::new();
        let mut open = VecDeque::from([from]);
        while let Some(current) = open.pop_front() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for edge in self.edges_from(current) {
                if !visited.contains(edge.to.as_str()) {
                    open.push_back(edge.to.as_str());
                }
            }
        }
        false
    }

    /// Shortest path as a node-id sequence, or `None` when unreachable.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        if !self.contains_node(from) || !self.contains_node(to) {
            return None;
        }
        if from == to {
            return Some(vec![from.to_string()]);
        }

        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut open = VecDeque::from([from]);
        while let Some(current) = open.pop_front() {
            for edge in self.edges_from(current) {
                let next = edge.to.as_str();
                if next == from || parents.contains_key(next) {
                    continue;
                }
                parents.insert(next, current);
                if next == to {
                    let mut path = vec![next.to_string()];
                    let mut cursor = current;
                    while cursor != from {
                        path.push(cursor.to_string());
                        cursor = parents[cursor];
                    }
                    path.push(from.to_string());
                    path.reverse();
                    return Some(path);
                }
                open.push_back(next);
            }
        }
        None
    }

    /// Bounded, best-effort path enumeration.
    ///
    /// Depth-first search that stops after `max_paths` results. Not an
    /// exhaustive simple-path enumeration: once the cap is hit, whole
    /// branches are abandoned, so reconverging branches may go unreported.
    pub fn all_paths(&self, from: &str, to: &str, max_paths: usize) -> Vec<Vec<String>> {
        if !self.contains_node(from) || !self.contains_node(to) {
            return Vec::new();
        }

        let mut paths = Vec::new();
        let mut on_path = HashSet::new();
        let mut path = vec![from.to_string()];
        self.all_paths_walk(from, to, max_paths, &mut on_path, &mut path, &mut paths);
        paths
    }

    fn all_paths_walk(
        &self,
        current: &str,
        to: &str,
        max_paths: usize,
        on_path: &mut HashSet<String>,
        path: &mut Vec<String>,
        paths: &mut Vec<Vec<String>>,
    ) {
        if paths.len() >= max_paths {
            return;
        }
        if current == to {
            paths.push(path.clone());
            return;
        }

        on_path.insert(current.to_string());
        for edge in self.edges_from(current) {
            if on_path.contains(edge.to.as_str()) {
                continue;
            }
            path.push(edge.to.clone());
            self.all_paths_walk(&edge.to, to, max_paths, on_path, path, paths);
            path.pop();
        }
        on_path.remove(current);
    }

    /// Whether every node is reachable from `start` (default: the first
    /// inserted node). Vacuously true for an empty graph; false when the
    /// start id is unknown.
    pub fn is_fully_connected(&self, start: Option<&str>) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        let start = match start {
            Some(id) => id,
            None => self.insertion_order[0].as_str(),
        };
        if !self.contains_node(start) {
            return false;
        }
        self.reachable_nodes(start).len() == self.nodes.len()
    }

    /// BFS closure from `start`; empty when the start id is unknown.
    pub fn reachable_nodes(&self, start: &str) -> BTreeSet<String> {
        let mut reachable = BTreeSet::new();
        if !self.contains_node(start) {
            return reachable;
        }

        let mut open = VecDeque::from([start]);
        reachable.insert(start.to_string());
        while let Some(current) = open.pop_front() {
            for edge in self.edges_from(current) {
                if reachable.insert(edge.to.clone()) {
                    open.push_back(edge.to.as_str());
                }
            }
        }
        reachable
    }

    /// Snapshot in the documented wire shape, nodes in insertion order.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes = self.nodes().cloned().collect();
        let edges = self
            .insertion_order
            .iter()
            .flat_map(|id| self.edges_from(id).iter().cloned())
            .collect();
        GraphSnapshot { nodes, edges }
    }

    /// Rebuild a graph from a snapshot, re-validating ids as it goes.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = LayoutGraph::new();
        for node in snapshot.nodes {
            graph.add_node(node.id, node.node_type, node.data)?;
        }
        for edge in snapshot.edges {
            graph.add_edge(&edge.from, &edge.to, edge.data)?;
        }
        Ok(graph)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.insertion_order.clear();
    }
}
