use crate::centrality::{betweenness_centrality, eigenvector_centrality};
use chatpulse_core::{CentralityStats, InteractionEdge, Message};
use chrono::Duration;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Directed "replied to" graph between senders.
///
/// An edge `u -> v` counts how often `u` spoke after `v` inside the
/// engagement window. Parallel interactions accumulate on one edge.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    graph: DiGraph<String, f64>,
    nodes: HashMap<String, NodeIndex>,
}

impl InteractionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to the edge `source -> target`, creating nodes as needed.
    pub fn add_interaction(&mut self, source: &str, target: &str, weight: f64) {
        let from = self.node(source);
        let to = self.node(target);
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] += weight,
            None => {
                self.graph.add_edge(from, to, weight);
            }
        }
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), index);
        index
    }

    /// Number of participants with at least one interaction.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Weight of the edge `source -> target`, if present.
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        let from = *self.nodes.get(source)?;
        let to = *self.nodes.get(target)?;
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> Vec<InteractionEdge> {
        self.graph
            .edge_references()
            .map(|edge| InteractionEdge {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                weight: *edge.weight(),
            })
            .collect()
    }

    /// Betweenness, eigenvector and weighted degrees per node.
    pub fn centrality(&self) -> BTreeMap<String, CentralityStats> {
        if self.graph.node_count() == 0 {
            return BTreeMap::new();
        }
        let betweenness = betweenness_centrality(&self.graph);
        let eigenvector = eigenvector_centrality(&self.graph);

        self.graph
            .node_indices()
            .map(|node| {
                let stats = CentralityStats {
                    betweenness: betweenness[node.index()],
                    eigenvector: eigenvector[node.index()],
                    in_degree: self.weighted_degree(node, Direction::Incoming),
                    out_degree: self.weighted_degree(node, Direction::Outgoing),
                };
                (self.graph[node].clone(), stats)
            })
            .collect()
    }

    fn weighted_degree(&self, node: NodeIndex, direction: Direction) -> f64 {
        self.graph
            .edges_directed(node, direction)
            .map(|edge| *edge.weight())
            .sum()
    }
}

/// Build the interaction graph with a windowed forward scan.
///
/// For every message `i`, each later message `j` within `window` of it and
/// from a different sender adds 1 to `sender(j) -> sender(i)`. The scan from
/// `i` stops at the first message past the window.
///
/// Weights count every in-window pair, not only adjacent turns: in a quick
/// A, B, A, B exchange `B -> A` weighs 3 and `A -> B` weighs 1.
pub fn build_interaction_graph(messages: &[Message], window: Duration) -> InteractionGraph {
    let mut graph = InteractionGraph::new();
    for (i, earlier) in messages.iter().enumerate() {
        for later in &messages[i + 1..] {
            if later.timestamp - earlier.timestamp > window {
                break;
            }
            if later.sender != earlier.sender {
                graph.add_interaction(&later.sender, &earlier.sender, 1.0);
            }
        }
    }
    debug!(
        "Built interaction graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

/// Build the graph and compute per-node centrality in one step.
pub fn compute_graph(
    messages: &[Message],
    window: Duration,
) -> (InteractionGraph, BTreeMap<String, CentralityStats>) {
    let graph = build_interaction_graph(messages, window);
    let centrality = graph.centrality();
    (graph, centrality)
}
