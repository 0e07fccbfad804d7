//! Graph optimization: node dedup, edge dedup, then confidence pruning.
//! Dedup runs before pruning so the threshold applies to merged data.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::ir::{IrGraph, NodeKind};

/// Edges below this confidence are dropped.
pub const MIN_EDGE_CONFIDENCE: f32 = 0.4;

/// Before/after counts of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStats {
    /// Node count before optimization.
    pub nodes_before: usize,
    /// Node count after optimization.
    pub nodes_after: usize,
    /// Edge count before optimization.
    pub edges_before: usize,
    /// Edge count after optimization.
    pub edges_after: usize,
    /// Node reduction as a percentage, rounded to two decimals.
    pub reduction_percentage: f64,
}

/// An IR graph with its optimization log and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedGraph {
    /// The optimized graph.
    #[serde(flatten)]
    pub graph: IrGraph,
    /// One entry per merge, removal, or drop.
    pub optimizations_applied: Vec<String>,
    /// Before/after statistics.
    pub optimization_stats: OptimizationStats,
}

fn node_confidence(properties: &serde_json::Map<String, serde_json::Value>) -> f64 {
    properties
        .get("confidence")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0)
}

/// Optimizes the graph: deduplicates nodes by (label, kind), deduplicates
/// edges by (from, to, relation), then prunes low-confidence edges.
#[must_use]
pub fn optimize(graph: IrGraph) -> OptimizedGraph {
    let nodes_before = graph.nodes.len();
    let edges_before = graph.edges.len();
    let mut log = Vec::new();

    // Pass 1: node dedup. The first occurrence of a (label, kind) pair is
    // kept; a later duplicate with strictly higher confidence donates its
    // properties to the kept node.
    let mut kept: IndexMap<(String, NodeKind), usize> = IndexMap::new();
    let mut nodes: Vec<crate::ir::IrNode> = Vec::new();
    for node in graph.nodes {
        let key = (node.label.clone(), node.kind);
        if let Some(&slot) = kept.get(&key) {
            let existing = &mut nodes[slot];
            if node_confidence(&node.properties) > node_confidence(&existing.properties) {
                existing.properties = node.properties;
            }
            log.push(format!("Merged duplicate node: {}", node.label));
        } else {
            kept.insert(key, nodes.len());
            nodes.push(node);
        }
    }

    // Pass 2: edge dedup.
    let mut seen: IndexSet<(usize, usize, String)> = IndexSet::new();
    let mut edges = Vec::new();
    for edge in graph.edges {
        let key = (edge.from, edge.to, edge.relation.clone());
        if seen.insert(key) {
            edges.push(edge);
        } else {
            log.push(format!("Removed redundant edge: {}", edge.relation));
        }
    }

    // Pass 3: confidence pruning over the deduplicated edges.
    edges.retain(|edge| {
        if edge.confidence < MIN_EDGE_CONFIDENCE {
            log.push(format!(
                "Removed low-confidence edge: {} ({:.2})",
                edge.relation, edge.confidence
            ));
            false
        } else {
            true
        }
    });

    let nodes_after = nodes.len();
    let edges_after = edges.len();
    #[allow(clippy::cast_precision_loss)]
    let reduction_percentage = if nodes_before == 0 {
        0.0
    } else {
        let ratio: f64 = 1.0 - nodes_after as f64 / nodes_before as f64;
        (ratio * 100.0 * 100.0).round() / 100.0
    };

    OptimizedGraph {
        graph: IrGraph {
            nodes,
            edges,
            ..graph
        },
        optimizations_applied: log,
        optimization_stats: OptimizationStats {
            nodes_before,
            nodes_after,
            edges_before,
            edges_after,
            reduction_percentage,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;
    use crate::ir::{IrEdge, IrNode};
    use serde_json::Value;

    fn node(id: usize, kind: NodeKind, label: &str, confidence: f64) -> IrNode {
        let mut properties = serde_json::Map::new();
        properties.insert("confidence".to_string(), Value::from(confidence));
        properties.insert("definition".to_string(), Value::String(label.to_string()));
        IrNode {
            id,
            kind,
            label: label.to_string(),
            properties,
        }
    }

    fn edge(from: usize, to: usize, relation: &str, confidence: f32) -> IrEdge {
        IrEdge {
            from,
            to,
            relation: relation.to_string(),
            confidence,
        }
    }

    fn graph(nodes: Vec<IrNode>, edges: Vec<IrEdge>) -> IrGraph {
        IrGraph {
            format: crate::ir::IR_FORMAT.to_string(),
            version: crate::ir::IR_VERSION.to_string(),
            intent: Intent::Unknown { confidence: 0.5 },
            nodes,
            edges,
        }
    }

    #[test]
    fn duplicate_nodes_collapse_to_first_occurrence() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.6),
                node(1, NodeKind::Entity, "dog", 0.5),
                node(2, NodeKind::Action, "dog", 0.5),
            ],
            vec![],
        );
        let optimized = optimize(input);
        // Same label, different kind survives.
        assert_eq!(optimized.graph.nodes.len(), 2);
        assert_eq!(optimized.optimizations_applied.len(), 1);
        assert!(optimized.optimizations_applied[0].contains("Merged duplicate node"));
    }

    #[test]
    fn higher_confidence_duplicate_donates_properties() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.6),
                node(1, NodeKind::Entity, "dog", 0.9),
            ],
            vec![],
        );
        let optimized = optimize(input);
        let kept = &optimized.graph.nodes[0];
        assert!((node_confidence(&kept.properties) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn lower_confidence_duplicate_is_discarded() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.9),
                node(1, NodeKind::Entity, "dog", 0.6),
            ],
            vec![],
        );
        let optimized = optimize(input);
        assert!((node_confidence(&optimized.graph.nodes[0].properties) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn duplicate_edges_are_removed() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.6),
                node(1, NodeKind::Action, "runs", 0.5),
            ],
            vec![
                edge(0, 1, "performs", 0.8),
                edge(0, 1, "performs", 0.8),
                edge(0, 1, "nsubj", 0.9),
            ],
        );
        let optimized = optimize(input);
        assert_eq!(optimized.graph.edges.len(), 2);
        assert!(optimized
            .optimizations_applied
            .iter()
            .any(|entry| entry.contains("Removed redundant edge")));
    }

    #[test]
    fn low_confidence_edges_are_pruned_after_dedup() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.6),
                node(1, NodeKind::Action, "runs", 0.5),
            ],
            vec![edge(0, 1, "conj", 0.35), edge(0, 1, "performs", 0.8)],
        );
        let optimized = optimize(input);
        assert_eq!(optimized.graph.edges.len(), 1);
        assert!(optimized
            .graph
            .edges
            .iter()
            .all(|e| e.confidence >= MIN_EDGE_CONFIDENCE));
        assert!(optimized
            .optimizations_applied
            .iter()
            .any(|entry| entry.contains("Removed low-confidence edge: conj (0.35)")));
    }

    #[test]
    fn optimization_is_monotone() {
        let input = graph(
            vec![
                node(0, NodeKind::Entity, "dog", 0.6),
                node(1, NodeKind::Entity, "dog", 0.8),
                node(2, NodeKind::Action, "runs", 0.5),
            ],
            vec![edge(0, 2, "performs", 0.8), edge(0, 2, "performs", 0.8)],
        );
        let optimized = optimize(input);
        let stats = optimized.optimization_stats;
        assert!(stats.nodes_after <= stats.nodes_before);
        assert!(stats.edges_after <= stats.edges_before);
        assert!((stats.reduction_percentage - 33.33).abs() < 1e-9);
    }

    #[test]
    fn empty_graph_optimizes_without_division_by_zero() {
        let optimized = optimize(graph(vec![], vec![]));
        let stats = optimized.optimization_stats;
        assert_eq!(stats.nodes_before, 0);
        assert!((stats.reduction_percentage).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_flatten_into_serialized_graph() {
        let optimized = optimize(graph(vec![node(0, NodeKind::Entity, "dog", 0.6)], vec![]));
        let json = serde_json::to_value(&optimized).unwrap();
        assert_eq!(json["format"], "JSON-IR");
        assert_eq!(json["optimization_stats"]["nodes_before"], 1);
    }
}
