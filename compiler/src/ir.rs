//! Intermediate representation: projects the semantic graph into nodes
//! and edges. Node references are resolved through a label lookup table
//! built once per graph; the first node carrying a label wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    intent::Intent,
    semantic::{EntityRole, Relationship, SemanticGraph},
};

/// Format tag stamped on every graph.
pub const IR_FORMAT: &str = "JSON-IR";
/// Version tag stamped on every graph.
pub const IR_VERSION: &str = "2.0";
/// Relation tag from a subject node to its action node.
pub const PERFORMS: &str = "performs";
/// Relation tag from an action node to each object node.
pub const AFFECTS: &str = "affects";
/// Fixed confidence of `affects` edges.
pub const AFFECTS_CONFIDENCE: f32 = 0.75;

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entity node.
    Entity,
    /// Action node.
    Action,
}

/// One graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNode {
    /// Dense id, unique within one graph, starting at 0.
    pub id: usize,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label (entity name or verb).
    pub label: String,
    /// Free-form properties.
    pub properties: serde_json::Map<String, Value>,
}

/// One directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrEdge {
    /// Source node id.
    pub from: usize,
    /// Target node id.
    pub to: usize,
    /// Relation tag.
    #[serde(rename = "type")]
    pub relation: String,
    /// Edge confidence.
    pub confidence: f32,
}

/// The knowledge graph form of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrGraph {
    /// Format tag.
    pub format: String,
    /// Version tag.
    pub version: String,
    /// Intent carried through from the semantic phase.
    pub intent: Intent,
    /// Nodes: entities first, then actions.
    pub nodes: Vec<IrNode>,
    /// Edges, in relationship order.
    pub edges: Vec<IrEdge>,
}

fn number(value: f32) -> Value {
    serde_json::Number::from_f64(f64::from(value)).map_or(Value::Null, Value::Number)
}

/// Builds the IR graph from the semantic structure.
#[must_use]
pub fn build(semantic: &SemanticGraph) -> IrGraph {
    let mut nodes = Vec::new();
    let mut labels: IndexMap<String, usize> = IndexMap::new();

    for entity in &semantic.entities {
        let id = nodes.len();
        let mut properties = serde_json::Map::new();
        properties.insert(
            "entityType".to_string(),
            Value::String(
                match entity.role {
                    EntityRole::Subject => "subject",
                    EntityRole::Object => "object",
                }
                .to_string(),
            ),
        );
        properties.insert(
            "role".to_string(),
            Value::String(
                entity
                    .grammatical
                    .clone()
                    .unwrap_or_else(|| "object".to_string()),
            ),
        );
        properties.insert(
            "definition".to_string(),
            Value::String(entity.definition.clone()),
        );
        properties.insert("clause".to_string(), Value::from(entity.clause));
        properties.insert("confidence".to_string(), number(entity.confidence));
        labels.entry(entity.name.clone()).or_insert(id);
        nodes.push(IrNode {
            id,
            kind: NodeKind::Entity,
            label: entity.name.clone(),
            properties,
        });
    }

    for action in &semantic.actions {
        let id = nodes.len();
        let mut properties = serde_json::Map::new();
        properties.insert(
            "definition".to_string(),
            Value::String(action.definition.clone()),
        );
        properties.insert("actor".to_string(), Value::String(action.actor.clone()));
        properties.insert("clause".to_string(), Value::from(action.clause));
        properties.insert("confidence".to_string(), number(action.confidence));
        labels.entry(action.action.clone()).or_insert(id);
        nodes.push(IrNode {
            id,
            kind: NodeKind::Action,
            label: action.action.clone(),
            properties,
        });
    }

    let mut edges = Vec::new();
    for relationship in &semantic.relationships {
        match relationship {
            Relationship::Dependency {
                relation,
                head,
                dependent,
                confidence,
                ..
            } => {
                // Endpoints without a matching node (sentinels, dropped
                // tokens) are skipped silently.
                if let (Some(&from), Some(&to)) = (labels.get(head), labels.get(dependent)) {
                    edges.push(IrEdge {
                        from,
                        to,
                        relation: relation.clone(),
                        confidence: *confidence,
                    });
                }
            }
            Relationship::Triple {
                subject,
                action,
                objects,
                confidence,
                ..
            } => {
                let subject_id = labels.get(subject).copied();
                let action_id = labels.get(action).copied();
                if let (Some(from), Some(to)) = (subject_id, action_id) {
                    edges.push(IrEdge {
                        from,
                        to,
                        relation: PERFORMS.to_string(),
                        confidence: *confidence,
                    });
                }
                if let Some(from) = action_id {
                    for object in objects {
                        if let Some(&to) = labels.get(object) {
                            edges.push(IrEdge {
                                from,
                                to,
                                relation: AFFECTS.to_string(),
                                confidence: AFFECTS_CONFIDENCE,
                            });
                        }
                    }
                }
            }
        }
    }

    IrGraph {
        format: IR_FORMAT.to_string(),
        version: IR_VERSION.to_string(),
        intent: semantic.intent.clone(),
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextMemory;
    use crate::token::{pos, Token};
    use crate::{semantic, syntax};

    fn token(i: usize, text: &str, tag: &str) -> Token {
        Token::new(i, text, tag.to_string(), None)
    }

    fn graph_for(words: &[(&str, &str)]) -> IrGraph {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, (text, tag))| token(i, text, tag))
            .collect();
        let tree = syntax::build(&tokens);
        let semantic = semantic::build(&tree, &tokens, &ContextMemory::default());
        build(&semantic)
    }

    #[test]
    fn ids_are_dense_entities_before_actions() {
        let graph = graph_for(&[
            ("dog", pos::NOUN),
            ("chases", pos::VERB),
            ("cat", pos::NOUN),
        ]);
        let ids: Vec<usize> = graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(graph.nodes[0].kind, NodeKind::Entity);
        assert_eq!(graph.nodes[1].kind, NodeKind::Entity);
        assert_eq!(graph.nodes[2].kind, NodeKind::Action);
    }

    #[test]
    fn triple_emits_performs_and_affects() {
        let graph = graph_for(&[
            ("dog", pos::NOUN),
            ("chases", pos::VERB),
            ("cat", pos::NOUN),
        ]);
        let performs = graph.edges.iter().find(|e| e.relation == PERFORMS).unwrap();
        assert_eq!(performs.from, 0);
        assert_eq!(performs.to, 2);
        let affects = graph.edges.iter().find(|e| e.relation == AFFECTS).unwrap();
        assert_eq!(affects.from, 2);
        assert_eq!(affects.to, 1);
        assert!((affects.confidence - AFFECTS_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn dependency_edges_resolve_by_label() {
        let graph = graph_for(&[("dog", pos::NOUN), ("runs", pos::VERB)]);
        let nsubj = graph.edges.iter().find(|e| e.relation == "nsubj").unwrap();
        assert_eq!(nsubj.from, 0);
        assert_eq!(nsubj.to, 1);
    }

    #[test]
    fn unresolvable_endpoints_are_skipped() {
        // "happy" modifies "dog" but adjectives never become nodes, so
        // the amod edge has no source node and is dropped.
        let graph = graph_for(&[
            ("happy", pos::ADJECTIVE),
            ("dog", pos::NOUN),
            ("runs", pos::VERB),
        ]);
        assert!(graph.edges.iter().all(|e| e.relation != "amod"));
        assert!(graph.edges.iter().any(|e| e.relation == PERFORMS));
    }

    #[test]
    fn first_label_occurrence_wins() {
        // "dog chases dog": subject and object share a label; edges
        // resolve to the first node carrying it.
        let graph = graph_for(&[
            ("dog", pos::NOUN),
            ("chases", pos::VERB),
            ("dog", pos::NOUN),
        ]);
        let affects = graph.edges.iter().find(|e| e.relation == AFFECTS).unwrap();
        assert_eq!(affects.to, 0);
    }

    #[test]
    fn empty_semantic_graph_yields_empty_ir() {
        let graph = graph_for(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(graph.format, IR_FORMAT);
        assert_eq!(graph.version, IR_VERSION);
    }
}
