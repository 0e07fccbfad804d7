//! Semantic graph construction: entities, actions, relationships,
//! pronoun resolution against the context memory, and confidence
//! aggregation.

use serde::{Deserialize, Serialize};

use crate::{
    context::ContextMemory,
    dependency::Dependency,
    intent::Intent,
    syntax::ParseTree,
    token::Token,
};

/// Subject entity confidence when its token has a dictionary entry.
pub const SUBJECT_RESOLVED: f32 = 0.9;
/// Subject entity confidence without a dictionary entry.
pub const SUBJECT_UNRESOLVED: f32 = 0.6;
/// Action confidence when its token has a dictionary entry.
pub const ACTION_RESOLVED: f32 = 0.85;
/// Action confidence without a dictionary entry.
pub const ACTION_UNRESOLVED: f32 = 0.5;
/// Object entity confidence when its token has a dictionary entry.
pub const OBJECT_RESOLVED: f32 = 0.8;
/// Object entity confidence without a dictionary entry.
pub const OBJECT_UNRESOLVED: f32 = 0.5;
/// Confidence of a subject-action-objects triple.
pub const TRIPLE_CONFIDENCE: f32 = 0.8;
/// Context reference confidence when the memory holds a frame.
pub const CONTEXT_HIT: f32 = 0.7;
/// Context reference confidence when the memory is empty.
pub const CONTEXT_MISS: f32 = 0.3;
/// Overall confidence when no action or object contributed a score.
pub const DEGENERATE_OVERALL: f32 = 0.5;

/// Antecedent name used when no referent can be resolved.
pub const UNKNOWN_REFERENT: &str = "unknown";

const THIRD_PERSON_PRONOUNS: &[&str] = &["he", "she", "it", "they", "him", "her", "them"];

/// Role of an entity within its clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    /// Clause subject.
    Subject,
    /// Clause object.
    Object,
}

/// An entity extracted from a clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Surface name.
    pub name: String,
    /// Clause role.
    #[serde(rename = "type")]
    pub role: EntityRole,
    /// Grammatical class of the token, kept for subjects.
    #[serde(rename = "role", skip_serializing_if = "Option::is_none")]
    pub grammatical: Option<String>,
    /// Definition text carried from the token.
    pub definition: String,
    /// Index of the owning clause.
    pub clause: usize,
    /// Dictionary-hit-dependent confidence.
    pub confidence: f32,
}

/// An action extracted from a clause predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Verb text.
    pub action: String,
    /// Definition text carried from the token.
    pub definition: String,
    /// Subject performing the action, or "unknown".
    pub actor: String,
    /// Index of the owning clause.
    pub clause: usize,
    /// Dictionary-hit-dependent confidence.
    pub confidence: f32,
}

/// A pronoun resolved against the context memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextReference {
    /// The pronoun as written.
    pub pronoun: String,
    /// Resolved antecedent, or "unknown".
    pub refers_to: String,
    /// Resolution confidence.
    pub confidence: f32,
}

/// A relationship in the semantic graph: either a clause-level
/// subject-action-objects triple or a projected dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relationship {
    /// Subject-action-objects triple from one clause.
    Triple {
        /// Subject name.
        subject: String,
        /// Action verb.
        action: String,
        /// Object names, in clause order.
        objects: Vec<String>,
        /// Index of the owning clause.
        clause: usize,
        /// Triple confidence.
        confidence: f32,
    },
    /// Projection of one extracted dependency.
    Dependency {
        /// Constant marker `dependency`.
        #[serde(rename = "type")]
        kind: String,
        /// Relation tag.
        relation: String,
        /// Head token text.
        head: String,
        /// Dependent token text.
        dependent: String,
        /// Confidence carried from the dependency.
        confidence: f32,
    },
}

impl Relationship {
    /// Projects a dependency into a relationship.
    #[must_use]
    pub fn from_dependency(dep: &Dependency) -> Self {
        Self::Dependency {
            kind: "dependency".to_string(),
            relation: dep.relation.clone(),
            head: dep.head.clone(),
            dependent: dep.dependent.clone(),
            confidence: dep.confidence,
        }
    }
}

/// Aggregate confidence of one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    /// Mean of action and object-entity confidences.
    pub overall: f32,
    /// Fraction of tokens with a resolved dictionary entry.
    pub pos_accuracy: f32,
}

/// Semantic structure of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticGraph {
    /// Intent type label.
    pub sentence_type: String,
    /// Classified intent.
    pub intent: Intent,
    /// Entities in clause order, subjects before objects per clause.
    pub entities: Vec<Entity>,
    /// Actions in clause order.
    pub actions: Vec<Action>,
    /// Triples first, then projected dependencies.
    pub relationships: Vec<Relationship>,
    /// Pronouns resolved against the context memory.
    pub context_references: Vec<ContextReference>,
    /// Aggregate confidence scores.
    pub confidence_scores: ConfidenceScores,
}

impl SemanticGraph {
    /// Name of the first subject entity, if any.
    #[must_use]
    pub fn main_subject(&self) -> Option<&str> {
        self.entities
            .iter()
            .find(|entity| entity.role == EntityRole::Subject)
            .map(|entity| entity.name.as_str())
    }

    /// Verb of the first action, if any.
    #[must_use]
    pub fn main_action(&self) -> Option<&str> {
        self.actions.first().map(|action| action.action.as_str())
    }
}

fn has_entry(tokens: &[Token], word: &str) -> bool {
    tokens
        .iter()
        .find(|token| token.text == word)
        .is_some_and(|token| token.has_entry)
}

fn resolve_pronoun(pronoun: &str, context: &ContextMemory) -> ContextReference {
    context.latest().map_or_else(
        || ContextReference {
            pronoun: pronoun.to_string(),
            refers_to: UNKNOWN_REFERENT.to_string(),
            confidence: CONTEXT_MISS,
        },
        |frame| ContextReference {
            pronoun: pronoun.to_string(),
            refers_to: frame
                .subject
                .unwrap_or_else(|| UNKNOWN_REFERENT.to_string()),
            confidence: CONTEXT_HIT,
        },
    )
}

/// Builds the semantic graph from the parse tree and the token stream,
/// resolving third-person pronoun subjects against `context`.
#[must_use]
pub fn build(tree: &ParseTree, tokens: &[Token], context: &ContextMemory) -> SemanticGraph {
    let mut entities = Vec::new();
    let mut actions = Vec::new();
    let mut relationships = Vec::new();
    let mut context_references = Vec::new();
    let mut total_confidence = 0.0f32;
    let mut contributions = 0usize;

    for (clause_index, clause) in tree.clauses.iter().enumerate() {
        if let Some(subject) = &clause.subject {
            let confidence = if has_entry(tokens, &subject.word) {
                SUBJECT_RESOLVED
            } else {
                SUBJECT_UNRESOLVED
            };
            entities.push(Entity {
                name: subject.word.clone(),
                role: EntityRole::Subject,
                grammatical: Some(subject.pos.clone()),
                definition: subject.definition.clone(),
                clause: clause_index,
                confidence,
            });
            if THIRD_PERSON_PRONOUNS.contains(&subject.word.to_lowercase().as_str()) {
                context_references.push(resolve_pronoun(&subject.word, context));
            }
        }

        if let Some(predicate) = &clause.predicate {
            let confidence = if has_entry(tokens, &predicate.word) {
                ACTION_RESOLVED
            } else {
                ACTION_UNRESOLVED
            };
            actions.push(Action {
                action: predicate.word.clone(),
                definition: predicate.definition.clone(),
                actor: clause
                    .subject
                    .as_ref()
                    .map_or_else(|| UNKNOWN_REFERENT.to_string(), |s| s.word.clone()),
                clause: clause_index,
                confidence,
            });
            total_confidence += confidence;
            contributions += 1;
        }

        for object in &clause.objects {
            let confidence = if has_entry(tokens, &object.word) {
                OBJECT_RESOLVED
            } else {
                OBJECT_UNRESOLVED
            };
            entities.push(Entity {
                name: object.word.clone(),
                role: EntityRole::Object,
                grammatical: None,
                definition: object.definition.clone(),
                clause: clause_index,
                confidence,
            });
            total_confidence += confidence;
            contributions += 1;
        }

        if let (Some(subject), Some(predicate)) = (&clause.subject, &clause.predicate) {
            relationships.push(Relationship::Triple {
                subject: subject.word.clone(),
                action: predicate.word.clone(),
                objects: clause.objects.iter().map(|o| o.word.clone()).collect(),
                clause: clause_index,
                confidence: TRIPLE_CONFIDENCE,
            });
        }
    }

    for dep in &tree.dependencies {
        relationships.push(Relationship::from_dependency(dep));
    }

    #[allow(clippy::cast_precision_loss)]
    let overall = if contributions == 0 {
        DEGENERATE_OVERALL
    } else {
        total_confidence / contributions as f32
    };
    #[allow(clippy::cast_precision_loss)]
    let pos_accuracy = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().filter(|t| t.has_entry).count() as f32 / tokens.len() as f32
    };

    SemanticGraph {
        sentence_type: tree.intent.label().to_string(),
        intent: tree.intent.clone(),
        entities,
        actions,
        relationships,
        context_references,
        confidence_scores: ConfidenceScores {
            overall,
            pos_accuracy,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextFrame;
    use crate::syntax;
    use crate::token::pos;

    fn token(i: usize, text: &str, tag: &str) -> Token {
        Token::new(i, text, tag.to_string(), None)
    }

    fn graph_for(tokens: &[Token], context: &ContextMemory) -> SemanticGraph {
        let tree = syntax::build(tokens);
        build(&tree, tokens, context)
    }

    #[test]
    fn pronoun_resolves_to_latest_context_subject() {
        let context = ContextMemory::default();
        context.push(ContextFrame::new(
            Some("Mark".to_string()),
            Some("run".to_string()),
        ));
        let tokens = vec![
            token(0, "He", pos::PRONOUN),
            token(1, "was", pos::VERB),
            token(2, "tired", pos::VERB),
        ];
        let graph = graph_for(&tokens, &context);
        let reference = &graph.context_references[0];
        assert_eq!(reference.refers_to, "Mark");
        assert!((reference.confidence - CONTEXT_HIT).abs() < f32::EPSILON);
    }

    #[test]
    fn pronoun_without_context_resolves_to_unknown() {
        let context = ContextMemory::default();
        let tokens = vec![token(0, "He", pos::PRONOUN), token(1, "was", pos::VERB)];
        let graph = graph_for(&tokens, &context);
        let reference = &graph.context_references[0];
        assert_eq!(reference.refers_to, UNKNOWN_REFERENT);
        assert!((reference.confidence - CONTEXT_MISS).abs() < f32::EPSILON);
    }

    #[test]
    fn non_pronoun_subject_emits_no_reference() {
        let context = ContextMemory::default();
        let tokens = vec![token(0, "dog", pos::NOUN), token(1, "runs", pos::VERB)];
        let graph = graph_for(&tokens, &context);
        assert!(graph.context_references.is_empty());
    }

    #[test]
    fn subjects_are_excluded_from_overall_confidence() {
        let context = ContextMemory::default();
        // Subject (0.6) is excluded; action (0.5) and object (0.5) average 0.5.
        let tokens = vec![
            token(0, "dog", pos::NOUN),
            token(1, "chases", pos::VERB),
            token(2, "cat", pos::NOUN),
        ];
        let graph = graph_for(&tokens, &context);
        assert!((graph.confidence_scores.overall - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_contribution_set_defaults_overall() {
        let context = ContextMemory::default();
        let tokens = vec![token(0, "dog", pos::NOUN)];
        let graph = graph_for(&tokens, &context);
        assert!((graph.confidence_scores.overall - DEGENERATE_OVERALL).abs() < f32::EPSILON);
    }

    #[test]
    fn pos_accuracy_counts_dictionary_hits() {
        let context = ContextMemory::default();
        let entry = semforge_lexicon::DictionaryEntry::simple("run", "verb", "move fast");
        let tokens = vec![
            token(0, "dog", pos::NOUN),
            Token::new(1, "runs", pos::VERB.to_string(), Some(entry)),
        ];
        let graph = graph_for(&tokens, &context);
        assert!((graph.confidence_scores.pos_accuracy - 0.5).abs() < 1e-6);
        // Resolved action scores 0.85 and is the only contribution.
        assert!((graph.confidence_scores.overall - ACTION_RESOLVED).abs() < 1e-6);
    }

    #[test]
    fn triple_and_dependencies_both_project() {
        let context = ContextMemory::default();
        let tokens = vec![
            token(0, "dog", pos::NOUN),
            token(1, "chases", pos::VERB),
            token(2, "cat", pos::NOUN),
        ];
        let graph = graph_for(&tokens, &context);
        let triples = graph
            .relationships
            .iter()
            .filter(|r| matches!(r, Relationship::Triple { .. }))
            .count();
        let deps = graph
            .relationships
            .iter()
            .filter(|r| matches!(r, Relationship::Dependency { .. }))
            .count();
        assert_eq!(triples, 1);
        // nsubj (dog→chases), dobj (chases→cat), nsubj is not emitted for cat
        // (no verb follows), so two projected dependencies.
        assert_eq!(deps, 2);
    }

    #[test]
    fn entity_serialization_distinguishes_roles() {
        let context = ContextMemory::default();
        let tokens = vec![
            token(0, "dog", pos::NOUN),
            token(1, "chases", pos::VERB),
            token(2, "cat", pos::NOUN),
        ];
        let graph = graph_for(&tokens, &context);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["entities"][0]["type"], "subject");
        assert_eq!(json["entities"][0]["role"], "noun");
        assert_eq!(json["entities"][1]["type"], "object");
        assert!(json["entities"][1].get("role").is_none());
        assert_eq!(json["relationships"][1]["type"], "dependency");
    }

    #[test]
    fn empty_input_produces_degenerate_graph() {
        let context = ContextMemory::default();
        let graph = graph_for(&[], &context);
        assert!(graph.entities.is_empty());
        assert!(graph.actions.is_empty());
        assert!((graph.confidence_scores.pos_accuracy).abs() < f32::EPSILON);
        assert!((graph.confidence_scores.overall - DEGENERATE_OVERALL).abs() < f32::EPSILON);
    }
}
