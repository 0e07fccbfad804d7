//! Typed head→dependent relation extraction over the tagged stream.
//!
//! Each rule scans forward from its trigger token for the nearest
//! qualifying partner. One token may originate several relations;
//! duplicates are left for the graph optimizer.

use serde::{Deserialize, Serialize};

use crate::token::{pos, Token};

/// Relation tags emitted by the extractor.
pub mod relation {
    /// Nominal subject.
    pub const NSUBJ: &str = "nsubj";
    /// Direct object.
    pub const DOBJ: &str = "dobj";
    /// Adjectival modifier.
    pub const AMOD: &str = "amod";
    /// Conjunction link.
    pub const CONJ: &str = "conj";
}

/// Confidence of subject relations.
pub const NSUBJ_CONFIDENCE: f32 = 0.9;
/// Confidence of object relations.
pub const DOBJ_CONFIDENCE: f32 = 0.85;
/// Confidence of adjectival modification.
pub const AMOD_CONFIDENCE: f32 = 0.8;
/// Confidence of conjunction links.
pub const CONJ_CONFIDENCE: f32 = 0.75;

/// Sentinel head when a conjunction opens the stream.
pub const ROOT_SENTINEL: &str = "ROOT";
/// Sentinel dependent when a conjunction closes the stream.
pub const END_SENTINEL: &str = "END";

/// A typed head→dependent link between two tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Head token text.
    pub head: String,
    /// Dependent token text.
    pub dependent: String,
    /// Relation tag.
    pub relation: String,
    /// Rule-intrinsic confidence.
    pub confidence: f32,
    /// Surface text of the conjunction, for `conj` relations.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub conjunction: Option<String>,
}

fn is_subject_like(tag: &str) -> bool {
    tag == pos::NOUN || tag == pos::PRONOUN || tag == pos::POSSESSIVE_PRONOUN
}

fn is_verb_like(tag: &str) -> bool {
    tag == pos::VERB || tag == pos::MODAL_VERB
}

/// Extracts all dependencies from the tagged token stream.
#[must_use]
pub fn extract(tokens: &[Token]) -> Vec<Dependency> {
    let mut dependencies = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if is_subject_like(&token.pos) {
            if let Some(verb) = tokens[i + 1..].iter().find(|t| is_verb_like(&t.pos)) {
                dependencies.push(Dependency {
                    head: token.text.clone(),
                    dependent: verb.text.clone(),
                    relation: relation::NSUBJ.to_string(),
                    confidence: NSUBJ_CONFIDENCE,
                    conjunction: None,
                });
            }
        }
        if token.pos == pos::VERB {
            if let Some(noun) = tokens[i + 1..].iter().find(|t| t.pos == pos::NOUN) {
                dependencies.push(Dependency {
                    head: token.text.clone(),
                    dependent: noun.text.clone(),
                    relation: relation::DOBJ.to_string(),
                    confidence: DOBJ_CONFIDENCE,
                    conjunction: None,
                });
            }
        }
        if token.pos == pos::ADJECTIVE {
            if let Some(next) = tokens.get(i + 1) {
                if next.pos == pos::NOUN {
                    dependencies.push(Dependency {
                        head: next.text.clone(),
                        dependent: token.text.clone(),
                        relation: relation::AMOD.to_string(),
                        confidence: AMOD_CONFIDENCE,
                        conjunction: None,
                    });
                }
            }
        }
        if token.pos == pos::CONJUNCTION {
            let head = if i > 0 {
                tokens[i - 1].text.clone()
            } else {
                ROOT_SENTINEL.to_string()
            };
            let dependent = tokens
                .get(i + 1)
                .map_or_else(|| END_SENTINEL.to_string(), |t| t.text.clone());
            dependencies.push(Dependency {
                head,
                dependent,
                relation: relation::CONJ.to_string(),
                confidence: CONJ_CONFIDENCE,
                conjunction: Some(token.text.clone()),
            });
        }
    }
    dependencies
}
