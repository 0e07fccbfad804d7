//! Clause construction: groups the tagged stream into clauses, splitting
//! on coordinating conjunctions, and assembles the parse tree together
//! with the classified intent and extracted dependencies.

use serde::{Deserialize, Serialize};

use crate::{
    dependency::{self, Dependency},
    intent::{self, Intent},
    token::{pos, Token},
};

/// Coordinating conjunctions that split clauses. Other conjunctions
/// (if, when, because, ...) stay inside their clause.
pub const COORDINATING: &[&str] = &["and", "or", "but"];

/// A token bound to a subject or predicate slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    /// Surface text.
    pub word: String,
    /// Part-of-speech role of the bound token.
    #[serde(rename = "type")]
    pub pos: String,
    /// Token position in the input.
    pub position: usize,
    /// Definition text carried from the token.
    pub definition: String,
}

/// A token bound to an object slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Surface text.
    pub word: String,
    /// Token position in the input.
    pub position: usize,
    /// Definition text carried from the token.
    pub definition: String,
}

/// A token bound to a modifier slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierRef {
    /// Surface text.
    pub word: String,
    /// Part-of-speech role of the bound token.
    #[serde(rename = "type")]
    pub pos: String,
    /// Token position in the input.
    pub position: usize,
}

/// One clause: subject, predicate, objects, and modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Subject slot; the first unassigned noun or personal pronoun.
    pub subject: Option<SlotRef>,
    /// Predicate slot; the first verb or modal verb.
    pub predicate: Option<SlotRef>,
    /// Nouns after the predicate, in order.
    pub objects: Vec<ObjectRef>,
    /// Adjectives, adverbs, articles, prepositions, and possessive
    /// pronouns, in order.
    pub modifiers: Vec<ModifierRef>,
    /// Reserved; the current ruleset never fills complements.
    pub complements: Vec<ModifierRef>,
}

/// Parse tree of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseTree {
    /// Classified discourse intent.
    pub intent: Intent,
    /// Clauses in input order. Always at least one, possibly empty.
    pub clauses: Vec<Clause>,
    /// All extracted dependencies.
    pub dependencies: Vec<Dependency>,
}

fn slot(token: &Token) -> SlotRef {
    SlotRef {
        word: token.text.clone(),
        pos: token.pos.clone(),
        position: token.index,
        definition: token.definition.clone(),
    }
}

fn modifier(token: &Token) -> ModifierRef {
    ModifierRef {
        word: token.text.clone(),
        pos: token.pos.clone(),
        position: token.index,
    }
}

fn is_subject_candidate(tag: &str) -> bool {
    tag == pos::NOUN || tag == pos::PRONOUN
}

fn is_modifier_candidate(tag: &str) -> bool {
    tag == pos::ADJECTIVE
        || tag == pos::ADVERB
        || tag == pos::ARTICLE
        || tag == pos::PREPOSITION
        || tag == pos::POSSESSIVE_PRONOUN
}

/// Builds the parse tree: intent, clause structure, and dependencies.
#[must_use]
pub fn build(tokens: &[Token]) -> ParseTree {
    let intent = intent::classify(tokens);
    let dependencies = dependency::extract(tokens);

    let mut clauses = Vec::new();
    let mut current = Clause::default();
    for token in tokens {
        if token.pos == pos::CONJUNCTION && COORDINATING.contains(&token.lowercase.as_str()) {
            clauses.push(std::mem::take(&mut current));
            continue;
        }
        if is_subject_candidate(&token.pos) && current.subject.is_none() {
            current.subject = Some(slot(token));
        } else if token.pos == pos::VERB || token.pos == pos::MODAL_VERB {
            if current.predicate.is_none() {
                current.predicate = Some(slot(token));
            }
        } else if token.pos == pos::NOUN && current.predicate.is_some() {
            current.objects.push(ObjectRef {
                word: token.text.clone(),
                position: token.index,
                definition: token.definition.clone(),
            });
        } else if is_modifier_candidate(&token.pos) {
            current.modifiers.push(modifier(token));
        }
        // Tokens matching no slot rule stay out of clause structure; they
        // remain visible through the token stream and dependencies.
    }
    clauses.push(current);

    ParseTree {
        intent,
        clauses,
        dependencies,
    }
}
