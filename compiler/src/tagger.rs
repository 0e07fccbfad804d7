//! Part-of-speech rule cascade.
//!
//! Evaluation order is load-bearing: dictionary entry, then fallback
//! table, then the closed-set and suffix rules below, then noun. Specific
//! exception sets run before the general suffix heuristics so that words
//! like "ring" or "red" are not mistaken for verbs.

use semforge_lexicon::{fallback, DictionaryEntry};

use crate::token::pos;

const PERSONAL_PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];
const POSSESSIVE_PRONOUNS: &[&str] = &["my", "your", "his", "her", "its", "our", "their"];
const DEMONSTRATIVE_PRONOUNS: &[&str] = &["this", "that", "these", "those"];
const BE_FORMS: &[&str] = &["is", "are", "am", "was", "were", "be", "been", "being"];
const ING_EXCEPTIONS: &[&str] = &["thing", "ring", "king", "sing", "wing"];
const ED_EXCEPTIONS: &[&str] = &["red", "bed", "fed", "led"];
const MODAL_VERBS: &[&str] = &[
    "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "less", "ous", "ive", "able"];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "from", "to", "of", "about", "under", "over",
];
const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "if", "when", "because", "although", "while", "unless",
];
const ARTICLES: &[&str] = &["the", "a", "an"];

/// One heuristic rule of the cascade: a named predicate and the tag it
/// assigns on the first match.
#[derive(Clone, Copy)]
pub struct TagRule {
    /// Rule name, for inspection and tests.
    pub name: &'static str,
    /// Predicate over the lowercased word.
    pub matches: fn(&str) -> bool,
    /// Tag assigned when the predicate holds.
    pub tag: &'static str,
}

impl std::fmt::Debug for TagRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRule")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish()
    }
}

fn is_personal_pronoun(word: &str) -> bool {
    PERSONAL_PRONOUNS.contains(&word)
}

fn is_possessive_pronoun(word: &str) -> bool {
    POSSESSIVE_PRONOUNS.contains(&word)
}

fn is_demonstrative_pronoun(word: &str) -> bool {
    DEMONSTRATIVE_PRONOUNS.contains(&word)
}

fn is_be_form(word: &str) -> bool {
    BE_FORMS.contains(&word)
}

fn is_ing_verb(word: &str) -> bool {
    word.ends_with("ing") && !ING_EXCEPTIONS.contains(&word)
}

fn is_ed_verb(word: &str) -> bool {
    word.ends_with("ed") && !ED_EXCEPTIONS.contains(&word)
}

fn is_modal_verb(word: &str) -> bool {
    MODAL_VERBS.contains(&word)
}

fn is_ly_adverb(word: &str) -> bool {
    word.ends_with("ly")
}

fn has_adjective_suffix(word: &str) -> bool {
    ADJECTIVE_SUFFIXES
        .iter()
        .any(|suffix| word.ends_with(suffix))
}

fn is_preposition(word: &str) -> bool {
    PREPOSITIONS.contains(&word)
}

fn is_conjunction(word: &str) -> bool {
    CONJUNCTIONS.contains(&word)
}

fn is_article(word: &str) -> bool {
    ARTICLES.contains(&word)
}

/// The heuristic cascade, in evaluation order.
pub const RULES: &[TagRule] = &[
    TagRule {
        name: "personal-pronoun",
        matches: is_personal_pronoun,
        tag: pos::PRONOUN,
    },
    TagRule {
        name: "possessive-pronoun",
        matches: is_possessive_pronoun,
        tag: pos::POSSESSIVE_PRONOUN,
    },
    TagRule {
        name: "demonstrative-pronoun",
        matches: is_demonstrative_pronoun,
        tag: pos::DEMONSTRATIVE_PRONOUN,
    },
    TagRule {
        name: "be-form",
        matches: is_be_form,
        tag: pos::VERB,
    },
    TagRule {
        name: "ing-suffix",
        matches: is_ing_verb,
        tag: pos::VERB,
    },
    TagRule {
        name: "ed-suffix",
        matches: is_ed_verb,
        tag: pos::VERB,
    },
    TagRule {
        name: "modal-verb",
        matches: is_modal_verb,
        tag: pos::MODAL_VERB,
    },
    TagRule {
        name: "ly-suffix",
        matches: is_ly_adverb,
        tag: pos::ADVERB,
    },
    TagRule {
        name: "adjective-suffix",
        matches: has_adjective_suffix,
        tag: pos::ADJECTIVE,
    },
    TagRule {
        name: "preposition",
        matches: is_preposition,
        tag: pos::PREPOSITION,
    },
    TagRule {
        name: "conjunction",
        matches: is_conjunction,
        tag: pos::CONJUNCTION,
    },
    TagRule {
        name: "article",
        matches: is_article,
        tag: pos::ARTICLE,
    },
];

/// Assigns one part-of-speech tag to a word.
///
/// A dictionary entry's first meaning wins outright; the fallback table
/// is consulted next; then the heuristic cascade runs in order; nouns are
/// the default.
#[must_use]
pub fn tag_word(word: &str, entry: Option<&DictionaryEntry>) -> String {
    if let Some(tag) = entry.and_then(DictionaryEntry::primary_part_of_speech) {
        return tag.to_string();
    }
    let lower = word.to_lowercase();
    if let Some(row) = fallback::lookup(&lower) {
        return row.pos.to_string();
    }
    for rule in RULES {
        if (rule.matches)(&lower) {
            return rule.tag.to_string();
        }
    }
    pos::NOUN.to_string()
}
