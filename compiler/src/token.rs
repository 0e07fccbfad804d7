use regex::Regex;
use semforge_lexicon::DictionaryEntry;
use serde::{Deserialize, Serialize};

/// Definition text used when no dictionary source covers a word.
pub const NO_DEFINITION: &str = "No definition available";

/// Canonical part-of-speech tag strings produced by the rule cascade.
/// Dictionary-sourced tags are kept verbatim and may fall outside this set.
pub mod pos {
    /// Default tag.
    pub const NOUN: &str = "noun";
    /// Main verbs, including copula forms.
    pub const VERB: &str = "verb";
    /// Modal auxiliaries.
    pub const MODAL_VERB: &str = "modal-verb";
    /// Personal pronouns.
    pub const PRONOUN: &str = "pronoun";
    /// Possessive pronouns.
    pub const POSSESSIVE_PRONOUN: &str = "possessive-pronoun";
    /// Demonstrative pronouns.
    pub const DEMONSTRATIVE_PRONOUN: &str = "demonstrative-pronoun";
    /// Adjectives.
    pub const ADJECTIVE: &str = "adjective";
    /// Adverbs.
    pub const ADVERB: &str = "adverb";
    /// Prepositions.
    pub const PREPOSITION: &str = "preposition";
    /// Conjunctions.
    pub const CONJUNCTION: &str = "conjunction";
    /// Articles.
    pub const ARTICLE: &str = "article";
}

/// One word of the input, immutable after the lexical phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Zero-based position in the input.
    pub index: usize,
    /// Surface text.
    pub text: String,
    /// Lowercased surface text.
    pub lowercase: String,
    /// Part-of-speech tag.
    pub pos: String,
    /// Resolved dictionary entry, if any source covered the word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<DictionaryEntry>,
    /// Definition text of the primary sense.
    pub definition: String,
    /// Synonyms of the primary meaning.
    pub synonyms: Vec<String>,
    /// Whether any dictionary source covered the word.
    pub has_entry: bool,
}

impl Token {
    /// Builds a token from a word, its tag, and its resolved entry.
    #[must_use]
    pub fn new(index: usize, text: &str, pos: String, entry: Option<DictionaryEntry>) -> Self {
        let definition = entry
            .as_ref()
            .and_then(DictionaryEntry::primary_definition)
            .unwrap_or(NO_DEFINITION)
            .to_string();
        let synonyms = entry
            .as_ref()
            .map(DictionaryEntry::primary_synonyms)
            .unwrap_or_default();
        Self {
            index,
            text: text.to_string(),
            lowercase: text.to_lowercase(),
            pos,
            has_entry: entry.is_some(),
            entry,
            definition,
            synonyms,
        }
    }
}

/// Splits input into word runs. Punctuation and whitespace separate words
/// and are not carried into the token stream.
#[must_use]
pub fn split_words(input: &str) -> Vec<&str> {
    let word = Regex::new(r"\w+").unwrap();
    word.find_iter(input).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_drops_punctuation() {
        assert_eq!(split_words("My dog, runs!"), vec!["My", "dog", "runs"]);
    }

    #[test]
    fn split_words_handles_empty_input() {
        assert!(split_words("").is_empty());
        assert!(split_words("  ...  ").is_empty());
    }

    #[test]
    fn token_without_entry_gets_placeholder_definition() {
        let token = Token::new(0, "Dog", pos::NOUN.to_string(), None);
        assert_eq!(token.lowercase, "dog");
        assert_eq!(token.definition, NO_DEFINITION);
        assert!(!token.has_entry);
        assert!(token.synonyms.is_empty());
    }

    #[test]
    fn token_with_entry_carries_primary_sense() {
        let mut entry = DictionaryEntry::simple("run", "verb", "move at speed");
        entry.meanings[0].synonyms = vec!["sprint".into()];
        let token = Token::new(2, "runs", pos::VERB.to_string(), Some(entry));
        assert!(token.has_entry);
        assert_eq!(token.definition, "move at speed");
        assert_eq!(token.synonyms, vec!["sprint".to_string()]);
    }
}
