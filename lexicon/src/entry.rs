use serde::{Deserialize, Serialize};

/// Definitions kept per meaning when normalizing a provider entry.
pub const MAX_MEANING_DEFINITIONS: usize = 2;
/// Synonyms kept per meaning when normalizing a provider entry.
pub const MAX_MEANING_SYNONYMS: usize = 3;

/// One sense of a meaning: a definition with an optional usage example.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionSense {
    /// Definition text.
    pub definition: String,
    /// Usage example, when the source supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// One meaning of a headword: a part of speech with its senses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meaning {
    /// Part of speech reported by the source, kept verbatim.
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: String,
    /// Definition senses, ordered as reported.
    pub definitions: Vec<DefinitionSense>,
    /// Synonyms, ordered as reported.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// A dictionary entry as consumed by the compiler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The looked-up word.
    pub headword: String,
    /// Phonetic transcription, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    /// Meanings, ordered as reported. The first meaning drives tagging.
    pub meanings: Vec<Meaning>,
    /// Etymological origin, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl DictionaryEntry {
    /// Creates an entry with a single meaning and no phonetic/origin data.
    #[must_use]
    pub fn simple(
        headword: impl Into<String>,
        part_of_speech: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            headword: headword.into(),
            phonetic: None,
            meanings: vec![Meaning {
                part_of_speech: part_of_speech.into(),
                definitions: vec![DefinitionSense {
                    definition: definition.into(),
                    example: None,
                }],
                synonyms: Vec::new(),
            }],
            origin: None,
        }
    }

    /// Truncates every meaning to the kept number of definitions and synonyms.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for meaning in &mut self.meanings {
            meaning.definitions.truncate(MAX_MEANING_DEFINITIONS);
            meaning.synonyms.truncate(MAX_MEANING_SYNONYMS);
        }
        self
    }

    /// Part of speech of the first meaning, if any.
    #[must_use]
    pub fn primary_part_of_speech(&self) -> Option<&str> {
        self.meanings
            .first()
            .map(|meaning| meaning.part_of_speech.as_str())
    }

    /// Definition text of the first sense of the first meaning, if any.
    #[must_use]
    pub fn primary_definition(&self) -> Option<&str> {
        self.meanings
            .first()
            .and_then(|meaning| meaning.definitions.first())
            .map(|sense| sense.definition.as_str())
    }

    /// Synonyms of the first meaning.
    #[must_use]
    pub fn primary_synonyms(&self) -> Vec<String> {
        self.meanings
            .first()
            .map(|meaning| meaning.synonyms.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_entry() -> DictionaryEntry {
        DictionaryEntry {
            headword: "run".into(),
            phonetic: Some("/rʌn/".into()),
            meanings: vec![Meaning {
                part_of_speech: "verb".into(),
                definitions: (0..4)
                    .map(|i| DefinitionSense {
                        definition: format!("sense {i}"),
                        example: None,
                    })
                    .collect(),
                synonyms: vec!["sprint".into(), "jog".into(), "dash".into(), "race".into()],
            }],
            origin: None,
        }
    }

    #[test]
    fn normalization_truncates_definitions_and_synonyms() {
        let entry = wide_entry().normalized();
        let meaning = &entry.meanings[0];
        assert_eq!(meaning.definitions.len(), MAX_MEANING_DEFINITIONS);
        assert_eq!(meaning.synonyms.len(), MAX_MEANING_SYNONYMS);
    }

    #[test]
    fn primary_accessors_use_first_meaning() {
        let entry = wide_entry();
        assert_eq!(entry.primary_part_of_speech(), Some("verb"));
        assert_eq!(entry.primary_definition(), Some("sense 0"));
        assert_eq!(entry.primary_synonyms().len(), 4);
    }

    #[test]
    fn meaning_serializes_with_camel_case_pos() {
        let entry = DictionaryEntry::simple("dog", "noun", "a domesticated canid");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"partOfSpeech\":\"noun\""));
        assert!(!json.contains("phonetic"));
    }
}
