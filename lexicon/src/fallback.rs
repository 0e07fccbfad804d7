use crate::entry::DictionaryEntry;

/// One row of the static fallback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackWord {
    /// Lowercased headword.
    pub word: &'static str,
    /// Part-of-speech tag assigned to the word.
    pub pos: &'static str,
    /// Finer-grained class (personal, auxiliary, coordinating, ...).
    pub subtype: &'static str,
    /// Short gloss used as the definition text.
    pub gloss: &'static str,
}

/// Function words covered without any external lookup: pronouns,
/// auxiliary and modal verbs, articles, and the coordinating, causal,
/// temporal, and conditional conjunctions.
pub const FALLBACK_WORDS: &[FallbackWord] = &[
    FallbackWord {
        word: "my",
        pos: "possessive-pronoun",
        subtype: "possessive",
        gloss: "belonging to me",
    },
    FallbackWord {
        word: "i",
        pos: "pronoun",
        subtype: "personal",
        gloss: "the speaker or writer",
    },
    FallbackWord {
        word: "you",
        pos: "pronoun",
        subtype: "personal",
        gloss: "the person being addressed",
    },
    FallbackWord {
        word: "is",
        pos: "verb",
        subtype: "auxiliary",
        gloss: "third person singular present of be",
    },
    FallbackWord {
        word: "are",
        pos: "verb",
        subtype: "auxiliary",
        gloss: "second person singular and plural present of be",
    },
    FallbackWord {
        word: "am",
        pos: "verb",
        subtype: "auxiliary",
        gloss: "first person singular present of be",
    },
    FallbackWord {
        word: "was",
        pos: "verb",
        subtype: "auxiliary",
        gloss: "past tense of be",
    },
    FallbackWord {
        word: "were",
        pos: "verb",
        subtype: "auxiliary",
        gloss: "past tense plural of be",
    },
    FallbackWord {
        word: "the",
        pos: "article",
        subtype: "definite",
        gloss: "denoting a specific item",
    },
    FallbackWord {
        word: "a",
        pos: "article",
        subtype: "indefinite",
        gloss: "used before singular nouns",
    },
    FallbackWord {
        word: "an",
        pos: "article",
        subtype: "indefinite",
        gloss: "used before words starting with vowel sounds",
    },
    FallbackWord {
        word: "and",
        pos: "conjunction",
        subtype: "coordinating",
        gloss: "connecting words or clauses",
    },
    FallbackWord {
        word: "but",
        pos: "conjunction",
        subtype: "coordinating",
        gloss: "used to introduce a contrasting statement",
    },
    FallbackWord {
        word: "or",
        pos: "conjunction",
        subtype: "coordinating",
        gloss: "used to link alternatives",
    },
    FallbackWord {
        word: "if",
        pos: "conjunction",
        subtype: "conditional",
        gloss: "introducing a conditional clause",
    },
    FallbackWord {
        word: "when",
        pos: "conjunction",
        subtype: "temporal",
        gloss: "at what time",
    },
    FallbackWord {
        word: "because",
        pos: "conjunction",
        subtype: "causal",
        gloss: "for the reason that",
    },
    FallbackWord {
        word: "can",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "be able to",
    },
    FallbackWord {
        word: "could",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "past of can",
    },
    FallbackWord {
        word: "will",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "expressing the future tense",
    },
    FallbackWord {
        word: "would",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "past of will",
    },
    FallbackWord {
        word: "shall",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "expressing an instruction or intention",
    },
    FallbackWord {
        word: "should",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "used to indicate obligation",
    },
    FallbackWord {
        word: "may",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "expressing possibility",
    },
    FallbackWord {
        word: "might",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "past of may",
    },
    FallbackWord {
        word: "must",
        pos: "modal-verb",
        subtype: "modal",
        gloss: "be obliged to",
    },
];

/// Looks up a word in the fallback table, case-insensitively.
#[must_use]
pub fn lookup(word: &str) -> Option<&'static FallbackWord> {
    FALLBACK_WORDS
        .iter()
        .find(|row| row.word.eq_ignore_ascii_case(word))
}

/// Builds a dictionary entry from the fallback table, if the word is covered.
#[must_use]
pub fn entry_for(word: &str) -> Option<DictionaryEntry> {
    lookup(word).map(|row| DictionaryEntry::simple(row.word, row.pos, row.gloss))
}
