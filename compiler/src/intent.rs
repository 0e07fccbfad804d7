//! Discourse intent classification over the whole token sequence.
//!
//! Rules run in a fixed order and the first match wins. Confidence is a
//! rule-intrinsic constant, not a computed score.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Confidence assigned to arithmetic intents.
pub const MATH_CONFIDENCE: f32 = 0.95;
/// Confidence assigned to questions.
pub const QUESTION_CONFIDENCE: f32 = 0.9;
/// Confidence assigned to commands.
pub const COMMAND_CONFIDENCE: f32 = 0.85;
/// Confidence assigned to declarative statements.
pub const STATEMENT_CONFIDENCE: f32 = 0.8;
/// Confidence assigned when no rule matches.
pub const UNKNOWN_CONFIDENCE: f32 = 0.5;

/// Discourse intent of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Arithmetic request naming an operation and at least one digit.
    MathOperation {
        /// Operation keyword (addition, subtraction, ...).
        operation: String,
        /// Rule-intrinsic confidence.
        confidence: f32,
    },
    /// Leading wh-word question.
    Question {
        /// The wh-word that triggered the rule.
        subtype: String,
        /// Rule-intrinsic confidence.
        confidence: f32,
    },
    /// Leading imperative verb.
    Command {
        /// Command class.
        action: String,
        /// Rule-intrinsic confidence.
        confidence: f32,
    },
    /// Copula somewhere in the utterance.
    Statement {
        /// Statement class.
        subtype: String,
        /// Rule-intrinsic confidence.
        confidence: f32,
    },
    /// No rule matched.
    Unknown {
        /// Rule-intrinsic confidence.
        confidence: f32,
    },
}

impl Intent {
    /// Rule-intrinsic confidence of this intent.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        match self {
            Self::MathOperation { confidence, .. }
            | Self::Question { confidence, .. }
            | Self::Command { confidence, .. }
            | Self::Statement { confidence, .. }
            | Self::Unknown { confidence } => *confidence,
        }
    }

    /// Type tag as it appears in serialized output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MathOperation { .. } => "math_operation",
            Self::Question { .. } => "question",
            Self::Command { .. } => "command",
            Self::Statement { .. } => "statement",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// One classification rule: a name and an evaluator returning an intent
/// when the rule applies to the joined, lowercased utterance.
#[derive(Clone, Copy)]
pub struct IntentRule {
    /// Rule name, for inspection and tests.
    pub name: &'static str,
    /// Evaluator over the joined lowercased text.
    pub eval: fn(&str) -> Option<Intent>,
}

const MATH_OPERATIONS: &[(&str, &str)] = &[
    ("addition", r"add|sum|plus|\+"),
    ("subtraction", r"subtract|minus|-"),
    ("multiplication", r"multiply|times|\*"),
    ("division", r"divide|divided by|/"),
];

fn eval_math(text: &str) -> Option<Intent> {
    let digit = Regex::new(r"\d").unwrap();
    if !digit.is_match(text) {
        return None;
    }
    for (operation, pattern) in MATH_OPERATIONS {
        if Regex::new(pattern).unwrap().is_match(text) {
            return Some(Intent::MathOperation {
                operation: (*operation).to_string(),
                confidence: MATH_CONFIDENCE,
            });
        }
    }
    None
}

fn eval_question(text: &str) -> Option<Intent> {
    let leading = Regex::new(r"^(what|who|where|when|why|how|which)").unwrap();
    if leading.is_match(text) {
        let subtype = text.split(' ').next().unwrap_or_default().to_string();
        return Some(Intent::Question {
            subtype,
            confidence: QUESTION_CONFIDENCE,
        });
    }
    None
}

fn eval_command(text: &str) -> Option<Intent> {
    let leading = Regex::new(r"^(create|make|build|generate|write|develop)").unwrap();
    if leading.is_match(text) {
        return Some(Intent::Command {
            action: "create".to_string(),
            confidence: COMMAND_CONFIDENCE,
        });
    }
    None
}

fn eval_statement(text: &str) -> Option<Intent> {
    let copula = Regex::new(r"is|are|am|was|were").unwrap();
    if copula.is_match(text) {
        return Some(Intent::Statement {
            subtype: "declarative".to_string(),
            confidence: STATEMENT_CONFIDENCE,
        });
    }
    None
}

/// The classification rules, in evaluation order.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        name: "math-operation",
        eval: eval_math,
    },
    IntentRule {
        name: "question",
        eval: eval_question,
    },
    IntentRule {
        name: "command",
        eval: eval_command,
    },
    IntentRule {
        name: "statement",
        eval: eval_statement,
    },
];

/// Classifies the token sequence; the first matching rule wins.
#[must_use]
pub fn classify(tokens: &[Token]) -> Intent {
    let text = tokens
        .iter()
        .map(|token| token.lowercase.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    for rule in RULES {
        if let Some(intent) = (rule.eval)(&text) {
            return intent;
        }
    }
    Intent::Unknown {
        confidence: UNKNOWN_CONFIDENCE,
    }
}
