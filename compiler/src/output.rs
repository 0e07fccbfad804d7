//! Output generation: assembles the canonical structured document and
//! renders it as JSON, a line-oriented indented key:value format, or an
//! element-per-key markup format.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    context::ContextFrame,
    optimizer::OptimizedGraph,
    semantic::SemanticGraph,
    token::Token,
};

/// Overall confidence below which the advisory error block is raised.
pub const ADVISORY_THRESHOLD: f32 = 0.5;
/// Reason reported in the advisory error block.
pub const LOW_CONFIDENCE_REASON: &str = "Low confidence in parsing";
/// Remediation hints reported in the advisory error block.
pub const SUGGESTIONS: &[&str] = &["Try simpler sentence structure", "Check spelling"];
/// Context frames embedded in the document.
pub const CONTEXT_WINDOW: usize = 3;
/// Root element of the markup rendering.
pub const MARKUP_ROOT: &str = "compilation";

/// Requested rendering of the structured document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Line-oriented indented key:value format.
    Yaml,
    /// Element-per-key markup format.
    Xml,
}

impl OutputFormat {
    /// Parses a format request leniently; unrecognized requests fall
    /// back to the structured-document (JSON) form.
    #[must_use]
    pub fn parse(request: &str) -> Self {
        match request.to_lowercase().as_str() {
            "yaml" => Self::Yaml,
            "xml" => Self::Xml,
            _ => Self::Json,
        }
    }

    /// Lowercase label of the format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Everything the document assembler needs from the pipeline.
#[derive(Debug)]
pub struct DocumentParts<'a> {
    /// Compilation id.
    pub compilation_id: Uuid,
    /// Original input text.
    pub original_text: &'a str,
    /// Advisory language tag from the request.
    pub language: &'a str,
    /// Requested output format.
    pub format: OutputFormat,
    /// Tagged token stream.
    pub tokens: &'a [Token],
    /// Semantic structure.
    pub semantic: &'a SemanticGraph,
    /// Optimized knowledge graph.
    pub graph: &'a OptimizedGraph,
    /// Trailing context window, oldest first.
    pub context_window: &'a [ContextFrame],
    /// Resolver chain descriptor.
    pub resolver: &'a str,
    /// Elapsed compilation time in milliseconds.
    pub elapsed_ms: u64,
}

fn round3(value: f32) -> f64 {
    (f64::from(value) * 1000.0).round() / 1000.0
}

/// Assembles the canonical structured document.
///
/// # Errors
/// Returns a serialization error if any component cannot be represented
/// as a JSON value.
pub fn document(parts: &DocumentParts<'_>) -> Result<Value, serde_json::Error> {
    let overall = parts.semantic.confidence_scores.overall;
    let has_errors = overall < ADVISORY_THRESHOLD;

    let tokens: Vec<Value> = parts
        .tokens
        .iter()
        .map(|token| {
            json!({
                "word": token.text,
                "pos": token.pos,
                "definition": token.definition,
                "synonyms": token.synonyms,
            })
        })
        .collect();

    Ok(json!({
        "metadata": {
            "compiler_version": env!("CARGO_PKG_VERSION"),
            "compilation_id": parts.compilation_id,
            "timestamp": Utc::now().to_rfc3339(),
            "source_language": parts.language,
            "target_format": parts.format.label(),
            "total_words": parts.tokens.len(),
            "dictionary_source": parts.resolver,
            "compilation_time_ms": parts.elapsed_ms,
            "confidence_score": round3(overall),
        },
        "original_text": parts.original_text,
        "intent": serde_json::to_value(&parts.semantic.intent)?,
        "tokens": tokens,
        "semantic_structure": serde_json::to_value(parts.semantic)?,
        "knowledge_graph": serde_json::to_value(parts.graph)?,
        "context_memory": serde_json::to_value(parts.context_window)?,
        "summary": {
            "main_subject": parts.semantic.main_subject().unwrap_or("N/A"),
            "main_action": parts.semantic.main_action().unwrap_or("N/A"),
            "entity_count": parts.semantic.entities.len(),
            "relationship_count": parts.semantic.relationships.len(),
            "confidence": format!("{:.1}%", overall * 100.0),
        },
        "error_handling": {
            "has_errors": has_errors,
            "error_reason": if has_errors {
                Value::String(LOW_CONFIDENCE_REASON.to_string())
            } else {
                Value::Null
            },
            "suggestions": if has_errors { SUGGESTIONS.to_vec() } else { Vec::new() },
        },
    }))
}

/// Renders the document in the requested format.
#[must_use]
pub fn render(document: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
        }
        OutputFormat::Yaml => render_yaml(document),
        OutputFormat::Xml => render_xml(document),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Renders an object as the indented key:value format.
#[must_use]
pub fn render_yaml(value: &Value) -> String {
    let mut out = String::new();
    if let Some(object) = value.as_object() {
        for (key, entry) in object {
            yaml_entry(&mut out, key, entry, 0);
        }
    }
    out
}

fn yaml_entry(out: &mut String, key: &str, value: &Value, indent: usize) {
    let spaces = "  ".repeat(indent);
    match value {
        Value::Object(object) => {
            out.push_str(&format!("{spaces}{key}:\n"));
            for (child_key, child) in object {
                yaml_entry(out, child_key, child, indent + 1);
            }
        }
        Value::Array(items) => {
            out.push_str(&format!("{spaces}{key}:\n"));
            for item in items {
                if let Some(object) = item.as_object() {
                    out.push_str(&format!("{spaces}  -\n"));
                    for (child_key, child) in object {
                        yaml_entry(out, child_key, child, indent + 2);
                    }
                } else {
                    out.push_str(&format!("{spaces}  - {}\n", scalar_text(item)));
                }
            }
        }
        scalar => out.push_str(&format!("{spaces}{key}: {}\n", scalar_text(scalar))),
    }
}

/// Restricts a key to `[A-Za-z0-9_]`, replacing other characters.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the document as the element-per-key markup format.
#[must_use]
pub fn render_xml(document: &Value) -> String {
    let mut out = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<{MARKUP_ROOT}>\n");
    if let Some(object) = document.as_object() {
        for (key, value) in object {
            xml_entry(&mut out, key, value, 1);
        }
    }
    out.push_str(&format!("</{MARKUP_ROOT}>"));
    out
}

fn xml_entry(out: &mut String, key: &str, value: &Value, indent: usize) {
    let spaces = "  ".repeat(indent);
    let tag = sanitize_key(key);
    match value {
        Value::Null => out.push_str(&format!("{spaces}<{tag}/>\n")),
        Value::Object(object) => {
            out.push_str(&format!("{spaces}<{tag}>\n"));
            for (child_key, child) in object {
                xml_entry(out, child_key, child, indent + 1);
            }
            out.push_str(&format!("{spaces}</{tag}>\n"));
        }
        Value::Array(items) => {
            out.push_str(&format!("{spaces}<{tag}>\n"));
            for item in items {
                if let Some(object) = item.as_object() {
                    out.push_str(&format!("{spaces}  <item>\n"));
                    for (child_key, child) in object {
                        xml_entry(out, child_key, child, indent + 2);
                    }
                    out.push_str(&format!("{spaces}  </item>\n"));
                } else {
                    out.push_str(&format!(
                        "{spaces}  <item>{}</item>\n",
                        escape_text(&scalar_text(item))
                    ));
                }
            }
            out.push_str(&format!("{spaces}</{tag}>\n"));
        }
        scalar => out.push_str(&format!(
            "{spaces}<{tag}>{}</{tag}>\n",
            escape_text(&scalar_text(scalar))
        )),
    }
}
