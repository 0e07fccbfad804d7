//! The compile entry point: runs the six phases strictly in order,
//! tracks per-phase status for display, appends to the context memory on
//! success, and keeps the analytics accumulator current on every path.

use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use semforge_lexicon::DefinitionResolver;
use shared_logging::LogLevel;

use crate::{
    analytics::{AnalyticsSnapshot, CompilerAnalytics},
    context::{ContextFrame, ContextMemory},
    intent::Intent,
    ir, optimizer,
    output::{self, DocumentParts, OutputFormat, ADVISORY_THRESHOLD, CONTEXT_WINDOW},
    semantic, syntax, tagger,
    telemetry::PipelineTelemetry,
    token::{self, Token},
};

/// Phase names and one-line descriptions, in execution order.
pub const PHASES: &[(&str, &str)] = &[
    (
        "Lexical Analysis",
        "Tokenizing and tagging with dictionary integration",
    ),
    (
        "Syntax Analysis",
        "Building clauses, intent, and dependencies",
    ),
    (
        "Semantic Analysis",
        "Extracting meaning and resolving references",
    ),
    ("IR Generation", "Projecting the knowledge graph"),
    ("Graph Optimization", "Deduplicating and pruning the graph"),
    ("Output Generation", "Rendering the structured document"),
];

/// Status of one pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Not started.
    Pending,
    /// Currently running.
    Processing,
    /// Finished successfully.
    Complete,
    /// Failed; the detail carries the message.
    Error,
}

impl PhaseStatus {
    /// Lowercase label of the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// Progress record of one phase, the contract the display layer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    /// One-based phase number.
    pub phase: usize,
    /// Phase name.
    pub name: String,
    /// Current status.
    pub status: PhaseStatus,
    /// One-line human-readable detail.
    pub detail: String,
}

/// A compilation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Input text.
    pub input: String,
    /// Requested output format.
    pub format: OutputFormat,
    /// Language tag; advisory, the rules are English-only.
    pub language: String,
}

impl CompileRequest {
    /// Creates a request with the advisory language tag `en`.
    #[must_use]
    pub fn new(input: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            format,
            language: "en".to_string(),
        }
    }

    /// Overrides the advisory language tag.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// A finished compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Compilation id.
    pub id: Uuid,
    /// Rendered document in the requested format.
    pub rendered: String,
    /// The structured document before rendering.
    pub document: serde_json::Value,
    /// Ordered phase reports.
    pub phases: Vec<PhaseReport>,
    /// Classified intent.
    pub intent: Intent,
    /// Overall confidence of the semantic phase.
    pub confidence: f32,
    /// Elapsed wall time in milliseconds.
    pub elapsed_ms: u64,
}

/// A compilation that failed inside the pipeline. Carries the phase
/// trail, terminated by a report with status `error`.
#[derive(Debug, Error)]
#[error("compilation failed in {phase}: {message}")]
pub struct CompileError {
    /// Name of the failing phase.
    pub phase: String,
    /// Failure message.
    pub message: String,
    /// Phase trail up to and including the failure.
    pub phases: Vec<PhaseReport>,
}

/// The six-phase compiler runtime.
///
/// Owns the definition resolver, the caller-supplied context memory, and
/// the analytics accumulator; optionally fans progress to telemetry.
#[derive(Debug)]
pub struct Compiler {
    resolver: DefinitionResolver,
    context: ContextMemory,
    analytics: CompilerAnalytics,
    telemetry: Option<PipelineTelemetry>,
}

impl Compiler {
    /// Creates a compiler with a fresh context memory.
    #[must_use]
    pub fn new(resolver: DefinitionResolver) -> Self {
        Self {
            resolver,
            context: ContextMemory::default(),
            analytics: CompilerAnalytics::new(),
            telemetry: None,
        }
    }

    /// Replaces the context memory, e.g. with state restored from disk.
    #[must_use]
    pub fn with_context(mut self, context: ContextMemory) -> Self {
        self.context = context;
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: PipelineTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// The context memory, for inspection and persistence.
    #[must_use]
    pub const fn context(&self) -> &ContextMemory {
        &self.context
    }

    /// Snapshot of the analytics accumulator.
    #[must_use]
    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot()
    }

    /// The full phase plan with every phase pending, for display layers
    /// that render progress before compilation starts.
    #[must_use]
    pub fn phase_plan() -> Vec<PhaseReport> {
        PHASES
            .iter()
            .enumerate()
            .map(|(i, (name, description))| PhaseReport {
                phase: i + 1,
                name: (*name).to_string(),
                status: PhaseStatus::Pending,
                detail: (*description).to_string(),
            })
            .collect()
    }

    /// Compiles one utterance.
    ///
    /// # Errors
    /// Returns a [`CompileError`] when a phase fails. Resolver failures
    /// are not errors (they degrade to fallback data), and neither is
    /// low-confidence output (reported inside the document).
    pub async fn compile(&self, request: &CompileRequest) -> Result<Compilation, CompileError> {
        let id = Uuid::new_v4();
        let started = Instant::now();
        let mut phases = Vec::new();

        self.begin(&mut phases, 1, id).await;
        let tokens = self.lexical(&request.input).await;
        let hits = tokens.iter().filter(|t| t.has_entry).count();
        #[allow(clippy::cast_precision_loss)]
        let accuracy = if tokens.is_empty() {
            0.0
        } else {
            hits as f32 / tokens.len() as f32 * 100.0
        };
        self.complete(
            &mut phases,
            format!(
                "Processed {} tokens | {} dictionary hits | POS accuracy: {accuracy:.1}%",
                tokens.len(),
                hits
            ),
            id,
        )
        .await;

        self.begin(&mut phases, 2, id).await;
        let tree = syntax::build(&tokens);
        self.complete(
            &mut phases,
            format!(
                "Intent: {} ({:.1}% confidence) | {} clause(s) | {} dependencies",
                tree.intent.label(),
                tree.intent.confidence() * 100.0,
                tree.clauses.len(),
                tree.dependencies.len()
            ),
            id,
        )
        .await;

        self.begin(&mut phases, 3, id).await;
        let semantic = semantic::build(&tree, &tokens, &self.context);
        let overall = semantic.confidence_scores.overall;
        self.complete(
            &mut phases,
            format!(
                "{} entities | {} actions | {} relationships | Confidence: {:.1}%",
                semantic.entities.len(),
                semantic.actions.len(),
                semantic.relationships.len(),
                overall * 100.0
            ),
            id,
        )
        .await;

        self.begin(&mut phases, 4, id).await;
        let graph = ir::build(&semantic);
        self.complete(
            &mut phases,
            format!("{} nodes | {} edges", graph.nodes.len(), graph.edges.len()),
            id,
        )
        .await;

        self.begin(&mut phases, 5, id).await;
        let optimized = optimizer::optimize(graph);
        self.complete(
            &mut phases,
            format!(
                "{} optimizations | Reduced {:.2}% | {} nodes final",
                optimized.optimizations_applied.len(),
                optimized.optimization_stats.reduction_percentage,
                optimized.optimization_stats.nodes_after
            ),
            id,
        )
        .await;

        self.begin(&mut phases, 6, id).await;
        let elapsed_ms = elapsed_millis(&started);
        let window = self.context.recent(CONTEXT_WINDOW);
        let resolver_chain = self.resolver.descriptor();
        let parts = DocumentParts {
            compilation_id: id,
            original_text: &request.input,
            language: &request.language,
            format: request.format,
            tokens: &tokens,
            semantic: &semantic,
            graph: &optimized,
            context_window: &window,
            resolver: &resolver_chain,
            elapsed_ms,
        };
        let document = match output::document(&parts) {
            Ok(document) => document,
            Err(err) => {
                return Err(self.fail(phases, err.to_string(), &started, id).await);
            }
        };
        let rendered = output::render(&document, request.format);
        self.complete(
            &mut phases,
            format!(
                "Generated {} output | {} bytes",
                request.format.label().to_uppercase(),
                rendered.len()
            ),
            id,
        )
        .await;

        self.context.push(ContextFrame::new(
            semantic.main_subject().map(ToString::to_string),
            semantic.main_action().map(ToString::to_string),
        ));

        let elapsed_ms = elapsed_millis(&started);
        self.analytics
            .record(elapsed_ms, overall >= ADVISORY_THRESHOLD);
        if let Some(telemetry) = &self.telemetry {
            let _ = telemetry.log(
                LogLevel::Info,
                "pipeline.completed",
                &json!({
                    "compilation_id": id,
                    "confidence": overall,
                    "elapsed_ms": elapsed_ms,
                }),
            );
            let _ = telemetry
                .event(
                    "compiler.completed",
                    json!({ "compilation_id": id, "confidence": overall }),
                )
                .await;
        }

        Ok(Compilation {
            id,
            rendered,
            document,
            phases,
            intent: semantic.intent.clone(),
            confidence: overall,
            elapsed_ms,
        })
    }

    async fn lexical(&self, input: &str) -> Vec<Token> {
        let words = token::split_words(input);
        // Lookups run concurrently; join_all keeps results in token order,
        // which the clause phase depends on.
        let entries = join_all(words.iter().map(|word| self.resolver.resolve(word))).await;
        words
            .into_iter()
            .zip(entries)
            .enumerate()
            .map(|(index, (word, entry))| {
                let pos = tagger::tag_word(word, entry.as_ref());
                Token::new(index, word, pos, entry)
            })
            .collect()
    }

    async fn begin(&self, phases: &mut Vec<PhaseReport>, number: usize, id: Uuid) {
        let (name, description) = PHASES[number - 1];
        phases.push(PhaseReport {
            phase: number,
            name: name.to_string(),
            status: PhaseStatus::Processing,
            detail: description.to_string(),
        });
        if let Some(telemetry) = &self.telemetry {
            let payload = json!({ "compilation_id": id, "phase": number, "name": name });
            let _ = telemetry.log(LogLevel::Debug, "pipeline.phase_started", &payload);
            let _ = telemetry.event("compiler.phase_started", payload).await;
        }
    }

    async fn complete(&self, phases: &mut Vec<PhaseReport>, detail: String, id: Uuid) {
        let Some(report) = phases.last_mut() else {
            return;
        };
        report.status = PhaseStatus::Complete;
        report.detail = detail;
        if let Some(telemetry) = &self.telemetry {
            let payload = json!({
                "compilation_id": id,
                "phase": report.phase,
                "name": report.name,
                "detail": report.detail,
            });
            let _ = telemetry.log(LogLevel::Info, "pipeline.phase_completed", &payload);
            let _ = telemetry.event("compiler.phase_completed", payload).await;
        }
    }

    async fn fail(
        &self,
        mut phases: Vec<PhaseReport>,
        message: String,
        started: &Instant,
        id: Uuid,
    ) -> CompileError {
        let phase_name = phases
            .last()
            .map_or_else(|| "pipeline".to_string(), |report| report.name.clone());
        if let Some(report) = phases.last_mut() {
            report.status = PhaseStatus::Error;
            report.detail = message.clone();
        }
        // Failed compilations never touch the context memory, but the
        // analytics must still count them.
        self.analytics.record_failure(elapsed_millis(started));
        if let Some(telemetry) = &self.telemetry {
            let payload = json!({
                "compilation_id": id,
                "phase": phase_name,
                "error": message,
            });
            let _ = telemetry.log(LogLevel::Error, "pipeline.failed", &payload);
            let _ = telemetry.event("compiler.failed", payload).await;
        }
        CompileError {
            phase: phase_name,
            message,
            phases,
        }
    }
}

fn elapsed_millis(started: &Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use semforge_lexicon::{DictionaryEntry, LoopbackDictionary};
    use shared_event_bus::MemoryEventBus;

    fn resolver_with(entries: &[(&str, &str, &str)]) -> DefinitionResolver {
        let mut provider = LoopbackDictionary::new();
        for (word, pos, gloss) in entries {
            provider = provider.with_entry(DictionaryEntry::simple(*word, *pos, *gloss));
        }
        DefinitionResolver::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn compiles_my_dog_runs_end_to_end() {
        let compiler = Compiler::new(resolver_with(&[(
            "runs",
            "verb",
            "moves at a speed faster than a walk",
        )]));
        let request = CompileRequest::new("My dog runs", OutputFormat::Json);
        let compilation = compiler.compile(&request).await.unwrap();

        assert!(compilation
            .phases
            .iter()
            .all(|p| p.status == PhaseStatus::Complete));
        assert_eq!(compilation.phases.len(), PHASES.len());

        let tokens = compilation.document["tokens"].as_array().unwrap();
        let tags: Vec<&str> = tokens.iter().map(|t| t["pos"].as_str().unwrap()).collect();
        assert_eq!(tags, vec!["possessive-pronoun", "noun", "verb"]);

        let semantic = &compilation.document["semantic_structure"];
        assert_eq!(semantic["entities"][0]["name"], "dog");
        assert_eq!(semantic["entities"][0]["type"], "subject");
        let entity_confidence = semantic["entities"][0]["confidence"].as_f64().unwrap();
        assert!((entity_confidence - 0.6).abs() < 1e-6);
        assert_eq!(semantic["actions"][0]["action"], "runs");

        let graph = &compilation.document["knowledge_graph"];
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
        assert!(graph["edges"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["type"] == "performs"));

        // Success leaves a frame behind for the next compilation.
        let frame = compiler.context().latest().unwrap();
        assert_eq!(frame.subject.as_deref(), Some("dog"));
        assert_eq!(frame.action.as_deref(), Some("runs"));
        assert_eq!(compiler.analytics().total_compilations, 1);
    }

    #[tokio::test]
    async fn pronoun_resolution_reads_previous_compilation() {
        let compiler = Compiler::new(resolver_with(&[("runs", "verb", "moves quickly")]));
        let first = CompileRequest::new("Mark runs", OutputFormat::Json);
        compiler.compile(&first).await.unwrap();

        let second = CompileRequest::new("He was tired", OutputFormat::Json);
        let compilation = compiler.compile(&second).await.unwrap();
        let reference = &compilation.document["semantic_structure"]["context_references"][0];
        assert_eq!(reference["refers_to"], "Mark");
        assert!((reference["confidence"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn pronoun_without_history_resolves_to_unknown() {
        let compiler = Compiler::new(DefinitionResolver::offline());
        let request = CompileRequest::new("He was tired", OutputFormat::Json);
        let compilation = compiler.compile(&request).await.unwrap();
        let reference = &compilation.document["semantic_structure"]["context_references"][0];
        assert_eq!(reference["refers_to"], "unknown");
        assert!((reference["confidence"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn clause_split_is_visible_in_phase_detail() {
        let compiler = Compiler::new(resolver_with(&[
            ("run", "verb", "move fast"),
            ("walk", "verb", "move at a regular pace"),
        ]));
        let request = CompileRequest::new("I run and you walk", OutputFormat::Json);
        let compilation = compiler.compile(&request).await.unwrap();
        assert!(compilation.phases[1].detail.contains("2 clause(s)"));
        let semantic = &compilation.document["semantic_structure"];
        assert_eq!(semantic["actions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_input_produces_a_degenerate_document() {
        let compiler = Compiler::new(DefinitionResolver::offline());
        let request = CompileRequest::new("", OutputFormat::Json);
        let compilation = compiler.compile(&request).await.unwrap();
        assert_eq!(compilation.document["metadata"]["total_words"], 0);
        assert_eq!(compilation.document["summary"]["main_subject"], "N/A");
        assert_eq!(compilation.document["error_handling"]["has_errors"], false);
        assert!(compilation
            .phases
            .iter()
            .all(|p| p.status == PhaseStatus::Complete));
    }

    #[tokio::test]
    async fn advisory_block_stays_quiet_at_the_threshold() {
        // Unresolved contributions score exactly 0.5; the advisory block
        // requires strictly less.
        let compiler = Compiler::new(DefinitionResolver::offline());
        let request = CompileRequest::new("dog chases cat", OutputFormat::Json);
        let compilation = compiler.compile(&request).await.unwrap();
        let block = &compilation.document["error_handling"];
        assert_eq!(block["has_errors"], false);
        assert!(block["error_reason"].is_null());
        assert!(block["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn yaml_and_xml_requests_render_their_formats() {
        let compiler = Compiler::new(DefinitionResolver::offline());
        let yaml = compiler
            .compile(&CompileRequest::new("My dog runs", OutputFormat::Yaml))
            .await
            .unwrap();
        assert!(yaml.rendered.starts_with("metadata:"));
        let xml = compiler
            .compile(&CompileRequest::new("My dog runs", OutputFormat::Xml))
            .await
            .unwrap();
        assert!(xml.rendered.starts_with("<?xml version=\"1.0\""));
        assert!(xml.rendered.ends_with("</compilation>"));
    }

    #[tokio::test]
    async fn context_memory_stays_bounded_across_compilations() {
        let compiler = Compiler::new(DefinitionResolver::offline());
        for i in 0..7 {
            let request = CompileRequest::new(format!("robot{i} is here"), OutputFormat::Json);
            compiler.compile(&request).await.unwrap();
        }
        assert_eq!(compiler.context().len(), 5);
    }

    #[tokio::test]
    async fn telemetry_receives_phase_events() {
        let bus = Arc::new(MemoryEventBus::new(64));
        let telemetry = PipelineTelemetry::builder("compiler")
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        let compiler = Compiler::new(DefinitionResolver::offline()).with_telemetry(telemetry);
        compiler
            .compile(&CompileRequest::new("My dog runs", OutputFormat::Json))
            .await
            .unwrap();
        let kinds: Vec<String> = bus.backlog().iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&"compiler.phase_started".to_string()));
        assert!(kinds.contains(&"compiler.phase_completed".to_string()));
        assert!(kinds.contains(&"compiler.completed".to_string()));
    }

    #[test]
    fn phase_plan_lists_all_phases_pending() {
        let plan = Compiler::phase_plan();
        assert_eq!(plan.len(), 6);
        assert!(plan.iter().all(|p| p.status == PhaseStatus::Pending));
        assert_eq!(plan[0].name, "Lexical Analysis");
    }
}
