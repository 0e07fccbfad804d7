#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Six-phase natural language compiler: lexical tagging, clause
//! construction with dependency extraction, semantic graph construction
//! with cross-utterance reference resolution, IR generation, graph
//! optimization, and multi-format serialization.

/// Running success/latency accounting.
pub mod analytics;
/// Rolling cross-compilation memory.
pub mod context;
/// Typed head→dependent relation extraction.
pub mod dependency;
/// Discourse intent classification.
pub mod intent;
/// Knowledge graph projection.
pub mod ir;
/// Graph deduplication and pruning.
pub mod optimizer;
/// Document assembly and rendering.
pub mod output;
/// The compile entry point and phase orchestration.
pub mod pipeline;
/// Entity/action/relationship extraction.
pub mod semantic;
/// Clause construction and the parse tree.
pub mod syntax;
/// Part-of-speech rule cascade.
pub mod tagger;
/// Telemetry fan-out for logs and progress events.
pub mod telemetry;
/// Tokens and tokenization.
pub mod token;

pub use analytics::{AnalyticsSnapshot, CompilerAnalytics};
pub use context::{ContextFrame, ContextMemory, CONTEXT_CAPACITY};
pub use dependency::Dependency;
pub use intent::Intent;
pub use ir::{IrEdge, IrGraph, IrNode, NodeKind};
pub use optimizer::{OptimizationStats, OptimizedGraph};
pub use output::OutputFormat;
pub use pipeline::{
    Compilation, CompileError, CompileRequest, Compiler, PhaseReport, PhaseStatus,
};
pub use semantic::SemanticGraph;
pub use syntax::{Clause, ParseTree};
pub use telemetry::{PipelineTelemetry, PipelineTelemetryBuilder};
pub use token::Token;
