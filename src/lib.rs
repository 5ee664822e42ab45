//! Gapcheck library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by concern:
//!
//! ## Pipeline
//! - [`ComplianceAnalyzer`] - Chunk, rank and evaluate a document, framework by framework
//! - [`Evaluator`], [`CascadeEvaluator`], [`PlaceholderEvaluator`] - Per-control scoring
//! - [`RelevanceRanker`] - Lexical chunk selection per control
//! - [`AnalysisResults`], [`FrameworkResult`], [`ReportSummary`] - Aggregated output
//!
//! ## Jobs
//! - [`JobManager`] - The `uploaded -> processing -> completed | failed` state machine
//! - [`JobStore`], [`FileJobStore`], [`MemoryJobStore`] - Durable job records
//!
//! ## Collaborators
//! - [`ControlRepository`], [`StaticControlRepository`] - Framework controls
//! - [`DocumentService`], [`PlainTextDocuments`] - Text extraction and chunking
//! - [`CompletionService`], [`GenaiCompletion`] - Tiered language-model calls
//!
//! ## Wiring
//! - [`Config`], [`ConfigError`] - Environment configuration
//! - [`ComplianceContext`] - Process-wide services built once at startup
//!
//! ## Test/Mock Support
//! [`ScriptedCompletion`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analyzer;
pub mod config;
pub mod constants;
pub mod context;
pub mod controls;
pub mod document;
pub mod evaluator;
pub mod gateway;
pub mod jobs;
pub mod llm;
pub mod ranking;
pub mod report;

pub use analyzer::{
    AnalysisError, AnalysisResult, AnalyzerSettings, ComplianceAnalyzer, ProgressSink,
    ProgressUpdate,
};
pub use config::{Config, ConfigError};
pub use context::{ComplianceContext, ContextError};
pub use controls::{
    Control, ControlMeta, ControlRepository, FrameworkInfo, FrameworkOutline, HierarchyShape,
    RepositoryError, SearchHit, StaticControlRepository,
};
pub use document::{
    DocumentChunk, DocumentError, DocumentService, DocumentStats, PlainTextDocuments, chunk_text,
    document_stats,
};
pub use evaluator::{
    CascadeEvaluator, ComplianceStatus, ControlEvaluation, Evaluator, PlaceholderEvaluator,
    Priority, Recommendation, RiskLevel, build_evaluator,
};
pub use jobs::{
    EvaluationStart, FileJobStore, Job, JobError, JobManager, JobStatus, JobStore,
    MemoryJobStore, PersistenceMirror, StoreError,
};
#[cfg(any(test, feature = "mock"))]
pub use llm::ScriptedCompletion;
pub use llm::{CompletionError, CompletionService, GenaiCompletion, ModelTier, RetryPolicy};
pub use ranking::RelevanceRanker;
pub use report::{
    AnalysisResults, DocumentInfo, FrameworkResult, FrameworkStatistics, FrameworkStructure,
    ReportSummary, ScoreLabel, summarize,
};
