//! Document analysis: chunk once, then rank and evaluate every control of every
//! requested framework, strictly in sequence.

pub mod error;


pub use error::{AnalysisError, AnalysisResult};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_CONTROL_DELAY_MS, DEFAULT_RELEVANCE_TOP_K,
    round1,
};
use crate::controls::ControlRepository;
use crate::document::{DocumentChunk, DocumentService};
use crate::evaluator::{ControlEvaluation, Evaluator};
use crate::ranking::RelevanceRanker;
use crate::report::{AnalysisResults, DocumentInfo, FrameworkResult};

/// Snapshot reported after each evaluated control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub framework: String,
    /// 1-based position within the framework.
    pub current_control: usize,
    pub total_controls: usize,
    pub control_id: String,
    /// `current_control / total_controls * 100`, rounded to one decimal.
    pub percentage: f64,
}

impl ProgressUpdate {
    pub fn new(framework: &str, current: usize, total: usize, control_id: &str) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            round1(current as f64 / total as f64 * 100.0)
        };
        Self {
            framework: framework.to_string(),
            current_control: current,
            total_controls: total,
            control_id: control_id.to_string(),
            percentage,
        }
    }
}

/// Receives progress updates during a run.
pub type ProgressSink = dyn Fn(ProgressUpdate) + Send + Sync;

/// Tuning knobs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub relevance_top_k: usize,
    /// Pause between consecutive controls.
    pub control_delay: Duration,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            relevance_top_k: DEFAULT_RELEVANCE_TOP_K,
            control_delay: Duration::from_millis(DEFAULT_CONTROL_DELAY_MS),
        }
    }
}

impl AnalyzerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            relevance_top_k: config.relevance_top_k,
            control_delay: config.control_delay,
        }
    }
}

/// Runs documents through ranking and evaluation.
pub struct ComplianceAnalyzer {
    repository: Arc<dyn ControlRepository>,
    evaluator: Arc<dyn Evaluator>,
    documents: Arc<dyn DocumentService>,
    ranker: RelevanceRanker,
    settings: AnalyzerSettings,
}

impl ComplianceAnalyzer {
    pub fn new(
        repository: Arc<dyn ControlRepository>,
        evaluator: Arc<dyn Evaluator>,
        documents: Arc<dyn DocumentService>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            repository,
            evaluator,
            documents,
            ranker: RelevanceRanker::new(settings.relevance_top_k),
            settings,
        }
    }

    pub fn repository(&self) -> &Arc<dyn ControlRepository> {
        &self.repository
    }

    pub fn documents(&self) -> &Arc<dyn DocumentService> {
        &self.documents
    }

    /// Returns `false` when running with the placeholder evaluator.
    pub fn evaluator_available(&self) -> bool {
        self.evaluator.is_available()
    }

    /// Resolves the framework list of a run: empty means every indexed framework.
    ///
    /// Fails on the first framework without an index.
    pub fn resolve_frameworks(&self, requested: &[String]) -> AnalysisResult<Vec<String>> {
        if requested.is_empty() {
            return Ok(self
                .repository
                .frameworks()
                .into_iter()
                .map(|f| f.id)
                .collect());
        }
        for framework in requested {
            if !self.repository.has_framework(framework) {
                return Err(AnalysisError::FrameworkUnavailable {
                    framework: framework.clone(),
                });
            }
        }
        Ok(requested.to_vec())
    }

    /// Extracts the document at `path` and analyses it.
    #[instrument(skip(self, progress), fields(path = %path.display()))]
    pub async fn analyze_document(
        &self,
        path: &Path,
        frameworks: &[String],
        max_controls: Option<usize>,
        progress: Option<&ProgressSink>,
    ) -> AnalysisResult<AnalysisResults> {
        let frameworks = self.resolve_frameworks(frameworks)?;
        let text = self.documents.extract_text(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.analyze_text(&filename, &text, &frameworks, max_controls, progress)
            .await
    }

    /// Analyses already-extracted text against `frameworks`.
    pub async fn analyze_text(
        &self,
        filename: &str,
        text: &str,
        frameworks: &[String],
        max_controls: Option<usize>,
        progress: Option<&ProgressSink>,
    ) -> AnalysisResult<AnalysisResults> {
        let frameworks = self.resolve_frameworks(frameworks)?;
        let chunks = self.documents.chunk_text(
            text,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        );
        info!(
            filename,
            chars = text.chars().count(),
            chunks = chunks.len(),
            frameworks = frameworks.len(),
            "Starting document analysis"
        );

        let mut results = Vec::with_capacity(frameworks.len());
        for framework in &frameworks {
            let controls = self
                .analyze_framework(text, &chunks, framework, max_controls, progress)
                .await?;
            results.push(FrameworkResult::build(framework.clone(), controls));
        }

        let document_info = DocumentInfo {
            filename: filename.to_string(),
            total_chars: text.chars().count(),
            total_chunks: chunks.len(),
        };
        Ok(AnalysisResults::new(document_info, results))
    }

    async fn analyze_framework(
        &self,
        text: &str,
        chunks: &[DocumentChunk],
        framework: &str,
        max_controls: Option<usize>,
        progress: Option<&ProgressSink>,
    ) -> AnalysisResult<Vec<ControlEvaluation>> {
        let mut controls = self.repository.list_controls(framework).await?;
        if let Some(limit) = max_controls {
            controls.truncate(limit);
        }
        let total = controls.len();
        debug!(framework, total, "Evaluating framework");

        let mut evaluations = Vec::with_capacity(total);
        for (idx, control) in controls.iter().enumerate() {
            if idx > 0 && !self.settings.control_delay.is_zero() {
                tokio::time::sleep(self.settings.control_delay).await;
            }

            let relevant = self.ranker.select(&control.text, chunks);
            let evaluation = self
                .evaluator
                .evaluate_control(text, control, &relevant)
                .await;
            evaluations.push(evaluation);

            if let Some(sink) = progress {
                sink(ProgressUpdate::new(framework, idx + 1, total, &control.id));
            }
        }

        Ok(evaluations)
    }

    /// Evaluates a single control against raw document text.
    #[instrument(skip(self, document_text))]
    pub async fn analyze_single_control(
        &self,
        document_text: &str,
        framework: &str,
        control_id: &str,
    ) -> AnalysisResult<ControlEvaluation> {
        if !self.repository.has_framework(framework) {
            return Err(AnalysisError::FrameworkUnavailable {
                framework: framework.to_string(),
            });
        }
        let control = self
            .repository
            .get_control_by_id(framework, control_id)
            .await?
            .ok_or_else(|| AnalysisError::ControlNotFound {
                framework: framework.to_string(),
                control_id: control_id.to_string(),
            })?;

        let chunks = self.documents.chunk_text(
            document_text,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        );
        let relevant = self.ranker.select(&control.text, &chunks);
        Ok(self
            .evaluator
            .evaluate_control(document_text, &control, &relevant)
            .await)
    }
}
