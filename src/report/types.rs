use serde::{Deserialize, Serialize};

use super::statistics::{FrameworkStatistics, compute_statistics};
use super::structure::{FrameworkStructure, build_structure};
use super::summary::{ReportSummary, summarize};
use crate::evaluator::ControlEvaluation;

/// Metadata about the analysed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub total_chars: usize,
    pub total_chunks: usize,
}

/// All evaluations of one framework plus their rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkResult {
    pub framework: String,
    pub total_controls: usize,
    pub controls: Vec<ControlEvaluation>,
    pub statistics: FrameworkStatistics,
    pub structure: FrameworkStructure,
}

impl FrameworkResult {
    /// Aggregates evaluations, kept in the order given.
    pub fn build(framework: impl Into<String>, controls: Vec<ControlEvaluation>) -> Self {
        let framework = framework.into();
        let statistics = compute_statistics(&controls);
        let structure = build_structure(&framework, &controls);
        Self {
            total_controls: controls.len(),
            framework,
            controls,
            statistics,
            structure,
        }
    }

    pub fn control(&self, control_id: &str) -> Option<&ControlEvaluation> {
        self.controls.iter().find(|c| c.control_id == control_id)
    }
}

/// Final output of a document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub document_info: DocumentInfo,
    pub frameworks: Vec<FrameworkResult>,
    pub summary: ReportSummary,
}

impl AnalysisResults {
    /// Builds the results and their summary.
    pub fn new(document_info: DocumentInfo, frameworks: Vec<FrameworkResult>) -> Self {
        let summary = summarize(&frameworks);
        Self {
            document_info,
            frameworks,
            summary,
        }
    }

    pub fn framework(&self, framework: &str) -> Option<&FrameworkResult> {
        self.frameworks.iter().find(|f| f.framework == framework)
    }
}
