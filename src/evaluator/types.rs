use serde::{Deserialize, Serialize};

use super::stages::{FinalAssessment, GapAnalysis, RelevanceCheck};
use crate::constants::{BAND_MINIMAL, BAND_MOSTLY, BAND_PARTIAL, MAX_SCORE};
use crate::controls::ControlMeta;

/// Compliance level of a control, derived from its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    FullyCompliant,
    MostlyCompliant,
    PartiallyCompliant,
    MinimallyCompliant,
    NonCompliant,
    /// Placeholder status of mock evaluations. Never produced by [`ComplianceStatus::band`].
    NotEvaluated,
}

impl ComplianceStatus {
    /// Maps a score in `[0, 100]` to its status band.
    ///
    /// `100` is fully compliant; `[75,100)` mostly; `[50,75)` partially;
    /// `[25,50)` minimally; anything lower is non-compliant.
    pub fn band(score: f64) -> Self {
        if score >= MAX_SCORE {
            ComplianceStatus::FullyCompliant
        } else if score >= BAND_MOSTLY {
            ComplianceStatus::MostlyCompliant
        } else if score >= BAND_PARTIAL {
            ComplianceStatus::PartiallyCompliant
        } else if score >= BAND_MINIMAL {
            ComplianceStatus::MinimallyCompliant
        } else {
            ComplianceStatus::NonCompliant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::FullyCompliant => "fully_compliant",
            ComplianceStatus::MostlyCompliant => "mostly_compliant",
            ComplianceStatus::PartiallyCompliant => "partially_compliant",
            ComplianceStatus::MinimallyCompliant => "minimally_compliant",
            ComplianceStatus::NonCompliant => "non_compliant",
            ComplianceStatus::NotEvaluated => "not_evaluated",
        }
    }
}

/// Qualitative severity of a control's gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Parses a model-supplied label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Priority of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    /// Missing or unrecognised priority.
    #[serde(other)]
    Unspecified,
}

impl Priority {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unspecified,
        }
    }

    /// Sort key: critical first, unspecified last.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Unspecified => 4,
        }
    }

    /// Critical and high recommendations make it into report summaries.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::Critical | Priority::High)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFinding {
    pub finding: String,
    /// `strength`, `weakness` or `gap` as reported by the model.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Raw per-stage payloads, kept for auditability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<RelevanceCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_analysis: Option<GapAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_scoring: Option<FinalAssessment>,
}

/// Outcome of evaluating one control.
///
/// `compliance_status` always equals `ComplianceStatus::band(final_score)`, except for
/// mock evaluations which carry [`ComplianceStatus::NotEvaluated`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEvaluation {
    pub control_id: String,
    pub control_text: String,
    pub control_meta: ControlMeta,
    pub final_score: f64,
    pub compliance_status: ComplianceStatus,
    pub confidence: f64,
    pub score_justification: String,
    #[serde(default)]
    pub key_findings: Vec<KeyFinding>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub evidence_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub skipped_deeper_analysis: bool,
    #[serde(default)]
    pub mock: bool,
    #[serde(default)]
    pub stages: StageTrace,
}

/// Clamps a model score into `[0, 100]` (NaN becomes 0).
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// Clamps a confidence into `[0, 1]` (NaN becomes 0).
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
