use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::label::ScoreLabel;
use crate::constants::{NEEDS_ATTENTION_BELOW, round1};
use crate::evaluator::{ComplianceStatus, ControlEvaluation};

/// Histogram key for evaluations without a risk level.
pub const UNKNOWN_RISK: &str = "unknown";

/// Error recorded on statistics over an empty control list.
pub const NO_CONTROLS_EVALUATED: &str = "No controls evaluated";

/// Per-framework rollup of control evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkStatistics {
    pub total_controls: usize,
    /// Mean score, rounded to one decimal. `0` when there are no controls.
    pub average_score: f64,
    pub overall_compliance: ScoreLabel,
    pub status_breakdown: BTreeMap<String, usize>,
    pub risk_breakdown: BTreeMap<String, usize>,
    pub fully_compliant_count: usize,
    pub non_compliant_count: usize,
    /// Controls scoring strictly below 50.
    pub needs_attention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Computes statistics for one framework's evaluations.
pub fn compute_statistics(controls: &[ControlEvaluation]) -> FrameworkStatistics {
    if controls.is_empty() {
        return FrameworkStatistics {
            total_controls: 0,
            average_score: 0.0,
            overall_compliance: ScoreLabel::for_score(0.0),
            status_breakdown: BTreeMap::new(),
            risk_breakdown: BTreeMap::new(),
            fully_compliant_count: 0,
            non_compliant_count: 0,
            needs_attention: 0,
            error: Some(NO_CONTROLS_EVALUATED.to_string()),
        };
    }

    let mut status_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut risk_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_score = 0.0;
    let mut needs_attention = 0;

    for control in controls {
        *status_breakdown
            .entry(control.compliance_status.as_str().to_string())
            .or_default() += 1;
        let risk = control
            .risk_level
            .map(|r| r.as_str())
            .unwrap_or(UNKNOWN_RISK);
        *risk_breakdown.entry(risk.to_string()).or_default() += 1;

        total_score += control.final_score;
        if control.final_score < NEEDS_ATTENTION_BELOW {
            needs_attention += 1;
        }
    }

    let average = total_score / controls.len() as f64;
    let count_of = |status: ComplianceStatus| {
        status_breakdown
            .get(status.as_str())
            .copied()
            .unwrap_or(0)
    };

    FrameworkStatistics {
        total_controls: controls.len(),
        average_score: round1(average),
        overall_compliance: ScoreLabel::for_score(average),
        fully_compliant_count: count_of(ComplianceStatus::FullyCompliant),
        non_compliant_count: count_of(ComplianceStatus::NonCompliant),
        needs_attention,
        error: None,
        status_breakdown,
        risk_breakdown,
    }
}
