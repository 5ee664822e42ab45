use serde::{Deserialize, Serialize};

use super::label::ScoreLabel;
use super::types::FrameworkResult;
use crate::constants::{
    BAND_MINIMAL, BAND_MOSTLY, BAND_PARTIAL, CRITICAL_GAP_BELOW, LABEL_EXCELLENT,
    MAX_CRITICAL_GAPS, MAX_TOP_RECOMMENDATIONS, round1,
};
use crate::evaluator::{Recommendation, RiskLevel};

/// A control scoring below the critical threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalGap {
    pub control_id: String,
    pub framework: String,
    pub score: f64,
    pub risk_level: Option<RiskLevel>,
}

/// An urgent recommendation with the control it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedRecommendation {
    pub control_id: String,
    pub framework: String,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

/// Control counts per score band (half-open ranges).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// `[90, ∞)`
    pub excellent: usize,
    /// `[75, 90)`
    pub good: usize,
    /// `[50, 75)`
    pub fair: usize,
    /// `[25, 50)`
    pub poor: usize,
    /// `[0, 25)`
    pub critical: usize,
}

impl ScoreDistribution {
    fn record(&mut self, score: f64) {
        if score >= LABEL_EXCELLENT {
            self.excellent += 1;
        } else if score >= BAND_MOSTLY {
            self.good += 1;
        } else if score >= BAND_PARTIAL {
            self.fair += 1;
        } else if score >= BAND_MINIMAL {
            self.poor += 1;
        } else {
            self.critical += 1;
        }
    }
}

/// Cross-framework rollup of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub overall_score: f64,
    pub overall_status: ScoreLabel,
    pub total_controls_evaluated: usize,
    pub frameworks_analyzed: Vec<String>,
    pub critical_gaps: Vec<CriticalGap>,
    pub top_recommendations: Vec<PrioritizedRecommendation>,
    pub score_distribution: ScoreDistribution,
}

/// Summarises all framework results of a run.
///
/// Critical gaps are the first ten controls scoring below 25, in encounter order.
/// Top recommendations are the critical and high ones, stably sorted by priority and
/// capped at fifteen.
pub fn summarize(frameworks: &[FrameworkResult]) -> ReportSummary {
    let mut total_score = 0.0;
    let mut total_controls = 0usize;
    let mut critical_gaps = Vec::new();
    let mut urgent = Vec::new();
    let mut score_distribution = ScoreDistribution::default();

    for result in frameworks {
        for control in &result.controls {
            total_score += control.final_score;
            total_controls += 1;
            score_distribution.record(control.final_score);

            for rec in control.recommendations.iter().filter(|r| r.priority.is_urgent()) {
                urgent.push(PrioritizedRecommendation {
                    control_id: control.control_id.clone(),
                    framework: result.framework.clone(),
                    recommendation: rec.clone(),
                });
            }

            if control.final_score < CRITICAL_GAP_BELOW {
                critical_gaps.push(CriticalGap {
                    control_id: control.control_id.clone(),
                    framework: result.framework.clone(),
                    score: control.final_score,
                    risk_level: control.risk_level,
                });
            }
        }
    }

    critical_gaps.truncate(MAX_CRITICAL_GAPS);
    // Vec::sort_by_key is stable.
    urgent.sort_by_key(|r| r.recommendation.priority.rank());
    urgent.truncate(MAX_TOP_RECOMMENDATIONS);

    let average = if total_controls == 0 {
        0.0
    } else {
        total_score / total_controls as f64
    };

    ReportSummary {
        overall_score: round1(average),
        overall_status: ScoreLabel::for_score(average),
        total_controls_evaluated: total_controls,
        frameworks_analyzed: frameworks.iter().map(|f| f.framework.clone()).collect(),
        critical_gaps,
        top_recommendations: urgent,
        score_distribution,
    }
}
