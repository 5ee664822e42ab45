use serde::{Deserialize, Serialize};

use super::summary::ScoreDistribution;
use super::types::AnalysisResults;
use crate::constants::{
    BAND_MINIMAL, BAND_MOSTLY, BAND_PARTIAL, DIGEST_LIST_CAP, DIGEST_TEXT_CHARS, truncate_chars,
};
use crate::evaluator::{ComplianceStatus, ControlEvaluation};

/// One control as listed in a [`ScoreDigest`], with its place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub control_id: String,
    /// First 200 characters of the control text.
    pub control_text: String,
    pub final_score: f64,
    pub compliance_status: ComplianceStatus,
    pub score_justification: String,
    pub framework: String,
    pub domain: String,
    pub subdomain: String,
}

impl DigestEntry {
    fn new(framework: &str, domain: &str, subdomain: &str, control: &ControlEvaluation) -> Self {
        Self {
            control_id: control.control_id.clone(),
            control_text: truncate_chars(&control.control_text, DIGEST_TEXT_CHARS).to_string(),
            final_score: control.final_score,
            compliance_status: control.compliance_status,
            score_justification: control.score_justification.clone(),
            framework: framework.to_string(),
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestCounts {
    pub overall_score: f64,
    pub total_controls: usize,
    pub score_distribution: ScoreDistribution,
    /// Below 25.
    pub critical_count: usize,
    /// `[25, 50)`
    pub poor_count: usize,
    /// `[50, 75)`
    pub fair_count: usize,
    /// 75 and above.
    pub good_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestControls {
    /// Lowest-scoring critical controls, at most ten.
    pub critical: Vec<DigestEntry>,
    /// Lowest-scoring poor controls, at most ten.
    pub poor: Vec<DigestEntry>,
    /// Every evaluated control, lowest score first.
    pub all: Vec<DigestEntry>,
}

/// Weakest-first view of a finished run, for triage screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDigest {
    pub summary: DigestCounts,
    pub controls: DigestControls,
}

/// Flattens every framework's structure into one list sorted by score, ascending.
///
/// Controls with equal scores keep their structure order. Buckets use four bands only;
/// everything from 75 up counts as good.
pub fn digest(results: &AnalysisResults) -> ScoreDigest {
    let mut all: Vec<DigestEntry> = results
        .frameworks
        .iter()
        .flat_map(|framework| {
            framework.structure.groups.iter().flat_map(move |group| {
                group.children.iter().flat_map(move |leaf| {
                    leaf.controls.iter().map(move |control| {
                        DigestEntry::new(&framework.framework, &group.name, &leaf.name, control)
                    })
                })
            })
        })
        .collect();
    all.sort_by(|a, b| a.final_score.total_cmp(&b.final_score));

    let critical = in_band(&all, f64::NEG_INFINITY, BAND_MINIMAL);
    let poor = in_band(&all, BAND_MINIMAL, BAND_PARTIAL);
    let fair_count = in_band(&all, BAND_PARTIAL, BAND_MOSTLY).len();
    let good_count = in_band(&all, BAND_MOSTLY, f64::INFINITY).len();

    let capped = |entries: &[&DigestEntry]| -> Vec<DigestEntry> {
        entries
            .iter()
            .take(DIGEST_LIST_CAP)
            .map(|e| (*e).clone())
            .collect()
    };

    let summary = DigestCounts {
        overall_score: results.summary.overall_score,
        total_controls: results.summary.total_controls_evaluated,
        score_distribution: results.summary.score_distribution,
        critical_count: critical.len(),
        poor_count: poor.len(),
        fair_count,
        good_count,
    };
    let controls = DigestControls {
        critical: capped(&critical),
        poor: capped(&poor),
        all,
    };

    ScoreDigest { summary, controls }
}

/// Entries scoring in `[low, high)`, in list order.
fn in_band(entries: &[DigestEntry], low: f64, high: f64) -> Vec<&DigestEntry> {
    entries
        .iter()
        .filter(|e| e.final_score >= low && e.final_score < high)
        .collect()
}
