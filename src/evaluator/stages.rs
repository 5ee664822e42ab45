//! Typed payloads of the three evaluation stages.
//!
//! Each stage has a parsed form, a sentinel for unparsable responses (carrying the raw
//! text) and a sentinel for failed calls (carrying the error message).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::payload::{
    UnparsablePayload, extract_object, get_bool, get_f64, get_objects, get_string,
    get_string_list,
};
use super::types::{KeyFinding, Priority, Recommendation, RiskLevel};
use crate::constants::{RAW_RESPONSE_KEEP_CHARS, truncate_chars};

/// Stage 1 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceCheck {
    pub is_relevant: bool,
    pub relevance_score: f64,
    #[serde(default)]
    pub relevant_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl RelevanceCheck {
    /// Parses a model response. Unparsable responses count as irrelevant.
    pub fn parse(response: &str) -> Self {
        match extract_object(response) {
            Ok(map) => Self::from_object(&map),
            Err(UnparsablePayload { raw }) => Self {
                raw_response: Some(raw),
                ..Self::default()
            },
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            is_relevant: get_bool(map, "is_relevant").unwrap_or(false),
            relevance_score: get_f64(map, "relevance_score")
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            relevant_keywords: get_string_list(map, "relevant_keywords"),
            quick_assessment: get_string(map, "quick_assessment"),
            error: None,
            raw_response: None,
        }
    }

    /// Sentinel for a call that failed after retries.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when deeper analysis should be skipped.
    pub fn is_clearly_irrelevant(&self, threshold: f64) -> bool {
        !self.is_relevant && self.relevance_score < threshold
    }
}

/// How much of a control a document covers, per gap analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageLevel {
    Full,
    Partial,
    Minimal,
    #[default]
    None,
}

impl CoverageLevel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "full" => CoverageLevel::Full,
            "partial" => CoverageLevel::Partial,
            "minimal" => CoverageLevel::Minimal,
            _ => CoverageLevel::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressedAspect {
    pub aspect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingAspect {
    pub aspect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
}

/// Stage 2 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub addresses_control: bool,
    pub coverage_level: CoverageLevel,
    #[serde(default)]
    pub addressed_aspects: Vec<AddressedAspect>,
    #[serde(default)]
    pub missing_aspects: Vec<MissingAspect>,
    #[serde(default)]
    pub document_quotes: Vec<String>,
    #[serde(default)]
    pub gap_analysis: String,
    pub preliminary_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl GapAnalysis {
    /// Parses a model response. Unparsable responses score zero.
    pub fn parse(response: &str) -> Self {
        match extract_object(response) {
            Ok(map) => Self::from_object(&map),
            Err(UnparsablePayload { raw }) => Self {
                raw_response: Some(raw),
                ..Self::default()
            },
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let addressed_aspects = get_objects(map, "addressed_aspects")
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(o) => Some(AddressedAspect {
                    aspect: get_string(o, "aspect")?,
                    evidence: get_string(o, "evidence"),
                }),
                Value::String(s) => Some(AddressedAspect {
                    aspect: s.clone(),
                    evidence: None,
                }),
                _ => None,
            })
            .collect();

        let missing_aspects = get_objects(map, "missing_aspects")
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(o) => Some(MissingAspect {
                    aspect: get_string(o, "aspect")?,
                    importance: get_string(o, "importance"),
                }),
                Value::String(s) => Some(MissingAspect {
                    aspect: s.clone(),
                    importance: None,
                }),
                _ => None,
            })
            .collect();

        Self {
            addresses_control: get_bool(map, "addresses_control").unwrap_or(false),
            coverage_level: get_string(map, "coverage_level")
                .map(|l| CoverageLevel::from_label(&l))
                .unwrap_or_default(),
            addressed_aspects,
            missing_aspects,
            document_quotes: get_string_list(map, "document_quotes"),
            gap_analysis: get_string(map, "gap_analysis").unwrap_or_default(),
            preliminary_score: get_f64(map, "preliminary_score").unwrap_or(0.0),
            error: None,
            raw_response: None,
        }
    }

    /// Sentinel for a call that failed after retries.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Stage 3 output, as reported by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalAssessment {
    pub final_score: f64,
    /// The model's own status label. Informational only; the reported status is
    /// always derived from the score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub score_justification: String,
    #[serde(default)]
    pub key_findings: Vec<KeyFinding>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub evidence_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl FinalAssessment {
    /// Parses a model response. Unlike the earlier stages an unparsable response is
    /// an error, so the caller can fall back to the preliminary score.
    pub fn parse(response: &str) -> Result<Self, UnparsablePayload> {
        let map = extract_object(response)?;
        if get_f64(&map, "final_score").is_none() {
            return Err(UnparsablePayload {
                raw: truncate_chars(response, RAW_RESPONSE_KEEP_CHARS).to_string(),
            });
        }
        Ok(Self::from_object(&map))
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let key_findings = get_objects(map, "key_findings")
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(o) => Some(KeyFinding {
                    finding: get_string(o, "finding")?,
                    kind: get_string(o, "type"),
                }),
                Value::String(s) => Some(KeyFinding {
                    finding: s.clone(),
                    kind: None,
                }),
                _ => None,
            })
            .collect();

        let recommendations = get_objects(map, "recommendations")
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(o) => Some(Recommendation {
                    priority: get_string(o, "priority")
                        .map(|p| Priority::from_label(&p))
                        .unwrap_or(Priority::Unspecified),
                    recommendation: get_string(o, "recommendation")?,
                    expected_impact: get_string(o, "expected_impact"),
                }),
                Value::String(s) => Some(Recommendation {
                    priority: Priority::Unspecified,
                    recommendation: s.clone(),
                    expected_impact: None,
                }),
                _ => None,
            })
            .collect();

        Self {
            final_score: get_f64(map, "final_score").unwrap_or(0.0),
            compliance_status: get_string(map, "compliance_status"),
            confidence: get_f64(map, "confidence"),
            score_justification: get_string(map, "score_justification").unwrap_or_default(),
            key_findings,
            recommendations,
            evidence_summary: get_string(map, "evidence_summary").unwrap_or_default(),
            risk_level: get_string(map, "risk_level").and_then(|r| RiskLevel::from_label(&r)),
            error: None,
            raw_response: None,
        }
    }

    /// Trace entry recorded when scoring fell back to the preliminary score.
    pub fn degraded(error: Option<String>, raw_response: Option<String>) -> Self {
        Self {
            error,
            raw_response,
            ..Self::default()
        }
    }
}
