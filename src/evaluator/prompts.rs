//! Prompt text for the three stages.

use super::stages::GapAnalysis;
use crate::controls::Control;

/// Builds stage prompts, appending the response-language instruction when configured.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    response_language: Option<String>,
}

/// A system + user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl PromptBuilder {
    pub fn new(response_language: Option<String>) -> Self {
        Self { response_language }
    }

    fn system(&self, base: String) -> String {
        match &self.response_language {
            Some(language) => format!(
                "{base} Write every free-text value (assessments, justifications, findings, \
                 recommendations) in {language}. Keep JSON keys and enum values in English."
            ),
            None => base,
        }
    }

    pub fn relevance(&self, control: &Control, excerpt: &str) -> Prompt {
        let user = format!(
            r#"You are a compliance relevance analyzer. Quickly determine if the following document excerpt is relevant to the given compliance control.

COMPLIANCE CONTROL ({id}):
{text}

DOCUMENT EXCERPT:
{excerpt}

Respond in JSON format:
{{
    "is_relevant": true/false,
    "relevance_score": 0.0-1.0,
    "relevant_keywords": ["list", "of", "matching", "keywords"],
    "quick_assessment": "one sentence summary"
}}

JSON Response:"#,
            id = control.id,
            text = control.text,
        );
        Prompt {
            system: self.system(
                "You are a fast compliance relevance analyzer. Respond only in valid JSON."
                    .to_string(),
            ),
            user,
        }
    }

    pub fn gap_analysis(&self, control: &Control, combined_chunks: &str) -> Prompt {
        let family = framework_family(&control.framework);
        let user = format!(
            r#"You are an expert compliance analyst specializing in the {family} framework.

CONTROL REQUIREMENT ({id}):
{text}

ORGANIZATION'S DOCUMENT:
{combined_chunks}

Analyze the document against this control requirement. Evaluate:
1. Does the document address this control requirement?
2. What specific clauses/sections address it?
3. Are there any gaps or missing elements?
4. What is the level of detail and specificity?

Respond in JSON format:
{{
    "addresses_control": true/false,
    "coverage_level": "full|partial|minimal|none",
    "addressed_aspects": [
        {{"aspect": "description", "evidence": "quote from document"}}
    ],
    "missing_aspects": [
        {{"aspect": "description", "importance": "critical|high|medium|low"}}
    ],
    "document_quotes": ["relevant quotes from the document"],
    "gap_analysis": "detailed description of gaps",
    "preliminary_score": 0-100
}}

JSON Response:"#,
            id = control.id,
            text = control.text,
        );
        Prompt {
            system: self.system(format!(
                "You are an expert {family} compliance analyst. Provide detailed, accurate \
                 analysis. Respond only in valid JSON."
            )),
            user,
        }
    }

    pub fn final_scoring(&self, control: &Control, gap: &GapAnalysis, excerpt: &str) -> Prompt {
        let family = framework_family(&control.framework);
        let preliminary = serde_json::to_string_pretty(gap).unwrap_or_default();
        let user = format!(
            r#"You are a senior compliance auditor providing final assessment for {family} compliance.

CONTROL ({id}):
{text}

PRELIMINARY ANALYSIS:
{preliminary}

DOCUMENT CONTEXT:
{excerpt}

Provide your FINAL compliance assessment:

1. FINAL SCORE (0-100%):
   - 100%: Fully compliant - all requirements met with evidence
   - 75-99%: Mostly compliant - minor gaps or documentation issues
   - 50-74%: Partially compliant - significant gaps but foundation exists
   - 25-49%: Minimally compliant - major gaps, only basic coverage
   - 0-24%: Non-compliant - control not addressed

2. Provide specific, actionable recommendations for improvement.

Respond in JSON format:
{{
    "final_score": 0-100,
    "compliance_status": "fully_compliant|mostly_compliant|partially_compliant|minimally_compliant|non_compliant",
    "confidence": 0.0-1.0,
    "score_justification": "detailed explanation of the score",
    "key_findings": [
        {{"finding": "description", "type": "strength|weakness|gap"}}
    ],
    "recommendations": [
        {{
            "priority": "critical|high|medium|low",
            "recommendation": "specific action to take",
            "expected_impact": "how this improves compliance"
        }}
    ],
    "evidence_summary": "summary of evidence found in document",
    "risk_level": "low|medium|high|critical"
}}

JSON Response:"#,
            id = control.id,
            text = control.text,
        );
        Prompt {
            system: self.system(format!(
                "You are a senior {family} compliance auditor. Provide accurate, \
                 well-justified final assessments. Respond only in valid JSON."
            )),
            user,
        }
    }
}

/// Display name of a framework family: `nca_ar` → `NCA`.
pub fn framework_family(framework: &str) -> String {
    framework
        .split('_')
        .next()
        .unwrap_or(framework)
        .to_ascii_uppercase()
}
