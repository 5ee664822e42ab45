use serde::{Deserialize, Serialize};

use crate::constants::{BAND_MINIMAL, BAND_MOSTLY, BAND_PARTIAL, LABEL_EXCELLENT};

/// Human-readable grade of an average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl ScoreLabel {
    /// `>=90` excellent, `>=75` good, `>=50` fair, `>=25` poor, otherwise critical.
    pub fn for_score(score: f64) -> Self {
        if score >= LABEL_EXCELLENT {
            ScoreLabel::Excellent
        } else if score >= BAND_MOSTLY {
            ScoreLabel::Good
        } else if score >= BAND_PARTIAL {
            ScoreLabel::Fair
        } else if score >= BAND_MINIMAL {
            ScoreLabel::Poor
        } else {
            ScoreLabel::Critical
        }
    }
}
