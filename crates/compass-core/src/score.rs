//! Per-element scores.

use serde::{Deserialize, Serialize};

/// Where a score came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum ScoreOrigin {
    /// Entered by a human grader. Never replaced by an inferred score.
    Manual,
    /// Copied from similar, manually graded elements.
    Inferred {
        /// Similarity of the scored element to its cluster representative.
        match_strength: f64,
    },
}

/// Credit awarded to one element.
///
/// Credits are opaque: the engine sums them but attaches no rubric meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub credits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub origin: ScoreOrigin,
}

impl Score {
    pub fn manual(credits: f64, comment: Option<String>) -> Self {
        Self {
            credits,
            comment,
            origin: ScoreOrigin::Manual,
        }
    }

    /// Creates an inferred score; `match_strength` is clamped to `[0, 1]`.
    pub fn inferred(credits: f64, comment: Option<String>, match_strength: f64) -> Self {
        Self {
            credits,
            comment,
            origin: ScoreOrigin::Inferred {
                match_strength: match_strength.clamp(0.0, 1.0),
            },
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.origin, ScoreOrigin::Manual)
    }

    /// How much this score can be trusted: 1.0 for manual scores, the match
    /// strength for inferred ones.
    pub fn confidence(&self) -> f64 {
        match self.origin {
            ScoreOrigin::Manual => 1.0,
            ScoreOrigin::Inferred { match_strength } => match_strength,
        }
    }
}
