//! Recorded grading sessions.
//!
//! A session file holds the submissions of one exercise, the assessments
//! graders entered for them and the models they dismissed, in the order the
//! engine should see them.

use log::{debug, info};
use serde::Deserialize;

use compass::{
    AssessmentEntry, CompassEngine, CompassError, diagnostic::Diagnostic, identifier::ModelId,
    model::Model, validate_payload,
};

/// One recorded assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedAssessment {
    pub model_id: ModelId,
    #[serde(default)]
    pub entries: Vec<AssessmentEntry>,
}

/// A recorded grading session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub assessments: Vec<RecordedAssessment>,
    /// Models removed from the waiting set after all assessments.
    #[serde(default)]
    pub dismissed: Vec<ModelId>,
}

impl Session {
    /// Parses a session from its JSON form.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Feeds the session through `engine`: registers every model, ingests
    /// every assessment, then dismisses models.
    ///
    /// Returns the warnings of all ingested assessments, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first model the engine rejects and at the first payload
    /// that fails [`validate_payload`].
    pub fn replay(self, engine: &CompassEngine) -> Result<Vec<Diagnostic>, CompassError> {
        info!(
            models = self.models.len(),
            assessments = self.assessments.len(),
            dismissed = self.dismissed.len();
            "Replaying session"
        );

        for model in self.models {
            engine.register_model(model)?;
        }

        let mut warnings = Vec::new();
        for assessment in self.assessments {
            validate_payload(&assessment.entries)?;
            let report = engine.ingest_assessment(assessment.model_id, assessment.entries)?;
            debug!(
                model = assessment.model_id.get(),
                applied = report.applied,
                inferred = report.inferred;
                "Replayed assessment"
            );
            warnings.extend(report.warnings);
        }

        for model in self.dismissed {
            engine.remove_from_waiting_set(model)?;
        }

        Ok(warnings)
    }
}
