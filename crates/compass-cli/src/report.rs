//! JSON report of a replayed session.

use indexmap::IndexMap;
use serde::Serialize;

use compass::{
    CompassEngine, CompassError, Statistics,
    diagnostic::Diagnostic,
    grade::ExportedGrade,
    identifier::{Id, ModelId},
};

/// Grade and cluster summary of one model.
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub id: ModelId,
    #[serde(flatten)]
    pub grade: ExportedGrade,
    pub waiting: bool,
    /// For each element, how many other elements share its cluster. Cluster
    /// mates from the same submission are counted too.
    pub similar_elements: IndexMap<Id, usize>,
}

/// The state of the engine after a replay.
#[derive(Debug, Serialize)]
pub struct Report {
    pub models: Vec<ModelReport>,
    pub statistics: Statistics,
    pub diversity: f64,
    pub next_optimal_model: Option<ModelId>,
    pub warnings: Vec<Diagnostic>,
}

impl Report {
    /// Snapshots `engine` into a report.
    pub fn collect(engine: &CompassEngine, warnings: Vec<Diagnostic>) -> Result<Self, CompassError> {
        let models = engine
            .model_ids()
            .into_iter()
            .map(|id| {
                Ok(ModelReport {
                    id,
                    grade: engine.get_result(id)?.exported(),
                    waiting: engine.is_waiting(id),
                    similar_elements: engine.similar_element_counts(id)?,
                })
            })
            .collect::<Result<Vec<_>, CompassError>>()?;

        Ok(Self {
            models,
            statistics: engine.statistics(),
            diversity: engine.diversity(),
            next_optimal_model: engine.next_optimal_model().map(|(id, _)| id),
            warnings,
        })
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
