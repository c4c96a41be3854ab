//! Operational statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::state::EngineState;

/// Counts and means describing the current engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_models: usize,
    pub total_clusters: usize,
    /// Cluster count keyed by element kind.
    pub clusters_per_kind: BTreeMap<String, usize>,
    pub entirely_assessed_models: usize,
    pub waiting_models: usize,
    pub mean_coverage: f64,
    pub mean_confidence: f64,
}

impl Statistics {
    pub(crate) fn collect(state: &EngineState) -> Self {
        let total_models = state.slots.len();

        let mut entirely_assessed_models = 0;
        let mut coverage = 0.0;
        let mut confidence = 0.0;
        for slot in &state.slots {
            let grade = slot.grade();
            if grade.entirely_assessed {
                entirely_assessed_models += 1;
            }
            coverage += grade.coverage;
            confidence += grade.confidence;
        }
        let (mean_coverage, mean_confidence) = if total_models == 0 {
            (0.0, 0.0)
        } else {
            (
                coverage / total_models as f64,
                confidence / total_models as f64,
            )
        };

        Self {
            total_models,
            total_clusters: state.index.len(),
            clusters_per_kind: state
                .index
                .clusters_per_kind()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect(),
            entirely_assessed_models,
            waiting_models: state.waiting.len(),
            mean_coverage,
            mean_confidence,
        }
    }
}
