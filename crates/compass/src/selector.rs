//! Optimal-submission selection.
//!
//! Picks the waiting model whose manual assessment is expected to spread
//! the most: every element that still needs a human decision counts with
//! the size of its cluster, since a manual score there propagates to all
//! cluster members.

use log::debug;

use compass_core::{identifier::ModelId, score::ScoreOrigin};

use crate::{
    config::GradingConfig,
    index::ElementRef,
    state::{EngineState, ModelIndex},
};

/// The waiting model with the highest assessment benefit, lowest id on ties.
///
/// Returns `None` if and only if the waiting set is empty.
pub(crate) fn next_optimal(state: &EngineState, config: &GradingConfig) -> Option<ModelId> {
    let mut best: Option<(ModelId, usize)> = None;

    for &id in &state.waiting {
        let Some(index) = state.index_of(id) else {
            continue;
        };
        let benefit = benefit(state, index, config);
        if best.is_none_or(|(_, top)| benefit > top) {
            best = Some((id, benefit));
        }
    }

    if let Some((id, benefit)) = best {
        debug!(model = id.get(), benefit; "Selected next optimal model");
    }
    best.map(|(id, _)| id)
}

/// Sum of cluster sizes over elements without a trustworthy score.
fn benefit(state: &EngineState, index: ModelIndex, config: &GradingConfig) -> usize {
    let slot = state.slot(index);
    slot.model()
        .elements()
        .iter()
        .filter(|element| match slot.score(element.local_id()).map(|score| score.origin) {
            None => true,
            Some(ScoreOrigin::Manual) => false,
            Some(ScoreOrigin::Inferred { match_strength }) => {
                match_strength < config.confidence_threshold()
            }
        })
        .map(|element| {
            state
                .index
                .cluster_size(ElementRef::new(index, element.local_id()))
        })
        .sum()
}
