//! Score propagation.
//!
//! A manual score recorded for one element is pushed, as an inferred score,
//! to every other member of the element's cluster that has no manual score
//! of its own. When a cluster holds several manual scores, members receive
//! the similarity-weighted mean of them.

use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use compass_core::{
    identifier::{Id, ModelId},
    model::Model,
    score::Score,
};

use crate::{
    calculator::compute_grade,
    config::AppConfig,
    diagnostic::{Diagnostic, DiagnosticCollector, ErrorCode, PayloadError},
    index::{ClusterId, ElementRef},
    similarity::similarity,
    state::{EngineState, ModelIndex},
};

/// One human-entered score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentEntry {
    pub local_id: Id,
    pub credits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AssessmentEntry {
    pub fn new(local_id: impl Into<Id>, credits: f64) -> Self {
        Self {
            local_id: local_id.into(),
            credits,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Outcome of one assessment ingestion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssessmentReport {
    /// Manual scores stored.
    pub applied: usize,
    /// Inferred scores written to other elements.
    pub inferred: usize,
    /// Entries that were skipped, and why.
    pub warnings: Vec<Diagnostic>,
    /// Models whose grade was recomputed, ascending.
    pub recomputed: Vec<ModelId>,
}

/// Checks an assessment payload before it is handed to the engine.
///
/// Rejects the payload as a whole if an entry has an empty `local_id` or if
/// a `local_id` appears more than once.
///
/// # Errors
///
/// Returns a [`PayloadError`] carrying one diagnostic per offending entry.
pub fn validate_payload(entries: &[AssessmentEntry]) -> Result<(), PayloadError> {
    let mut collector = DiagnosticCollector::new();
    let mut seen = HashSet::new();

    for (position, entry) in entries.iter().enumerate() {
        if entry.local_id.is_empty() {
            collector.emit(
                Diagnostic::error(format!("entry #{position} has an empty local id"))
                    .with_code(ErrorCode::E100)
                    .with_help("every entry must name the element it scores"),
            );
        } else if !seen.insert(entry.local_id) {
            collector.emit(
                Diagnostic::error(format!("element `{}` is scored twice", entry.local_id))
                    .with_code(ErrorCode::E101)
                    .with_help("merge the entries into one score"),
            );
        }
    }

    collector.finish().map(|_| ())
}

/// Records manual scores for `model` and propagates them.
///
/// The caller must hold the write lock and has resolved `model` already.
/// Unusable entries only produce warnings, so ingestion cannot fail.
pub(crate) fn ingest(
    state: &mut EngineState,
    model: ModelIndex,
    entries: Vec<AssessmentEntry>,
    config: &AppConfig,
) -> AssessmentReport {
    let model_id = state.slot(model).model().id();
    let (accepted, warnings) = screen_entries(state.slot(model).model(), entries);

    let applied = accepted.len();
    let mut touched_clusters = BTreeSet::new();
    for (id, score) in accepted {
        state.slot_mut(model).set_score(id, score);
        if let Some(cluster) = state.index.cluster_of(ElementRef::new(model, id)) {
            touched_clusters.insert(cluster);
        }
    }
    debug!(model = model_id.get(), applied, skipped = warnings.len(); "Stored manual scores");

    let mut touched_models = BTreeSet::from([model]);
    let mut inferred = 0;
    for cluster in touched_clusters {
        let updates = infer_cluster(state, cluster, None, config);
        inferred += updates.len();
        for (element, score) in updates {
            if state.slot_mut(element.model).set_score(element.local_id, score) {
                touched_models.insert(element.model);
            }
        }
    }

    let recomputed = recompute(state, touched_models, config);
    AssessmentReport {
        applied,
        inferred,
        warnings,
        recomputed,
    }
}

/// Splits a payload into the manual scores to store and warnings for the
/// entries that are skipped.
fn screen_entries(
    model: &Model,
    entries: Vec<AssessmentEntry>,
) -> (Vec<(Id, Score)>, Vec<Diagnostic>) {
    let model_id = model.id();
    let mut accepted = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();

    for entry in entries {
        let id = entry.local_id;
        if !model.contains(id) {
            warn!(model = model_id.get(), element:% = id; "Skipping score for unknown element");
            warnings.push(
                Diagnostic::warning(format!("model {model_id} has no element `{id}`"))
                    .with_code(ErrorCode::W001)
                    .with_subject(model_id, id)
                    .with_help("check that the assessment targets the right submission"),
            );
            continue;
        }
        if !entry.credits.is_finite() {
            warn!(model = model_id.get(), element:% = id; "Skipping non-finite credits");
            warnings.push(
                Diagnostic::warning(format!("credits for `{id}` are not a finite number"))
                    .with_code(ErrorCode::W002)
                    .with_subject(model_id, id),
            );
            continue;
        }
        accepted.push((id, Score::manual(entry.credits, entry.comment)));
    }

    (accepted, warnings)
}

/// Gives the elements of a freshly registered model the scores already
/// decided for their clusters.
pub(crate) fn assess_new_model(
    state: &mut EngineState,
    model: ModelIndex,
    config: &AppConfig,
) -> usize {
    let clusters: BTreeSet<ClusterId> = state
        .element_refs(model)
        .into_iter()
        .filter_map(|element| state.index.cluster_of(element))
        .collect();

    let mut inferred = 0;
    for cluster in clusters {
        for (element, score) in infer_cluster(state, cluster, Some(model), config) {
            state.slot_mut(element.model).set_score(element.local_id, score);
            inferred += 1;
        }
    }
    inferred
}

/// A manual score inside a cluster, keyed for deterministic ordering.
struct ManualScore<'a> {
    model: ModelId,
    local_id: String,
    element: ElementRef,
    score: &'a Score,
}

/// Computes inferred scores for the non-manual members of `cluster`,
/// optionally restricted to members of one model.
fn infer_cluster(
    state: &EngineState,
    cluster: ClusterId,
    only: Option<ModelIndex>,
    config: &AppConfig,
) -> Vec<(ElementRef, Score)> {
    let Some(cluster) = state.index.cluster(cluster) else {
        return Vec::new();
    };

    let mut manual: Vec<ManualScore<'_>> = cluster
        .members()
        .iter()
        .filter_map(|member| {
            let element = member.element;
            let slot = state.slot(element.model);
            slot.score(element.local_id)
                .filter(|score| score.is_manual())
                .map(|score| ManualScore {
                    model: slot.model().id(),
                    local_id: element.local_id.to_string(),
                    element,
                    score,
                })
        })
        .collect();
    if manual.is_empty() {
        return Vec::new();
    }
    manual.sort_by(|a, b| (a.model, &a.local_id).cmp(&(b.model, &b.local_id)));

    let first_credits = manual[0].score.credits;
    let agreed = manual.iter().all(|entry| entry.score.credits == first_credits);

    let mut updates = Vec::new();
    for member in cluster.members() {
        let element = member.element;
        if only.is_some_and(|model| model != element.model) {
            continue;
        }
        if state
            .slot(element.model)
            .score(element.local_id)
            .is_some_and(Score::is_manual)
        {
            continue;
        }
        let Some(target) = element.view(&state.slots) else {
            continue;
        };

        let weights: Vec<f64> = manual
            .iter()
            .map(|entry| {
                entry
                    .element
                    .view(&state.slots)
                    .map_or(0.0, |source| similarity(source, target, config.similarity()))
            })
            .collect();

        let credits = if agreed {
            first_credits
        } else {
            weighted_credits(&manual, &weights)
        };

        // Highest weight wins; the earliest manual score wins ties.
        let mut best = 0;
        for (i, weight) in weights.iter().enumerate() {
            if *weight > weights[best] {
                best = i;
            }
        }
        let comment = manual[best].score.comment.clone();

        updates.push((
            element,
            Score::inferred(credits, comment, member.match_strength),
        ));
    }

    debug!(
        cluster:% = cluster.id(),
        signature:% = cluster.signature(),
        manual = manual.len(),
        inferred = updates.len();
        "Propagated cluster scores"
    );
    updates
}

fn weighted_credits(manual: &[ManualScore<'_>], weights: &[f64]) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        let sum: f64 = manual.iter().map(|entry| entry.score.credits).sum();
        return sum / manual.len() as f64;
    }
    manual
        .iter()
        .zip(weights)
        .map(|(entry, weight)| entry.score.credits * weight)
        .sum::<f64>()
        / total_weight
}

/// Recomputes the grades of `models` and drops entirely assessed models from
/// the waiting set. Returns the recomputed model ids, ascending.
pub(crate) fn recompute(
    state: &mut EngineState,
    models: BTreeSet<ModelIndex>,
    config: &AppConfig,
) -> Vec<ModelId> {
    let mut recomputed = Vec::with_capacity(models.len());
    for index in models {
        let slot = state.slot_mut(index);
        let grade = compute_grade(slot.model(), slot.scores(), config.grading());
        let id = slot.model().id();
        debug!(
            model = id.get(),
            points = grade.points,
            coverage = grade.coverage,
            confidence = grade.confidence,
            entirely_assessed = grade.entirely_assessed;
            "Recomputed grade"
        );
        let done = grade.entirely_assessed;
        slot.replace_grade(grade);

        if done && state.waiting.remove(&id) {
            debug!(model = id.get(); "Model left the waiting set");
        }
        recomputed.push(id);
    }
    recomputed.sort();
    recomputed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_payload_accepts_distinct_entries() {
        let entries = vec![
            AssessmentEntry::new("c1", 1.0),
            AssessmentEntry::new("c2", 0.5).with_comment("partially correct"),
        ];
        assert!(validate_payload(&entries).is_ok());
        assert!(validate_payload(&[]).is_ok());
    }

    #[test]
    fn test_validate_payload_rejects_empty_and_duplicate_ids() {
        let entries = vec![
            AssessmentEntry::new("c1", 1.0),
            AssessmentEntry::new("", 1.0),
            AssessmentEntry::new("c1", 2.0),
        ];
        let err = validate_payload(&entries).unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().map(|diag| diag.code()).collect();

        assert_eq!(codes, vec![Some(ErrorCode::E100), Some(ErrorCode::E101)]);
    }

    #[test]
    fn test_screen_entries_splits_usable_from_skipped() {
        use compass_core::{
            element::{ClassType, Element, NodeKind},
            model::DiagramType,
        };

        let model = Model::new(
            ModelId::new(1),
            DiagramType::ClassDiagram,
            vec![
                Element::node("c1", NodeKind::Class(ClassType::Class), "Book"),
                Element::node("c2", NodeKind::Class(ClassType::Class), "Shelf"),
            ],
        );
        let entries = vec![
            AssessmentEntry::new("c2", 1.0),
            AssessmentEntry::new("ghost", 1.0),
            AssessmentEntry::new("c1", f64::INFINITY),
            AssessmentEntry::new("c1", 0.5).with_comment("ok"),
        ];

        let (accepted, warnings) = screen_entries(&model, entries);

        let ids: Vec<_> = accepted.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![Id::new("c2"), Id::new("c1")]);
        assert_eq!(accepted[1].1, Score::manual(0.5, Some("ok".to_string())));
        let codes: Vec<_> = warnings.iter().map(|diag| diag.code()).collect();
        assert_eq!(codes, vec![Some(ErrorCode::W001), Some(ErrorCode::W002)]);
    }

    #[test]
    fn test_weighted_credits() {
        let a = Score::manual(2.0, None);
        let b = Score::manual(0.0, None);
        let manual: Vec<_> = [(1, &a), (2, &b)]
            .into_iter()
            .map(|(id, score)| ManualScore {
                model: ModelId::new(id),
                local_id: "c1".to_string(),
                element: ElementRef::new(ModelIndex::new(id as usize - 1), Id::new("c1")),
                score,
            })
            .collect();

        assert_eq!(weighted_credits(&manual, &[1.0, 1.0]), 1.0);
        assert_eq!(weighted_credits(&manual, &[3.0, 1.0]), 1.5);
        assert_eq!(weighted_credits(&manual, &[0.0, 0.0]), 1.0);
    }

    #[test]
    fn test_entry_deserialization() {
        let entry: AssessmentEntry =
            serde_json::from_str(r#"{"local_id": "c1", "credits": 1.5}"#).unwrap();
        assert_eq!(entry, AssessmentEntry::new("c1", 1.5));
    }
}
