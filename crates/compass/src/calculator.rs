//! Grade calculation.
//!
//! Grades are derived data: they are computed from a model's elements and
//! its recorded scores, and recomputed from scratch whenever those scores
//! change.

use std::collections::HashMap;

use indexmap::IndexMap;

use compass_core::{grade::Grade, identifier::Id, model::Model, score::Score};

use crate::config::GradingConfig;

/// Computes the grade of `model` from its recorded scores.
///
/// - `points` sums the credits of scored elements.
/// - `coverage` is the fraction of scored elements, 1.0 for an empty model.
/// - `confidence` averages element confidence over all elements, counting
///   unscored elements as 0; it is 0.0 when nothing is scored.
pub fn compute_grade(
    model: &Model,
    scores: &HashMap<Id, Score>,
    config: &GradingConfig,
) -> Grade {
    let total = model.len();

    let ordered: IndexMap<Id, Score> = model
        .elements()
        .iter()
        .filter_map(|element| {
            let id = element.local_id();
            scores.get(&id).map(|score| (id, score.clone()))
        })
        .collect();

    let points = ordered.values().map(|score| score.credits).sum();
    let (coverage, confidence) = if total == 0 {
        (1.0, 0.0)
    } else if ordered.is_empty() {
        (0.0, 0.0)
    } else {
        let confidence: f64 = ordered.values().map(Score::confidence).sum();
        (
            ordered.len() as f64 / total as f64,
            confidence / total as f64,
        )
    };

    let entirely_assessed = coverage == 1.0
        && confidence >= config.confidence_threshold()
        && coverage >= config.coverage_threshold();

    Grade {
        points,
        coverage,
        confidence,
        entirely_assessed,
        scores: ordered,
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use compass_core::{
        element::{Element, NodeKind},
        identifier::ModelId,
        model::DiagramType,
    };

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Element count plus, per element, an optional (credits, manual, strength).
    fn scored_model_strategy() -> impl Strategy<Value = Vec<Option<(f64, bool, f64)>>> {
        prop::collection::vec(
            prop::option::of((-5.0f64..10.0, any::<bool>(), 0.0f64..=1.0)),
            0..20,
        )
    }

    fn build(entries: &[Option<(f64, bool, f64)>]) -> (Model, HashMap<Id, Score>) {
        let mut elements = Vec::new();
        let mut scores = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            let id = format!("m{i}");
            elements.push(Element::node(id.as_str(), NodeKind::Method, id.as_str()));
            if let Some((credits, manual, strength)) = *entry {
                let score = if manual {
                    Score::manual(credits, None)
                } else {
                    Score::inferred(credits, None, strength)
                };
                scores.insert(Id::new(&id), score);
            }
        }
        (
            Model::new(ModelId::new(1), DiagramType::ClassDiagram, elements),
            scores,
        )
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Coverage and confidence always stay within [0, 1].
    fn check_bounds(entries: Vec<Option<(f64, bool, f64)>>) -> Result<(), TestCaseError> {
        let (model, scores) = build(&entries);
        let grade = compute_grade(&model, &scores, &GradingConfig::default());

        prop_assert!((0.0..=1.0).contains(&grade.coverage));
        prop_assert!((0.0..=1.0 + 1e-9).contains(&grade.confidence));
        prop_assert!(grade.confidence <= grade.coverage + 1e-9);
        Ok(())
    }

    /// Adding a score never lowers coverage.
    fn check_coverage_is_monotone(
        entries: Vec<Option<(f64, bool, f64)>>,
        pick: usize,
    ) -> Result<(), TestCaseError> {
        let (model, mut scores) = build(&entries);
        let config = GradingConfig::default();
        let before = compute_grade(&model, &scores, &config);

        if let Some(element) = model.elements().get(pick % model.len().max(1)) {
            scores.insert(element.local_id(), Score::manual(1.0, None));
        }
        let after = compute_grade(&model, &scores, &config);

        prop_assert!(after.coverage >= before.coverage);
        Ok(())
    }

    // ===================
    // Property Tests
    // ===================

    proptest! {
        #[test]
        fn grade_bounds(entries in scored_model_strategy()) {
            check_bounds(entries)?;
        }

        #[test]
        fn coverage_is_monotone(entries in scored_model_strategy(), pick in 0usize..32) {
            check_coverage_is_monotone(entries, pick)?;
        }
    }
}
