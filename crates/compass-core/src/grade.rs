//! Per-model grade aggregate.
//!
//! A [`Grade`] is a snapshot: the engine recomputes it from scratch whenever a
//! score of the model changes and swaps the old snapshot out. Points are kept
//! unrounded; rounding happens only in [`Grade::exported`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{identifier::Id, score::Score};

/// Rounds `value` to the nearest multiple of 0.5, ties rounding up.
///
/// # Examples
///
/// ```
/// use compass_core::grade::round_to_half;
///
/// assert_eq!(round_to_half(6.12), 6.0);
/// assert_eq!(round_to_half(7.25), 7.5);
/// assert_eq!(round_to_half(7.74), 7.5);
/// ```
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0 + 0.5).floor() / 2.0
}

/// Aggregated result for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    /// Sum of credits over scored elements.
    pub points: f64,
    /// Fraction of elements that carry a score.
    pub coverage: f64,
    /// Mean element confidence over all elements.
    pub confidence: f64,
    pub entirely_assessed: bool,
    /// Scores keyed by element id, in element order.
    pub scores: IndexMap<Id, Score>,
}

impl Grade {
    /// The grade of a model nobody has scored yet.
    ///
    /// An empty model is fully covered by convention.
    pub fn unassessed(is_empty_model: bool) -> Self {
        Self {
            points: 0.0,
            coverage: if is_empty_model { 1.0 } else { 0.0 },
            confidence: 0.0,
            entirely_assessed: false,
            scores: IndexMap::new(),
        }
    }

    pub fn score(&self, id: Id) -> Option<&Score> {
        self.scores.get(&id)
    }

    /// Number of elements scored by a human.
    pub fn manual_count(&self) -> usize {
        self.scores.values().filter(|score| score.is_manual()).count()
    }

    /// Produces the externally visible form with rounded points.
    pub fn exported(&self) -> ExportedGrade {
        ExportedGrade {
            points: round_to_half(self.points),
            raw_points: self.points,
            coverage: self.coverage,
            confidence: self.confidence,
            entirely_assessed: self.entirely_assessed,
        }
    }
}

/// A grade as shown to graders and students.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportedGrade {
    /// Points rounded to the nearest 0.5.
    pub points: f64,
    pub raw_points: f64,
    pub coverage: f64,
    pub confidence: f64,
    pub entirely_assessed: bool,
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_round_to_half() {
        assert_eq!(round_to_half(0.0), 0.0);
        assert_eq!(round_to_half(0.1), 0.0);
        assert_eq!(round_to_half(0.25), 0.5);
        assert_eq!(round_to_half(4.9), 5.0);
        assert_eq!(round_to_half(6.12), 6.0);
        assert_eq!(round_to_half(7.3), 7.5);
        assert_eq!(round_to_half(7.75), 8.0);
        assert_eq!(round_to_half(9.5), 9.5);
    }

    #[test]
    fn test_rounding_applies_to_total_only() {
        let credits = [
            0.0000001,
            0.1,
            5.09,
            6.12,
            7.5,
            7.59,
            8.0,
            9.68,
            9.9999999999999,
        ];
        let raw: f64 = credits.iter().sum();
        let per_element: Vec<f64> = credits.iter().copied().map(round_to_half).collect();

        assert_approx_eq!(f64, raw, 54.0800001, epsilon = 1e-6);
        assert_eq!(
            per_element,
            vec![0.0, 0.0, 5.0, 6.0, 7.5, 7.5, 8.0, 9.5, 10.0]
        );
        assert_eq!(per_element.iter().sum::<f64>(), 53.5);

        let grade = Grade {
            points: raw,
            ..Grade::unassessed(false)
        };
        let exported = grade.exported();
        assert_eq!(exported.points, 54.0);
        assert_approx_eq!(f64, exported.raw_points, raw);
    }

    #[test]
    fn test_unassessed() {
        let empty = Grade::unassessed(true);
        assert_eq!(empty.coverage, 1.0);
        assert_eq!(empty.confidence, 0.0);
        assert_eq!(empty.points, 0.0);
        assert!(!empty.entirely_assessed);

        assert_eq!(Grade::unassessed(false).coverage, 0.0);
    }

    #[test]
    fn test_manual_count() {
        let mut grade = Grade::unassessed(false);
        grade.scores.insert(Id::new("a"), Score::manual(1.0, None));
        grade.scores.insert(Id::new("b"), Score::inferred(1.0, None, 0.9));

        assert_eq!(grade.manual_count(), 1);
        assert!(grade.score(Id::new("b")).is_some());
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn points_strategy() -> impl Strategy<Value = f64> {
        -1000.0f64..1000.0
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Rounded values are multiples of 0.5 at most a quarter away.
    fn check_rounding_is_nearest_half(value: f64) -> Result<(), TestCaseError> {
        let rounded = round_to_half(value);

        prop_assert!((rounded - value).abs() <= 0.25 + 1e-9);
        prop_assert!(approx_eq!(f64, (rounded * 2.0).fract(), 0.0));
        Ok(())
    }

    /// Rounding an already rounded value changes nothing.
    fn check_rounding_is_idempotent(value: f64) -> Result<(), TestCaseError> {
        let once = round_to_half(value);
        prop_assert_eq!(round_to_half(once), once);
        Ok(())
    }

    /// Rounding preserves order.
    fn check_rounding_is_monotone(a: f64, b: f64) -> Result<(), TestCaseError> {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(round_to_half(low) <= round_to_half(high));
        Ok(())
    }

    // ===================
    // Property Tests
    // ===================

    proptest! {
        #[test]
        fn rounding_is_nearest_half(value in points_strategy()) {
            check_rounding_is_nearest_half(value)?;
        }

        #[test]
        fn rounding_is_idempotent(value in points_strategy()) {
            check_rounding_is_idempotent(value)?;
        }

        #[test]
        fn rounding_is_monotone(a in points_strategy(), b in points_strategy()) {
            check_rounding_is_monotone(a, b)?;
        }
    }
}
