//! Configuration types for the Compass grading engine.
//!
//! This module provides the tunables that control clustering, grading and
//! diversity sampling. All types implement [`serde::Deserialize`] and every
//! field has a default, so a partial configuration file is always valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`SimilarityConfig`] - Cluster threshold and similarity blend weights.
//! - [`GradingConfig`] - Thresholds deciding when a model is entirely assessed.
//! - [`DiversityConfig`] - Pair sampling limits for the diversity metric.
//!
//! # Example
//!
//! ```
//! # use compass::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.similarity().cluster_threshold(), 0.95);
//! assert_eq!(config.grading().confidence_threshold(), 0.75);
//! ```

use serde::Deserialize;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Similarity and clustering section.
    #[serde(default)]
    similarity: SimilarityConfig,

    /// Grade calculation section.
    #[serde(default)]
    grading: GradingConfig,

    /// Diversity sampling section.
    #[serde(default)]
    diversity: DiversityConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        similarity: SimilarityConfig,
        grading: GradingConfig,
        diversity: DiversityConfig,
    ) -> Self {
        Self {
            similarity,
            grading,
            diversity,
        }
    }

    /// Returns the similarity configuration.
    pub fn similarity(&self) -> &SimilarityConfig {
        &self.similarity
    }

    /// Returns the grading configuration.
    pub fn grading(&self) -> &GradingConfig {
        &self.grading
    }

    /// Returns the diversity configuration.
    pub fn diversity(&self) -> &DiversityConfig {
        &self.diversity
    }
}

/// Tunables of the element similarity function and the cluster index.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum similarity to a cluster representative for an element to join.
    cluster_threshold: f64,

    /// Share of the name in the score of a node with children.
    name_weight: f64,

    /// Share of the parent context in the score of an owned node.
    parent_weight: f64,

    /// Share of the edge label in the score of a named edge.
    edge_name_weight: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: 0.95,
            name_weight: 0.6,
            parent_weight: 0.2,
            edge_name_weight: 0.2,
        }
    }
}

impl SimilarityConfig {
    /// Creates a similarity configuration; weights are clamped to `[0, 1]`.
    pub fn new(
        cluster_threshold: f64,
        name_weight: f64,
        parent_weight: f64,
        edge_name_weight: f64,
    ) -> Self {
        Self {
            cluster_threshold: cluster_threshold.clamp(0.0, 1.0),
            name_weight: name_weight.clamp(0.0, 1.0),
            parent_weight: parent_weight.clamp(0.0, 1.0),
            edge_name_weight: edge_name_weight.clamp(0.0, 1.0),
        }
    }

    pub fn cluster_threshold(&self) -> f64 {
        self.cluster_threshold
    }

    pub fn name_weight(&self) -> f64 {
        self.name_weight.clamp(0.0, 1.0)
    }

    pub fn parent_weight(&self) -> f64 {
        self.parent_weight.clamp(0.0, 1.0)
    }

    pub fn edge_name_weight(&self) -> f64 {
        self.edge_name_weight.clamp(0.0, 1.0)
    }
}

/// Thresholds of the grade calculator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Minimum model confidence for a model to count as entirely assessed.
    /// Inferred scores below this strength also keep a model attractive to
    /// the optimal-submission selector.
    confidence_threshold: f64,

    /// Minimum coverage for a model to count as entirely assessed.
    coverage_threshold: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.75,
            coverage_threshold: 0.8,
        }
    }
}

impl GradingConfig {
    pub fn new(confidence_threshold: f64, coverage_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            coverage_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn coverage_threshold(&self) -> f64 {
        self.coverage_threshold
    }
}

/// Sampling limits of the diversity metric.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Largest number of model pairs compared exhaustively.
    max_pairs: usize,

    /// Seed of the pair sampler used above `max_pairs`.
    seed: u64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            max_pairs: 500,
            seed: 24301,
        }
    }
}

impl DiversityConfig {
    pub fn new(max_pairs: usize, seed: u64) -> Self {
        Self { max_pairs, seed }
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.similarity().cluster_threshold(), 0.95);
        assert_eq!(config.similarity().name_weight(), 0.6);
        assert_eq!(config.similarity().parent_weight(), 0.2);
        assert_eq!(config.similarity().edge_name_weight(), 0.2);
        assert_eq!(config.grading().confidence_threshold(), 0.75);
        assert_eq!(config.grading().coverage_threshold(), 0.8);
        assert_eq!(config.diversity().max_pairs(), 500);
        assert_eq!(config.diversity().seed(), 24301);
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [similarity]
            cluster_threshold = 0.9

            [diversity]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.similarity().cluster_threshold(), 0.9);
        assert_eq!(config.similarity().name_weight(), 0.6);
        assert_eq!(config.grading().coverage_threshold(), 0.8);
        assert_eq!(config.diversity().seed(), 7);
        assert_eq!(config.diversity().max_pairs(), 500);
    }

    #[test]
    fn test_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.grading().confidence_threshold(), 0.75);
    }

    #[test]
    fn test_new_clamps_weights() {
        let similarity = SimilarityConfig::new(1.5, -0.2, 0.3, 2.0);

        assert_eq!(similarity.cluster_threshold(), 1.0);
        assert_eq!(similarity.name_weight(), 0.0);
        assert_eq!(similarity.parent_weight(), 0.3);
        assert_eq!(similarity.edge_name_weight(), 1.0);
    }
}
