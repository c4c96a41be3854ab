//! Compass - semi-automatic grading of diagram submissions.
//!
//! Similar elements across student submissions are clustered, so a score a
//! grader gives to one element can be propagated to every element like it.
//! Per-submission grades track how much of a model is scored and how much
//! of that score can be trusted, and the engine suggests which submission a
//! human should grade next.

pub mod config;
pub mod diagnostic;
pub mod similarity;

mod calculator;
mod diversity;
mod error;
mod index;
mod propagation;
mod selector;
mod state;
mod statistics;

pub use compass_core::{element, grade, identifier, model, score};

pub use error::CompassError;
pub use index::ClusterId;
pub use propagation::{AssessmentEntry, AssessmentReport, validate_payload};
pub use statistics::Statistics;

use std::{collections::HashSet, sync::Arc};

use indexmap::IndexMap;
use log::{debug, info};
use parking_lot::RwLock;

use compass_core::{
    grade::Grade,
    identifier::{Id, ModelId},
    model::Model,
};

use config::AppConfig;
use index::ElementRef;
use similarity::ElementView;
use state::EngineState;

/// The grading engine.
///
/// All state sits behind one reader-writer lock: registering models and
/// ingesting assessments are exclusive, queries run concurrently on a
/// consistent snapshot. Grades are handed out as `Arc<Grade>` and never
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use compass::{AssessmentEntry, CompassEngine, config::AppConfig};
/// use compass::element::{ClassType, Element, NodeKind};
/// use compass::identifier::ModelId;
/// use compass::model::{DiagramType, Model};
///
/// let engine = CompassEngine::new(AppConfig::default());
///
/// for id in [1, 2] {
///     let model = Model::new(
///         ModelId::new(id),
///         DiagramType::ClassDiagram,
///         vec![Element::node("c1", NodeKind::Class(ClassType::Class), "Book")],
///     );
///     engine.register_model(model).expect("valid model");
/// }
///
/// engine
///     .ingest_assessment(ModelId::new(1), vec![AssessmentEntry::new("c1", 2.0)])
///     .expect("known model");
///
/// let grade = engine.get_result(ModelId::new(2)).expect("known model");
/// assert_eq!(grade.points, 2.0);
/// assert_eq!(grade.coverage, 1.0);
/// ```
#[derive(Debug, Default)]
pub struct CompassEngine {
    config: AppConfig,
    state: RwLock<EngineState>,
}

impl CompassEngine {
    /// Create a new engine with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registers a submission and clusters its elements.
    ///
    /// Elements that land in clusters which already hold manual scores are
    /// assessed right away, and the model's grade is computed before this
    /// returns. The model joins the waiting set unless that already made it
    /// entirely assessed.
    ///
    /// # Errors
    ///
    /// - [`CompassError::DuplicateModel`] if the id is already registered.
    /// - [`CompassError::StructuralViolation`] if the model is malformed.
    ///
    /// Nothing is changed when an error is returned.
    pub fn register_model(&self, model: Model) -> Result<Arc<Grade>, CompassError> {
        let id = model.id();
        model
            .validate()
            .map_err(|err| CompassError::structural(id, err))?;

        let mut state = self.state.write();
        if state.by_id.contains_key(&id) {
            return Err(CompassError::DuplicateModel(id));
        }

        info!(model = id.get(), elements = model.len(); "Registering model");
        let index = state.push(model);
        let state = &mut *state;
        for element in state.element_refs(index) {
            state
                .index
                .find_or_create_cluster(&state.slots, element, self.config.similarity());
        }

        let inferred = propagation::assess_new_model(state, index, &self.config);
        state.waiting.insert(id);
        propagation::recompute(state, [index].into(), &self.config);

        let grade = Arc::clone(state.slot(index).grade());
        debug!(
            model = id.get(),
            inferred,
            clusters = state.index.len(),
            waiting = state.waiting.contains(&id);
            "Model registered"
        );
        Ok(grade)
    }

    /// Records manual scores for a model and propagates them through the
    /// clusters of the scored elements.
    ///
    /// Entries naming unknown elements or carrying non-finite credits are
    /// skipped and reported as warnings; the rest of the batch is applied.
    /// Re-ingesting an identical payload leaves the engine unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if the model is not registered.
    pub fn ingest_assessment(
        &self,
        model_id: ModelId,
        entries: Vec<AssessmentEntry>,
    ) -> Result<AssessmentReport, CompassError> {
        let mut state = self.state.write();
        let index = state
            .index_of(model_id)
            .ok_or(CompassError::UnknownModel(model_id))?;

        info!(model = model_id.get(), entries = entries.len(); "Ingesting assessment");
        let report = propagation::ingest(&mut state, index, entries, &self.config);
        info!(
            model = model_id.get(),
            applied = report.applied,
            inferred = report.inferred,
            warnings = report.warnings.len(),
            recomputed = report.recomputed.len();
            "Assessment ingested"
        );
        Ok(report)
    }

    /// Returns the current grade snapshot of a model.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if the model is not registered.
    pub fn get_result(&self, model_id: ModelId) -> Result<Arc<Grade>, CompassError> {
        let state = self.state.read();
        let index = state
            .index_of(model_id)
            .ok_or(CompassError::UnknownModel(model_id))?;
        Ok(Arc::clone(state.slot(index).grade()))
    }

    /// Suggests the waiting model whose manual assessment would benefit the
    /// most other elements. `None` once the waiting set is empty.
    pub fn next_optimal_model(&self) -> Option<(ModelId, Arc<Grade>)> {
        let state = self.state.read();
        let id = selector::next_optimal(&state, self.config.grading())?;
        let index = state.index_of(id)?;
        Some((id, Arc::clone(state.slot(index).grade())))
    }

    /// Removes a model from the waiting set. Removing it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if the model is not registered.
    pub fn remove_from_waiting_set(&self, model_id: ModelId) -> Result<(), CompassError> {
        let mut state = self.state.write();
        if !state.by_id.contains_key(&model_id) {
            return Err(CompassError::UnknownModel(model_id));
        }
        if state.waiting.remove(&model_id) {
            info!(model = model_id.get(); "Removed model from waiting set");
        }
        Ok(())
    }

    /// Returns `true` if the model is still waiting for assessment.
    pub fn is_waiting(&self, model_id: ModelId) -> bool {
        self.state.read().waiting.contains(&model_id)
    }

    /// Registered model ids in registration order.
    pub fn model_ids(&self) -> Vec<ModelId> {
        self.state.read().model_ids().collect()
    }

    /// Similarity of two registered elements.
    ///
    /// Returns `Ok(None)` if either element does not exist in its model.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if either model is not registered.
    pub fn similarity(
        &self,
        model_a: ModelId,
        element_a: Id,
        model_b: ModelId,
        element_b: Id,
    ) -> Result<Option<f64>, CompassError> {
        let state = self.state.read();
        let index_a = state
            .index_of(model_a)
            .ok_or(CompassError::UnknownModel(model_a))?;
        let index_b = state
            .index_of(model_b)
            .ok_or(CompassError::UnknownModel(model_b))?;

        let a = ElementView::find(state.slot(index_a).model(), element_a);
        let b = ElementView::find(state.slot(index_b).model(), element_b);
        Ok(a.zip(b)
            .map(|(a, b)| similarity::similarity(a, b, self.config.similarity())))
    }

    /// Similarity of two registered models as a whole.
    ///
    /// Elements are paired greedily, best pairs first, and the pair scores
    /// are normalized by the larger element count.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if either model is not registered.
    pub fn model_similarity(
        &self,
        model_a: ModelId,
        model_b: ModelId,
    ) -> Result<f64, CompassError> {
        let state = self.state.read();
        let index_a = state
            .index_of(model_a)
            .ok_or(CompassError::UnknownModel(model_a))?;
        let index_b = state
            .index_of(model_b)
            .ok_or(CompassError::UnknownModel(model_b))?;

        Ok(similarity::model_similarity(
            state.slot(index_a).model(),
            state.slot(index_b).model(),
            self.config.similarity(),
        ))
    }

    /// The cluster an element belongs to, `Ok(None)` for unknown elements.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if the model is not registered.
    pub fn cluster_of(
        &self,
        model_id: ModelId,
        element: Id,
    ) -> Result<Option<ClusterId>, CompassError> {
        let state = self.state.read();
        let index = state
            .index_of(model_id)
            .ok_or(CompassError::UnknownModel(model_id))?;
        Ok(state.index.cluster_of(ElementRef::new(index, element)))
    }

    /// For each element of a model, how many other registered elements share
    /// its cluster.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownModel`] if the model is not registered.
    pub fn similar_element_counts(
        &self,
        model_id: ModelId,
    ) -> Result<IndexMap<Id, usize>, CompassError> {
        let state = self.state.read();
        let index = state
            .index_of(model_id)
            .ok_or(CompassError::UnknownModel(model_id))?;

        Ok(state
            .element_refs(index)
            .into_iter()
            .map(|element| {
                let others = state.index.cluster_size(element).saturating_sub(1);
                (element.local_id, others)
            })
            .collect())
    }

    /// Mean pairwise dissimilarity of all registered models.
    pub fn diversity(&self) -> f64 {
        let state = self.state.read();
        let cluster_sets: Vec<HashSet<ClusterId>> = (0..state.slots.len())
            .map(|idx| {
                state
                    .element_refs(state::ModelIndex::new(idx))
                    .into_iter()
                    .filter_map(|element| state.index.cluster_of(element))
                    .collect()
            })
            .collect();
        diversity::diversity(&cluster_sets, self.config.diversity())
    }

    /// Counts and means describing the current state.
    pub fn statistics(&self) -> Statistics {
        Statistics::collect(&self.state.read())
    }
}
