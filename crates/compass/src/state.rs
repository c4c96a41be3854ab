//! Engine state guarded by the engine lock.
//!
//! Models live in an append-only arena addressed by [`ModelIndex`]. Every
//! slot owns its model, the scores recorded for its elements, and the most
//! recently computed grade.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use compass_core::{
    grade::Grade,
    identifier::{Id, ModelId},
    model::Model,
    score::Score,
};

use crate::index::{ElementRef, SimilarityIndex};

/// Dense position of a model in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ModelIndex(usize);

impl ModelIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// One registered model with its scores and current grade.
#[derive(Debug)]
pub(crate) struct ModelSlot {
    model: Model,
    scores: HashMap<Id, Score>,
    grade: Arc<Grade>,
}

impl ModelSlot {
    pub fn new(model: Model) -> Self {
        let grade = Arc::new(Grade::unassessed(model.is_empty()));
        Self {
            model,
            scores: HashMap::new(),
            grade,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scores(&self) -> &HashMap<Id, Score> {
        &self.scores
    }

    pub fn score(&self, id: Id) -> Option<&Score> {
        self.scores.get(&id)
    }

    /// Stores `score` and reports whether the stored value changed.
    pub fn set_score(&mut self, id: Id, score: Score) -> bool {
        if self.scores.get(&id) == Some(&score) {
            return false;
        }
        self.scores.insert(id, score);
        true
    }

    pub fn grade(&self) -> &Arc<Grade> {
        &self.grade
    }

    /// Replaces the grade snapshot. Readers holding the old `Arc` keep it.
    pub fn replace_grade(&mut self, grade: Grade) {
        self.grade = Arc::new(grade);
    }
}

/// Everything the engine mutates under its write lock.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub slots: Vec<ModelSlot>,
    pub by_id: HashMap<ModelId, ModelIndex>,
    pub index: SimilarityIndex,
    pub waiting: BTreeSet<ModelId>,
}

impl EngineState {
    pub fn index_of(&self, id: ModelId) -> Option<ModelIndex> {
        self.by_id.get(&id).copied()
    }

    pub fn slot(&self, index: ModelIndex) -> &ModelSlot {
        &self.slots[index.get()]
    }

    pub fn slot_mut(&mut self, index: ModelIndex) -> &mut ModelSlot {
        &mut self.slots[index.get()]
    }

    /// Appends a model to the arena without indexing its elements.
    pub fn push(&mut self, model: Model) -> ModelIndex {
        let index = ModelIndex::new(self.slots.len());
        self.by_id.insert(model.id(), index);
        self.slots.push(ModelSlot::new(model));
        index
    }

    /// References to every element of the model at `index`, in element order.
    pub fn element_refs(&self, index: ModelIndex) -> Vec<ElementRef> {
        self.slot(index)
            .model()
            .elements()
            .iter()
            .map(|element| ElementRef::new(index, element.local_id()))
            .collect()
    }

    /// Registered model ids in registration order.
    pub fn model_ids(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.slots.iter().map(|slot| slot.model().id())
    }
}
