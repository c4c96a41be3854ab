//! Similarity index.
//!
//! Clusters partition every registered element: each element belongs to
//! exactly one cluster, and all members of a cluster share the same
//! [`ElementKind`]. An element joins the cluster whose representative it is
//! most similar to, provided the similarity reaches the configured threshold;
//! otherwise it founds a new cluster. Clusters only ever grow.

use std::{collections::HashMap, fmt};

use log::debug;
use serde::Serialize;

use compass_core::{element::ElementKind, identifier::Id};

use crate::{
    config::SimilarityConfig,
    similarity::{ElementView, normalize, similarity},
    state::{ModelIndex, ModelSlot},
};

/// Identifier of a similarity cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ClusterId(usize);

impl ClusterId {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster-{}", self.0)
    }
}

/// A registered element, addressed by arena slot and local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ElementRef {
    pub model: ModelIndex,
    pub local_id: Id,
}

impl ElementRef {
    pub fn new(model: ModelIndex, local_id: Id) -> Self {
        Self { model, local_id }
    }

    /// Resolves the element against the arena.
    pub fn view<'a>(&self, slots: &'a [ModelSlot]) -> Option<ElementView<'a>> {
        let model = slots.get(self.model.get())?.model();
        ElementView::find(model, self.local_id)
    }
}

/// A cluster member and how closely it matches the representative.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Member {
    pub element: ElementRef,
    pub match_strength: f64,
}

/// Canonical description of a cluster's representative, used in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Signature {
    kind: ElementKind,
    name: String,
    parts: Vec<String>,
}

impl Signature {
    /// Kind, canonical name, and canonical child names (nodes) or endpoint
    /// names (edges).
    fn of(view: ElementView<'_>) -> Self {
        let element = view.element();
        let model = view.model();

        let parts = if element.kind().is_edge() {
            [element.source(), element.target()]
                .into_iter()
                .flatten()
                .filter_map(|id| model.element(id))
                .map(|endpoint| normalize(endpoint.name()))
                .collect()
        } else {
            let mut names: Vec<String> = model
                .children(element.local_id())
                .map(|child| normalize(child.name()))
                .collect();
            names.sort();
            names
        };

        Self {
            kind: element.kind(),
            name: normalize(element.name()),
            parts,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)?;
        if !self.parts.is_empty() {
            write!(f, " [{}]", self.parts.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Cluster {
    id: ClusterId,
    representative: ElementRef,
    signature: Signature,
    members: Vec<Member>,
}

impl Cluster {
    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn representative(&self) -> ElementRef {
        self.representative
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Members in join order; the representative comes first.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// All clusters, partitioned by element kind.
#[derive(Debug, Default)]
pub(crate) struct SimilarityIndex {
    clusters: Vec<Cluster>,
    by_kind: HashMap<ElementKind, Vec<ClusterId>>,
    reverse: HashMap<ElementRef, ClusterId>,
}

impl SimilarityIndex {
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.0)
    }

    pub fn cluster_of(&self, element: ElementRef) -> Option<ClusterId> {
        self.reverse.get(&element).copied()
    }

    /// Number of elements in the cluster of `element`, 0 if unindexed.
    pub fn cluster_size(&self, element: ElementRef) -> usize {
        self.cluster_of(element)
            .and_then(|id| self.cluster(id))
            .map_or(0, Cluster::len)
    }

    /// Places `element` into the best matching cluster of its kind, or into
    /// a new singleton cluster. Equally good clusters resolve to the lowest
    /// id. Already indexed elements keep their cluster.
    pub fn find_or_create_cluster(
        &mut self,
        slots: &[ModelSlot],
        element: ElementRef,
        config: &SimilarityConfig,
    ) -> Option<ClusterId> {
        if let Some(existing) = self.cluster_of(element) {
            return Some(existing);
        }
        let view = element.view(slots)?;
        let kind = view.element().kind();

        let mut best: Option<(ClusterId, f64)> = None;
        for &candidate in self.by_kind.get(&kind).into_iter().flatten() {
            let Some(representative) = self.clusters[candidate.0].representative().view(slots)
            else {
                continue;
            };
            let score = similarity(view, representative, config);
            if score >= config.cluster_threshold() && best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        let id = match best {
            Some((id, match_strength)) => {
                let cluster = &mut self.clusters[id.0];
                cluster.members.push(Member {
                    element,
                    match_strength,
                });
                debug!(
                    cluster:% = id,
                    element:% = element.local_id,
                    match_strength,
                    size = cluster.members.len();
                    "Element joined cluster"
                );
                id
            }
            None => {
                let id = ClusterId::new(self.clusters.len());
                let signature = Signature::of(view);
                debug!(cluster:% = id, signature:%; "Created cluster");
                self.clusters.push(Cluster {
                    id,
                    representative: element,
                    signature,
                    members: vec![Member {
                        element,
                        match_strength: 1.0,
                    }],
                });
                self.by_kind.entry(kind).or_default().push(id);
                id
            }
        };

        self.reverse.insert(element, id);
        Some(id)
    }

    /// Number of clusters per element kind.
    pub fn clusters_per_kind(&self) -> impl Iterator<Item = (ElementKind, usize)> + '_ {
        self.by_kind.iter().map(|(kind, ids)| (*kind, ids.len()))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }
}

#[cfg(test)]
mod tests {
    use compass_core::{
        element::{ClassType, Element, NodeKind},
        identifier::ModelId,
        model::{DiagramType, Model},
    };

    use super::*;

    fn slots(models: Vec<Model>) -> Vec<ModelSlot> {
        models.into_iter().map(ModelSlot::new).collect()
    }

    fn library(id: u64, class_name: &str) -> Model {
        Model::new(
            ModelId::new(id),
            DiagramType::ClassDiagram,
            vec![
                Element::node("c1", NodeKind::Class(ClassType::Class), class_name),
                Element::node("a1", NodeKind::Attribute, "title").with_parent("c1"),
            ],
        )
    }

    fn index_all(index: &mut SimilarityIndex, slots: &[ModelSlot]) {
        let config = SimilarityConfig::default();
        for (idx, slot) in slots.iter().enumerate() {
            for element in slot.model().elements() {
                let element = ElementRef::new(ModelIndex::new(idx), element.local_id());
                index.find_or_create_cluster(slots, element, &config);
            }
        }
    }

    #[test]
    fn test_identical_elements_share_cluster() {
        let slots = slots(vec![library(1, "Book"), library(2, "book")]);
        let mut index = SimilarityIndex::default();
        index_all(&mut index, &slots);

        assert_eq!(index.len(), 2);
        let first = ElementRef::new(ModelIndex::new(0), Id::new("c1"));
        let second = ElementRef::new(ModelIndex::new(1), Id::new("c1"));
        assert_eq!(index.cluster_of(first), index.cluster_of(second));
        assert_eq!(index.cluster_size(first), 2);

        let cluster = index.cluster(index.cluster_of(first).unwrap()).unwrap();
        assert_eq!(cluster.representative(), first);
        assert_eq!(cluster.members()[0].match_strength, 1.0);
        assert_eq!(cluster.members()[1].match_strength, 1.0);
        assert_eq!(cluster.signature().to_string(), "class(Class) 'book' [title]");
    }

    #[test]
    fn test_dissimilar_elements_found_new_clusters() {
        let slots = slots(vec![library(1, "Book"), library(2, "Invoice")]);
        let mut index = SimilarityIndex::default();
        index_all(&mut index, &slots);

        // Classes differ, and so do the attributes through their owners.
        assert_eq!(index.len(), 4);
        let per_kind: HashMap<_, _> = index.clusters_per_kind().collect();
        assert_eq!(per_kind[&ElementKind::Node(NodeKind::Attribute)], 2);
    }

    #[test]
    fn test_equally_good_clusters_resolve_to_lowest_id() {
        let class = |id: u64, name: &str| {
            Model::new(
                ModelId::new(id),
                DiagramType::ClassDiagram,
                vec![Element::node("c1", NodeKind::Class(ClassType::Class), name)],
            )
        };
        let slots = slots(vec![class(1, "ab"), class(2, "cd"), class(3, "abcd")]);
        let config = SimilarityConfig::new(0.6, 0.6, 0.2, 0.2);
        let mut index = SimilarityIndex::default();

        let ids: Vec<_> = (0..slots.len())
            .map(|idx| {
                let element = ElementRef::new(ModelIndex::new(idx), Id::new("c1"));
                index.find_or_create_cluster(&slots, element, &config)
            })
            .collect();

        // "ab" and "cd" share nothing; "abcd" matches both equally.
        assert_eq!(ids[0], Some(ClusterId::new(0)));
        assert_eq!(ids[1], Some(ClusterId::new(1)));
        assert_eq!(ids[2], Some(ClusterId::new(0)));

        let joined = index.cluster(ClusterId::new(0)).unwrap();
        assert_eq!(joined.len(), 2);
        assert!((joined.members()[1].match_strength - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(index.cluster(ClusterId::new(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_reindexing_is_a_no_op() {
        let slots = slots(vec![library(1, "Book")]);
        let mut index = SimilarityIndex::default();
        index_all(&mut index, &slots);
        index_all(&mut index, &slots);

        assert_eq!(index.len(), 2);
        for local_id in ["c1", "a1"] {
            let element = ElementRef::new(ModelIndex::new(0), Id::new(local_id));
            assert_eq!(index.cluster_size(element), 1);
        }
    }
}
