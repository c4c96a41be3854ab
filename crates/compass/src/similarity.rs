//! Element similarity.
//!
//! [`similarity`] scores how alike two elements are, possibly from different
//! models, on a `[0, 1]` scale. Elements of different kinds never match. For
//! nodes the score combines the display name with the structure the node
//! owns (attributes and methods of a class, actions inside an activity) and,
//! for owned nodes, the name of the owner. For edges the score is driven by
//! how alike the connected endpoints are.

pub mod name;

use std::cmp::Ordering;

use log::trace;

use compass_core::{
    element::{Element, ElementKind},
    identifier::Id,
    model::Model,
};

use crate::config::SimilarityConfig;

pub use name::{name_similarity, normalize};

/// Nesting depth after which structure is ignored and only names count.
pub const MAX_DEPTH: usize = 4;

/// An element together with the model it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    model: &'a Model,
    element: &'a Element,
}

impl<'a> ElementView<'a> {
    pub fn new(model: &'a Model, element: &'a Element) -> Self {
        Self { model, element }
    }

    /// Looks up `id` in `model`.
    pub fn find(model: &'a Model, id: Id) -> Option<Self> {
        model.element(id).map(|element| Self::new(model, element))
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    fn children(&self) -> Vec<ElementView<'a>> {
        let model = self.model;
        model
            .children(self.element.local_id())
            .map(|element| ElementView::new(model, element))
            .collect()
    }

    fn parent(&self) -> Option<ElementView<'a>> {
        let model = self.model;
        model
            .parent_of(self.element)
            .map(|element| ElementView::new(model, element))
    }

    fn resolve(&self, id: Option<Id>) -> Option<ElementView<'a>> {
        id.and_then(|id| ElementView::find(self.model, id))
    }
}

/// Similarity of two elements in `[0, 1]`.
pub fn similarity(a: ElementView<'_>, b: ElementView<'_>, config: &SimilarityConfig) -> f64 {
    let score = similarity_at(a, b, config, 0).clamp(0.0, 1.0);
    trace!(
        a:% = a.element.local_id(),
        b:% = b.element.local_id(),
        score;
        "Compared elements"
    );
    score
}

fn similarity_at(
    a: ElementView<'_>,
    b: ElementView<'_>,
    config: &SimilarityConfig,
    depth: usize,
) -> f64 {
    let kind = a.element.kind();
    if kind != b.element.kind() {
        return 0.0;
    }
    if depth >= MAX_DEPTH {
        return name_similarity(a.element.name(), b.element.name());
    }

    match kind {
        ElementKind::Node(_) => node_similarity(a, b, config, depth),
        ElementKind::Edge(edge_kind) => {
            edge_similarity(a, b, edge_kind.is_undirected(), config, depth)
        }
    }
}

fn node_similarity(
    a: ElementView<'_>,
    b: ElementView<'_>,
    config: &SimilarityConfig,
    depth: usize,
) -> f64 {
    let name = name_similarity(a.element.name(), b.element.name());

    let a_children = a.children();
    let b_children = b.children();
    let own = if a_children.is_empty() && b_children.is_empty() {
        name
    } else {
        let children = children_similarity(&a_children, &b_children, config, depth);
        blend(children, name, config.name_weight())
    };

    // Owner context applies to the compared elements only.
    if depth > 0 {
        return own;
    }
    let context = match (a.parent(), b.parent()) {
        (None, None) => return own,
        (Some(a_parent), Some(b_parent)) => {
            name_similarity(a_parent.element.name(), b_parent.element.name())
        }
        _ => 0.0,
    };
    blend(own, context, config.parent_weight())
}

/// Similarity of two whole models in `[0, 1]`.
///
/// Every element of `a` is paired with at most one element of `b`, best
/// pairs first, and the pair scores are summed and divided by the larger
/// element count. Models of different diagram types score 0; two empty
/// models of the same type score 1.
pub fn model_similarity(a: &Model, b: &Model, config: &SimilarityConfig) -> f64 {
    if a.diagram_type() != b.diagram_type() {
        return 0.0;
    }
    let score = greedy_match(&views_of(a), &views_of(b), |x, y| {
        similarity_at(x, y, config, 0)
    });
    trace!(a:% = a.id(), b:% = b.id(), score; "Compared models");
    score.clamp(0.0, 1.0)
}

fn views_of(model: &Model) -> Vec<ElementView<'_>> {
    model
        .elements()
        .iter()
        .map(|element| ElementView::new(model, element))
        .collect()
}

/// Greedy best-first matching of two child lists, normalized by the larger
/// list so missing or surplus children lower the score.
fn children_similarity(
    a: &[ElementView<'_>],
    b: &[ElementView<'_>],
    config: &SimilarityConfig,
    depth: usize,
) -> f64 {
    greedy_match(a, b, |x, y| similarity_at(x, y, config, depth + 1))
}

/// Pairs the elements of `a` and `b` one-to-one, highest score first with
/// ties broken by position, and returns the summed pair scores over the
/// larger list length. Two empty lists match perfectly.
fn greedy_match<'a>(
    a: &[ElementView<'a>],
    b: &[ElementView<'a>],
    score: impl Fn(ElementView<'a>, ElementView<'a>) -> f64,
) -> f64 {
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 1.0;
    }

    let mut pairs = Vec::new();
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            let pair_score = score(*x, *y);
            if pair_score > 0.0 {
                pairs.push((pair_score, i, j));
            }
        }
    }
    pairs.sort_by(|(s1, i1, j1), (s2, i2, j2)| {
        s2.partial_cmp(s1)
            .unwrap_or(Ordering::Equal)
            .then(i1.cmp(i2))
            .then(j1.cmp(j2))
    });

    let mut a_used = vec![false; a.len()];
    let mut b_used = vec![false; b.len()];
    let mut total = 0.0;
    for (pair_score, i, j) in pairs {
        if a_used[i] || b_used[j] {
            continue;
        }
        a_used[i] = true;
        b_used[j] = true;
        total += pair_score;
    }

    total / larger as f64
}

fn edge_similarity(
    a: ElementView<'_>,
    b: ElementView<'_>,
    undirected: bool,
    config: &SimilarityConfig,
    depth: usize,
) -> f64 {
    let a_source = a.resolve(a.element.source());
    let a_target = a.resolve(a.element.target());
    let b_source = b.resolve(b.element.source());
    let b_target = b.resolve(b.element.target());

    let endpoint = |x, y| endpoint_similarity(x, y, config, depth + 1);
    let forward = (endpoint(a_source, b_source) + endpoint(a_target, b_target)) / 2.0;
    let endpoints = if undirected {
        let swapped = (endpoint(a_source, b_target) + endpoint(a_target, b_source)) / 2.0;
        forward.max(swapped)
    } else {
        forward
    };

    if a.element.name().trim().is_empty() && b.element.name().trim().is_empty() {
        return endpoints;
    }
    let name = name_similarity(a.element.name(), b.element.name());
    blend(endpoints, name, config.edge_name_weight())
}

fn endpoint_similarity(
    a: Option<ElementView<'_>>,
    b: Option<ElementView<'_>>,
    config: &SimilarityConfig,
    depth: usize,
) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => similarity_at(a, b, config, depth),
        _ => 0.0,
    }
}

/// Moves `base` towards `other` by `weight`.
fn blend(base: f64, other: f64, weight: f64) -> f64 {
    base + weight * (other - base)
}
