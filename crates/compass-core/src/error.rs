//! Structural errors raised when a model violates its own invariants.

use thiserror::Error;

use crate::identifier::Id;

/// A structural defect found by [`Model::validate`](crate::model::Model::validate).
///
/// Each variant names the offending element so the caller can point the
/// submitter at the exact shape or connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("duplicate element id `{0}`")]
    DuplicateElement(Id),

    #[error("edge `{0}` is missing its {1} endpoint")]
    MissingEndpoint(Id, Endpoint),

    #[error("node `{0}` must not carry edge endpoints")]
    NodeWithEndpoints(Id),

    #[error("element `{element}` references unknown {relation} `{reference}`")]
    DanglingReference {
        element: Id,
        relation: Relation,
        reference: Id,
    },

    #[error("element `{element}` has edge `{parent}` as parent")]
    EdgeAsParent { element: Id, parent: Id },

    #[error("element `{0}` is part of a parent cycle")]
    ParentCycle(Id),
}

/// Which side of an edge an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// Which reference of an element an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Parent,
    Source,
    Target,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Parent => write!(f, "parent"),
            Relation::Source => write!(f, "source"),
            Relation::Target => write!(f, "target"),
        }
    }
}
