//! Diagram element types for the canonical model.
//!
//! Every diagram family (class, object, activity, use-case, communication,
//! component, deployment, Petri net, BPMN, flowchart, syntax tree) is
//! decomposed into the same two roles: nodes (shapes) and edges
//! (connectors). The concrete flavour lives in [`ElementKind`], a plain
//! `Copy` discriminant that the engine dispatches on and partitions clusters
//! by.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// Class flavours of a class diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Class,
    AbstractClass,
    Interface,
    Enumeration,
}

/// Node flavours of an activity diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityNodeType {
    Initial,
    Final,
    Action,
    Object,
    Decision,
    Merge,
    Fork,
    Join,
}

/// Shapes of a flowchart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowchartShape {
    Terminal,
    Process,
    Decision,
    InputOutput,
    FunctionCall,
}

/// Shapes of a BPMN process diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpmnShape {
    Task,
    Subprocess,
    Transaction,
    CallActivity,
    StartEvent,
    IntermediateEvent,
    EndEvent,
    Gateway,
    DataObject,
    DataStore,
    Pool,
    Swimlane,
    Group,
    Annotation,
}

/// Connector types of a BPMN process diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpmnFlowType {
    Sequence,
    Message,
    Association,
    DataAssociation,
}

/// Relationship types shared by class, component and deployment diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Association,
    DirectedAssociation,
    Aggregation,
    Composition,
    Inheritance,
    Realization,
    Dependency,
    InterfaceProvided,
    InterfaceRequired,
}

/// Connector types of a use-case diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseRelation {
    Association,
    Include,
    Extend,
    Generalization,
}

/// Shape kinds across all supported diagram families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class(ClassType),
    Attribute,
    Method,
    Activity,
    ActivityNode(ActivityNodeType),
    Component,
    ComponentInterface,
    UseCase,
    Actor,
    SystemBoundary,
    Flowchart(FlowchartShape),
    SyntaxTreeNonterminal,
    SyntaxTreeTerminal,
    /// Named instance in an object or communication diagram.
    Object,
    /// Execution environment or device of a deployment diagram.
    DeploymentNode,
    Artifact,
    PetriNetPlace,
    PetriNetTransition,
    Bpmn(BpmnShape),
}

/// Connector kinds across all supported diagram families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Relationship(RelationshipType),
    ControlFlow,
    Association(UseCaseRelation),
    Flowline,
    Link,
    /// Object link of a communication diagram; its name carries the
    /// messages sent along it.
    CommunicationLink,
    ObjectLink,
    PetriNetArc,
    BpmnFlow(BpmnFlowType),
}

impl EdgeKind {
    /// Returns `true` if source and target of this edge kind are interchangeable.
    pub fn is_undirected(&self) -> bool {
        matches!(
            self,
            EdgeKind::Relationship(RelationshipType::Association)
                | EdgeKind::Association(UseCaseRelation::Association)
                | EdgeKind::CommunicationLink
                | EdgeKind::ObjectLink
                | EdgeKind::BpmnFlow(BpmnFlowType::Association)
        )
    }
}

/// The role and flavour of an [`Element`].
///
/// Two elements can only ever be judged similar if their kinds are equal, so
/// this type doubles as the partition key of the similarity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Node(NodeKind),
    Edge(EdgeKind),
}

impl ElementKind {
    /// Returns `true` for connector kinds.
    pub fn is_edge(&self) -> bool {
        matches!(self, ElementKind::Edge(_))
    }

    /// Returns `true` for shape kinds.
    pub fn is_node(&self) -> bool {
        matches!(self, ElementKind::Node(_))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node(kind) => match kind {
                NodeKind::Class(class_type) => write!(f, "class({class_type:?})"),
                NodeKind::ActivityNode(node_type) => write!(f, "activity_node({node_type:?})"),
                NodeKind::Flowchart(shape) => write!(f, "flowchart({shape:?})"),
                NodeKind::Bpmn(shape) => write!(f, "bpmn({shape:?})"),
                other => write!(f, "{other:?}"),
            },
            ElementKind::Edge(kind) => match kind {
                EdgeKind::Relationship(rel) => write!(f, "relationship({rel:?})"),
                EdgeKind::Association(rel) => write!(f, "association({rel:?})"),
                EdgeKind::BpmnFlow(flow) => write!(f, "bpmn_flow({flow:?})"),
                other => write!(f, "{other:?}"),
            },
        }
    }
}

/// One diagram shape or connector.
///
/// Relations to other elements of the same model are expressed through
/// their [`Id`]s: `parent` for owned elements (attributes of a class, use
/// cases inside a system boundary) and `source`/`target` for edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "id")]
    local_id: Id,
    kind: ElementKind,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<Id>,
}

impl Element {
    /// Create a shape element.
    pub fn node(local_id: impl Into<Id>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            kind: ElementKind::Node(kind),
            name: name.into(),
            parent: None,
            source: None,
            target: None,
        }
    }

    /// Create a connector element between `source` and `target`.
    pub fn edge(
        local_id: impl Into<Id>,
        kind: EdgeKind,
        source: impl Into<Id>,
        target: impl Into<Id>,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            kind: ElementKind::Edge(kind),
            name: String::new(),
            parent: None,
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }

    /// Set the owning element.
    pub fn with_parent(mut self, parent: impl Into<Id>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn local_id(&self) -> Id {
        self.local_id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The display name as drawn in the diagram.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} {}", self.kind, self.local_id)
        } else {
            write!(f, "{} '{}' ({})", self.kind, self.name, self.local_id)
        }
    }
}
