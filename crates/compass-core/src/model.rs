//! Canonical submission model.
//!
//! A [`Model`] is one student's diagram, already decomposed by a
//! diagram-specific parser into a flat, ordered list of [`Element`]s. The
//! hierarchy (attributes of a class, use cases inside a boundary) is encoded
//! through parent back-references and is recovered on demand with
//! [`Model::children`].

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    element::Element,
    error::{Endpoint, Relation, StructuralError},
    identifier::{Id, ModelId},
};

/// The diagram family a model was drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    ClassDiagram,
    ObjectDiagram,
    ActivityDiagram,
    UseCaseDiagram,
    CommunicationDiagram,
    ComponentDiagram,
    DeploymentDiagram,
    PetriNet,
    Bpmn,
    Flowchart,
    SyntaxTree,
}

/// Serialized shape of a [`Model`]; the lookup index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct ModelDef {
    id: ModelId,
    diagram_type: DiagramType,
    #[serde(default)]
    elements: Vec<Element>,
}

/// One submitted diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelDef", into = "ModelDef")]
pub struct Model {
    id: ModelId,
    diagram_type: DiagramType,
    elements: Vec<Element>,
    positions: HashMap<Id, usize>,
    children: HashMap<Id, Vec<usize>>,
}

impl From<ModelDef> for Model {
    fn from(def: ModelDef) -> Self {
        Model::new(def.id, def.diagram_type, def.elements)
    }
}

impl From<Model> for ModelDef {
    fn from(model: Model) -> Self {
        ModelDef {
            id: model.id,
            diagram_type: model.diagram_type,
            elements: model.elements,
        }
    }
}

impl Model {
    /// Creates a model from its elements.
    ///
    /// Construction never fails; call [`Model::validate`] to check the
    /// structural invariants. When ids are duplicated the lookup index
    /// resolves to the first occurrence.
    pub fn new(id: ModelId, diagram_type: DiagramType, elements: Vec<Element>) -> Self {
        let mut positions = HashMap::with_capacity(elements.len());
        let mut children: HashMap<Id, Vec<usize>> = HashMap::new();
        for (idx, element) in elements.iter().enumerate() {
            positions.entry(element.local_id()).or_insert(idx);
            if let Some(parent) = element.parent() {
                children.entry(parent).or_default().push(idx);
            }
        }
        Self {
            id,
            diagram_type,
            elements,
            positions,
            children,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    /// All elements in submission order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Looks up an element by its local id.
    pub fn element(&self, id: Id) -> Option<&Element> {
        self.positions.get(&id).map(|&idx| &self.elements[idx])
    }

    pub fn contains(&self, id: Id) -> bool {
        self.positions.contains_key(&id)
    }

    /// Elements whose parent is `id`, in submission order.
    pub fn children(&self, id: Id) -> impl Iterator<Item = &Element> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.elements[idx])
    }

    /// The owning element of `element`, if any.
    pub fn parent_of(&self, element: &Element) -> Option<&Element> {
        element.parent().and_then(|parent| self.element(parent))
    }

    /// Checks the structural invariants of the model.
    ///
    /// Returns the first violation found, scanning elements in order.
    pub fn validate(&self) -> Result<(), StructuralError> {
        self.check_structure().inspect_err(|err| {
            debug!(model = self.id.get(), error:% = err; "Model failed structural validation");
        })
    }

    fn check_structure(&self) -> Result<(), StructuralError> {
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.local_id()) {
                return Err(StructuralError::DuplicateElement(element.local_id()));
            }
        }

        for element in &self.elements {
            self.validate_element(element)?;
        }

        self.validate_parent_chains()
    }

    fn validate_element(&self, element: &Element) -> Result<(), StructuralError> {
        let id = element.local_id();

        if element.kind().is_edge() {
            let source = element
                .source()
                .ok_or(StructuralError::MissingEndpoint(id, Endpoint::Source))?;
            let target = element
                .target()
                .ok_or(StructuralError::MissingEndpoint(id, Endpoint::Target))?;
            self.check_reference(id, Relation::Source, source)?;
            self.check_reference(id, Relation::Target, target)?;
        } else if element.source().is_some() || element.target().is_some() {
            return Err(StructuralError::NodeWithEndpoints(id));
        }

        if let Some(parent) = element.parent() {
            if parent == id {
                return Err(StructuralError::ParentCycle(id));
            }
            self.check_reference(id, Relation::Parent, parent)?;
            if self
                .element(parent)
                .is_some_and(|owner| owner.kind().is_edge())
            {
                return Err(StructuralError::EdgeAsParent {
                    element: id,
                    parent,
                });
            }
        }

        Ok(())
    }

    fn check_reference(
        &self,
        element: Id,
        relation: Relation,
        reference: Id,
    ) -> Result<(), StructuralError> {
        if self.contains(reference) {
            Ok(())
        } else {
            Err(StructuralError::DanglingReference {
                element,
                relation,
                reference,
            })
        }
    }

    /// Every parent chain must reach a root.
    fn validate_parent_chains(&self) -> Result<(), StructuralError> {
        let mut acyclic: HashSet<Id> = HashSet::new();

        for element in &self.elements {
            let mut chain = Vec::new();
            let mut current = Some(element);

            while let Some(node) = current {
                let id = node.local_id();
                if acyclic.contains(&id) {
                    break;
                }
                if chain.contains(&id) {
                    return Err(StructuralError::ParentCycle(element.local_id()));
                }
                chain.push(id);
                current = self.parent_of(node);
            }

            acyclic.extend(chain);
        }

        Ok(())
    }
}
