//! The diagram graph
//!
//! A [`Diagram`] owns its classes; relations are owned by their source class
//! and point at their target by id. Every mutation checks its preconditions
//! before touching anything, so a failed call leaves the diagram unchanged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    check_index, DiagramError, DiagramResult, EntityKind, LayoutResult, Position, DEFAULT_POSITION,
};

use super::invariants::{ensure_invariants, invariant_violations, InvariantViolation};
use super::{
    Attribute, AttributePatch, ClassEntity, Method, MethodPatch, Parameter, ParameterPatch,
    Relation, RelationPatch,
};

/// Which relations the diagram accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationPolicy {
    /// Accept relations whose target is their own source class
    pub allow_self_relations: bool,
}

/// A class diagram
///
/// Deserializing checks every invariant under the default
/// [`RelationPolicy`]; use [`DiagramDocument`] to pick another policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiagramDocument")]
pub struct Diagram {
    id: String,
    pub name: String,
    classes: Vec<ClassEntity>,
    #[serde(skip)]
    policy: RelationPolicy,
}

/// A diagram as written on disk, not yet checked
#[derive(Debug, Clone, Deserialize)]
pub struct DiagramDocument {
    pub id: String,
    pub name: String,
    pub classes: Vec<ClassEntity>,
}

impl DiagramDocument {
    /// Check the invariants under `policy` and build the diagram
    pub fn into_diagram(self, policy: RelationPolicy) -> DiagramResult<Diagram> {
        Diagram::from_classes_with_policy(self.id, self.name, self.classes, policy)
    }
}

impl TryFrom<DiagramDocument> for Diagram {
    type Error = DiagramError;

    fn try_from(document: DiagramDocument) -> DiagramResult<Self> {
        document.into_diagram(RelationPolicy::default())
    }
}

impl Diagram {
    /// Create an empty diagram with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            classes: Vec::new(),
            policy: RelationPolicy::default(),
        }
    }

    /// Build a diagram from existing classes, checking every invariant
    pub fn from_classes(
        id: impl Into<String>,
        name: impl Into<String>,
        classes: Vec<ClassEntity>,
    ) -> DiagramResult<Self> {
        Self::from_classes_with_policy(id, name, classes, RelationPolicy::default())
    }

    /// Like [`Diagram::from_classes`], checking relations against `policy`
    pub fn from_classes_with_policy(
        id: impl Into<String>,
        name: impl Into<String>,
        classes: Vec<ClassEntity>,
        policy: RelationPolicy,
    ) -> DiagramResult<Self> {
        let diagram = Self {
            id: id.into(),
            name: name.into(),
            classes,
            policy,
        };
        diagram.validate()?;
        Ok(diagram)
    }

    pub fn with_policy(mut self, policy: RelationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn policy(&self) -> RelationPolicy {
        self.policy
    }

    /// Change the relation policy
    ///
    /// Relations that already exist are kept even if the new policy would
    /// reject them; [`Diagram::violations`] reports them.
    pub fn set_policy(&mut self, policy: RelationPolicy) {
        self.policy = policy;
    }

    pub fn classes(&self) -> &[ClassEntity] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.class(id).is_some()
    }

    pub fn class(&self, id: &str) -> Option<&ClassEntity> {
        self.classes.iter().find(|c| c.id() == id)
    }

    fn class_mut(&mut self, id: &str) -> DiagramResult<&mut ClassEntity> {
        self.classes
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| DiagramError::not_found(id))
    }

    /// All broken invariants, empty for a consistent diagram
    pub fn violations(&self) -> Vec<InvariantViolation> {
        invariant_violations(&self.classes, &self.policy)
    }

    pub fn validate(&self) -> DiagramResult<()> {
        ensure_invariants(&self.classes, &self.policy)
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Add an empty class with a fresh id
    pub fn create_class(
        &mut self,
        name: impl Into<String>,
        position: Option<Position>,
    ) -> &ClassEntity {
        let class = ClassEntity::new(name).at(position.unwrap_or(DEFAULT_POSITION));
        debug!(class_id = %class.id(), name = %class.name, "Created class");
        let index = self.classes.len();
        self.classes.push(class);
        &self.classes[index]
    }

    /// Add a prepared class
    ///
    /// Fails if the id is taken or one of its relations would break an
    /// invariant. Relations may target any class already in the diagram, or
    /// the class itself when the policy allows it.
    pub fn insert_class(&mut self, class: ClassEntity) -> DiagramResult<&ClassEntity> {
        if self.contains(class.id().as_str()) {
            return Err(DiagramError::InvariantViolation {
                violations: vec![InvariantViolation::DuplicateClassId {
                    class_id: class.id().to_string(),
                }],
            });
        }
        for relation in &class.relations {
            self.check_target(class.id().as_str(), relation.target_class_id.as_str())?;
        }
        let index = self.classes.len();
        self.classes.push(class);
        Ok(&self.classes[index])
    }

    /// Remove a class and every relation that targets it
    ///
    /// Returns `None` when the id is unknown.
    pub fn delete_class(&mut self, id: &str) -> Option<ClassEntity> {
        let index = self.classes.iter().position(|c| c.id() == id)?;
        let removed = self.classes.remove(index);

        let mut stripped = 0;
        for class in &mut self.classes {
            let before = class.relations.len();
            class.relations.retain(|r| r.target_class_id != *id);
            stripped += before - class.relations.len();
        }
        debug!(class_id = %id, stripped_relations = stripped, "Deleted class");
        Some(removed)
    }

    pub fn rename_class(&mut self, id: &str, name: impl Into<String>) -> DiagramResult<()> {
        self.class_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> DiagramResult<()> {
        self.class_mut(id)?.position = position;
        Ok(())
    }

    /// Write layout positions back; ids absent from the diagram are ignored
    pub fn apply_positions(&mut self, layout: &LayoutResult) {
        for class in &mut self.classes {
            if let Some(position) = layout.position(class.id().as_str()) {
                class.position = position;
            }
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    fn check_target(&self, source: &str, target: &str) -> DiagramResult<()> {
        if target == source {
            if self.policy.allow_self_relations {
                return Ok(());
            }
            return Err(DiagramError::invalid_reference(
                source,
                target,
                "self-relations are disabled",
            ));
        }
        if !self.contains(target) {
            return Err(DiagramError::invalid_reference(
                source,
                target,
                "target class does not exist",
            ));
        }
        Ok(())
    }

    pub fn add_relation(&mut self, source_id: &str, relation: Relation) -> DiagramResult<()> {
        if !self.contains(source_id) {
            return Err(DiagramError::not_found(source_id));
        }
        self.check_target(source_id, relation.target_class_id.as_str())?;
        debug!(
            source = %source_id,
            target = %relation.target_class_id,
            kind = %relation.kind,
            "Added relation"
        );
        self.class_mut(source_id)?.relations.push(relation);
        Ok(())
    }

    pub fn update_relation(
        &mut self,
        source_id: &str,
        index: usize,
        patch: RelationPatch,
    ) -> DiagramResult<()> {
        let len = self
            .class(source_id)
            .ok_or_else(|| DiagramError::not_found(source_id))?
            .relations
            .len();
        check_index(EntityKind::Relation, index, len)?;
        if let Some(target) = &patch.target_class_id {
            self.check_target(source_id, target.as_str())?;
        }
        patch.apply(&mut self.class_mut(source_id)?.relations[index]);
        Ok(())
    }

    /// Remove a relation; `Ok(None)` when the source class is unknown
    pub fn delete_relation(
        &mut self,
        source_id: &str,
        index: usize,
    ) -> DiagramResult<Option<Relation>> {
        let Ok(class) = self.class_mut(source_id) else {
            return Ok(None);
        };
        check_index(EntityKind::Relation, index, class.relations.len())?;
        Ok(Some(class.relations.remove(index)))
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn add_attribute(&mut self, class_id: &str, attribute: Attribute) -> DiagramResult<()> {
        self.class_mut(class_id)?.attributes.push(attribute);
        Ok(())
    }

    pub fn update_attribute(
        &mut self,
        class_id: &str,
        index: usize,
        patch: AttributePatch,
    ) -> DiagramResult<()> {
        let class = self.class_mut(class_id)?;
        check_index(EntityKind::Attribute, index, class.attributes.len())?;
        patch.apply(&mut class.attributes[index]);
        Ok(())
    }

    /// Remove an attribute; `Ok(None)` when the class is unknown
    pub fn delete_attribute(
        &mut self,
        class_id: &str,
        index: usize,
    ) -> DiagramResult<Option<Attribute>> {
        let Ok(class) = self.class_mut(class_id) else {
            return Ok(None);
        };
        check_index(EntityKind::Attribute, index, class.attributes.len())?;
        Ok(Some(class.attributes.remove(index)))
    }

    // ========================================================================
    // Methods
    // ========================================================================

    pub fn add_method(&mut self, class_id: &str, method: Method) -> DiagramResult<()> {
        self.class_mut(class_id)?.methods.push(method);
        Ok(())
    }

    pub fn update_method(
        &mut self,
        class_id: &str,
        index: usize,
        patch: MethodPatch,
    ) -> DiagramResult<()> {
        let class = self.class_mut(class_id)?;
        check_index(EntityKind::Method, index, class.methods.len())?;
        patch.apply(&mut class.methods[index]);
        Ok(())
    }

    /// Remove a method; `Ok(None)` when the class is unknown
    pub fn delete_method(&mut self, class_id: &str, index: usize) -> DiagramResult<Option<Method>> {
        let Ok(class) = self.class_mut(class_id) else {
            return Ok(None);
        };
        check_index(EntityKind::Method, index, class.methods.len())?;
        Ok(Some(class.methods.remove(index)))
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    fn method_mut(&mut self, class_id: &str, method_index: usize) -> DiagramResult<&mut Method> {
        let class = self.class_mut(class_id)?;
        check_index(EntityKind::Method, method_index, class.methods.len())?;
        Ok(&mut class.methods[method_index])
    }

    pub fn add_parameter(
        &mut self,
        class_id: &str,
        method_index: usize,
        parameter: Parameter,
    ) -> DiagramResult<()> {
        self.method_mut(class_id, method_index)?
            .parameters
            .push(parameter);
        Ok(())
    }

    pub fn update_parameter(
        &mut self,
        class_id: &str,
        method_index: usize,
        param_index: usize,
        patch: ParameterPatch,
    ) -> DiagramResult<()> {
        let method = self.method_mut(class_id, method_index)?;
        check_index(EntityKind::Parameter, param_index, method.parameters.len())?;
        patch.apply(&mut method.parameters[param_index]);
        Ok(())
    }

    /// Remove a parameter; `Ok(None)` when the class is unknown
    pub fn delete_parameter(
        &mut self,
        class_id: &str,
        method_index: usize,
        param_index: usize,
    ) -> DiagramResult<Option<Parameter>> {
        if !self.contains(class_id) {
            return Ok(None);
        }
        let method = self.method_mut(class_id, method_index)?;
        check_index(EntityKind::Parameter, param_index, method.parameters.len())?;
        Ok(Some(method.parameters.remove(param_index)))
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
