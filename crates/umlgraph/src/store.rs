//! Diagram store
//!
//! [`DiagramStore`] is the single owner of a [`Diagram`] and the entry point
//! for editing it. On top of the model operations it derives defaults for
//! new members and relations, keeps the current selection, mirrors
//! bidirectional relations and runs layouts, immediately or deferred.
//!
//! # Deferred layout
//!
//! [`DiagramStore::schedule_layout`] hands out a ticket; only the most
//! recent ticket can still be run. Running an older one reports
//! [`LayoutOutcome::Superseded`] and leaves positions untouched. Edits are
//! never cancelled, and a layout always reads the diagram as it is when the
//! ticket is run.

use tracing::{debug, info, warn};

use crate::core::{
    ClassId, DiagramError, DiagramResult, LayoutResult, Position, RelationKind, Visibility,
};
use crate::layout::{LayoutConfig, LayoutKind};
use crate::model::{
    Attribute, AttributePatch, ClassEntity, Diagram, Method, MethodPatch, Parameter,
    ParameterPatch, Relation, RelationPatch, RelationPolicy,
};
use crate::render::CanvasEvent;
use crate::wire::{self, DiagramFormat};

/// Name and type given to new attributes
pub const DEFAULT_ATTRIBUTE: (&str, &str) = ("newAttribute", "String");
/// Name and return type given to new methods
pub const DEFAULT_METHOD: (&str, &str) = ("newMethod", "void");
/// Name and type given to new parameters
pub const DEFAULT_PARAMETER: (&str, &str) = ("newParam", "String");

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreConfig {
    pub policy: RelationPolicy,
    pub layout: LayoutConfig,
    /// Strategy used by [`DiagramStore::auto_layout`]
    pub default_layout: LayoutKind,
}

/// Handle for a deferred layout request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutTicket(u64);

/// What happened to a deferred layout request
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    /// The layout ran and its positions were written back
    Applied(LayoutResult),
    /// A newer request replaced this one; nothing changed
    Superseded,
}

impl LayoutOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LayoutOutcome::Applied(_))
    }
}

/// Owner of a diagram and the operations that edit it
#[derive(Debug, Clone)]
pub struct DiagramStore {
    diagram: Diagram,
    selected: Option<ClassId>,
    config: StoreConfig,
    next_ticket: u64,
    pending: Option<(LayoutTicket, LayoutKind)>,
}

impl Default for DiagramStore {
    fn default() -> Self {
        Self::new(Diagram::default())
    }
}

impl DiagramStore {
    pub fn new(diagram: Diagram) -> Self {
        Self::with_config(diagram, StoreConfig::default())
    }

    pub fn with_config(mut diagram: Diagram, config: StoreConfig) -> Self {
        diagram.set_policy(config.policy);
        Self {
            diagram,
            selected: None,
            config,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Swap in a whole new diagram, returning the previous one
    ///
    /// Clears the selection and any pending layout.
    pub fn replace_diagram(&mut self, mut diagram: Diagram) -> Diagram {
        diagram.set_policy(self.config.policy);
        self.selected = None;
        self.pending = None;
        info!(diagram_id = %diagram.id(), classes = diagram.len(), "Replaced diagram");
        std::mem::replace(&mut self.diagram, diagram)
    }

    /// Parse a native or legacy document under the store's relation policy
    /// and swap it in
    ///
    /// On failure the current diagram stays in place.
    pub fn load_json(&mut self, input: &str) -> DiagramResult<DiagramFormat> {
        let (diagram, format) = wire::read_any_with(input, self.config.policy)?;
        self.replace_diagram(diagram);
        Ok(format)
    }

    pub fn class(&self, id: &str) -> Option<&ClassEntity> {
        self.diagram.class(id)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a class, or clear the selection with `None`
    pub fn select_class(&mut self, id: Option<&str>) -> DiagramResult<()> {
        match id {
            Some(id) => {
                let class = self
                    .diagram
                    .class(id)
                    .ok_or_else(|| DiagramError::not_found(id))?;
                self.selected = Some(class.id().clone());
            }
            None => self.selected = None,
        }
        Ok(())
    }

    pub fn selected_class(&self) -> Option<&ClassEntity> {
        self.selected
            .as_ref()
            .and_then(|id| self.diagram.class(id.as_str()))
    }

    /// Apply a canvas event
    pub fn handle_event(&mut self, event: CanvasEvent) -> DiagramResult<()> {
        match event {
            CanvasEvent::Select { class_id } => {
                self.select_class(class_id.as_ref().map(ClassId::as_str))
            }
            CanvasEvent::Drag { class_id, position } => self.move_class(class_id.as_str(), position),
        }
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Add an empty class and return its id
    pub fn add_class(&mut self, name: impl Into<String>, position: Option<Position>) -> ClassId {
        self.diagram.create_class(name, position).id().clone()
    }

    pub fn update_class_name(&mut self, id: &str, name: impl Into<String>) -> DiagramResult<()> {
        self.diagram.rename_class(id, name)
    }

    pub fn move_class(&mut self, id: &str, position: Position) -> DiagramResult<()> {
        self.diagram.set_position(id, position)
    }

    /// Delete a class and every relation targeting it
    ///
    /// Unknown ids are ignored. Deleting the selected class clears the
    /// selection.
    pub fn delete_class(&mut self, id: &str) -> Option<ClassEntity> {
        let removed = self.diagram.delete_class(id)?;
        if self.selected.as_ref().is_some_and(|s| s == removed.id()) {
            self.selected = None;
        }
        Some(removed)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Append a `newAttribute: String` PRIVATE attribute; returns its index
    pub fn add_attribute(&mut self, class_id: &str) -> DiagramResult<usize> {
        let attribute = Attribute::new(DEFAULT_ATTRIBUTE.0, DEFAULT_ATTRIBUTE.1)
            .with_visibility(Visibility::Private);
        self.diagram.add_attribute(class_id, attribute)?;
        Ok(self.last_index(class_id, |c| c.attributes.len()))
    }

    pub fn update_attribute(
        &mut self,
        class_id: &str,
        index: usize,
        patch: AttributePatch,
    ) -> DiagramResult<()> {
        self.diagram.update_attribute(class_id, index, patch)
    }

    pub fn delete_attribute(
        &mut self,
        class_id: &str,
        index: usize,
    ) -> DiagramResult<Option<Attribute>> {
        self.diagram.delete_attribute(class_id, index)
    }

    // ========================================================================
    // Methods and parameters
    // ========================================================================

    /// Append a `newMethod(): void` PUBLIC method; returns its index
    pub fn add_method(&mut self, class_id: &str) -> DiagramResult<usize> {
        let method = Method::new(DEFAULT_METHOD.0, DEFAULT_METHOD.1, Visibility::Public);
        self.diagram.add_method(class_id, method)?;
        Ok(self.last_index(class_id, |c| c.methods.len()))
    }

    pub fn update_method(
        &mut self,
        class_id: &str,
        index: usize,
        patch: MethodPatch,
    ) -> DiagramResult<()> {
        self.diagram.update_method(class_id, index, patch)
    }

    pub fn delete_method(&mut self, class_id: &str, index: usize) -> DiagramResult<Option<Method>> {
        self.diagram.delete_method(class_id, index)
    }

    /// Append a `newParam: String` parameter; returns its index
    pub fn add_parameter(&mut self, class_id: &str, method_index: usize) -> DiagramResult<usize> {
        let parameter = Parameter::new(DEFAULT_PARAMETER.0, DEFAULT_PARAMETER.1);
        self.diagram.add_parameter(class_id, method_index, parameter)?;
        Ok(self.last_index(class_id, |c| c.methods[method_index].parameters.len()))
    }

    pub fn update_parameter(
        &mut self,
        class_id: &str,
        method_index: usize,
        param_index: usize,
        patch: ParameterPatch,
    ) -> DiagramResult<()> {
        self.diagram
            .update_parameter(class_id, method_index, param_index, patch)
    }

    pub fn delete_parameter(
        &mut self,
        class_id: &str,
        method_index: usize,
        param_index: usize,
    ) -> DiagramResult<Option<Parameter>> {
        self.diagram
            .delete_parameter(class_id, method_index, param_index)
    }

    /// Index of the last member after a successful append
    fn last_index(&self, class_id: &str, count: impl Fn(&ClassEntity) -> usize) -> usize {
        self.diagram
            .class(class_id)
            .map(|c| count(c).saturating_sub(1))
            .unwrap_or(0)
    }

    // ========================================================================
    // Relations
    // ========================================================================

    pub fn add_relation(&mut self, source_id: &str, relation: Relation) -> DiagramResult<()> {
        self.diagram.add_relation(source_id, relation)
    }

    /// Add a relation and, for association-like kinds, its mirror
    ///
    /// The mirror points back at `source_id` with the same kind and with
    /// multiplicities and role names swapped. It is skipped when the target
    /// already has a relation to the source. Returns whether a mirror was
    /// added.
    pub fn add_bidirectional_relation(
        &mut self,
        source_id: &str,
        relation: Relation,
    ) -> DiagramResult<bool> {
        let target_id = relation.target_class_id.clone();
        let mirror_kind = relation.kind.mirror();
        let mirror = Relation {
            target_class_id: ClassId::new(source_id),
            kind: mirror_kind.unwrap_or(relation.kind),
            multiplicity_p: relation.multiplicity_c,
            multiplicity_c: relation.multiplicity_p,
            role_name_p: relation.role_name_c.clone(),
            role_name_c: relation.role_name_p.clone(),
        };

        self.diagram.add_relation(source_id, relation)?;

        if mirror_kind.is_none() {
            return Ok(false);
        }
        let already_linked = self
            .diagram
            .class(target_id.as_str())
            .is_some_and(|c| c.relates_to(source_id));
        if already_linked {
            debug!(source = %source_id, target = %target_id, "Mirror relation already present");
            return Ok(false);
        }
        self.diagram.add_relation(target_id.as_str(), mirror)?;
        Ok(true)
    }

    pub fn update_relation(
        &mut self,
        source_id: &str,
        index: usize,
        patch: RelationPatch,
    ) -> DiagramResult<()> {
        self.diagram.update_relation(source_id, index, patch)
    }

    pub fn delete_relation(
        &mut self,
        source_id: &str,
        index: usize,
    ) -> DiagramResult<Option<Relation>> {
        self.diagram.delete_relation(source_id, index)
    }

    /// Classes `class_id` has no relation to yet, excluding itself
    pub fn available_relation_targets(&self, class_id: &str) -> DiagramResult<Vec<&ClassEntity>> {
        let source = self
            .diagram
            .class(class_id)
            .ok_or_else(|| DiagramError::not_found(class_id))?;
        Ok(self
            .diagram
            .classes()
            .iter()
            .filter(|c| c.id() != class_id && !source.relates_to(c.id().as_str()))
            .collect())
    }

    /// Add an ASSOCIATION to the first available target
    ///
    /// Returns the chosen target, or `None` when every other class is
    /// already targeted.
    pub fn add_default_relation(&mut self, class_id: &str) -> DiagramResult<Option<ClassId>> {
        let target = match self.available_relation_targets(class_id)?.first() {
            Some(class) => class.id().clone(),
            None => return Ok(None),
        };
        self.diagram.add_relation(
            class_id,
            Relation::new(target.clone(), RelationKind::default()),
        )?;
        Ok(Some(target))
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Run a layout now and write the positions back
    pub fn apply_layout(&mut self, kind: LayoutKind) -> LayoutResult {
        let result = kind
            .algorithm(self.config.layout.clone())
            .layout(self.diagram.classes());
        self.diagram.apply_positions(&result);
        info!(strategy = %kind, classes = result.len(), "Applied layout");
        result
    }

    /// Run the configured default layout now
    pub fn auto_layout(&mut self) -> LayoutResult {
        self.apply_layout(self.config.default_layout)
    }

    /// Request a layout to run later, superseding any pending request
    pub fn schedule_layout(&mut self, kind: LayoutKind) -> LayoutTicket {
        self.next_ticket += 1;
        let ticket = LayoutTicket(self.next_ticket);
        if let Some((previous, _)) = self.pending.replace((ticket, kind)) {
            debug!(previous = previous.0, current = ticket.0, "Replaced pending layout");
        }
        ticket
    }

    pub fn pending_layout(&self) -> Option<LayoutTicket> {
        self.pending.map(|(ticket, _)| ticket)
    }

    /// Run a scheduled layout if it is still the most recent request
    pub fn run_scheduled_layout(&mut self, ticket: LayoutTicket) -> LayoutOutcome {
        match self.pending {
            Some((current, kind)) if current == ticket => {
                self.pending = None;
                LayoutOutcome::Applied(self.apply_layout(kind))
            }
            _ => {
                warn!(ticket = ticket.0, "Layout request superseded, skipping");
                LayoutOutcome::Superseded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Multiplicity;

    fn store_with(names: &[&str]) -> (DiagramStore, Vec<ClassId>) {
        let mut store = DiagramStore::new(Diagram::with_id("d", "Test"));
        let ids = names.iter().map(|n| store.add_class(*n, None)).collect();
        (store, ids)
    }

    #[test]
    fn test_default_members() {
        let (mut store, ids) = store_with(&["Car"]);
        let car = ids[0].as_str();

        assert_eq!(store.add_attribute(car).unwrap(), 0);
        assert_eq!(store.add_method(car).unwrap(), 0);
        assert_eq!(store.add_parameter(car, 0).unwrap(), 0);
        assert_eq!(store.add_attribute(car).unwrap(), 1);

        let class = store.class(car).unwrap();
        let attr = &class.attributes[0];
        assert_eq!(attr.name, "newAttribute");
        assert_eq!(attr.attr_type, "String");
        assert_eq!(attr.visibility, Some(Visibility::Private));

        let method = &class.methods[0];
        assert_eq!(method.name, "newMethod");
        assert_eq!(method.return_type, "void");
        assert_eq!(method.visibility, Visibility::Public);
        assert_eq!(method.parameters, vec![Parameter::new("newParam", "String")]);
    }

    #[test]
    fn test_bidirectional_mirrors_structural_kinds() {
        let (mut store, ids) = store_with(&["Car", "Engine"]);
        let (car, engine) = (ids[0].as_str(), ids[1].as_str());

        let relation = Relation::new(engine, RelationKind::Composition)
            .with_multiplicities(Multiplicity::exactly(1), Multiplicity::unbounded(0))
            .with_roles("owner", "part");
        assert!(store.add_bidirectional_relation(car, relation).unwrap());

        let mirror = &store.class(engine).unwrap().relations[0];
        assert_eq!(mirror.target_class_id, car);
        assert_eq!(mirror.kind, RelationKind::Composition);
        assert_eq!(mirror.multiplicity_p, Some(Multiplicity::unbounded(0)));
        assert_eq!(mirror.role_name_p.as_deref(), Some("part"));
    }

    #[test]
    fn test_bidirectional_skips_hierarchy_and_existing_back_edges() {
        let (mut store, ids) = store_with(&["Animal", "Dog"]);
        let (animal, dog) = (ids[0].as_str(), ids[1].as_str());

        let added = store
            .add_bidirectional_relation(dog, Relation::new(animal, RelationKind::Inheritance))
            .unwrap();
        assert!(!added);
        assert!(store.class(animal).unwrap().relations.is_empty());

        store
            .add_relation(animal, Relation::new(dog, RelationKind::Association))
            .unwrap();
        let added = store
            .add_bidirectional_relation(dog, Relation::new(animal, RelationKind::Association))
            .unwrap();
        assert!(!added);
        assert_eq!(store.class(animal).unwrap().relations.len(), 1);
    }

    #[test]
    fn test_bidirectional_invalid_target_changes_nothing() {
        let (mut store, ids) = store_with(&["Car"]);
        let err = store
            .add_bidirectional_relation(
                ids[0].as_str(),
                Relation::new("ghost", RelationKind::Association),
            )
            .unwrap_err();
        assert!(err.is_invalid_reference());
        assert!(store.class(ids[0].as_str()).unwrap().relations.is_empty());
    }

    #[test]
    fn test_default_relation_picks_untargeted_class() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        let a = ids[0].as_str();

        assert_eq!(store.add_default_relation(a).unwrap(), Some(ids[1].clone()));
        assert_eq!(store.add_default_relation(a).unwrap(), Some(ids[2].clone()));
        assert_eq!(store.add_default_relation(a).unwrap(), None);

        let relations = &store.class(a).unwrap().relations;
        assert_eq!(relations.len(), 2);
        assert!(relations.iter().all(|r| r.kind == RelationKind::Association));
    }

    #[test]
    fn test_selection_cleared_on_delete() {
        let (mut store, ids) = store_with(&["A", "B"]);
        store.select_class(Some(ids[0].as_str())).unwrap();
        assert_eq!(store.selected_class().map(|c| c.name.as_str()), Some("A"));

        store.delete_class(ids[1].as_str());
        assert!(store.selected_class().is_some());

        store.delete_class(ids[0].as_str());
        assert!(store.selected_class().is_none());
    }

    #[test]
    fn test_select_unknown_class() {
        let (mut store, _) = store_with(&["A"]);
        assert!(store.select_class(Some("ghost")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_canvas_events() {
        let (mut store, ids) = store_with(&["A"]);
        store
            .handle_event(CanvasEvent::Drag {
                class_id: ids[0].clone(),
                position: Position::new(42.0, 7.0),
            })
            .unwrap();
        assert_eq!(
            store.class(ids[0].as_str()).unwrap().position,
            Position::new(42.0, 7.0)
        );

        store
            .handle_event(CanvasEvent::Select {
                class_id: Some(ids[0].clone()),
            })
            .unwrap();
        assert!(store.selected_class().is_some());
        store
            .handle_event(CanvasEvent::Select { class_id: None })
            .unwrap();
        assert!(store.selected_class().is_none());
    }

    #[test]
    fn test_scheduled_layout_superseded() {
        let (mut store, ids) = store_with(&["A", "B"]);
        let first = store.schedule_layout(LayoutKind::Hierarchical);
        let second = store.schedule_layout(LayoutKind::Hierarchical);
        assert_eq!(store.pending_layout(), Some(second));

        assert_eq!(store.run_scheduled_layout(first), LayoutOutcome::Superseded);
        assert_eq!(store.pending_layout(), Some(second));

        let outcome = store.run_scheduled_layout(second);
        assert!(outcome.is_applied());
        assert_eq!(store.pending_layout(), None);
        assert_eq!(
            store.class(ids[1].as_str()).unwrap().position,
            Position::new(400.0, 100.0)
        );

        assert_eq!(store.run_scheduled_layout(second), LayoutOutcome::Superseded);
    }

    #[test]
    fn test_scheduled_layout_reads_latest_state() {
        let (mut store, _) = store_with(&["A"]);
        let ticket = store.schedule_layout(LayoutKind::Hierarchical);
        let late = store.add_class("Late", Some(Position::new(0.0, 0.0)));

        let LayoutOutcome::Applied(result) = store.run_scheduled_layout(ticket) else {
            panic!("layout should have run");
        };
        assert!(result.position(late.as_str()).is_some());
        assert_eq!(
            store.class(late.as_str()).unwrap().position,
            Position::new(400.0, 100.0)
        );
    }

    #[test]
    fn test_replace_diagram_resets_state() {
        let (mut store, ids) = store_with(&["A"]);
        store.select_class(Some(ids[0].as_str())).unwrap();
        store.schedule_layout(LayoutKind::General);

        let old = store.replace_diagram(Diagram::with_id("other", "Other"));
        assert_eq!(old.id(), "d");
        assert_eq!(store.diagram().id(), "other");
        assert!(store.selected_class().is_none());
        assert!(store.pending_layout().is_none());
    }

    #[test]
    fn test_store_policy_applies_to_diagram() {
        let config = StoreConfig {
            policy: RelationPolicy {
                allow_self_relations: true,
            },
            ..StoreConfig::default()
        };
        let mut store = DiagramStore::with_config(Diagram::new("Self"), config);
        let a = store.add_class("A", None);
        store
            .add_relation(a.as_str(), Relation::new(a.clone(), RelationKind::Association))
            .unwrap();
        assert_eq!(store.class(a.as_str()).unwrap().relations.len(), 1);
    }

    #[test]
    fn test_load_json_keeps_diagram_on_error() {
        let (mut store, ids) = store_with(&["A"]);
        let err = store.load_json(r#"{"id":"x","name":"X","classes":[
            {"id":"a","name":"A","attributes":[],"methods":[],
             "relations":[{"target_class_id":"a","relation":"ASSOCIATION"}]}
        ]}"#);
        assert!(err.is_err());
        assert_eq!(store.diagram().id(), "d");
        assert!(store.class(ids[0].as_str()).is_some());
    }
}
