//! Render boundary
//!
//! Flat views of the diagram for a canvas collaborator, and the events it
//! sends back. Nothing here draws; it only describes what to draw.

use serde::Serialize;

use crate::core::{ClassId, Position, RelationKind};
use crate::model::{Attribute, ClassEntity, Diagram, Method, Relation};

/// A class box ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassView {
    pub id: ClassId,
    pub name: String,
    pub position: Position,
    pub attributes: Vec<String>,
    pub methods: Vec<String>,
}

impl ClassView {
    pub fn from_class(class: &ClassEntity) -> Self {
        Self {
            id: class.id().clone(),
            name: class.name.clone(),
            position: class.position,
            attributes: class.attributes.iter().map(format_attribute).collect(),
            methods: class.methods.iter().map(format_method).collect(),
        }
    }
}

/// Arrow head drawn at one end of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Filled triangle
    ArrowClosed,
    /// Open arrow
    Arrow,
    /// Hollow diamond
    Diamond,
    /// Filled diamond
    DiamondFilled,
}

/// Markers for a relation kind as `(start, end)`
///
/// The start marker sits on the source class, the end marker on the target.
pub fn markers(kind: RelationKind) -> (Option<Marker>, Option<Marker>) {
    match kind {
        RelationKind::Inheritance | RelationKind::Implementation => {
            (None, Some(Marker::ArrowClosed))
        }
        RelationKind::Association => (None, Some(Marker::Arrow)),
        RelationKind::Aggregation => (Some(Marker::Diamond), None),
        RelationKind::Composition => (Some(Marker::DiamondFilled), None),
        RelationKind::None => (None, None),
    }
}

/// An edge ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDescriptor {
    /// `"{source}-{target}-{index}"`, index being the relation's slot in
    /// its source class
    pub id: String,
    pub source_id: ClassId,
    pub target_id: ClassId,
    pub kind: RelationKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_start: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<Marker>,
}

impl EdgeDescriptor {
    pub fn from_relation(source: &ClassId, index: usize, relation: &Relation) -> Self {
        let (marker_start, marker_end) = markers(relation.kind);
        Self {
            id: format!("{}-{}-{}", source, relation.target_class_id, index),
            source_id: source.clone(),
            target_id: relation.target_class_id.clone(),
            kind: relation.kind,
            label: edge_label(relation),
            marker_start,
            marker_end,
        }
    }
}

/// Edge label: the kind name, then the multiplicities on a second line
///
/// ```
/// use umlgraph::core::{Multiplicity, RelationKind};
/// use umlgraph::model::Relation;
/// use umlgraph::render::edge_label;
///
/// let rel = Relation::new("driver", RelationKind::Association)
///     .with_multiplicities(Multiplicity::exactly(1), Multiplicity::new(0, Some(5)));
/// assert_eq!(edge_label(&rel), "association\n1..1 0..5");
/// ```
pub fn edge_label(relation: &Relation) -> String {
    let mut label = relation.kind.label().to_string();
    let parts: Vec<String> = [relation.multiplicity_p, relation.multiplicity_c]
        .iter()
        .flatten()
        .map(ToString::to_string)
        .collect();
    if !parts.is_empty() {
        label.push('\n');
        label.push_str(&parts.join(" "));
    }
    label
}

/// `-name: Type`, with a trailing `$` for static attributes
pub fn format_attribute(attribute: &Attribute) -> String {
    let suffix = if attribute.is_static() { "$" } else { "" };
    format!(
        "{}{}: {}{}",
        attribute.effective_visibility().symbol(),
        attribute.name,
        attribute.attr_type,
        suffix
    )
}

/// `+name(p: T): R`, with `*` for abstract and `$` for static methods
pub fn format_method(method: &Method) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.param_type))
        .collect::<Vec<_>>()
        .join(", ");
    let mut suffix = String::new();
    if method.is_abstract {
        suffix.push('*');
    }
    if method.is_static {
        suffix.push('$');
    }
    format!(
        "{}{}({}): {}{}",
        method.visibility.symbol(),
        method.name,
        params,
        method.return_type,
        suffix
    )
}

pub fn class_views(diagram: &Diagram) -> Vec<ClassView> {
    diagram.classes().iter().map(ClassView::from_class).collect()
}

/// One descriptor per relation, in class then relation order
pub fn edge_descriptors(diagram: &Diagram) -> Vec<EdgeDescriptor> {
    diagram
        .classes()
        .iter()
        .flat_map(|class| {
            class
                .relations
                .iter()
                .enumerate()
                .map(move |(index, relation)| {
                    EdgeDescriptor::from_relation(class.id(), index, relation)
                })
        })
        .collect()
}

/// Events emitted by the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A class was clicked, or the background (`None`)
    Select { class_id: Option<ClassId> },
    /// A class was dropped at a new position
    Drag { class_id: ClassId, position: Position },
}
