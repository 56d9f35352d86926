//! umlgraph - UML class diagram graph model and automatic layout
//!
//! A library for editing class diagrams (classes, members and typed
//! relations) while keeping the graph referentially consistent, and for
//! arranging the classes on a 2D canvas.
//!
//! # Quick Start
//!
//! ```rust
//! use umlgraph::auto_layout;
//! use umlgraph::layout::LayoutKind;
//!
//! let input = r#"{
//!     "id": "d1",
//!     "name": "Animals",
//!     "classes": [
//!         {"id": "animal", "name": "Animal", "attributes": [], "methods": []},
//!         {"id": "dog", "name": "Dog", "attributes": [], "methods": [],
//!          "relations": [{"target_class_id": "animal", "relation": "INHERITANCE"}]}
//!     ]
//! }"#;
//! let output = auto_layout(input, LayoutKind::Hierarchical).unwrap();
//! assert!(output.contains("\"y\": 420.0"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, edit through a store:
//!
//! ```rust
//! use umlgraph::prelude::*;
//!
//! let mut store = DiagramStore::new(Diagram::new("Vehicles"));
//! let vehicle = store.add_class("Vehicle", None);
//! let car = store.add_class("Car", None);
//! store
//!     .add_relation(car.as_str(), Relation::new(vehicle.clone(), RelationKind::Inheritance))
//!     .unwrap();
//!
//! let hierarchy = Hierarchy::analyze(store.diagram().classes());
//! assert_eq!(hierarchy.level_of(car.as_str()), Some(1));
//!
//! store.apply_layout(LayoutKind::Hierarchical);
//! let car_y = store.class(car.as_str()).unwrap().position.y;
//! let vehicle_y = store.class(vehicle.as_str()).unwrap().position.y;
//! assert!(vehicle_y < car_y);
//! ```

pub mod core;
pub mod hierarchy;
pub mod layout;
pub mod model;
pub mod render;
pub mod store;
pub mod wire;

pub use self::core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ClassId, DiagramError, DiagramResult, LayoutAlgorithm, LayoutResult, Multiplicity,
        Position, RelationKind, Visibility,
    };
    pub use crate::hierarchy::Hierarchy;
    pub use crate::layout::{GeneralLayout, HierarchicalLayout, LayoutConfig, LayoutKind};
    pub use crate::model::{
        Attribute, AttributePatch, ClassEntity, Diagram, Method, MethodPatch, Parameter,
        ParameterPatch, Relation, RelationPatch, RelationPolicy,
    };
    pub use crate::render::{CanvasEvent, ClassView, EdgeDescriptor, Marker};
    pub use crate::store::{DiagramStore, LayoutOutcome, LayoutTicket, StoreConfig};
    pub use crate::wire::DiagramFormat;
}

/// Read a diagram in either format
///
/// # Example
/// ```rust
/// let diagram = umlgraph::load(r#"{"id": "d", "name": "Empty", "classes": []}"#).unwrap();
/// assert!(diagram.is_empty());
/// ```
pub fn load(input: &str) -> anyhow::Result<model::Diagram> {
    use anyhow::Context;

    let (diagram, _) = wire::read_any(input).context("Failed to read diagram")?;
    Ok(diagram)
}

/// Lay out a serialized diagram and return it in the same format
///
/// Legacy input carries no positions, so the legacy output of this function
/// only differs from its input in its timestamps; use the native format to
/// keep the computed positions.
pub fn auto_layout(input: &str, kind: layout::LayoutKind) -> anyhow::Result<String> {
    use anyhow::Context;

    let (diagram, format) = wire::read_any(input).context("Failed to read diagram")?;
    let mut store = store::DiagramStore::new(diagram);
    store.apply_layout(kind);
    let output = wire::write(store.diagram(), format)
        .with_context(|| format!("Failed to write {} diagram", format))?;
    Ok(output)
}
