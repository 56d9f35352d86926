//! Diagram graph model
//!
//! Classes, their members and relations, and the [`Diagram`] that keeps
//! them consistent under edits.

mod diagram;
mod entity;
pub mod invariants;
mod patch;

pub use diagram::{Diagram, DiagramDocument, RelationPolicy};
pub use entity::{Attribute, ClassEntity, Method, Parameter, Relation};
pub use invariants::InvariantViolation;
pub use patch::{AttributePatch, MethodPatch, ParameterPatch, RelationPatch};
