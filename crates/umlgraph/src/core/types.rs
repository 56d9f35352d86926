//! Core type definitions for class diagrams
//!
//! This module contains the small value types shared by every layer of
//! umlgraph: class identifiers, positions, member visibility, relation kinds
//! and multiplicities.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a class within a diagram
///
/// Relations reference their target through this id, never through a pointer,
/// so cyclic hierarchies are representable without ownership cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    /// Create an id from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClassId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ClassId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ClassId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ClassId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Top-left placement of a class box on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position given to classes created without an explicit placement
pub const DEFAULT_POSITION: Position = Position::new(100.0, 100.0);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Visibility modifier for attributes and methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    /// Default for attributes that carry no explicit visibility
    #[default]
    Private,
    Protected,
    /// Package-level, no modifier keyword
    NonModifier,
}

impl Visibility {
    /// UML symbol used when a member is displayed
    pub fn symbol(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::NonModifier => '~',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::NonModifier),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "PUBLIC"),
            Visibility::Private => write!(f, "PRIVATE"),
            Visibility::Protected => write!(f, "PROTECTED"),
            Visibility::NonModifier => write!(f, "NON_MODIFIER"),
        }
    }
}

/// Kind of a directed relation between two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    None,
    Inheritance,
    Implementation,
    /// Kind given to relations created without an explicit choice
    #[default]
    Association,
    Aggregation,
    Composition,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::None,
        RelationKind::Inheritance,
        RelationKind::Implementation,
        RelationKind::Association,
        RelationKind::Aggregation,
        RelationKind::Composition,
    ];

    /// Returns true for edges that define the class hierarchy
    pub fn is_hierarchy(self) -> bool {
        matches!(self, RelationKind::Inheritance | RelationKind::Implementation)
    }

    /// Returns true for association-like edges (association, aggregation, composition)
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            RelationKind::Association | RelationKind::Aggregation | RelationKind::Composition
        )
    }

    /// Kind of the edge inserted in the opposite direction for a bidirectional relation
    ///
    /// Hierarchy edges are one-directional and have no mirror.
    pub fn mirror(self) -> Option<RelationKind> {
        if self.is_structural() {
            Some(self)
        } else {
            None
        }
    }

    /// Human-readable name used in edge labels
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::None => "",
            RelationKind::Inheritance => "inheritance",
            RelationKind::Implementation => "implementation",
            RelationKind::Association => "association",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Composition => "composition",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::None => write!(f, "NONE"),
            RelationKind::Inheritance => write!(f, "INHERITANCE"),
            RelationKind::Implementation => write!(f, "IMPLEMENTATION"),
            RelationKind::Association => write!(f, "ASSOCIATION"),
            RelationKind::Aggregation => write!(f, "AGGREGATION"),
            RelationKind::Composition => write!(f, "COMPOSITION"),
        }
    }
}

/// Multiplicity of one side of a relation, e.g. `0..*` or `1..1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplicity {
    pub lower: u32,
    /// `None` means unbounded (`*`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<u32>,
}

impl Multiplicity {
    pub fn new(lower: u32, upper: Option<u32>) -> Self {
        Self { lower, upper }
    }

    pub fn exactly(n: u32) -> Self {
        Self::new(n, Some(n))
    }

    pub fn unbounded(lower: u32) -> Self {
        Self::new(lower, None)
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{}..{}", self.lower, upper),
            None => write!(f, "{}..*", self.lower),
        }
    }
}
