//! Class diagram entities
//!
//! Classes own their attributes, methods and outgoing relations.

use serde::{Deserialize, Serialize};

use crate::core::{ClassId, Multiplicity, Position, RelationKind, Visibility, DEFAULT_POSITION};

/// A class attribute (field)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: String,
    /// `None` when the source carried no visibility; displayed as PRIVATE
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub is_static: Option<bool>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: attr_type.into(),
            visibility: None,
            is_static: None,
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = Some(v);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    /// Visibility with the PRIVATE default applied
    pub fn effective_visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    pub fn is_static(&self) -> bool {
        self.is_static.unwrap_or(false)
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
        }
    }
}

/// A class method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            visibility,
            is_abstract: false,
            is_static: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A directed relation owned by its source class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub target_class_id: ClassId,
    #[serde(rename = "relation")]
    pub kind: RelationKind,
    /// Multiplicity on the parent (target) side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity_p: Option<Multiplicity>,
    /// Multiplicity on the child (source) side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity_c: Option<Multiplicity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name_p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name_c: Option<String>,
}

impl Relation {
    pub fn new(target: impl Into<ClassId>, kind: RelationKind) -> Self {
        Self {
            target_class_id: target.into(),
            kind,
            multiplicity_p: None,
            multiplicity_c: None,
            role_name_p: None,
            role_name_c: None,
        }
    }

    pub fn with_multiplicities(mut self, parent: Multiplicity, child: Multiplicity) -> Self {
        self.multiplicity_p = Some(parent);
        self.multiplicity_c = Some(child);
        self
    }

    pub fn with_roles(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.role_name_p = Some(parent.into());
        self.role_name_c = Some(child.into());
        self
    }
}

/// A class in the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    id: ClassId,
    pub name: String,
    #[serde(default = "default_position")]
    pub position: Position,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

fn default_position() -> Position {
    DEFAULT_POSITION
}

impl ClassEntity {
    /// Create an empty class with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ClassId::generate(), name)
    }

    /// Create an empty class with a caller-chosen id
    pub fn with_id(id: impl Into<ClassId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: DEFAULT_POSITION,
            attributes: Vec::new(),
            methods: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// The id is fixed at creation
    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// Relations of kind INHERITANCE or IMPLEMENTATION, in declaration order
    pub fn hierarchy_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|r| r.kind.is_hierarchy())
    }

    /// Returns true if some relation of this class targets `target`
    pub fn relates_to(&self, target: &str) -> bool {
        self.relations.iter().any(|r| r.target_class_id == *target)
    }
}
