//! Partial updates for indexed entities
//!
//! Every field is optional; `None` leaves the current value untouched.

use crate::core::{ClassId, Multiplicity, RelationKind, Visibility};

use super::{Attribute, Method, Parameter, Relation};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributePatch {
    pub name: Option<String>,
    pub attr_type: Option<String>,
    pub visibility: Option<Visibility>,
    pub is_static: Option<bool>,
}

impl AttributePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn attr_type(mut self, attr_type: impl Into<String>) -> Self {
        self.attr_type = Some(attr_type.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn apply(self, attribute: &mut Attribute) {
        if let Some(name) = self.name {
            attribute.name = name;
        }
        if let Some(attr_type) = self.attr_type {
            attribute.attr_type = attr_type;
        }
        if let Some(visibility) = self.visibility {
            attribute.visibility = Some(visibility);
        }
        if let Some(is_static) = self.is_static {
            attribute.is_static = Some(is_static);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodPatch {
    pub name: Option<String>,
    pub return_type: Option<String>,
    pub visibility: Option<Visibility>,
    pub is_abstract: Option<bool>,
    pub is_static: Option<bool>,
}

impl MethodPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn apply(self, method: &mut Method) {
        if let Some(name) = self.name {
            method.name = name;
        }
        if let Some(return_type) = self.return_type {
            method.return_type = return_type;
        }
        if let Some(visibility) = self.visibility {
            method.visibility = visibility;
        }
        if let Some(is_abstract) = self.is_abstract {
            method.is_abstract = is_abstract;
        }
        if let Some(is_static) = self.is_static {
            method.is_static = is_static;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPatch {
    pub name: Option<String>,
    pub param_type: Option<String>,
}

impl ParameterPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn param_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = Some(param_type.into());
        self
    }

    pub fn apply(self, parameter: &mut Parameter) {
        if let Some(name) = self.name {
            parameter.name = name;
        }
        if let Some(param_type) = self.param_type {
            parameter.param_type = param_type;
        }
    }
}

/// Changes to a relation
///
/// Multiplicities and role names use a nested `Option` so a patch can clear
/// them: `Some(None)` removes the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationPatch {
    pub target_class_id: Option<ClassId>,
    pub kind: Option<RelationKind>,
    pub multiplicity_p: Option<Option<Multiplicity>>,
    pub multiplicity_c: Option<Option<Multiplicity>>,
    pub role_name_p: Option<Option<String>>,
    pub role_name_c: Option<Option<String>>,
}

impl RelationPatch {
    pub fn target(mut self, target: impl Into<ClassId>) -> Self {
        self.target_class_id = Some(target.into());
        self
    }

    pub fn kind(mut self, kind: RelationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn multiplicity_p(mut self, multiplicity: Option<Multiplicity>) -> Self {
        self.multiplicity_p = Some(multiplicity);
        self
    }

    pub fn multiplicity_c(mut self, multiplicity: Option<Multiplicity>) -> Self {
        self.multiplicity_c = Some(multiplicity);
        self
    }

    pub fn role_name_p(mut self, role: Option<String>) -> Self {
        self.role_name_p = Some(role);
        self
    }

    pub fn role_name_c(mut self, role: Option<String>) -> Self {
        self.role_name_c = Some(role);
        self
    }

    pub fn apply(self, relation: &mut Relation) {
        if let Some(target) = self.target_class_id {
            relation.target_class_id = target;
        }
        if let Some(kind) = self.kind {
            relation.kind = kind;
        }
        if let Some(m) = self.multiplicity_p {
            relation.multiplicity_p = m;
        }
        if let Some(m) = self.multiplicity_c {
            relation.multiplicity_c = m;
        }
        if let Some(role) = self.role_name_p {
            relation.role_name_p = role;
        }
        if let Some(role) = self.role_name_c {
            relation.role_name_c = role;
        }
    }
}
