//! Legacy integer encoding
//!
//! The legacy persistence format nests relations under
//! `relations.relation_infos`, keys the diagram id as `file_id.id`, carries
//! creation and modification timestamps, and encodes enums as integers:
//!
//! | Visibility   | Code |   | Relation       | Code |
//! |--------------|------|---|----------------|------|
//! | PUBLIC       | 1    |   | NONE           | 0    |
//! | PRIVATE      | 2    |   | INHERITANCE    | 1    |
//! | PROTECTED    | 3    |   | IMPLEMENTATION | 2    |
//! | NON_MODIFIER | 4    |   | ASSOCIATION    | 3    |
//! |              |      |   | AGGREGATION    | 4    |
//! |              |      |   | COMPOSITION    | 5    |
//!
//! A null attribute visibility means "absent". Legacy classes carry no
//! position; imported classes are stacked vertically. Timestamps are
//! regenerated on every write.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    DiagramError, DiagramResult, Multiplicity, Position, RelationKind, Visibility,
};
use crate::model::{Attribute, ClassEntity, Diagram, Method, Parameter, Relation, RelationPolicy};

/// Vertical distance between imported classes
pub const IMPORT_ROW_HEIGHT: f64 = 250.0;
/// Position of the first imported class
pub const IMPORT_ORIGIN: Position = Position::new(100.0, 100.0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFileId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMultiplicity {
    pub lower: u32,
    #[serde(default)]
    pub upper: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyVariable {
    #[serde(default)]
    pub visibility: Option<i64>,
    #[serde(default)]
    pub is_static: Option<bool>,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMethod {
    pub visibility: i64,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    pub name: String,
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<LegacyVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRelationInfo {
    pub target_class_id: String,
    pub relation: i64,
    pub multiplicity_p: LegacyMultiplicity,
    pub multiplicity_c: LegacyMultiplicity,
    pub role_name_p: String,
    pub role_name_c: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRelations {
    #[serde(default)]
    pub relation_infos: Vec<LegacyRelationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyClass {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relations: LegacyRelations,
    #[serde(default)]
    pub attributes: Vec<LegacyVariable>,
    #[serde(default)]
    pub methods: Vec<LegacyMethod>,
}

/// A diagram in the legacy persistence format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDiagram {
    pub last_modified: i64,
    pub created_at: i64,
    pub file_id: LegacyFileId,
    pub name: String,
    pub classes: Vec<LegacyClass>,
}

pub fn visibility_from_code(code: i64) -> DiagramResult<Visibility> {
    match code {
        1 => Ok(Visibility::Public),
        2 => Ok(Visibility::Private),
        3 => Ok(Visibility::Protected),
        4 => Ok(Visibility::NonModifier),
        other => Err(DiagramError::invalid_encoding("visibility", other)),
    }
}

pub fn visibility_code(visibility: Visibility) -> i64 {
    match visibility {
        Visibility::Public => 1,
        Visibility::Private => 2,
        Visibility::Protected => 3,
        Visibility::NonModifier => 4,
    }
}

pub fn relation_kind_from_code(code: i64) -> DiagramResult<RelationKind> {
    match code {
        0 => Ok(RelationKind::None),
        1 => Ok(RelationKind::Inheritance),
        2 => Ok(RelationKind::Implementation),
        3 => Ok(RelationKind::Association),
        4 => Ok(RelationKind::Aggregation),
        5 => Ok(RelationKind::Composition),
        other => Err(DiagramError::invalid_encoding("relation", other)),
    }
}

pub fn relation_kind_code(kind: RelationKind) -> i64 {
    match kind {
        RelationKind::None => 0,
        RelationKind::Inheritance => 1,
        RelationKind::Implementation => 2,
        RelationKind::Association => 3,
        RelationKind::Aggregation => 4,
        RelationKind::Composition => 5,
    }
}

impl From<&LegacyMultiplicity> for Multiplicity {
    fn from(m: &LegacyMultiplicity) -> Self {
        Multiplicity::new(m.lower, m.upper)
    }
}

impl From<Multiplicity> for LegacyMultiplicity {
    fn from(m: Multiplicity) -> Self {
        Self {
            lower: m.lower,
            upper: m.upper,
        }
    }
}

impl LegacyDiagram {
    /// Convert into the in-memory model
    ///
    /// Fails on unknown integer codes and on broken invariants.
    pub fn into_diagram(self) -> DiagramResult<Diagram> {
        self.into_diagram_with(RelationPolicy::default())
    }

    /// Like [`LegacyDiagram::into_diagram`], checking relations against `policy`
    pub fn into_diagram_with(self, policy: RelationPolicy) -> DiagramResult<Diagram> {
        let classes = self
            .classes
            .into_iter()
            .enumerate()
            .map(|(index, class)| class.into_class(index))
            .collect::<DiagramResult<Vec<_>>>()?;
        debug!(
            diagram_id = %self.file_id.id,
            classes = classes.len(),
            "Imported legacy diagram"
        );
        Diagram::from_classes_with_policy(self.file_id.id, self.name, classes, policy)
    }

    /// Encode a diagram, stamping both timestamps with the current time
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            last_modified: now,
            created_at: now,
            file_id: LegacyFileId {
                id: diagram.id().to_string(),
            },
            name: diagram.name.clone(),
            classes: diagram.classes().iter().map(LegacyClass::from_class).collect(),
        }
    }
}

impl LegacyClass {
    fn into_class(self, index: usize) -> DiagramResult<ClassEntity> {
        let position = Position::new(
            IMPORT_ORIGIN.x,
            IMPORT_ORIGIN.y + index as f64 * IMPORT_ROW_HEIGHT,
        );
        let mut class = ClassEntity::with_id(self.id, self.name).at(position);

        for attr in self.attributes {
            class.attributes.push(Attribute {
                name: attr.name,
                attr_type: attr.var_type,
                visibility: attr.visibility.map(visibility_from_code).transpose()?,
                is_static: attr.is_static,
            });
        }

        for method in self.methods {
            class.methods.push(Method {
                name: method.name,
                return_type: method.return_type,
                visibility: visibility_from_code(method.visibility)?,
                is_abstract: method.is_abstract,
                is_static: method.is_static,
                parameters: method
                    .parameters
                    .into_iter()
                    .map(|p| Parameter::new(p.name, p.var_type))
                    .collect(),
            });
        }

        for info in self.relations.relation_infos {
            class.relations.push(Relation {
                target_class_id: info.target_class_id.into(),
                kind: relation_kind_from_code(info.relation)?,
                multiplicity_p: Some(Multiplicity::from(&info.multiplicity_p)),
                multiplicity_c: Some(Multiplicity::from(&info.multiplicity_c)),
                role_name_p: Some(info.role_name_p),
                role_name_c: Some(info.role_name_c),
            });
        }

        Ok(class)
    }

    fn from_class(class: &ClassEntity) -> Self {
        let attributes = class
            .attributes
            .iter()
            .map(|attr| LegacyVariable {
                visibility: attr.visibility.map(visibility_code),
                is_static: attr.is_static,
                name: attr.name.clone(),
                var_type: attr.attr_type.clone(),
            })
            .collect();

        let methods = class
            .methods
            .iter()
            .map(|method| LegacyMethod {
                visibility: visibility_code(method.visibility),
                is_abstract: method.is_abstract,
                is_static: method.is_static,
                name: method.name.clone(),
                return_type: method.return_type.clone(),
                parameters: method
                    .parameters
                    .iter()
                    .map(|p| LegacyVariable {
                        visibility: None,
                        is_static: None,
                        name: p.name.clone(),
                        var_type: p.param_type.clone(),
                    })
                    .collect(),
            })
            .collect();

        let relation_infos = class
            .relations
            .iter()
            .map(|rel| LegacyRelationInfo {
                target_class_id: rel.target_class_id.to_string(),
                relation: relation_kind_code(rel.kind),
                multiplicity_p: rel
                    .multiplicity_p
                    .unwrap_or(Multiplicity::unbounded(1))
                    .into(),
                multiplicity_c: rel
                    .multiplicity_c
                    .unwrap_or(Multiplicity::unbounded(0))
                    .into(),
                role_name_p: rel.role_name_p.clone().unwrap_or_else(|| "parent".to_string()),
                role_name_c: rel.role_name_c.clone().unwrap_or_else(|| "child".to_string()),
            })
            .collect();

        Self {
            id: class.id().to_string(),
            name: class.name.clone(),
            relations: LegacyRelations { relation_infos },
            attributes,
            methods,
        }
    }
}
