//! Structural checks over a whole diagram
//!
//! Mutations keep these invariants by construction. The checks exist for
//! diagrams that arrive from outside, through deserialization or
//! [`Diagram::insert_class`](super::Diagram::insert_class).

use std::collections::HashSet;
use std::fmt;

use crate::core::{DiagramError, DiagramResult};

use super::{ClassEntity, RelationPolicy};

/// A single broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    DuplicateClassId { class_id: String },
    DanglingRelation { source_id: String, target_id: String },
    SelfRelation { class_id: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::DuplicateClassId { class_id } => {
                write!(f, "Duplicate class id '{}'", class_id)
            }
            InvariantViolation::DanglingRelation {
                source_id,
                target_id,
            } => write!(
                f,
                "Relation from '{}' targets missing class '{}'",
                source_id, target_id
            ),
            InvariantViolation::SelfRelation { class_id } => {
                write!(f, "Class '{}' relates to itself", class_id)
            }
        }
    }
}

/// Collect every violation, in class order
pub fn invariant_violations(
    classes: &[ClassEntity],
    policy: &RelationPolicy,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen: HashSet<&str> = HashSet::with_capacity(classes.len());

    for class in classes {
        if !seen.insert(class.id().as_str()) {
            violations.push(InvariantViolation::DuplicateClassId {
                class_id: class.id().to_string(),
            });
        }
    }

    for class in classes {
        for relation in &class.relations {
            let target = relation.target_class_id.as_str();
            if !seen.contains(target) {
                violations.push(InvariantViolation::DanglingRelation {
                    source_id: class.id().to_string(),
                    target_id: target.to_string(),
                });
            } else if target == class.id().as_str() && !policy.allow_self_relations {
                violations.push(InvariantViolation::SelfRelation {
                    class_id: class.id().to_string(),
                });
            }
        }
    }

    violations
}

/// Fail with [`DiagramError::InvariantViolation`] listing every violation
pub fn ensure_invariants(classes: &[ClassEntity], policy: &RelationPolicy) -> DiagramResult<()> {
    let violations = invariant_violations(classes, policy);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(DiagramError::InvariantViolation { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationKind;
    use crate::model::Relation;

    #[test]
    fn test_valid_classes_pass() {
        let classes = vec![
            ClassEntity::with_id("a", "A"),
            ClassEntity::with_id("b", "B").with_relation(Relation::new("a", RelationKind::Inheritance)),
        ];
        assert!(invariant_violations(&classes, &RelationPolicy::default()).is_empty());
        assert!(ensure_invariants(&classes, &RelationPolicy::default()).is_ok());
    }

    #[test]
    fn test_duplicate_ids_reported() {
        let classes = vec![ClassEntity::with_id("a", "A"), ClassEntity::with_id("a", "A2")];
        let violations = invariant_violations(&classes, &RelationPolicy::default());
        assert_eq!(
            violations,
            vec![InvariantViolation::DuplicateClassId {
                class_id: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_dangling_relation_reported() {
        let classes = vec![
            ClassEntity::with_id("a", "A").with_relation(Relation::new("ghost", RelationKind::Association)),
        ];
        let err = ensure_invariants(&classes, &RelationPolicy::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ghost"));
        assert!(msg.contains("'a'"));
    }

    #[test]
    fn test_self_relation_depends_on_policy() {
        let classes = vec![
            ClassEntity::with_id("a", "A").with_relation(Relation::new("a", RelationKind::Association)),
        ];
        assert_eq!(
            invariant_violations(&classes, &RelationPolicy::default()),
            vec![InvariantViolation::SelfRelation {
                class_id: "a".to_string()
            }]
        );
        let permissive = RelationPolicy {
            allow_self_relations: true,
        };
        assert!(invariant_violations(&classes, &permissive).is_empty());
    }
}
