//! Hierarchy analysis
//!
//! Derives a parent/child forest from INHERITANCE and IMPLEMENTATION
//! relations and assigns every class a depth level. Other relation kinds are
//! ignored.
//!
//! - A class's parent is the target of its first hierarchy relation; later
//!   hierarchy targets are recorded as secondary parents.
//! - Classes without a parent are roots at level 0. Levels are assigned
//!   breadth-first from the roots, each child one below its parent.
//! - Classes the traversal never reaches (members of a hierarchy cycle, or
//!   descendants of one) are placed at level 0 after the roots.
//!
//! Within a level, classes appear in discovery order.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, span, trace, Level};

use crate::core::ClassId;
use crate::model::ClassEntity;

/// Result of analyzing the hierarchy relations of a set of classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    levels: Vec<Vec<ClassId>>,
    level_of: HashMap<ClassId, usize>,
    parent: HashMap<ClassId, ClassId>,
    children: HashMap<ClassId, Vec<ClassId>>,
    secondary_parents: HashMap<ClassId, Vec<ClassId>>,
    roots: Vec<ClassId>,
    unreached: Vec<ClassId>,
}

impl Hierarchy {
    /// Analyze the given classes
    ///
    /// Relations whose target is not among `classes` are ignored.
    pub fn analyze(classes: &[ClassEntity]) -> Self {
        let analyze_span = span!(Level::DEBUG, "analyze_hierarchy", class_count = classes.len());
        let _enter = analyze_span.enter();

        let known: HashSet<&str> = classes.iter().map(|c| c.id().as_str()).collect();

        let mut parent: HashMap<ClassId, ClassId> = HashMap::new();
        let mut children: HashMap<ClassId, Vec<ClassId>> = HashMap::new();
        let mut secondary_parents: HashMap<ClassId, Vec<ClassId>> = HashMap::new();

        for class in classes {
            for relation in class.hierarchy_relations() {
                let target = &relation.target_class_id;
                if !known.contains(target.as_str()) {
                    trace!(child = %class.id(), parent = %target, "Skipping unknown parent");
                    continue;
                }
                if parent.contains_key(class.id()) {
                    secondary_parents
                        .entry(class.id().clone())
                        .or_default()
                        .push(target.clone());
                    continue;
                }
                parent.insert(class.id().clone(), target.clone());
                children
                    .entry(target.clone())
                    .or_default()
                    .push(class.id().clone());
            }
        }

        let roots: Vec<ClassId> = classes
            .iter()
            .filter(|c| !parent.contains_key(c.id()))
            .map(|c| c.id().clone())
            .collect();
        debug!(
            root_count = roots.len(),
            parent_links = parent.len(),
            "Recorded parent links"
        );

        let mut levels: Vec<Vec<ClassId>> = Vec::new();
        let mut level_of: HashMap<ClassId, usize> = HashMap::new();
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut queue: VecDeque<(ClassId, usize)> = VecDeque::new();

        for root in &roots {
            visited.insert(root.clone());
            queue.push_back((root.clone(), 0));
        }

        while let Some((id, level)) = queue.pop_front() {
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(id.clone());
            level_of.insert(id.clone(), level);

            if let Some(kids) = children.get(&id) {
                for child in kids {
                    if visited.insert(child.clone()) {
                        queue.push_back((child.clone(), level + 1));
                    }
                }
            }
        }

        let mut unreached = Vec::new();
        for class in classes {
            if level_of.contains_key(class.id()) {
                continue;
            }
            if levels.is_empty() {
                levels.push(Vec::new());
            }
            levels[0].push(class.id().clone());
            level_of.insert(class.id().clone(), 0);
            unreached.push(class.id().clone());
        }
        if !unreached.is_empty() {
            debug!(
                unreached = unreached.len(),
                "Placed classes outside any rooted hierarchy at level 0"
            );
        }

        Self {
            levels,
            level_of,
            parent,
            children,
            secondary_parents,
            roots,
            unreached,
        }
    }

    /// Classes grouped by level, level 0 first
    pub fn levels(&self) -> &[Vec<ClassId>] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.level_of.get(id).copied()
    }

    /// Primary parent of a class
    pub fn parent_of(&self, id: &str) -> Option<&ClassId> {
        self.parent.get(id)
    }

    /// Children whose primary parent is `id`, in class order
    pub fn children_of(&self, id: &str) -> &[ClassId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hierarchy targets beyond the first one
    pub fn secondary_parents(&self, id: &str) -> &[ClassId] {
        self.secondary_parents
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Classes with no parent
    pub fn roots(&self) -> &[ClassId] {
        &self.roots
    }

    /// Classes that have a parent but no path from a root
    pub fn unreached(&self) -> &[ClassId] {
        &self.unreached
    }

    /// Roots that take no part in any hierarchy relation
    pub fn isolated(&self) -> Vec<&ClassId> {
        self.roots
            .iter()
            .filter(|id| !self.children.contains_key(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationKind;
    use crate::model::Relation;

    fn class(id: &str) -> ClassEntity {
        ClassEntity::with_id(id, id.to_uppercase())
    }

    fn ids(list: &[ClassId]) -> Vec<&str> {
        list.iter().map(ClassId::as_str).collect()
    }

    #[test]
    fn test_chain_levels() {
        let classes = vec![
            class("a"),
            class("b").with_relation(Relation::new("a", RelationKind::Inheritance)),
            class("c").with_relation(Relation::new("b", RelationKind::Inheritance)),
        ];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(h.level_of("a"), Some(0));
        assert_eq!(h.level_of("b"), Some(1));
        assert_eq!(h.level_of("c"), Some(2));
        assert_eq!(h.level_count(), 3);
        assert_eq!(ids(h.roots()), vec!["a"]);
    }

    #[test]
    fn test_order_within_level_follows_discovery() {
        let classes = vec![
            class("root"),
            class("x").with_relation(Relation::new("root", RelationKind::Implementation)),
            class("other"),
            class("y").with_relation(Relation::new("root", RelationKind::Inheritance)),
        ];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(ids(&h.levels()[0]), vec!["root", "other"]);
        assert_eq!(ids(&h.levels()[1]), vec!["x", "y"]);
        assert_eq!(ids(h.children_of("root")), vec!["x", "y"]);
    }

    #[test]
    fn test_non_hierarchy_relations_ignored() {
        let classes = vec![
            class("car").with_relation(Relation::new("engine", RelationKind::Composition)),
            class("engine").with_relation(Relation::new("car", RelationKind::Association)),
        ];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(h.level_of("car"), Some(0));
        assert_eq!(h.level_of("engine"), Some(0));
        assert_eq!(h.isolated().len(), 2);
    }

    #[test]
    fn test_two_cycle_terminates_at_level_zero() {
        let classes = vec![
            class("a").with_relation(Relation::new("b", RelationKind::Inheritance)),
            class("b").with_relation(Relation::new("a", RelationKind::Inheritance)),
        ];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(h.level_of("a"), Some(0));
        assert_eq!(h.level_of("b"), Some(0));
        assert!(h.roots().is_empty());
        assert_eq!(ids(h.unreached()), vec!["a", "b"]);
    }

    #[test]
    fn test_first_parent_wins() {
        let classes = vec![
            class("animal"),
            class("pet").with_relation(Relation::new("animal", RelationKind::Inheritance)),
            class("dog")
                .with_relation(Relation::new("pet", RelationKind::Inheritance))
                .with_relation(Relation::new("animal", RelationKind::Implementation)),
        ];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(h.parent_of("dog").map(ClassId::as_str), Some("pet"));
        assert_eq!(ids(h.secondary_parents("dog")), vec!["animal"]);
        assert_eq!(h.level_of("dog"), Some(2));
    }

    #[test]
    fn test_unknown_parent_ignored() {
        let classes =
            vec![class("a").with_relation(Relation::new("missing", RelationKind::Inheritance))];
        let h = Hierarchy::analyze(&classes);
        assert_eq!(h.level_of("a"), Some(0));
        assert_eq!(h.parent_of("a"), None);
    }

    #[test]
    fn test_empty_input() {
        let h = Hierarchy::analyze(&[]);
        assert_eq!(h.level_count(), 0);
        assert!(h.roots().is_empty());
    }
}
