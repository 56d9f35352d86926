//! Edge cases across the model, analyzer and layouts

use umlgraph::prelude::*;

fn class(id: &str) -> ClassEntity {
    ClassEntity::with_id(id, id)
}

fn rel(target: &str, kind: RelationKind) -> Relation {
    Relation::new(target, kind)
}

#[test]
fn test_empty_diagram_layouts() {
    for kind in [LayoutKind::Hierarchical, LayoutKind::General] {
        let mut store = DiagramStore::default();
        let result = store.apply_layout(kind);
        assert!(result.is_empty());
        assert_eq!(result.width, 0.0);
    }
}

#[test]
fn test_single_class() {
    let classes = vec![class("only")];
    for kind in [LayoutKind::Hierarchical, LayoutKind::General] {
        let result = kind.algorithm(LayoutConfig::default()).layout(&classes);
        assert_eq!(result.position("only"), Some(Position::new(100.0, 100.0)));
    }
}

#[test]
fn test_inheritance_cycle_is_not_lost() {
    let classes = vec![
        class("a").with_relation(rel("b", RelationKind::Inheritance)),
        class("b").with_relation(rel("a", RelationKind::Inheritance)),
        class("c"),
    ];
    let hierarchy = Hierarchy::analyze(&classes);

    assert_eq!(hierarchy.roots(), &[ClassId::new("c")]);
    assert_eq!(hierarchy.unreached().len(), 2);
    assert_eq!(hierarchy.levels()[0], vec!["c", "a", "b"]);

    let result = HierarchicalLayout::new().layout(&classes);
    assert_eq!(result.len(), 3);
    assert_eq!(result.position("b"), Some(Position::new(700.0, 100.0)));
}

#[test]
fn test_cycle_with_reachable_child() {
    // d hangs off the a/b cycle and is never reached from a root
    let classes = vec![
        class("a").with_relation(rel("b", RelationKind::Inheritance)),
        class("b").with_relation(rel("a", RelationKind::Inheritance)),
        class("d").with_relation(rel("a", RelationKind::Implementation)),
    ];
    let hierarchy = Hierarchy::analyze(&classes);
    assert!(hierarchy.roots().is_empty());
    assert_eq!(hierarchy.level_count(), 1);
    assert_eq!(hierarchy.level_of("d"), Some(0));
}

#[test]
fn test_general_layout_with_only_cycles() {
    let classes = vec![
        class("a").with_relation(rel("b", RelationKind::Association)),
        class("b").with_relation(rel("c", RelationKind::Association)),
        class("c").with_relation(rel("a", RelationKind::Association)),
    ];
    let result = GeneralLayout::new().layout(&classes);
    assert_eq!(result.len(), 3);

    let mut ys: Vec<f64> = ["a", "b", "c"]
        .iter()
        .map(|id| result.position(id).unwrap().y)
        .collect();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(ys, vec![100.0, 480.0, 860.0]);
}

#[test]
fn test_disconnected_components_do_not_overlap() {
    let classes = vec![class("a"), class("b"), class("c"), class("d")];
    let result = GeneralLayout::new().layout(&classes);

    let mut xs: Vec<f64> = result.positions.values().map(|p| p.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] >= 280.0 - 1e-6);
    }
    assert!(result.positions.values().all(|p| p.y == 100.0));
}

#[test]
fn test_duplicate_relations_are_kept() {
    let mut store = DiagramStore::default();
    let a = store.add_class("A", None);
    let b = store.add_class("B", None);
    for _ in 0..2 {
        store
            .add_relation(a.as_str(), Relation::new(b.clone(), RelationKind::Association))
            .unwrap();
    }
    assert_eq!(store.class(a.as_str()).unwrap().relations.len(), 2);

    store.delete_class(b.as_str());
    assert!(store.class(a.as_str()).unwrap().relations.is_empty());
}

#[test]
fn test_default_relation_exhausts_targets() {
    let mut store = DiagramStore::default();
    let a = store.add_class("A", None);
    let b = store.add_class("B", None);
    let c = store.add_class("C", None);

    assert_eq!(store.add_default_relation(a.as_str()).unwrap(), Some(b));
    assert_eq!(store.add_default_relation(a.as_str()).unwrap(), Some(c));
    assert_eq!(store.add_default_relation(a.as_str()).unwrap(), None);
    assert_eq!(store.class(a.as_str()).unwrap().relations.len(), 2);
}

#[test]
fn test_bidirectional_hierarchy_has_no_mirror() {
    let mut store = DiagramStore::default();
    let base = store.add_class("Base", None);
    let derived = store.add_class("Derived", None);

    let mirrored = store
        .add_bidirectional_relation(
            derived.as_str(),
            Relation::new(base.clone(), RelationKind::Inheritance),
        )
        .unwrap();
    assert!(!mirrored);
    assert!(store.class(base.as_str()).unwrap().relations.is_empty());
}

#[test]
fn test_superseded_layout_changes_nothing() {
    let mut store = DiagramStore::default();
    let a = store.add_class("A", Some(Position::new(5.0, 5.0)));

    let first = store.schedule_layout(LayoutKind::General);
    let second = store.schedule_layout(LayoutKind::Hierarchical);

    assert_eq!(store.run_scheduled_layout(first), LayoutOutcome::Superseded);
    assert_eq!(store.class(a.as_str()).unwrap().position, Position::new(5.0, 5.0));

    assert!(store.run_scheduled_layout(second).is_applied());
    assert_eq!(store.pending_layout(), None);
    assert_eq!(store.run_scheduled_layout(second), LayoutOutcome::Superseded);
}

#[test]
fn test_rename_keeps_identity() {
    let mut store = DiagramStore::default();
    let a = store.add_class("Old", None);
    store.update_class_name(a.as_str(), "New").unwrap();
    assert_eq!(store.class(a.as_str()).unwrap().name, "New");
    assert_eq!(store.class(a.as_str()).unwrap().id(), &a);
}

#[test]
fn test_replace_diagram_clears_session_state() {
    let mut store = DiagramStore::default();
    let a = store.add_class("A", None);
    store.select_class(Some(a.as_str())).unwrap();
    store.schedule_layout(LayoutKind::General);

    let previous = store.replace_diagram(Diagram::with_id("next", "Next"));
    assert_eq!(previous.len(), 1);
    assert!(store.selected_class().is_none());
    assert!(store.pending_layout().is_none());
    assert_eq!(store.diagram().id(), "next");
}
