//! Integration tests for the public API

use umlgraph::prelude::*;
use umlgraph::{auto_layout, load};

const ANIMALS: &str = include_str!("fixtures/animals.json");

fn animals() -> Diagram {
    load(ANIMALS).unwrap()
}

#[test]
fn test_load_fixture() {
    let diagram = animals();
    assert_eq!(diagram.id(), "animals_001");
    assert_eq!(diagram.name, "Animals");
    assert_eq!(diagram.len(), 7);

    let owner = diagram.class("owner").unwrap();
    assert_eq!(
        owner.relations[0].multiplicity_c,
        Some(Multiplicity::unbounded(0))
    );
}

#[test]
fn test_hierarchy_levels() {
    let diagram = animals();
    let hierarchy = Hierarchy::analyze(diagram.classes());

    assert_eq!(hierarchy.level_count(), 3);
    assert_eq!(hierarchy.levels()[0], vec!["animal", "pet", "owner", "kennel"]);
    assert_eq!(hierarchy.levels()[1], vec!["dog", "cat"]);
    assert_eq!(hierarchy.levels()[2], vec!["puppy"]);
    assert_eq!(hierarchy.secondary_parents("dog"), &[ClassId::new("pet")]);
}

#[test]
fn test_hierarchical_layout_positions() {
    let diagram = animals();
    let result = HierarchicalLayout::new().layout(diagram.classes());

    assert_eq!(result.position("animal"), Some(Position::new(100.0, 100.0)));
    assert_eq!(result.position("kennel"), Some(Position::new(1000.0, 100.0)));
    assert_eq!(result.position("cat"), Some(Position::new(400.0, 420.0)));
    assert_eq!(result.position("puppy"), Some(Position::new(100.0, 740.0)));
    assert_eq!(result.width, 1220.0);
    assert_eq!(result.height, 940.0);
}

#[test]
fn test_general_layout_ranks() {
    let diagram = animals();
    let result = GeneralLayout::new().layout(diagram.classes());

    assert_eq!(result.len(), 7);
    let y = |id: &str| result.position(id).unwrap().y;
    assert!(y("animal") < y("dog"));
    assert!(y("dog") < y("puppy"));
    assert!(y("pet") < y("dog"));
}

#[test]
fn test_auto_layout_keeps_format() {
    let output = auto_layout(ANIMALS, LayoutKind::Hierarchical).unwrap();
    let (diagram, format) = umlgraph::wire::read_any(&output).unwrap();
    assert_eq!(format, DiagramFormat::Native);
    assert_eq!(
        diagram.class("puppy").unwrap().position,
        Position::new(100.0, 740.0)
    );
}

#[test]
fn test_store_editing_session() {
    let mut store = DiagramStore::new(Diagram::new("Shop"));
    let order = store.add_class("Order", None);
    let line = store.add_class("OrderLine", Some(Position::new(400.0, 100.0)));

    let attr = store.add_attribute(order.as_str()).unwrap();
    store
        .update_attribute(
            order.as_str(),
            attr,
            AttributePatch::default().name("total").attr_type("double"),
        )
        .unwrap();

    let mirrored = store
        .add_bidirectional_relation(
            order.as_str(),
            Relation::new(line.clone(), RelationKind::Composition)
                .with_multiplicities(Multiplicity::exactly(1), Multiplicity::unbounded(1)),
        )
        .unwrap();
    assert!(mirrored);

    store.select_class(Some(line.as_str())).unwrap();
    store.delete_class(line.as_str());

    assert!(store.selected_class().is_none());
    let order_class = store.class(order.as_str()).unwrap();
    assert!(order_class.relations.is_empty());
    assert_eq!(order_class.attributes[0].name, "total");
    assert_eq!(order_class.attributes[0].attr_type, "double");
}

#[test]
fn test_canvas_round_trip() {
    let mut store = DiagramStore::new(animals());

    store
        .handle_event(CanvasEvent::Drag {
            class_id: ClassId::new("cat"),
            position: Position::new(30.0, 40.0),
        })
        .unwrap();
    store
        .handle_event(CanvasEvent::Select {
            class_id: Some(ClassId::new("cat")),
        })
        .unwrap();

    let selected = store.selected_class().unwrap();
    assert_eq!(selected.position, Position::new(30.0, 40.0));

    let views = umlgraph::render::class_views(store.diagram());
    let animal = views.iter().find(|v| v.id == "animal").unwrap();
    assert_eq!(animal.attributes, vec!["#name: String"]);
    assert_eq!(animal.methods, vec!["+speak(): void*"]);
}

#[test]
fn test_edge_descriptors_for_fixture() {
    let edges = umlgraph::render::edge_descriptors(&animals());
    let ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "dog-animal-0",
            "dog-pet-1",
            "cat-animal-0",
            "puppy-dog-0",
            "owner-dog-0",
            "kennel-dog-0"
        ]
    );

    let owner = edges.iter().find(|e| e.id == "owner-dog-0").unwrap();
    assert_eq!(owner.label, "association\n1..1 0..*");
    assert_eq!(owner.marker_end, Some(Marker::Arrow));

    let kennel = edges.iter().find(|e| e.id == "kennel-dog-0").unwrap();
    assert_eq!(kennel.marker_start, Some(Marker::Diamond));
}

#[test]
fn test_deferred_layout_uses_latest_state() {
    let mut store = DiagramStore::new(Diagram::with_id("d", "D"));
    let base = store.add_class("Base", None);
    let ticket = store.schedule_layout(LayoutKind::Hierarchical);

    let derived = store.add_class("Derived", None);
    store
        .add_relation(derived.as_str(), Relation::new(base, RelationKind::Inheritance))
        .unwrap();

    assert!(store.run_scheduled_layout(ticket).is_applied());
    assert_eq!(
        store.class(derived.as_str()).unwrap().position,
        Position::new(100.0, 420.0)
    );
}
