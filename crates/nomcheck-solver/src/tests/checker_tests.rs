use super::{ConnectionChecker, Port, PortRole};
use crate::definition::HierarchyDef;
use crate::error::SolverError;
use crate::hierarchy::TypeHierarchy;
use nomcheck_core::{INPUT_PRIORITY, OUTPUT_PRIORITY};

fn checker() -> ConnectionChecker {
    let def: HierarchyDef = serde_json::from_str(
        r#"{
            "Animal": {},
            "Mammal": { "fulfills": ["Animal"] },
            "FlyingAnimal": { "fulfills": ["Animal"] },
            "Dog": { "fulfills": ["Mammal"] },
            "Cat": { "fulfills": ["Mammal"] },
            "Bat": { "fulfills": ["Mammal", "FlyingAnimal"] },
            "List": { "params": [{ "name": "T", "variance": "co" }] }
        }"#,
    )
    .unwrap();
    ConnectionChecker::new(TypeHierarchy::new(&def).unwrap())
}

fn parent(node: &str, check: &str) -> Port {
    Port::new(node, check, PortRole::Parent)
}

fn child(node: &str, check: &str) -> Port {
    Port::new(node, check, PortRole::Child)
}

#[test]
fn explicit_subtype_connects_to_explicit_supertype() {
    let c = checker();
    assert!(c.can_connect(&parent("p", "Mammal"), &child("c", "Dog")).unwrap());
    assert!(!c.can_connect(&parent("p", "Dog"), &child("c", "Mammal")).unwrap());
}

#[test]
fn role_order_in_the_arguments_does_not_matter() {
    let c = checker();
    assert!(c.can_connect(&child("c", "Dog"), &parent("p", "Mammal")).unwrap());
}

#[test]
fn parameterized_checks_work_end_to_end() {
    let c = checker();
    assert!(
        c.can_connect(&parent("p", "List[Mammal]"), &child("c", "List[Dog]"))
            .unwrap()
    );
    assert!(
        !c.can_connect(&parent("p", "List[Dog]"), &child("c", "List[Mammal]"))
            .unwrap()
    );
}

#[test]
fn untyped_ports_connect_to_anything() {
    let c = checker();
    assert!(c.can_connect(&parent("p", ""), &child("c", "Dog")).unwrap());
    assert!(c.can_connect(&parent("p", "Dog"), &child("c", "")).unwrap());
}

#[test]
fn unbound_generics_connect_to_anything() {
    let c = checker();
    assert!(c.can_connect(&parent("p", "t"), &child("c", "Dog")).unwrap());
    assert!(c.can_connect(&parent("p", "Dog"), &child("c", "t")).unwrap());
}

#[test]
fn connecting_binds_a_generic_child_from_the_parent() {
    let mut c = checker();
    let p = parent("p", "Mammal");
    let ch = child("c", "t");
    c.on_connect(&p, &ch).unwrap();
    assert_eq!(
        c.generics().explicit_type("c", "t"),
        Some("mammal".to_string())
    );
    assert_eq!(c.generics().top_priority("c", "t"), Some(OUTPUT_PRIORITY));

    c.on_disconnect(&p, &ch).unwrap();
    assert_eq!(c.generics().explicit_type("c", "t"), None);
}

#[test]
fn connecting_binds_a_generic_parent_from_the_child() {
    let mut c = checker();
    let p = parent("p", "t");
    let ch = child("c", "Dog");
    c.on_connect(&p, &ch).unwrap();
    assert_eq!(c.generics().explicit_type("p", "t"), Some("dog".to_string()));
    assert_eq!(c.generics().top_priority("p", "t"), Some(INPUT_PRIORITY));

    c.on_disconnect(&p, &ch).unwrap();
    assert_eq!(c.generics().explicit_type("p", "t"), None);
}

#[test]
fn input_bound_parent_generics_accept_any_shared_ancestor() {
    let mut c = checker();
    c.on_connect(&parent("p", "t"), &child("c1", "Dog")).unwrap();

    // Bat is not a Dog, but they share Mammal; an input-bound generic has
    // not committed to a producer yet.
    assert!(c.can_connect(&parent("p", "t"), &child("c2", "Bat")).unwrap());
    // Nothing ties a List to a Dog, so that stays rejected.
    assert!(
        !c.can_connect(&parent("p", "t"), &child("c2", "List[Dog]"))
            .unwrap()
    );
}

#[test]
fn output_bound_generics_are_checked_strictly() {
    let mut c = checker();
    c.generics_mut().bind_explicit("p", "t", "dog", OUTPUT_PRIORITY);

    assert!(c.can_connect(&parent("p", "t"), &child("c", "Dog")).unwrap());
    assert!(!c.can_connect(&parent("p", "t"), &child("c", "Bat")).unwrap());
}

#[test]
fn generic_to_generic_connections_derive_from_the_bound_side() {
    let mut c = checker();
    c.generics_mut().bind_explicit("c", "t", "dog", OUTPUT_PRIORITY);

    let p = parent("p", "t");
    let ch = child("c", "t");
    c.on_connect(&p, &ch).unwrap();
    assert_eq!(c.generics().explicit_type("p", "t"), Some("dog".to_string()));

    // The parent follows the child's later transitions.
    c.generics_mut().bind_explicit("c", "t", "mammal", OUTPUT_PRIORITY + 1);
    assert_eq!(
        c.generics().explicit_type("p", "t"),
        Some("mammal".to_string())
    );

    c.on_disconnect(&p, &ch).unwrap();
    assert_eq!(c.generics().explicit_type("p", "t"), None);
}

#[test]
fn explicit_types_of_reports_the_resolved_set() {
    let mut c = checker();
    assert!(c.explicit_types_of(&parent("p", "t")).unwrap().is_empty());

    c.on_connect(&parent("p", "t"), &child("c1", "Dog")).unwrap();
    c.on_connect(&parent("p", "t"), &child("c2", "Bat")).unwrap();
    assert_eq!(
        c.explicit_types_of(&parent("p", "t")).unwrap(),
        vec!["dog".to_string(), "bat".to_string()]
    );
}

#[test]
fn malformed_checks_surface_as_errors() {
    let c = checker();
    let err = c
        .can_connect(&parent("p", "Dog["), &child("c", "Dog"))
        .unwrap_err();
    assert!(matches!(err.source, SolverError::Parse(_)));
    assert_eq!(err.parent_node, "p");
}

#[test]
fn undefined_types_surface_as_errors() {
    let c = checker();
    let err = c
        .can_connect(&parent("p", "Unicorn"), &child("c", "Dog"))
        .unwrap_err();
    assert_eq!(
        err.source,
        SolverError::TypeNotFound {
            name: "unicorn".to_string(),
        }
    );
}
