//! End-to-end scenarios: a host graph wiring typed and generic ports
//! through the public API, definition JSON included.

use nomcheck_solver::{
    ConnectionChecker, HierarchyDef, Port, PortRole, TypeHierarchy, validate_hierarchy,
};

const ZOOLOGY: &str = r#"{
    "Animal": {},
    "Mammal": { "fulfills": ["Animal"] },
    "FlyingAnimal": { "fulfills": ["Animal"] },
    "Dog": { "fulfills": ["Mammal"] },
    "Cat": { "fulfills": ["Mammal"] },
    "Bat": { "fulfills": ["Mammal", "FlyingAnimal"] },
    "List": {
        "params": [{ "name": "T", "variance": "co" }],
        "fulfills": ["Collection[T]"]
    },
    "Collection": { "params": [{ "name": "T", "variance": "co" }] }
}"#;

fn checker() -> ConnectionChecker {
    let def: HierarchyDef = serde_json::from_str(ZOOLOGY).unwrap();
    assert!(validate_hierarchy(&def).is_empty());
    ConnectionChecker::new(TypeHierarchy::new(&def).unwrap())
}

fn parent(node: &str, check: &str) -> Port {
    Port::new(node, check, PortRole::Parent)
}

fn child(node: &str, check: &str) -> Port {
    Port::new(node, check, PortRole::Child)
}

#[test]
fn a_generic_value_learns_its_type_from_its_consumer() {
    let mut c = checker();
    // A "random animal" node with a generic output plugged into a slot
    // that wants a Dog.
    let slot = parent("feeder", "Dog");
    let out = child("random", "t");

    assert!(c.can_connect(&slot, &out).unwrap());
    c.on_connect(&slot, &out).unwrap();
    assert_eq!(
        c.explicit_types_of(&out).unwrap(),
        vec!["dog".to_string()]
    );

    // Once bound, the output no longer fits an incompatible slot.
    assert!(!c.can_connect(&parent("percher", "FlyingAnimal"), &out).unwrap());

    c.on_disconnect(&slot, &out).unwrap();
    assert!(c.explicit_types_of(&out).unwrap().is_empty());
    assert!(c.can_connect(&parent("percher", "FlyingAnimal"), &out).unwrap());
}

#[test]
fn sibling_inputs_widen_an_input_bound_generic() {
    let mut c = checker();
    // A list-builder whose element inputs and output all share the
    // generic t.
    let input1 = parent("builder", "t");
    let input2 = parent("builder", "t");
    let output = child("builder", "t");

    c.on_connect(&input1, &child("dogs", "Dog")).unwrap();

    // The generic is only input-bound, so a sibling producing Bat is
    // accepted through their shared ancestor Mammal.
    assert!(c.can_connect(&input2, &child("bats", "Bat")).unwrap());
    c.on_connect(&input2, &child("bats", "Bat")).unwrap();
    assert_eq!(
        c.explicit_types_of(&output).unwrap(),
        vec!["dog".to_string(), "bat".to_string()]
    );

    // The output satisfies a Mammal slot through either candidate.
    assert!(c.can_connect(&parent("kennel", "Mammal"), &output).unwrap());
    // And an Animal slot, but not a FlyingAnimal-only slot via Dog alone.
    assert!(c.can_connect(&parent("zoo", "Animal"), &output).unwrap());

    c.on_disconnect(&input1, &child("dogs", "Dog")).unwrap();
    c.on_disconnect(&input2, &child("bats", "Bat")).unwrap();
    assert!(c.explicit_types_of(&output).unwrap().is_empty());
}

#[test]
fn chained_generics_follow_the_source_of_truth() {
    let mut c = checker();
    // wrapper's t derives from source's t, which an explicit consumer
    // pins to Cat.
    let source_out = child("source", "t");
    c.on_connect(&parent("cattery", "Cat"), &source_out).unwrap();

    let wrapper_in = parent("wrapper", "t");
    assert!(c.can_connect(&wrapper_in, &source_out).unwrap());
    c.on_connect(&wrapper_in, &source_out).unwrap();
    assert_eq!(
        c.explicit_types_of(&child("wrapper", "t")).unwrap(),
        vec!["cat".to_string()]
    );

    // Unpinning the source unwinds the whole chain.
    c.on_disconnect(&parent("cattery", "Cat"), &source_out).unwrap();
    assert!(c.explicit_types_of(&child("wrapper", "t")).unwrap().is_empty());
}

#[test]
fn parameterized_checks_respect_covariance_across_the_hierarchy() {
    let c = checker();
    assert!(
        c.can_connect(&parent("p", "Collection[Animal]"), &child("c", "List[Dog]"))
            .unwrap()
    );
    assert!(
        !c.can_connect(&parent("p", "List[Dog]"), &child("c", "Collection[Animal]"))
            .unwrap()
    );
}
