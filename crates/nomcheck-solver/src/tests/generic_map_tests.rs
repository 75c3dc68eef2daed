use super::GenericMap;
use crate::error::SolverError;
use nomcheck_core::{INPUT_PRIORITY, OUTPUT_PRIORITY};

#[test]
fn unbound_generics_read_as_none() {
    let map = GenericMap::new();
    assert_eq!(map.explicit_type("node", "t"), None);
    assert!(map.explicit_types("node", "t").is_empty());
    assert_eq!(map.top_priority("node", "t"), None);
}

#[test]
fn bindings_are_per_node_and_caseless() {
    let mut map = GenericMap::new();
    map.bind_explicit("a", "T", "Dog", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
    assert_eq!(map.explicit_type("a", "T"), Some("dog".to_string()));
    // The same generic name on another node is unrelated.
    assert_eq!(map.explicit_type("b", "t"), None);
}

#[test]
fn higher_priority_bindings_shadow_lower_ones() {
    let mut map = GenericMap::new();
    map.bind_explicit("a", "t", "dog", INPUT_PRIORITY);
    map.bind_explicit("a", "t", "mammal", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("mammal".to_string()));
    assert_eq!(map.top_priority("a", "t"), Some(OUTPUT_PRIORITY));

    map.unbind_explicit("a", "t", "mammal", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
    assert_eq!(map.top_priority("a", "t"), Some(INPUT_PRIORITY));

    map.unbind_explicit("a", "t", "dog", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), None);
}

#[test]
fn ties_keep_the_earliest_binding_first() {
    let mut map = GenericMap::new();
    map.bind_explicit("a", "t", "dog", INPUT_PRIORITY);
    map.bind_explicit("a", "t", "bat", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
    assert_eq!(
        map.explicit_types("a", "t"),
        vec!["dog".to_string(), "bat".to_string()]
    );
}

#[test]
fn binding_to_an_unbound_generic_is_an_error() {
    let mut map = GenericMap::new();
    let err = map
        .bind_to_generic("a", "t", "b", "u", INPUT_PRIORITY)
        .unwrap_err();
    assert_eq!(
        err,
        SolverError::UnboundDependency {
            node_id: "b".to_string(),
            generic: "u".to_string(),
        }
    );
    assert_eq!(map.explicit_type("a", "t"), None);
}

#[test]
fn derived_bindings_take_the_dependency_value() {
    let mut map = GenericMap::new();
    map.bind_explicit("b", "t", "dog", OUTPUT_PRIORITY);
    map.bind_to_generic("a", "t", "b", "t", INPUT_PRIORITY).unwrap();
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
    assert_eq!(map.top_priority("a", "t"), Some(INPUT_PRIORITY));
}

#[test]
fn derived_bindings_follow_dependency_rebinds() {
    let mut map = GenericMap::new();
    map.bind_explicit("b", "t", "dog", INPUT_PRIORITY);
    map.bind_to_generic("a", "t", "b", "t", INPUT_PRIORITY).unwrap();

    // A higher-priority binding changes b's active value; a follows.
    map.bind_explicit("b", "t", "mammal", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("mammal".to_string()));

    // Removing it falls b back to dog; a follows again.
    map.unbind_explicit("b", "t", "mammal", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
}

#[test]
fn dependency_going_unbound_removes_derived_bindings() {
    let mut map = GenericMap::new();
    map.bind_explicit("b", "t", "dog", OUTPUT_PRIORITY);
    map.bind_to_generic("a", "t", "b", "t", INPUT_PRIORITY).unwrap();

    map.unbind_explicit("b", "t", "dog", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), None);

    // The relationship ended with the value; a does not resurrect.
    map.bind_explicit("b", "t", "cat", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), None);
}

#[test]
fn rebinds_cascade_through_chains_of_dependers() {
    let mut map = GenericMap::new();
    map.bind_explicit("c", "t", "dog", OUTPUT_PRIORITY);
    map.bind_to_generic("b", "t", "c", "t", INPUT_PRIORITY).unwrap();
    map.bind_to_generic("a", "t", "b", "t", INPUT_PRIORITY).unwrap();
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));

    map.bind_explicit("c", "t", "mammal", OUTPUT_PRIORITY);
    map.unbind_explicit("c", "t", "dog", OUTPUT_PRIORITY);
    assert_eq!(map.explicit_type("b", "t"), Some("mammal".to_string()));
    assert_eq!(map.explicit_type("a", "t"), Some("mammal".to_string()));
}

#[test]
fn unbind_from_generic_severs_the_relationship() {
    let mut map = GenericMap::new();
    map.bind_explicit("b", "t", "dog", OUTPUT_PRIORITY);
    map.bind_to_generic("a", "t", "b", "t", INPUT_PRIORITY).unwrap();

    map.unbind_from_generic("a", "t", "b", "t", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), None);

    // a no longer follows b.
    map.bind_explicit("b", "t", "mammal", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), None);
}

#[test]
fn unbind_from_generic_without_a_record_is_a_no_op() {
    let mut map = GenericMap::new();
    map.bind_explicit("a", "t", "dog", INPUT_PRIORITY);
    map.unbind_from_generic("a", "t", "b", "t", INPUT_PRIORITY);
    assert_eq!(map.explicit_type("a", "t"), Some("dog".to_string()));
}
