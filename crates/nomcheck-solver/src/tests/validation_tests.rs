use super::{ValidationIssue, validate_hierarchy};
use crate::definition::HierarchyDef;

fn issues(json: &str) -> Vec<ValidationIssue> {
    let def: HierarchyDef = serde_json::from_str(json).unwrap();
    validate_hierarchy(&def)
}

#[test]
fn a_clean_definition_has_no_issues() {
    let found = issues(
        r#"{
            "Animal": {},
            "Mammal": { "fulfills": ["Animal"] },
            "List": {
                "params": [{ "name": "T", "variance": "co" }],
                "fulfills": ["Collection[T]"]
            },
            "Collection": { "params": [{ "name": "T", "variance": "co" }] }
        }"#,
    );
    assert!(found.is_empty(), "unexpected issues: {found:?}");
}

#[test]
fn caseless_name_collisions_are_reported_once() {
    let found = issues(r#"{ "Dog": {}, "dog": {}, "DOG": {} }"#);
    assert_eq!(
        found,
        vec![ValidationIssue::ConflictingTypes {
            name: "Dog".to_string(),
            conflicts: vec!["dog".to_string(), "DOG".to_string()],
        }]
    );
}

#[test]
fn single_character_names_are_flagged_as_generic() {
    let found = issues(r#"{ "D": {} }"#);
    assert_eq!(
        found,
        vec![ValidationIssue::GenericTypeName {
            name: "D".to_string(),
        }]
    );
}

#[test]
fn reserved_characters_in_names_are_flagged() {
    let found = issues(r#"{ "Dog[T]": {}, "Big Dog": {} }"#);
    assert_eq!(
        found,
        vec![
            ValidationIssue::ReservedCharacters {
                name: "Dog[T]".to_string(),
            },
            ValidationIssue::ReservedCharacters {
                name: "Big Dog".to_string(),
            },
        ]
    );
}

#[test]
fn invalid_variance_strings_are_flagged() {
    let found = issues(
        r#"{ "List": { "params": [{ "name": "T", "variance": "sideways" }] } }"#,
    );
    assert_eq!(
        found,
        vec![ValidationIssue::InvalidVariance {
            type_name: "List".to_string(),
            param: "T".to_string(),
            value: "sideways".to_string(),
        }]
    );
}

#[test]
fn undefined_supertypes_are_flagged() {
    let found = issues(r#"{ "Dog": { "fulfills": ["Mammal"] } }"#);
    assert_eq!(
        found,
        vec![ValidationIssue::UndefinedSupertype {
            type_name: "Dog".to_string(),
            super_name: "mammal".to_string(),
        }]
    );
}

#[test]
fn self_fulfillment_is_flagged() {
    let found = issues(r#"{ "Dog": { "fulfills": ["Dog"] } }"#);
    assert!(found.contains(&ValidationIssue::SelfFulfillment {
        type_name: "Dog".to_string(),
    }));
}

#[test]
fn duplicate_fulfillments_are_flagged() {
    let found = issues(
        r#"{
            "Animal": {},
            "Dog": { "fulfills": ["Animal", "animal"] }
        }"#,
    );
    assert_eq!(
        found,
        vec![ValidationIssue::DuplicateFulfillment {
            type_name: "Dog".to_string(),
            super_name: "animal".to_string(),
        }]
    );
}

#[test]
fn malformed_super_references_are_flagged() {
    let found = issues(r#"{ "Dog": { "fulfills": ["Animal["] } }"#);
    assert!(matches!(
        found.as_slice(),
        [ValidationIssue::MalformedSuperReference { type_name, super_ref, .. }]
            if type_name == "Dog" && super_ref == "Animal["
    ));
}

#[test]
fn super_param_arity_mismatches_are_flagged() {
    let found = issues(
        r#"{
            "Collection": { "params": [{ "name": "T", "variance": "co" }] },
            "List": { "fulfills": ["Collection"] }
        }"#,
    );
    assert_eq!(
        found,
        vec![ValidationIssue::SuperParamsCountMismatch {
            type_name: "List".to_string(),
            super_name: "collection".to_string(),
            expected: 1,
            actual: 0,
        }]
    );
}

#[test]
fn circular_dependencies_report_the_cycle_path() {
    let found = issues(
        r#"{
            "TypeA": { "fulfills": ["TypeB"] },
            "TypeB": { "fulfills": ["TypeC"] },
            "TypeC": { "fulfills": ["TypeA"] }
        }"#,
    );
    assert_eq!(
        found,
        vec![ValidationIssue::CircularDependency {
            path: vec![
                "TypeA".to_string(),
                "TypeB".to_string(),
                "TypeC".to_string(),
                "TypeA".to_string(),
            ],
        }]
    );
}

#[test]
fn every_defect_in_a_definition_is_collected() {
    let found = issues(
        r#"{
            "D": {},
            "Dog": { "fulfills": ["Mammal", "Dog"] },
            "List": { "params": [{ "name": "T", "variance": "diagonal" }] }
        }"#,
    );
    assert!(found.contains(&ValidationIssue::GenericTypeName {
        name: "D".to_string(),
    }));
    assert!(found.contains(&ValidationIssue::UndefinedSupertype {
        type_name: "Dog".to_string(),
        super_name: "mammal".to_string(),
    }));
    assert!(found.contains(&ValidationIssue::SelfFulfillment {
        type_name: "Dog".to_string(),
    }));
    assert!(found.contains(&ValidationIssue::InvalidVariance {
        type_name: "List".to_string(),
        param: "T".to_string(),
        value: "diagonal".to_string(),
    }));
    // The self-fulfillment doubles as a one-step cycle.
    assert!(found.contains(&ValidationIssue::CircularDependency {
        path: vec!["Dog".to_string(), "Dog".to_string()],
    }));
    assert_eq!(found.len(), 5);
}
