use std::sync::{Arc, OnceLock};

use pretty_assertions::assert_eq;
use tagval::{Validate, ValidationErrors, Validator, ValidatorConfig};

#[derive(Validate)]
struct Node {
    #[validate("required")]
    name: String,
    next: OnceLock<Arc<Node>>,
}

#[derive(Validate)]
struct Chain {
    #[validate("required")]
    name: String,
    next: Option<Box<Chain>>,
}

#[derive(Validate)]
struct Shared {
    left: Arc<Node>,
    right: Arc<Node>,
}

fn node(name: &str) -> Arc<Node> {
    Arc::new(Node {
        name: name.into(),
        next: OnceLock::new(),
    })
}

fn namespaces(errors: &ValidationErrors) -> Vec<&str> {
    errors.iter().map(|e| e.namespace.as_str()).collect()
}

/// `depth` unnamed links.
fn chain(depth: usize) -> Chain {
    (0..depth).fold(
        Chain {
            name: String::new(),
            next: None,
        },
        |inner, _| Chain {
            name: String::new(),
            next: Some(Box::new(inner)),
        },
    )
}

#[test]
fn test_cycle_terminates() {
    let a = node("a");
    let b = node("");
    assert!(a.next.set(Arc::clone(&b)).is_ok());
    assert!(b.next.set(Arc::clone(&a)).is_ok());

    let validator = Validator::new();
    let errors = validator.validate_struct(&*a).unwrap();
    assert_eq!(namespaces(&errors), vec!["next.name"]);

    let errors = validator.validate_struct(&b).unwrap();
    assert_eq!(namespaces(&errors), vec!["name"]);
}

#[test]
fn test_self_loop() {
    let a = node("");
    assert!(a.next.set(Arc::clone(&a)).is_ok());

    let validator = Validator::new();
    let errors = validator.validate_struct(&a).unwrap();
    assert_eq!(namespaces(&errors), vec!["name"]);
}

#[test]
fn test_shared_values_are_visited_on_each_path() {
    let leaf = node("");
    let shared = Shared {
        left: Arc::clone(&leaf),
        right: leaf,
    };

    let validator = Validator::new();
    let errors = validator.validate_struct(&shared).unwrap();
    assert_eq!(namespaces(&errors), vec!["left.name", "right.name"]);
}

#[test]
fn test_recursive_type_without_cycle() {
    let validator = Validator::new();
    let errors = validator.validate_struct(&chain(3)).unwrap();
    assert_eq!(
        namespaces(&errors),
        vec!["name", "next.name", "next.next.name", "next.next.next.name"]
    );
    assert_eq!(validator.cache_stats().structs, 1);
}

#[test]
fn test_max_depth_truncates() {
    let validator = Validator::with_config(ValidatorConfig {
        max_depth: 2,
        ..ValidatorConfig::default()
    });
    let errors = validator.validate_struct(&chain(5)).unwrap();
    assert_eq!(namespaces(&errors), vec!["name", "next.name"]);
}
