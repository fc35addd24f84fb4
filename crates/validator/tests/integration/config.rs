use pretty_assertions::assert_eq;
use serde_json::json;
use tagval::{ConfigError, FieldLevel, Validate, Validator, ValidatorConfig};

#[derive(Validate)]
struct Contact {
    #[validate("min=5,email,contains=@")]
    email: String,
    #[validate("never")]
    window: Span,
}

#[derive(Validate)]
struct Span {
    start: u32,
    tags: Vec<u32>,
}

#[derive(Validate)]
struct Deep {
    #[validate("required")]
    name: String,
    child: Option<Box<Deep>>,
}

fn contact() -> Contact {
    Contact {
        email: "ab".into(),
        window: Span {
            start: 3,
            tags: vec![1, 2],
        },
    }
}

fn validator(config: ValidatorConfig) -> Validator {
    let mut validator = Validator::with_config(config);
    validator
        .register_validation("never", |_: &FieldLevel<'_, '_>| false)
        .unwrap();
    validator
}

#[test]
fn test_every_directive_runs_by_default() {
    let validator = validator(ValidatorConfig::default());
    let errors = validator.validate_struct(&contact()).unwrap();

    let tags: Vec<_> = errors.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["min", "email", "contains", "never"]);
}

#[test]
fn test_first_error_per_field() {
    let validator = validator(ValidatorConfig {
        first_error_per_field: true,
        ..ValidatorConfig::default()
    });
    let errors = validator.validate_struct(&contact()).unwrap();

    let tags: Vec<_> = errors.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["min", "never"]);
}

#[test]
fn test_value_snapshots() {
    let deep = validator(ValidatorConfig::default());
    let errors = deep.validate_struct(&contact()).unwrap();
    let window = errors.get("window").unwrap();
    assert_eq!(window.value, json!({ "start": 3, "tags": [1, 2] }));

    let shallow = validator(ValidatorConfig {
        value_snapshot_depth: 1,
        ..ValidatorConfig::default()
    });
    let errors = shallow.validate_struct(&contact()).unwrap();
    let window = errors.get("window").unwrap();
    assert_eq!(window.value, json!({ "start": 3, "tags": null }));
}

#[test]
fn test_capture_values_off() {
    let validator = validator(ValidatorConfig {
        capture_values: false,
        ..ValidatorConfig::default()
    });
    let errors = validator.validate_struct(&contact()).unwrap();
    assert!(errors.iter().all(|e| e.value.is_null()));
}

#[test]
fn test_without_builtins() {
    let validator = validator(ValidatorConfig {
        include_builtins: false,
        ..ValidatorConfig::default()
    });

    let err = validator.validate_struct(&contact()).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ConfigError::UnknownDirective { name, .. } if name == "min"
    ));

    // Control directives do not depend on the built-in set.
    let errors = validator
        .validate_value(&Vec::<String>::new(), "required,dive,never")
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].tag, "required");
}

#[test]
fn test_config_from_json() {
    let config: ValidatorConfig =
        serde_json::from_str(r#"{ "max_depth": 1, "capture_values": false }"#).unwrap();
    let validator = Validator::with_config(config);
    assert_eq!(validator.config().max_depth, 1);

    let deep = Deep {
        name: String::new(),
        child: Some(Box::new(Deep {
            name: String::new(),
            child: None,
        })),
    };
    let errors = validator.validate_struct(&deep).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].namespace, "name");
}

#[test]
fn test_depth_warning_is_logged() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let validator = Validator::with_config(ValidatorConfig {
        max_depth: 0,
        ..ValidatorConfig::default()
    });
    let deep = Deep {
        name: String::new(),
        child: None,
    };
    assert!(validator.validate_struct(&deep).unwrap().is_empty());
}
