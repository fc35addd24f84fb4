use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tagval::{
    ConfigError, FieldLevel, Kind, PredicateOptions, RefScope, Validate, Validator, Value,
};

/// A database-style nullable string.
struct NullString {
    value: String,
    valid: bool,
}

tagval::reflect_opaque!(NullString);

impl NullString {
    fn some(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            valid: true,
        }
    }

    fn null() -> Self {
        Self {
            value: String::new(),
            valid: false,
        }
    }
}

struct Celsius(f64);

tagval::reflect_opaque!(Celsius);

#[derive(Validate)]
struct Customer {
    #[validate("required,min=3")]
    name: NullString,
    #[validate("omitempty,email")]
    email: NullString,
    #[validate("required")]
    nickname: Option<NullString>,
}

#[derive(Validate)]
struct Reading {
    #[validate("gte=-50,lte=60")]
    temperature: Celsius,
    #[validate("even")]
    count: i64,
    #[validate("even")]
    missing: Option<i64>,
}

fn customer_validator() -> Validator {
    let mut validator = Validator::new();
    validator.register_custom_type_func::<NullString, _>(|value| {
        if value.valid {
            Value::str(&value.value)
        } else {
            Value::Nil
        }
    });
    validator
}

fn is_even(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(fl.value(), Value::Int(n) if n % 2 == 0)
}

#[test]
fn test_custom_type_values_are_extracted() {
    let validator = customer_validator();

    let ok = Customer {
        name: NullString::some("Joey"),
        email: NullString::null(),
        nickname: Some(NullString::some("jo")),
    };
    assert!(validator.validate_struct(&ok).unwrap().is_empty());

    let bad = Customer {
        name: NullString::some("Jo"),
        email: NullString::some("nope"),
        nickname: Some(NullString::null()),
    };
    let errors = validator.validate_struct(&bad).unwrap();
    let found: Vec<_> = errors
        .iter()
        .map(|e| (e.namespace.as_str(), e.tag.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![("name", "min"), ("email", "email"), ("nickname", "required")]
    );

    let name = &errors.errors()[0];
    assert_eq!(name.kind, Kind::String);
    assert_eq!(name.value, serde_json::json!("Jo"));
    assert!(name.type_name.ends_with("NullString"));
}

#[test]
fn test_null_custom_value_is_absent() {
    let validator = customer_validator();
    let errors = validator
        .validate_struct(&Customer {
            name: NullString::null(),
            email: NullString::null(),
            nickname: None,
        })
        .unwrap();

    let found: Vec<_> = errors
        .iter()
        .map(|e| (e.namespace.as_str(), e.kind))
        .collect();
    assert_eq!(found, vec![("name", Kind::Invalid), ("nickname", Kind::Invalid)]);
}

#[test]
fn test_unregistered_opaque_values() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Customer {
            name: NullString::some("Joey"),
            email: NullString::null(),
            nickname: None,
        })
        .unwrap();

    // Opaque values are present but cannot be measured or formatted.
    let found: Vec<_> = errors
        .iter()
        .map(|e| (e.namespace.as_str(), e.tag.as_str(), e.kind))
        .collect();
    assert_eq!(
        found,
        vec![
            ("name", "min", Kind::Opaque),
            ("email", "email", Kind::Opaque),
            ("nickname", "required", Kind::Invalid),
        ]
    );
}

#[test]
fn test_extract_matches_engine_view() {
    let validator = customer_validator();
    let wrapped = Some(Box::new(NullString::some("x")));
    assert_eq!(validator.extract(&wrapped).as_str(), Some("x"));
    assert!(validator.extract(&NullString::null()).is_nil());
}

#[test]
fn test_custom_predicate() {
    let mut validator = Validator::new();
    validator.register_custom_type_func::<Celsius, _>(|c| Value::Float(c.0));
    validator.register_validation("even", is_even).unwrap();

    let ok = Reading {
        temperature: Celsius(21.5),
        count: 4,
        missing: Some(2),
    };
    assert!(validator.validate_struct(&ok).unwrap().is_empty());

    let bad = Reading {
        temperature: Celsius(-70.0),
        count: 3,
        missing: Some(5),
    };
    let errors = validator.validate_struct(&bad).unwrap();
    let found: Vec<_> = errors
        .iter()
        .map(|e| (e.namespace.as_str(), e.tag.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![("temperature", "gte"), ("count", "even"), ("missing", "even")]
    );
}

#[test]
fn test_absent_value_fails_plain_predicate() {
    let mut validator = Validator::new();
    validator.register_validation("even", is_even).unwrap();

    let errors = validator.validate_value(&None::<i64>, "even").unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].tag, "even");
    assert_eq!(errors.errors()[0].kind, Kind::Invalid);
}

#[test]
fn test_nil_aware_predicate_sees_absent_values() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut validator = Validator::new();
    validator
        .register_validation_with(
            "absent_ok",
            move |fl: &FieldLevel<'_, '_>| {
                seen.fetch_add(1, Ordering::SeqCst);
                fl.value().is_nil() || fl.value().has_value()
            },
            PredicateOptions::new().call_when_nil(),
        )
        .unwrap();

    assert!(validator.validate_value(&None::<String>, "absent_ok").unwrap().is_empty());
    assert!(validator.validate_value(&String::new(), "absent_ok").unwrap().has_errors());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_predicate_with_field_refs() {
    #[derive(Validate)]
    struct Range {
        low: u32,
        #[validate("double=low")]
        high: u32,
    }

    let mut validator = Validator::new();
    validator
        .register_validation_with(
            "double",
            |fl: &FieldLevel<'_, '_>| match (fl.value(), fl.referenced()) {
                (Value::Uint(high), Some(Value::Uint(low))) => *high == low * 2,
                _ => false,
            },
            PredicateOptions::new().requires_param().field_refs(RefScope::Parent),
        )
        .unwrap();

    assert!(validator.validate_struct(&Range { low: 2, high: 4 }).unwrap().is_empty());
    assert!(validator.validate_struct(&Range { low: 2, high: 5 }).unwrap().has_errors());
}

#[test]
fn test_predicate_replaced_on_collision() {
    let mut validator = Validator::new();
    assert!(validator.validate_value(&"x".to_owned(), "email").unwrap().has_errors());

    validator.register_validation("email", |_: &FieldLevel<'_, '_>| true).unwrap();
    assert!(validator.validate_value(&"x".to_owned(), "email").unwrap().is_empty());
}

#[test]
fn test_missing_param_for_custom_predicate() {
    let mut validator = Validator::new();
    validator
        .register_validation_with(
            "divisible_by",
            |fl: &FieldLevel<'_, '_>| {
                let Ok(divisor) = fl.param().parse::<i64>() else {
                    return false;
                };
                matches!(fl.value(), Value::Int(n) if divisor != 0 && n % divisor == 0)
            },
            PredicateOptions::new().requires_param(),
        )
        .unwrap();

    assert!(validator.validate_value(&9_i64, "divisible_by=3").unwrap().is_empty());
    assert!(matches!(
        validator.validate_value(&9_i64, "divisible_by"),
        Err(ConfigError::MissingParam { .. })
    ));
}
