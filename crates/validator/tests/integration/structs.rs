use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tagval::{ConfigError, Error, Kind, Validate, ValidationErrors, Validator};

#[derive(Validate)]
struct Foo {
    #[validate("min=5,max=10")]
    string_value: String,
    #[validate("min=5,max=10")]
    int_value: i32,
}

#[derive(Validate)]
struct Plain {
    name: String,
    count: u32,
    tags: Vec<String>,
}

#[derive(Validate)]
struct Profile {
    #[validate("required,min=3")]
    name: String,
    #[validate("omitempty,min=3")]
    nick_name: String,
    #[validate("required")]
    email: Option<String>,
    #[validate("omitempty,email")]
    backup_email: Option<String>,
    #[validate("min=3")]
    bio: Option<String>,
}

#[derive(Validate)]
struct Palette {
    #[validate("rgb|rgba")]
    color: String,
    #[validate("min=5,email")]
    contact: String,
}

#[derive(Validate)]
struct Outer {
    #[validate(rules = "required", rename = "Title")]
    title: String,
    inner: Inner,
    #[validate(rename = "Extra")]
    extra: Option<Box<Inner>>,
}

#[derive(Validate)]
struct Inner {
    #[validate(rules = "gte=1", rename = "Start")]
    start: u32,
}

#[derive(Validate)]
struct Claim {
    #[validate("required,omitempty,min=3")]
    absent: Option<String>,
    #[validate("required,omitempty,min=3")]
    empty: String,
}

#[derive(Validate)]
struct Broken {
    #[validate("required,bogus")]
    value: String,
}

fn profile() -> Profile {
    Profile {
        name: "alice".into(),
        nick_name: String::new(),
        email: Some("alice@example.com".into()),
        backup_email: None,
        bio: Some("hello".into()),
    }
}

#[rstest]
#[case("Foobar", 7, &[])]
#[case("Fo", 3, &["string_value", "int_value"])]
#[case("Foobarbazqux", 11, &["string_value", "int_value"])]
#[case("Fooba", 10, &[])]
fn test_min_max(#[case] string_value: &str, #[case] int_value: i32, #[case] failed: &[&str]) {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Foo {
            string_value: string_value.into(),
            int_value,
        })
        .unwrap();

    let namespaces: Vec<_> = errors.iter().map(|e| e.namespace.as_str()).collect();
    assert_eq!(namespaces, failed);
}

#[test]
fn test_failure_details() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Foo {
            string_value: "Fo".into(),
            int_value: 3,
        })
        .unwrap();

    assert_eq!(errors.len(), 2);
    let first = &errors.errors()[0];
    assert_eq!(first.tag, "min");
    assert_eq!(first.actual_tag, "min");
    assert_eq!(first.param, "5");
    assert_eq!(first.kind, Kind::String);
    assert_eq!(first.value, json!("Fo"));
    assert_eq!(first.type_name, std::any::type_name::<String>());

    let second = &errors.errors()[1];
    assert_eq!(second.tag, "min");
    assert_eq!(second.kind, Kind::Int);
    assert_eq!(second.value, json!(3));
    assert_eq!(
        errors.to_string(),
        "Key: 'string_value' Error: field validation for 'string_value' failed on the 'min' tag\n\
         Key: 'int_value' Error: field validation for 'int_value' failed on the 'min' tag"
    );
}

#[test]
fn test_no_rules_no_errors() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Plain {
            name: String::new(),
            count: 0,
            tags: Vec::new(),
        })
        .unwrap();
    assert!(errors.is_empty());
}

#[test]
fn test_valid_profile() {
    let validator = Validator::new();
    assert!(validator.validate_struct(&profile()).unwrap().is_empty());
}

#[test]
fn test_required_short_circuits_field() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Profile {
            name: String::new(),
            ..profile()
        })
        .unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].namespace, "name");
    assert_eq!(errors.errors()[0].tag, "required");
}

#[test]
fn test_omitempty_only_checks_present_values() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Profile {
            nick_name: "ab".into(),
            backup_email: Some("not-an-email".into()),
            ..profile()
        })
        .unwrap();

    let tags: Vec<_> = errors.iter().map(|e| (e.namespace.as_str(), e.tag.as_str())).collect();
    assert_eq!(tags, vec![("nick_name", "min"), ("backup_email", "email")]);
}

#[test]
fn test_absent_values() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Profile {
            email: None,
            bio: None,
            ..profile()
        })
        .unwrap();

    assert_eq!(errors.len(), 2);
    let email = errors.get("email").unwrap();
    assert_eq!(email.tag, "required");
    assert_eq!(email.kind, Kind::Invalid);
    assert_eq!(email.value, serde_json::Value::Null);

    let bio = errors.get("bio").unwrap();
    assert_eq!(bio.tag, "min");
    assert_eq!(bio.param, "3");
}

#[test]
fn test_required_wins_over_omitempty() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Claim {
            absent: None,
            empty: String::new(),
        })
        .unwrap();

    let tags: Vec<_> = errors.iter().map(|e| (e.namespace.as_str(), e.tag.as_str())).collect();
    assert_eq!(tags, vec![("absent", "required"), ("empty", "required")]);
}

#[test]
fn test_alternatives_report_one_error() {
    let validator = Validator::new();

    let ok = validator
        .validate_struct(&Palette {
            color: "rgba(0,0,0,0.5)".into(),
            contact: "someone@example.com".into(),
        })
        .unwrap();
    assert!(ok.is_empty());

    let errors = validator
        .validate_struct(&Palette {
            color: "blue".into(),
            contact: "someone@example.com".into(),
        })
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].tag, "rgb|rgba");
    assert_eq!(errors.errors()[0].param, "");
}

#[test]
fn test_every_failing_directive_reported() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Palette {
            color: "rgb(1,2,3)".into(),
            contact: "ab".into(),
        })
        .unwrap();

    let tags: Vec<_> = errors.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["min", "email"]);
}

#[test]
fn test_nested_namespaces() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Outer {
            title: String::new(),
            inner: Inner { start: 0 },
            extra: Some(Box::new(Inner { start: 0 })),
        })
        .unwrap();

    assert_eq!(errors.len(), 3);

    let title = &errors.errors()[0];
    assert_eq!(title.namespace, "Title");
    assert_eq!(title.struct_namespace, "title");
    assert_eq!(title.field, "Title");
    assert_eq!(title.struct_field, "title");

    let start = &errors.errors()[1];
    assert_eq!(start.namespace, "inner.Start");
    assert_eq!(start.struct_namespace, "inner.start");

    let extra = &errors.errors()[2];
    assert_eq!(extra.namespace, "Extra.Start");
    assert_eq!(extra.struct_namespace, "extra.start");
}

#[test]
fn test_absent_nested_struct_is_not_visited() {
    let validator = Validator::new();
    let errors = validator
        .validate_struct(&Outer {
            title: "t".into(),
            inner: Inner { start: 1 },
            extra: None,
        })
        .unwrap();
    assert!(errors.is_empty());
}

#[test]
fn test_unknown_directive_is_config_error() {
    let validator = Validator::new();
    let err = validator
        .validate_struct(&Broken {
            value: String::new(),
        })
        .unwrap_err();

    assert!(matches!(err, ConfigError::Field { field: "value", .. }));
    assert!(matches!(
        err.root_cause(),
        ConfigError::UnknownDirective { name, .. } if name == "bogus"
    ));
}

#[rstest]
#[case("x", "required,email", &["email"])]
#[case("", "required,email", &["required"])]
#[case("", "omitempty,email", &[])]
#[case("abc", "len=3", &[])]
#[case("abcd", "len=3,alpha", &["len"])]
fn test_validate_value(#[case] value: &str, #[case] rules: &str, #[case] tags: &[&str]) {
    let validator = Validator::new();
    let errors = validator.validate_value(&value.to_owned(), rules).unwrap();

    let found: Vec<_> = errors.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(found, tags);
    assert!(errors.iter().all(|e| e.namespace.is_empty() && e.field.is_empty()));
}

#[test]
fn test_validate_value_rejects_bad_rules() {
    let validator = Validator::new();
    assert!(matches!(
        validator.validate_value(&1_u8, "min=1,,max=3"),
        Err(ConfigError::TagSyntax { .. })
    ));
    assert!(matches!(
        validator.validate_value(&1_u8, "max"),
        Err(ConfigError::MissingParam { .. })
    ));
}

fn register(validator: &Validator, foo: &Foo) -> Result<(), Error> {
    validator.validate_struct(foo)?.into_result(())?;
    Ok(())
}

#[test]
fn test_single_error_type() {
    let validator = Validator::new();
    let bad = Foo {
        string_value: "Fo".into(),
        int_value: 7,
    };

    match register(&validator, &bad) {
        Err(Error::Invalid(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation failure, got {other:?}"),
    }

    let good = Foo {
        string_value: "Foobar".into(),
        int_value: 7,
    };
    assert!(register(&validator, &good).is_ok());
}

#[test]
fn test_errors_serialize() {
    let validator = Validator::new();
    let errors: ValidationErrors = validator
        .validate_struct(&Foo {
            string_value: "Fo".into(),
            int_value: 7,
        })
        .unwrap();

    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json[0]["namespace"], "string_value");
    assert_eq!(json[0]["tag"], "min");
    assert_eq!(json[0]["kind"], "string");
    assert_eq!(json[0]["value"], "Fo");
}
