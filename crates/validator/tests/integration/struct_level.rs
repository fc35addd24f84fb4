use pretty_assertions::assert_eq;
use tagval::{StructLevel, Validate, ValidationErrors, Validator};

#[derive(Validate)]
struct Person {
    first_name: String,
    last_name: String,
    #[validate("gte=0,lte=130")]
    age: u8,
}

#[derive(Validate)]
struct Household {
    #[validate("required")]
    name: String,
    head: Person,
    #[validate("structonly")]
    guest: Person,
    #[validate("nostructlevel")]
    lodger: Option<Person>,
    #[validate("dive")]
    members: Vec<Person>,
}

fn person(first: &str, last: &str, age: u8) -> Person {
    Person {
        first_name: first.into(),
        last_name: last.into(),
        age,
    }
}

fn validator() -> Validator {
    let mut validator = Validator::new();
    validator.register_struct_validation::<Person, _>(|sl: &mut StructLevel<'_, '_>, person: &Person| {
        if person.first_name.is_empty() && person.last_name.is_empty() {
            sl.report_error(&person.first_name, "first_name", "first_name", "fnameorlname", "");
            sl.report_error(&person.last_name, "last_name", "last_name", "fnameorlname", "");
        }
    });
    validator
}

fn found(errors: &ValidationErrors) -> Vec<(&str, &str)> {
    errors
        .iter()
        .map(|e| (e.namespace.as_str(), e.tag.as_str()))
        .collect()
}

#[test]
fn test_hook_reports_errors() {
    let validator = validator();
    let errors = validator.validate_struct(&person("", "", 30)).unwrap();

    assert_eq!(
        found(&errors),
        vec![("first_name", "fnameorlname"), ("last_name", "fnameorlname")]
    );
    assert_eq!(errors.errors()[0].actual_tag, "fnameorlname");
    assert_eq!(errors.errors()[0].struct_field, "first_name");

    assert!(validator.validate_struct(&person("Ada", "", 30)).unwrap().is_empty());
}

#[test]
fn test_hook_errors_follow_field_errors() {
    let validator = validator();
    let errors = validator.validate_struct(&person("", "", 200)).unwrap();
    assert_eq!(
        found(&errors),
        vec![
            ("age", "lte"),
            ("first_name", "fnameorlname"),
            ("last_name", "fnameorlname"),
        ]
    );
}

#[test]
fn test_nested_hooks_and_suppression() {
    let validator = validator();
    let household = Household {
        name: String::new(),
        head: person("", "", 40),
        guest: person("", "", 250),
        lodger: Some(person("", "", 251)),
        members: vec![person("Ann", "", 9), person("", "", 7)],
    };

    let errors = validator.validate_struct(&household).unwrap();
    assert_eq!(
        found(&errors),
        vec![
            ("name", "required"),
            ("head.first_name", "fnameorlname"),
            ("head.last_name", "fnameorlname"),
            // structonly: fields skipped, hook still runs
            ("guest.first_name", "fnameorlname"),
            ("guest.last_name", "fnameorlname"),
            // nostructlevel: fields checked, hook skipped
            ("lodger.age", "lte"),
            ("members[1].first_name", "fnameorlname"),
            ("members[1].last_name", "fnameorlname"),
        ]
    );
    assert_eq!(errors.errors()[6].struct_namespace, "members[1].first_name");
}

#[test]
fn test_hook_sees_context() {
    let mut validator = Validator::new();
    validator.register_struct_validation::<Person, _>(|sl: &mut StructLevel<'_, '_>, person: &Person| {
        let top_is_household = sl.top().is_some_and(|top| top.type_name().ends_with("Household"));
        let schema_len = sl.current().schema().len();
        if top_is_household && schema_len == 3 && sl.namespace() == "head" {
            sl.report_error(&person.age, "age", "age", "seen", "head");
        }
    });

    let household = Household {
        name: "Smiths".into(),
        head: person("Jo", "Smith", 40),
        guest: person("Al", "", 30),
        lodger: None,
        members: Vec::new(),
    };
    let errors = validator.validate_struct(&household).unwrap();

    assert_eq!(found(&errors), vec![("head.age", "seen")]);
    assert_eq!(errors.errors()[0].param, "head");
    assert_eq!(errors.errors()[0].value, serde_json::json!(40));
}

#[test]
fn test_hook_replaced_on_registration() {
    let mut validator = validator();
    validator.register_struct_validation::<Person, _>(|_: &mut StructLevel<'_, '_>, _: &Person| {});
    assert!(validator.validate_struct(&person("", "", 30)).unwrap().is_empty());
}
