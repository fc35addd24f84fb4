//! Basic usage example for tagval
//!
//! Run with `cargo run --example basic_usage`; compile and registration
//! events are printed at debug level.

use tagval::{FieldLevel, StructLevel, Validate, Validator};

#[derive(Validate)]
struct Address {
    #[validate("required")]
    street: String,
    #[validate("required,len=5,numeric")]
    zip: String,
}

#[derive(Validate)]
struct User {
    #[validate(rules = "required", rename = "FirstName")]
    first_name: String,
    #[validate(rules = "required", rename = "LastName")]
    last_name: String,
    #[validate("gte=0,lte=130")]
    age: u8,
    #[validate("required,email")]
    email: String,
    #[validate("iscolor")]
    favourite_color: String,
    #[validate("required,dive,required")]
    addresses: Vec<Address>,
    #[validate("omitempty,even")]
    lucky_number: Option<i64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut validator = Validator::new();
    validator
        .register_validation("even", |fl: &FieldLevel<'_, '_>| {
            matches!(fl.value(), tagval::Value::Int(n) if n % 2 == 0)
        })
        .expect("valid predicate name");
    validator.register_struct_validation::<User, _>(|sl: &mut StructLevel<'_, '_>, user: &User| {
        if user.first_name == user.last_name && !user.first_name.is_empty() {
            sl.report_error(&user.last_name, "LastName", "last_name", "distinctnames", "");
        }
    });

    let user = User {
        first_name: "Badger".into(),
        last_name: "Smith".into(),
        age: 135,
        email: "Badger.Smith@gmail".into(),
        favourite_color: "#000-".into(),
        addresses: vec![Address {
            street: "Eavesdown Docks".into(),
            zip: String::new(),
        }],
        lucky_number: Some(7),
    };

    match validator.validate_struct(&user) {
        Ok(errors) if errors.is_empty() => println!("✓ user is valid"),
        Ok(errors) => {
            for error in &errors {
                println!(
                    "✗ {:<22} tag={:<10} actual={:<10} param={:<4} value={}",
                    error.namespace, error.tag, error.actual_tag, error.param, error.value
                );
            }
            println!("\n{errors}");
        }
        Err(config) => eprintln!("rules are broken: {config}"),
    }

    let email = "joeybloggs.gmail.com".to_owned();
    match validator.validate_value(&email, "required,email") {
        Ok(errors) => println!("\n'{email}': {} error(s)", errors.len()),
        Err(config) => eprintln!("rules are broken: {config}"),
    }

    println!("\n{:?}", validator.cache_stats());
}
