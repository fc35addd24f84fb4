//! Tests for the Validate derive macro - generic structs.

use tagval::{Struct, Validate, Validator};

#[derive(Validate)]
pub struct Page<T> {
    #[validate("required,max=2,dive")]
    items: Vec<T>,

    #[validate("gte=1")]
    number: u32,
}

#[derive(Validate)]
pub struct Item {
    #[validate("required")]
    id: String,
}

fn main() {
    let page = Page {
        items: vec![Item { id: "a".into() }, Item { id: String::new() }],
        number: 1,
    };
    assert_eq!(page.schema().len(), 2);

    let errors = Validator::new().validate_struct(&page).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].namespace, "items[1].id");
}
