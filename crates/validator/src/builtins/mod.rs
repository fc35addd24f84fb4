//! Built-in predicates and aliases.
//!
//! Installed into every validator unless
//! [`ValidatorConfig::include_builtins`](crate::ValidatorConfig::include_builtins)
//! is turned off. Each category registers itself, the same way user code
//! registers custom predicates.

mod compare;
mod format;

use std::sync::Arc;

use crate::level::FieldLevel;
use crate::registry::{PredicateOptions, RefScope, Registry};

type Builtin = fn(&FieldLevel<'_, '_>) -> bool;

/// Registers every built-in predicate and alias.
pub(crate) fn install(registry: &mut Registry) {
    register_size_functions(registry);
    register_set_functions(registry);
    register_format_functions(registry);
    register_cross_field_functions(registry);
    register_presence_functions(registry);

    registry.insert_alias("iscolor", "hexcolor|rgb|rgba|hsl|hsla");
}

fn register(registry: &mut Registry, name: &str, options: PredicateOptions, func: Builtin) {
    registry.insert_predicate(name, options, Arc::new(func));
}

fn register_size_functions(registry: &mut Registry) {
    let param = PredicateOptions::new().requires_param();
    register(registry, "len", param, compare::len);
    register(registry, "min", param, compare::min);
    register(registry, "max", param, compare::max);

    let plain = PredicateOptions::new();
    register(registry, "eq", plain, compare::eq);
    register(registry, "ne", plain, compare::ne);
    // Without a parameter these compare times against the current instant.
    register(registry, "lt", plain, compare::lt);
    register(registry, "lte", plain, compare::lte);
    register(registry, "gt", plain, compare::gt);
    register(registry, "gte", plain, compare::gte);
}

fn register_set_functions(registry: &mut Registry) {
    let param = PredicateOptions::new().requires_param();
    register(registry, "oneof", param, compare::one_of);
    register(registry, "contains", param, format::contains);
    register(registry, "excludes", param, format::excludes);
    register(registry, "startswith", param, format::starts_with);
    register(registry, "endswith", param, format::ends_with);
}

fn register_format_functions(registry: &mut Registry) {
    let plain = PredicateOptions::new();
    register(registry, "alpha", plain, format::alpha);
    register(registry, "alphanum", plain, format::alphanumeric);
    register(registry, "numeric", plain, format::numeric);
    register(registry, "number", plain, format::number);
    register(registry, "hexadecimal", plain, format::hexadecimal);
    register(registry, "lowercase", plain, format::lowercase);
    register(registry, "uppercase", plain, format::uppercase);
    register(registry, "email", plain, format::email);
    register(registry, "uuid", plain, format::uuid);
    register(registry, "hexcolor", plain, format::hex_color);
    register(registry, "rgb", plain, format::rgb);
    register(registry, "rgba", plain, format::rgba);
    register(registry, "hsl", plain, format::hsl);
    register(registry, "hsla", plain, format::hsla);
}

fn register_cross_field_functions(registry: &mut Registry) {
    let parent = PredicateOptions::new().field_refs(RefScope::Parent);
    register(registry, "eqfield", parent, compare::eq_field);
    register(registry, "nefield", parent, compare::ne_field);
    register(registry, "gtfield", parent, compare::gt_field);
    register(registry, "gtefield", parent, compare::gte_field);
    register(registry, "ltfield", parent, compare::lt_field);
    register(registry, "ltefield", parent, compare::lte_field);

    let root = PredicateOptions::new().field_refs(RefScope::Root);
    register(registry, "eqcsfield", root, compare::eq_field);
    register(registry, "necsfield", root, compare::ne_field);
    register(registry, "gtcsfield", root, compare::gt_field);
    register(registry, "gtecsfield", root, compare::gte_field);
    register(registry, "ltcsfield", root, compare::lt_field);
    register(registry, "ltecsfield", root, compare::lte_field);
}

fn register_presence_functions(registry: &mut Registry) {
    let options = PredicateOptions::new()
        .call_when_nil()
        .requires_param()
        .field_refs(RefScope::Parent);
    register(registry, "required_with", options, compare::required_with);
    register(registry, "required_without", options, compare::required_without);
}
