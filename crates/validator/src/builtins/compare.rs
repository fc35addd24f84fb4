//! Size, ordering, membership and cross-field predicates.
//!
//! Strings are measured in characters and collections by length. Numbers
//! compare numerically across signed, unsigned and float kinds. Values of
//! unrelated kinds never compare, so every ordering check on them fails.

use std::cmp::Ordering;

use chrono::Utc;

use crate::level::FieldLevel;
use crate::value::Value;

// ============================================================================
// PARAMETER COMPARISONS
// ============================================================================

/// Compares a value's size or magnitude with a numeric parameter.
fn measure(value: &Value<'_>, param: &str) -> Option<Ordering> {
    let param = param.trim();
    match value {
        Value::Str(_) | Value::Seq(_) | Value::Map(_) => {
            let limit: usize = param.parse().ok()?;
            Some(value.len()?.cmp(&limit))
        }
        Value::Int(n) => match param.parse::<i64>() {
            Ok(limit) => Some(n.cmp(&limit)),
            Err(_) => compare_float(value, param),
        },
        Value::Uint(n) => match param.parse::<u64>() {
            Ok(limit) => Some(n.cmp(&limit)),
            Err(_) => compare_float(value, param),
        },
        Value::Float(_) => compare_float(value, param),
        _ => None,
    }
}

fn compare_float(value: &Value<'_>, param: &str) -> Option<Ordering> {
    let limit: f64 = param.parse().ok()?;
    value.as_f64()?.partial_cmp(&limit)
}

/// Like [`measure`], but times without a parameter compare against now.
fn ordering(fl: &FieldLevel<'_, '_>) -> Option<Ordering> {
    match fl.value() {
        Value::Time(time) if fl.param().trim().is_empty() => Some(time.cmp(&Utc::now())),
        value => measure(value, fl.param()),
    }
}

pub(super) fn len(fl: &FieldLevel<'_, '_>) -> bool {
    measure(fl.value(), fl.param()) == Some(Ordering::Equal)
}

pub(super) fn min(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(
        measure(fl.value(), fl.param()),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

pub(super) fn max(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(
        measure(fl.value(), fl.param()),
        Some(Ordering::Less | Ordering::Equal)
    )
}

pub(super) fn eq(fl: &FieldLevel<'_, '_>) -> bool {
    match fl.value() {
        Value::Str(value) => value == fl.param(),
        Value::Bool(value) => fl.param().trim().parse::<bool>().is_ok_and(|p| p == *value),
        value => measure(value, fl.param()) == Some(Ordering::Equal),
    }
}

pub(super) fn ne(fl: &FieldLevel<'_, '_>) -> bool {
    !eq(fl)
}

pub(super) fn lt(fl: &FieldLevel<'_, '_>) -> bool {
    ordering(fl) == Some(Ordering::Less)
}

pub(super) fn lte(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(ordering(fl), Some(Ordering::Less | Ordering::Equal))
}

pub(super) fn gt(fl: &FieldLevel<'_, '_>) -> bool {
    ordering(fl) == Some(Ordering::Greater)
}

pub(super) fn gte(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(ordering(fl), Some(Ordering::Greater | Ordering::Equal))
}

pub(super) fn one_of(fl: &FieldLevel<'_, '_>) -> bool {
    let mut options = fl.param().split_whitespace();
    match fl.value() {
        Value::Str(value) => options.any(|option| option == &**value),
        Value::Int(value) => options.any(|option| option.parse::<i64>().is_ok_and(|o| o == *value)),
        Value::Uint(value) => options.any(|option| option.parse::<u64>().is_ok_and(|o| o == *value)),
        _ => false,
    }
}

// ============================================================================
// CROSS-FIELD
// ============================================================================

fn numeric(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Uint(x), Value::Uint(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Uint(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        (Value::Uint(x), Value::Int(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn equal(a: &Value<'_>, b: &Value<'_>) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Time(x), Value::Time(y)) => x == y,
        (Value::Seq(_), Value::Seq(_)) | (Value::Map(_), Value::Map(_)) => a.len() == b.len(),
        _ => numeric(a, b) == Some(Ordering::Equal),
    }
}

fn order(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::Time(x), Value::Time(y)) => Some(x.cmp(y)),
        (Value::Str(_), Value::Str(_))
        | (Value::Seq(_), Value::Seq(_))
        | (Value::Map(_), Value::Map(_)) => Some(a.len()?.cmp(&b.len()?)),
        _ => numeric(a, b),
    }
}

fn against_referenced(fl: &FieldLevel<'_, '_>) -> Option<Ordering> {
    let other = fl.referenced()?;
    order(fl.value(), &other)
}

pub(super) fn eq_field(fl: &FieldLevel<'_, '_>) -> bool {
    fl.referenced().is_some_and(|other| equal(fl.value(), &other))
}

/// Passes when the referenced value is missing or of another kind.
pub(super) fn ne_field(fl: &FieldLevel<'_, '_>) -> bool {
    fl.referenced().is_none_or(|other| !equal(fl.value(), &other))
}

pub(super) fn gt_field(fl: &FieldLevel<'_, '_>) -> bool {
    against_referenced(fl) == Some(Ordering::Greater)
}

pub(super) fn gte_field(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(
        against_referenced(fl),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

pub(super) fn lt_field(fl: &FieldLevel<'_, '_>) -> bool {
    against_referenced(fl) == Some(Ordering::Less)
}

pub(super) fn lte_field(fl: &FieldLevel<'_, '_>) -> bool {
    matches!(
        against_referenced(fl),
        Some(Ordering::Less | Ordering::Equal)
    )
}

// ============================================================================
// CONDITIONAL PRESENCE
// ============================================================================

/// Present whenever any referenced field is present.
pub(super) fn required_with(fl: &FieldLevel<'_, '_>) -> bool {
    let triggered = fl
        .references()
        .any(|other| other.is_some_and(|value| value.has_value()));
    !triggered || fl.value().has_value()
}

/// Present whenever any referenced field is absent.
pub(super) fn required_without(fl: &FieldLevel<'_, '_>) -> bool {
    let triggered = fl
        .references()
        .any(|other| !other.is_some_and(|value| value.has_value()));
    !triggered || fl.value().has_value()
}
