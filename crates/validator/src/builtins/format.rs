//! String content and format predicates.
//!
//! All of these fail for non-string values, except `numeric` and `number`
//! which also accept numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::level::FieldLevel;
use crate::value::Value;

const BYTE: &str = r"(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)";
const PERCENT: &str = r"(?:100|[1-9]?\d)%";
const HUE: &str = r"(?:360|3[0-5]\d|[12]\d\d|[1-9]?\d)";
const OPACITY: &str = r"(?:0|1|0?\.\d+|1\.0+)";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap()
});

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

static HEXADECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[xX])?[0-9a-fA-F]+$").unwrap());

static HEXCOLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static RGB_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgb\(\s*(?:{BYTE}\s*,\s*{BYTE}\s*,\s*{BYTE}|{PERCENT}\s*,\s*{PERCENT}\s*,\s*{PERCENT})\s*\)$"
    ))
    .unwrap()
});

static RGBA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^rgba\(\s*(?:{BYTE}\s*,\s*{BYTE}\s*,\s*{BYTE}|{PERCENT}\s*,\s*{PERCENT}\s*,\s*{PERCENT})\s*,\s*{OPACITY}\s*\)$"
    ))
    .unwrap()
});

static HSL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsl\(\s*{HUE}\s*,\s*{PERCENT}\s*,\s*{PERCENT}\s*\)$"
    ))
    .unwrap()
});

static HSLA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^hsla\(\s*{HUE}\s*,\s*{PERCENT}\s*,\s*{PERCENT}\s*,\s*{OPACITY}\s*\)$"
    ))
    .unwrap()
});

fn string_matches(fl: &FieldLevel<'_, '_>, regex: &Regex) -> bool {
    fl.value().as_str().is_some_and(|s| regex.is_match(s))
}

fn string_is(fl: &FieldLevel<'_, '_>, rule: impl Fn(&str) -> bool) -> bool {
    fl.value().as_str().is_some_and(rule)
}

// ============================================================================
// SUBSTRINGS
// ============================================================================

pub(super) fn contains(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| s.contains(fl.param()))
}

pub(super) fn excludes(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| !s.contains(fl.param()))
}

pub(super) fn starts_with(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| s.starts_with(fl.param()))
}

pub(super) fn ends_with(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| s.ends_with(fl.param()))
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

pub(super) fn alpha(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
}

pub(super) fn alphanumeric(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub(super) fn numeric(fl: &FieldLevel<'_, '_>) -> bool {
    match fl.value() {
        Value::Int(_) | Value::Uint(_) | Value::Float(_) => true,
        _ => string_matches(fl, &NUMERIC_REGEX),
    }
}

pub(super) fn number(fl: &FieldLevel<'_, '_>) -> bool {
    match fl.value() {
        Value::Uint(_) => true,
        Value::Int(value) => *value >= 0,
        _ => string_matches(fl, &NUMBER_REGEX),
    }
}

pub(super) fn hexadecimal(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &HEXADECIMAL_REGEX)
}

pub(super) fn lowercase(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| !s.is_empty() && s == s.to_lowercase())
}

pub(super) fn uppercase(fl: &FieldLevel<'_, '_>) -> bool {
    string_is(fl, |s| !s.is_empty() && s == s.to_uppercase())
}

// ============================================================================
// FORMATS
// ============================================================================

pub(super) fn email(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &EMAIL_REGEX)
}

pub(super) fn uuid(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &UUID_REGEX)
}

pub(super) fn hex_color(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &HEXCOLOR_REGEX)
}

pub(super) fn rgb(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &RGB_REGEX)
}

pub(super) fn rgba(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &RGBA_REGEX)
}

pub(super) fn hsl(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &HSL_REGEX)
}

pub(super) fn hsla(fl: &FieldLevel<'_, '_>) -> bool {
    string_matches(fl, &HSLA_REGEX)
}
