//! Rule expression grammar.
//!
//! ```text
//! expression := segment ("," segment)*
//! segment    := directive ("|" directive)*
//! directive  := name ("=" param)?
//! ```
//!
//! A segment with more than one directive is an *alternative group*: it
//! passes when any member passes. Inside parameters `0x2C` stands for a
//! literal `,` and `0x7C` for a literal `|`.
//!
//! Control directives steer the engine instead of checking values:
//! `-`, `required`, `omitempty`, `dive`, `keys`, `endkeys`, `structonly`
//! and `nostructlevel`.

use crate::error::ConfigError;

/// Skip the field entirely.
pub const SKIP: &str = "-";
/// The value must be present and non-zero.
pub const REQUIRED: &str = "required";
/// Skip the remaining checks when the value is zero.
pub const OMITEMPTY: &str = "omitempty";
/// Apply the following directives to every element.
pub const DIVE: &str = "dive";
/// Start of the map-key directives after `dive`.
pub const KEYS: &str = "keys";
/// End of the map-key directives.
pub const ENDKEYS: &str = "endkeys";
/// Validate a nested struct only through its struct-level hook.
pub const STRUCTONLY: &str = "structonly";
/// Do not run the nested struct's struct-level hook.
pub const NOSTRUCTLEVEL: &str = "nostructlevel";

const CONTROL: [&str; 8] = [
    SKIP,
    REQUIRED,
    OMITEMPTY,
    DIVE,
    KEYS,
    ENDKEYS,
    STRUCTONLY,
    NOSTRUCTLEVEL,
];

const ESCAPED_COMMA: &str = "0x2C";
const ESCAPED_PIPE: &str = "0x7C";

/// Returns `true` for names reserved by the engine.
#[must_use]
pub fn is_control(name: &str) -> bool {
    CONTROL.contains(&name)
}

/// One parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name as looked up in the registry.
    pub name: String,
    /// Unescaped parameter, empty when absent.
    pub param: String,
    /// Alternative group this directive belongs to, if any. Members of the
    /// same group share the index.
    pub or_group: Option<usize>,
    /// Alias the directive was expanded from.
    pub alias: Option<String>,
}

impl Directive {
    /// Name reported in errors: the alias if there is one.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn is_control(&self) -> bool {
        is_control(&self.name)
    }
}

/// Splits a rule expression into directives and checks its structure.
///
/// # Errors
///
/// Returns [`ConfigError::TagSyntax`] for empty directives, misplaced control
/// directives and unbalanced `keys`/`endkeys`.
pub fn parse(expression: &str) -> Result<Vec<Directive>, ConfigError> {
    let mut directives = Vec::new();
    if expression.is_empty() {
        return Ok(directives);
    }

    for (index, segment) in expression.split(',').enumerate() {
        if segment.trim().is_empty() {
            return Err(ConfigError::syntax(expression, segment, "empty directive"));
        }
        if !segment.contains('|') {
            directives.push(directive(expression, segment, None)?);
            continue;
        }
        for alternative in segment.split('|') {
            if alternative.trim().is_empty() {
                return Err(ConfigError::syntax(
                    expression,
                    segment,
                    "empty alternative in `|` group",
                ));
            }
            let parsed = directive(expression, alternative, Some(index))?;
            if parsed.is_control() {
                return Err(ConfigError::syntax(
                    expression,
                    alternative,
                    "control directive inside `|` group",
                ));
            }
            directives.push(parsed);
        }
    }

    check_structure(expression, &directives)?;
    Ok(directives)
}

fn directive(
    expression: &str,
    fragment: &str,
    or_group: Option<usize>,
) -> Result<Directive, ConfigError> {
    let (name, param) = match fragment.split_once('=') {
        Some((name, param)) => (name.trim(), Some(param)),
        None => (fragment.trim(), None),
    };
    if name.is_empty() {
        return Err(ConfigError::syntax(expression, fragment, "empty directive name"));
    }
    if param.is_some() && is_control(name) {
        return Err(ConfigError::syntax(
            expression,
            fragment,
            "control directive takes no parameter",
        ));
    }

    Ok(Directive {
        name: name.to_owned(),
        param: param.map(unescape).unwrap_or_default(),
        or_group,
        alias: None,
    })
}

fn unescape(param: &str) -> String {
    param
        .replace(ESCAPED_COMMA, ",")
        .replace(ESCAPED_PIPE, "|")
}

fn check_structure(expression: &str, directives: &[Directive]) -> Result<(), ConfigError> {
    let mut in_keys = false;

    for (index, directive) in directives.iter().enumerate() {
        match directive.name.as_str() {
            SKIP if directives.len() > 1 => {
                return Err(ConfigError::syntax(
                    expression,
                    SKIP,
                    "`-` cannot be combined with other directives",
                ));
            }
            KEYS => {
                let after_dive = index > 0 && directives[index - 1].name == DIVE;
                if in_keys || !after_dive {
                    return Err(ConfigError::syntax(
                        expression,
                        KEYS,
                        "`keys` must directly follow `dive`",
                    ));
                }
                in_keys = true;
            }
            ENDKEYS => {
                if !in_keys {
                    return Err(ConfigError::syntax(
                        expression,
                        ENDKEYS,
                        "`endkeys` without matching `keys`",
                    ));
                }
                in_keys = false;
            }
            _ => {}
        }
    }

    if in_keys {
        return Err(ConfigError::syntax(
            expression,
            KEYS,
            "`keys` without matching `endkeys`",
        ));
    }
    Ok(())
}
