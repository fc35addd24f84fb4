//! Compiled rule chains.
//!
//! A [`Chain`] is a rule expression after parsing, alias expansion and
//! predicate lookup. Control directives become flags, `dive` becomes a nested
//! chain, and everything else becomes a [`Step`] that the walker runs in
//! order.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::path::FieldPath;
use crate::registry::{Predicate, Registry};
use crate::tag::{self, Directive};

/// Directives compiled for one value.
#[derive(Debug, Default)]
pub(crate) struct Chain {
    pub(crate) required: bool,
    pub(crate) omit_empty: bool,
    pub(crate) struct_only: bool,
    pub(crate) no_struct_level: bool,
    pub(crate) steps: Vec<Step>,
    pub(crate) dive: Option<Box<Dive>>,
}

impl Chain {
    /// `true` when any step runs for nil values.
    pub(crate) fn has_nil_aware_step(&self) -> bool {
        self.steps.iter().any(Step::is_nil_aware)
    }
}

/// Rules applied to collection elements.
#[derive(Debug)]
pub(crate) struct Dive {
    pub(crate) keys: Option<Chain>,
    pub(crate) elements: Chain,
}

#[derive(Debug)]
pub(crate) enum Step {
    Check(Check),
    /// Alternative group: passes when any member passes.
    Any { label: Arc<str>, checks: Vec<Check> },
}

impl Step {
    pub(crate) fn is_nil_aware(&self) -> bool {
        match self {
            Self::Check(check) => check.is_nil_aware(),
            Self::Any { checks, .. } => checks.iter().any(Check::is_nil_aware),
        }
    }

    /// Name reported as `tag`.
    pub(crate) fn tag(&self) -> &str {
        match self {
            Self::Check(check) => &check.tag,
            Self::Any { label, .. } => label,
        }
    }

    /// Name reported as `actual_tag`.
    pub(crate) fn actual_tag(&self) -> &str {
        match self {
            Self::Check(check) => &check.predicate.name,
            Self::Any { label, .. } => label,
        }
    }

    pub(crate) fn param(&self) -> &str {
        match self {
            Self::Check(check) => &check.param,
            Self::Any { .. } => "",
        }
    }
}

#[derive(Debug)]
pub(crate) struct Check {
    pub(crate) tag: Arc<str>,
    pub(crate) param: Arc<str>,
    pub(crate) predicate: Arc<Predicate>,
    pub(crate) refs: Vec<FieldPath>,
}

impl Check {
    fn is_nil_aware(&self) -> bool {
        self.predicate.options.call_when_nil
    }
}

/// Compiles a rule expression. `None` means the value is skipped (`-`).
pub(crate) fn compile(expression: &str, registry: &Registry) -> Result<Option<Chain>, ConfigError> {
    let directives = tag::parse(expression)?;
    if directives.first().is_some_and(|d| d.name == tag::SKIP) {
        return Ok(None);
    }
    let directives = expand_aliases(expression, directives, registry)?;
    build(expression, &directives, registry).map(Some)
}

fn expand_aliases(
    expression: &str,
    directives: Vec<Directive>,
    registry: &Registry,
) -> Result<Vec<Directive>, ConfigError> {
    let mut next_group = directives
        .iter()
        .filter_map(|d| d.or_group)
        .max()
        .map_or(0, |group| group + 1);
    let mut expanded = Vec::with_capacity(directives.len());

    for directive in directives {
        let Some(body) = registry.alias(&directive.name) else {
            expanded.push(directive);
            continue;
        };
        if !directive.param.is_empty() {
            return Err(ConfigError::syntax(
                expression,
                &directive.name,
                "alias takes no parameter",
            ));
        }

        let members = tag::parse(body)?;
        let segments = members.iter().filter_map(|m| m.or_group).max().map_or(0, |g| g + 1);

        match directive.or_group {
            Some(group) => {
                let single = members.len() == 1
                    || members.iter().all(|m| m.or_group.is_some() && m.or_group == members[0].or_group);
                if !single || members.iter().any(|m| tag::is_control(&m.name)) {
                    return Err(ConfigError::syntax(
                        expression,
                        &directive.name,
                        "alias inside `|` group must expand to alternatives only",
                    ));
                }
                expanded.extend(members.into_iter().map(|member| Directive {
                    or_group: Some(group),
                    alias: Some(directive.name.clone()),
                    ..member
                }));
            }
            None => {
                expanded.extend(members.into_iter().map(|member| Directive {
                    or_group: member.or_group.map(|g| g + next_group),
                    alias: Some(directive.name.clone()),
                    ..member
                }));
                next_group += segments;
            }
        }
    }

    Ok(expanded)
}

fn build(expression: &str, directives: &[Directive], registry: &Registry) -> Result<Chain, ConfigError> {
    let mut chain = Chain::default();
    let mut index = 0;

    while index < directives.len() {
        let directive = &directives[index];

        if let Some(group) = directive.or_group {
            let end = index
                + directives[index..]
                    .iter()
                    .take_while(|d| d.or_group == Some(group))
                    .count();
            let members = &directives[index..end];
            let checks = members
                .iter()
                .map(|member| check(expression, member, registry))
                .collect::<Result<Vec<_>, _>>()?;
            chain.steps.push(Step::Any {
                label: group_label(members).into(),
                checks,
            });
            index = end;
            continue;
        }

        match directive.name.as_str() {
            tag::REQUIRED => chain.required = true,
            tag::OMITEMPTY => chain.omit_empty = true,
            tag::STRUCTONLY => chain.struct_only = true,
            tag::NOSTRUCTLEVEL => chain.no_struct_level = true,
            tag::DIVE => {
                let rest = &directives[index + 1..];
                let (keys, rest) = if rest.first().is_some_and(|d| d.name == tag::KEYS) {
                    let end = rest
                        .iter()
                        .position(|d| d.name == tag::ENDKEYS)
                        .ok_or_else(|| {
                            ConfigError::syntax(expression, tag::KEYS, "`keys` without matching `endkeys`")
                        })?;
                    (Some(build(expression, &rest[1..end], registry)?), &rest[end + 1..])
                } else {
                    (None, rest)
                };
                let elements = build(expression, rest, registry)?;
                chain.dive = Some(Box::new(Dive { keys, elements }));
                return Ok(chain);
            }
            tag::SKIP | tag::KEYS | tag::ENDKEYS => {
                return Err(ConfigError::syntax(
                    expression,
                    &directive.name,
                    "misplaced control directive",
                ));
            }
            _ => chain.steps.push(Step::Check(check(expression, directive, registry)?)),
        }
        index += 1;
    }

    Ok(chain)
}

fn check(expression: &str, directive: &Directive, registry: &Registry) -> Result<Check, ConfigError> {
    let predicate = registry
        .predicate(&directive.name)
        .ok_or_else(|| ConfigError::UnknownDirective {
            name: directive.name.clone(),
            expression: expression.to_owned(),
        })?;
    let options = predicate.options;

    if options.requires_param && directive.param.is_empty() {
        return Err(ConfigError::MissingParam {
            name: directive.tag().to_owned(),
            expression: expression.to_owned(),
        });
    }

    let refs = if options.field_refs.is_some() {
        if directive.param.trim().is_empty() {
            vec![FieldPath::default()]
        } else {
            directive
                .param
                .split_whitespace()
                .map(FieldPath::parse)
                .collect::<Result<_, _>>()?
        }
    } else {
        Vec::new()
    };

    Ok(Check {
        tag: directive.tag().into(),
        param: directive.param.as_str().into(),
        predicate: Arc::clone(predicate),
        refs,
    })
}

/// `a|b|c`, with consecutive members from the same alias collapsed.
fn group_label(members: &[Directive]) -> String {
    let mut label = String::new();
    let mut previous: Option<&str> = None;

    for member in members {
        let tag = member.tag();
        if member.alias.is_some() && previous == Some(tag) {
            continue;
        }
        if !label.is_empty() {
            label.push('|');
        }
        label.push_str(tag);
        previous = Some(tag);
    }
    label
}
