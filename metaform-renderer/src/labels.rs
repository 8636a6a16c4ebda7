//! Typed, total accessors over orchestration labels.
//!
//! Labels are loosely-typed `string → string` metadata. Every accessor
//! degrades to the caller's default instead of failing. Accessors never log:
//! conditions worth surfacing come back as a [`LabelDiagnostic`] next to the
//! value, and the caller decides what to do with it.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Label mapping as supplied by the metadata service.
pub type Labels = HashMap<String, String>;

/// Something noteworthy that happened while reading a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelDiagnostic {
    /// An integer label did not parse; the default was used instead.
    InvalidInteger {
        label: String,
        raw: String,
        fallback: String,
        reason: String,
    },
    /// A list label was present but yielded no non-empty item.
    EmptyList { label: String },
}

impl fmt::Display for LabelDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelDiagnostic::InvalidInteger {
                label,
                raw,
                fallback,
                reason,
            } => write!(
                f,
                "unable to parse {label:?}: {raw:?}, falling back to {fallback}: {reason}"
            ),
            LabelDiagnostic::EmptyList { label } => write!(f, "could not load {label:?}"),
        }
    }
}

/// A value plus the diagnostic produced while computing it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub value: T,
    pub diagnostic: Option<LabelDiagnostic>,
}

impl<T> Lookup<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }
}

/// Value of `name` if present and non-empty, else `default`.
pub fn get_string(labels: &Labels, name: &str, default: &str) -> String {
    match labels.get(name) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// Boolean value of `name`; unparsable or absent values silently yield `default`.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn get_bool(labels: &Labels, name: &str, default: bool) -> bool {
    labels
        .get(name)
        .and_then(|raw| parse_bool(raw))
        .unwrap_or(default)
}

/// Base-10 `i32` value of `name`. A present but unparsable value yields
/// `default` with an [`LabelDiagnostic::InvalidInteger`].
pub fn get_int(labels: &Labels, name: &str, default: i32) -> Lookup<i32> {
    parse_int(labels, name, default)
}

/// Same contract as [`get_int`] at 64-bit width.
pub fn get_int64(labels: &Labels, name: &str, default: i64) -> Lookup<i64> {
    parse_int(labels, name, default)
}

/// Comma-separated list under `name`, trimmed, empty items dropped.
///
/// A present label that yields no item produces [`LabelDiagnostic::EmptyList`].
pub fn get_string_list(labels: &Labels, name: &str) -> Lookup<Vec<String>> {
    let Some(raw) = labels.get(name) else {
        return Lookup::clean(Vec::new());
    };
    let items = split_and_trim(raw, ",");
    if items.is_empty() {
        return Lookup {
            value: items,
            diagnostic: Some(LabelDiagnostic::EmptyList {
                label: name.to_string(),
            }),
        };
    }
    Lookup::clean(items)
}

/// True iff `name` is present with a non-empty value.
pub fn has(labels: &Labels, name: &str) -> bool {
    labels.get(name).is_some_and(|v| !v.is_empty())
}

/// True iff at least one key starting with `prefix` has a non-empty value.
pub fn has_prefix(labels: &Labels, prefix: &str) -> bool {
    labels
        .iter()
        .any(|(name, value)| name.starts_with(prefix) && !value.is_empty())
}

/// Split `base` on `sep`, trim each piece, drop empty pieces.
pub fn split_and_trim(base: &str, sep: &str) -> Vec<String> {
    base.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_int<T>(labels: &Labels, name: &str, default: T) -> Lookup<T>
where
    T: std::str::FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    let Some(raw) = labels.get(name) else {
        return Lookup::clean(default);
    };
    match raw.parse::<T>() {
        Ok(value) => Lookup::clean(value),
        Err(err) => Lookup {
            diagnostic: Some(LabelDiagnostic::InvalidInteger {
                label: name.to_string(),
                raw: raw.clone(),
                fallback: default.to_string(),
                reason: err.to_string(),
            }),
            value: default,
        },
    }
}
