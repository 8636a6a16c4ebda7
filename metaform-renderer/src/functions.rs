//! Template function table.
//!
//! [`FunctionTable`] is a plain value mapping template-visible names to
//! function pointers. It can be enumerated and called directly, and is
//! installed into a [`Tera`] instance for each render.
//!
//! Every function takes Tera keyword arguments, e.g.
//! `{{ get_int_value(labels=service.labels, name="port", default=80) }}`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tera::Tera;

use crate::error::RenderError;
use crate::labels::{self, LabelDiagnostic, Labels, Lookup};

/// Keyword arguments as passed by Tera.
pub type Args = HashMap<String, Value>;

/// Signature shared by every table entry. Diagnostics are pushed onto the
/// second argument instead of being logged.
pub type TemplateFn = fn(&Args, &mut Vec<LabelDiagnostic>) -> tera::Result<Value>;

/// Collects diagnostics raised by functions during one render.
pub(crate) type DiagnosticSink = Arc<Mutex<Vec<LabelDiagnostic>>>;

/// Name → function mapping exposed to templates.
#[derive(Clone)]
pub struct FunctionTable {
    functions: BTreeMap<&'static str, TemplateFn>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}

impl FunctionTable {
    /// Empty table.
    pub fn empty() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// Label accessors plus the string helpers and status predicates.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table
            .insert("get_string_value", get_string_value)
            .insert("get_bool_value", get_bool_value)
            .insert("get_int_value", get_int_value)
            .insert("get_int64_value", get_int64_value)
            .insert("get_string_list", get_string_list)
            .insert("has_label", has_label)
            .insert("has_label_prefix", has_label_prefix)
            .insert("split", split)
            .insert("replace", replace)
            .insert("tolower", tolower)
            .insert("contains", contains)
            .insert("ishealthy", ishealthy)
            .insert("isrunning", isrunning);
        table
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: &'static str, function: TemplateFn) -> &mut Self {
        self.functions.insert(name, function);
        self
    }

    /// Function names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn get(&self, name: &str) -> Option<TemplateFn> {
        self.functions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call `name` outside of Tera. Returns the result and any diagnostics.
    pub fn call(
        &self,
        name: &str,
        args: &Args,
    ) -> Result<(Value, Vec<LabelDiagnostic>), RenderError> {
        let function = self
            .get(name)
            .ok_or_else(|| RenderError::UnknownFunction(name.to_string()))?;
        let mut diagnostics = Vec::new();
        let value = function(args, &mut diagnostics)?;
        Ok((value, diagnostics))
    }

    /// Register every entry on `tera`, routing diagnostics into `sink`.
    pub(crate) fn install(&self, tera: &mut Tera, sink: &DiagnosticSink) {
        for (name, function) in &self.functions {
            let function = *function;
            let sink = Arc::clone(sink);
            tera.register_function(name, move |args: &Args| {
                let mut diagnostics = Vec::new();
                let result = function(args, &mut diagnostics);
                if !diagnostics.is_empty() {
                    if let Ok(mut guard) = sink.lock() {
                        guard.extend(diagnostics);
                    }
                }
                result
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Read `labels` as a string mapping. Null or absent means empty; numbers
/// and bools are stringified; nested values are ignored.
pub fn labels_arg(args: &Args) -> Labels {
    let Some(Value::Object(map)) = args.get("labels") else {
        return Labels::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((k.clone(), value))
        })
        .collect()
}

fn str_arg<'a>(args: &'a Args, key: &str, function: &str) -> tera::Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(tera::Error::msg(format!(
            "`{function}`: argument `{key}` must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "`{function}`: missing argument `{key}`"
        ))),
    }
}

fn int_default(args: &Args, function: &str) -> tera::Result<i64> {
    match args.get("default") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            tera::Error::msg(format!("`{function}`: `default` must be an integer, got {n}"))
        }),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| {
            tera::Error::msg(format!("`{function}`: `default` must be an integer, got {s:?}"))
        }),
        Some(other) => Err(tera::Error::msg(format!(
            "`{function}`: `default` must be an integer, got {other}"
        ))),
    }
}

fn record<T>(lookup: Lookup<T>, diagnostics: &mut Vec<LabelDiagnostic>) -> T {
    diagnostics.extend(lookup.diagnostic);
    lookup.value
}

// ---------------------------------------------------------------------------
// Label accessors
// ---------------------------------------------------------------------------

fn get_string_value(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "get_string_value")?;
    let default = match args.get("default") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    Ok(Value::String(labels::get_string(&labels_arg(args), name, &default)))
}

fn get_bool_value(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "get_bool_value")?;
    let default = match args.get("default") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "`get_bool_value`: `default` must be a bool, got {other}"
            )))
        }
    };
    Ok(Value::Bool(labels::get_bool(&labels_arg(args), name, default)))
}

fn get_int_value(args: &Args, diagnostics: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "get_int_value")?;
    let default = i32::try_from(int_default(args, "get_int_value")?).map_err(|_| {
        tera::Error::msg("`get_int_value`: `default` does not fit in 32 bits")
    })?;
    let value = record(labels::get_int(&labels_arg(args), name, default), diagnostics);
    Ok(Value::from(value))
}

fn get_int64_value(args: &Args, diagnostics: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "get_int64_value")?;
    let default = int_default(args, "get_int64_value")?;
    let value = record(labels::get_int64(&labels_arg(args), name, default), diagnostics);
    Ok(Value::from(value))
}

fn get_string_list(args: &Args, diagnostics: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "get_string_list")?;
    let items = record(labels::get_string_list(&labels_arg(args), name), diagnostics);
    Ok(Value::from(items))
}

fn has_label(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let name = str_arg(args, "name", "has_label")?;
    Ok(Value::Bool(labels::has(&labels_arg(args), name)))
}

fn has_label_prefix(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let prefix = str_arg(args, "prefix", "has_label_prefix")?;
    Ok(Value::Bool(labels::has_prefix(&labels_arg(args), prefix)))
}

// ---------------------------------------------------------------------------
// String helpers and status predicates
// ---------------------------------------------------------------------------

fn split(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "split")?;
    let sep = str_arg(args, "sep", "split")?;
    let parts: Vec<&str> = if sep.is_empty() {
        // Empty separator splits into individual characters.
        s.char_indices()
            .map(|(i, c)| &s[i..i + c.len_utf8()])
            .collect()
    } else {
        s.split(sep).collect()
    };
    Ok(Value::from(parts))
}

fn replace(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "replace")?;
    let old = str_arg(args, "old", "replace")?;
    let new = str_arg(args, "new", "replace")?;
    Ok(Value::String(s.replace(old, new)))
}

fn tolower(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "tolower")?;
    Ok(Value::String(s.to_lowercase()))
}

fn contains(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "contains")?;
    let substr = str_arg(args, "substr", "contains")?;
    Ok(Value::Bool(s.contains(substr)))
}

fn ishealthy(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "ishealthy")?;
    Ok(Value::Bool(s.contains("healthy")))
}

fn isrunning(args: &Args, _: &mut Vec<LabelDiagnostic>) -> tera::Result<Value> {
    let s = str_arg(args, "s", "isrunning")?;
    Ok(Value::Bool(s.contains("running")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => panic!("args must be an object"),
        }
    }

    #[test]
    fn standard_table_is_enumerable() {
        let table = FunctionTable::standard();
        let names: Vec<_> = table.names().collect();
        assert_eq!(table.len(), 13);
        assert!(names.contains(&"get_string_list"));
        assert!(names.contains(&"has_label_prefix"));
        assert!(names.contains(&"isrunning"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn call_unknown_function_fails() {
        let err = FunctionTable::standard()
            .call("nope", &Args::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownFunction(_)));
    }

    #[test]
    fn int_value_falls_back_with_diagnostic() {
        let (value, diags) = FunctionTable::standard()
            .call(
                "get_int_value",
                &args(json!({"labels": {"n": "abc"}, "name": "n", "default": 7})),
            )
            .unwrap();
        assert_eq!(value, json!(7));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn labels_accept_numbers_and_ignore_nested_values() {
        let labels = labels_arg(&args(json!({"labels": {"port": 80, "on": true, "x": {"y": 1}, "n": null}})));
        assert_eq!(labels.get("port").map(String::as_str), Some("80"));
        assert_eq!(labels.get("on").map(String::as_str), Some("true"));
        assert!(!labels.contains_key("x"));
        assert!(!labels.contains_key("n"));
    }

    #[test]
    fn missing_labels_behave_as_empty() {
        let (value, _) = FunctionTable::standard()
            .call("get_bool_value", &args(json!({"name": "flag", "default": true})))
            .unwrap();
        assert_eq!(value, json!(true));
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = FunctionTable::standard()
            .call("has_label", &args(json!({"labels": {}})))
            .unwrap_err();
        assert!(err.to_string().contains("missing argument `name`"), "got: {err}");
    }

    #[test]
    fn string_list_returns_array() {
        let (value, diags) = FunctionTable::standard()
            .call(
                "get_string_list",
                &args(json!({"labels": {"l": " a, ,b ,"}, "name": "l"})),
            )
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
        assert!(diags.is_empty());
    }

    #[test]
    fn string_helpers() {
        let table = FunctionTable::standard();
        let (v, _) = table.call("split", &args(json!({"s": "a:b:c", "sep": ":"}))).unwrap();
        assert_eq!(v, json!(["a", "b", "c"]));
        let (v, _) = table
            .call("replace", &args(json!({"s": "a-b-c", "old": "-", "new": "_"})))
            .unwrap();
        assert_eq!(v, json!("a_b_c"));
        let (v, _) = table.call("tolower", &args(json!({"s": "HeLLo"}))).unwrap();
        assert_eq!(v, json!("hello"));
        let (v, _) = table
            .call("contains", &args(json!({"s": "web-01", "substr": "web"})))
            .unwrap();
        assert_eq!(v, json!(true));
    }

    #[test]
    fn status_predicates_match_substrings() {
        let table = FunctionTable::standard();
        let (v, _) = table.call("ishealthy", &args(json!({"s": "unhealthy"}))).unwrap();
        assert_eq!(v, json!(true), "substring match, like the status strings it checks");
        let (v, _) = table.call("ishealthy", &args(json!({"s": "initializing"}))).unwrap();
        assert_eq!(v, json!(false));
        let (v, _) = table.call("isrunning", &args(json!({"s": "running"}))).unwrap();
        assert_eq!(v, json!(true));
        let (v, _) = table.call("isrunning", &args(json!({"s": "stopped"}))).unwrap();
        assert_eq!(v, json!(false));
    }
}
