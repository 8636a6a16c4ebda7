//! Tera rendering engine.
//!
//! Each render builds a fresh [`Tera`] instance so edits to a template source
//! are picked up on the next cycle. Autoescaping is disabled: outputs are
//! configuration files, not HTML.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tera::Tera;

use crate::context::to_tera_context;
use crate::error::{io_err, RenderError};
use crate::functions::{DiagnosticSink, FunctionTable};
use crate::labels::LabelDiagnostic;

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    /// Diagnostics raised by template functions, in call order.
    pub diagnostics: Vec<LabelDiagnostic>,
}

/// Renders template sources against a metadata snapshot using a
/// [`FunctionTable`]. Create once and reuse.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    functions: FunctionTable,
}

impl TemplateEngine {
    /// Engine with the standard function table.
    pub fn new() -> Self {
        Self::with_functions(FunctionTable::standard())
    }

    pub fn with_functions(functions: FunctionTable) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Read `source` and render it as template `name` against `data`.
    pub fn render_file(
        &self,
        name: &str,
        source: &Path,
        data: &Value,
    ) -> Result<Rendered, RenderError> {
        let template = std::fs::read_to_string(source).map_err(|e| io_err(source, e))?;
        self.render_str(name, &template, data)
    }

    /// Render `template` text as template `name` against `data`.
    pub fn render_str(
        &self,
        name: &str,
        template: &str,
        data: &Value,
    ) -> Result<Rendered, RenderError> {
        let ctx = to_tera_context(data)?;
        let sink: DiagnosticSink = Arc::new(Mutex::new(Vec::new()));

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        self.functions.install(&mut tera, &sink);
        tera.add_raw_template(name, template)?;
        let content = tera.render(name, &ctx)?;

        let diagnostics = sink.lock().map(|g| g.clone()).unwrap_or_default();
        Ok(Rendered {
            content,
            diagnostics,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn render(template: &str, data: Value) -> Rendered {
        TemplateEngine::new()
            .render_str("test.tmpl", template, &data)
            .unwrap_or_else(|e| panic!("render failed: {e}"))
    }

    #[test]
    fn binds_data_as_root_context() {
        let out = render("stack={{ stack.name }}", json!({"stack": {"name": "web"}}));
        assert_eq!(out.content, "stack=web");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn label_functions_are_callable() {
        let data = json!({"labels": {"traefik.port": "8080", "traefik.enable": "true", "hosts": "a.io, b.io"}});
        let out = render(
            "{% if has_label_prefix(labels=labels, prefix=\"traefik.\") %}\
             port={{ get_int_value(labels=labels, name=\"traefik.port\", default=80) }} \
             on={{ get_bool_value(labels=labels, name=\"traefik.enable\") }} \
             {% for h in get_string_list(labels=labels, name=\"hosts\") %}[{{ h }}]{% endfor %}\
             {% endif %}",
            data,
        );
        assert_eq!(out.content, "port=8080 on=true [a.io][b.io]");
    }

    #[test]
    fn diagnostics_are_collected_not_logged() {
        let out = render(
            "{{ get_int_value(labels=labels, name=\"n\", default=7) }}|{{ get_string_list(labels=labels, name=\"l\") | length }}",
            json!({"labels": {"n": "abc", "l": " , "}}),
        );
        assert_eq!(out.content, "7|0");
        assert_eq!(out.diagnostics.len(), 2);
        assert!(matches!(out.diagnostics[0], LabelDiagnostic::InvalidInteger { .. }));
        assert!(matches!(out.diagnostics[1], LabelDiagnostic::EmptyList { .. }));
    }

    #[test]
    fn status_predicates_in_templates() {
        let data = json!({"containers": [
            {"name": "a", "health_state": "healthy", "state": "running"},
            {"name": "b", "health_state": "initializing", "state": "stopped"}
        ]});
        let out = render(
            "{% for c in containers %}{% if ishealthy(s=c.health_state) and isrunning(s=c.state) %}{{ c.name }}{% endif %}{% endfor %}",
            data,
        );
        assert_eq!(out.content, "a");
    }

    #[test]
    fn html_named_templates_are_not_escaped() {
        let out = TemplateEngine::new()
            .render_str("index.html", "{{ v }}", &json!({"v": "<b>&"}))
            .unwrap();
        assert_eq!(out.content, "<b>&");
    }

    #[test]
    fn parse_error_is_reported() {
        let err = TemplateEngine::new()
            .render_str("bad.tmpl", "{% if %}", &json!({}))
            .unwrap_err();
        assert!(matches!(err, RenderError::Tera(_)), "got: {err}");
    }

    #[test]
    fn render_file_reads_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hello.tmpl");
        std::fs::write(&src, "hello {{ who }}").unwrap();
        let out = TemplateEngine::new()
            .render_file("hello.tmpl", &src, &json!({"who": "world"}))
            .unwrap();
        assert_eq!(out.content, "hello world");
    }

    #[test]
    fn missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = TemplateEngine::new()
            .render_file("x", &tmp.path().join("absent.tmpl"), &json!({}))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }), "got: {err}");
    }
}
