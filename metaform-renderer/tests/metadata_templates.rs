//! Rendering realistic metadata snapshots through the public API.

use metaform_renderer::{FunctionTable, LabelDiagnostic, TemplateEngine};
use serde_json::{json, Value};

fn snapshot() -> Value {
    json!({
        "self": {"stack": {"name": "frontend"}},
        "services": [
            {
                "name": "web",
                "stack_name": "frontend",
                "labels": {
                    "traefik.enable": "true",
                    "traefik.port": "8080",
                    "traefik.domain": "web.example.com, www.example.com"
                },
                "containers": [
                    {"name": "web-1", "primary_ip": "10.0.0.2", "state": "running", "health_state": "healthy"},
                    {"name": "web-2", "primary_ip": "10.0.0.3", "state": "stopped", "health_state": "unhealthy"}
                ]
            },
            {
                "name": "db",
                "stack_name": "frontend",
                "labels": {"traefik.port": "not-a-port"},
                "containers": []
            }
        ]
    })
}

const BACKENDS: &str = r#"{% for svc in services %}{% if get_bool_value(labels=svc.labels, name="traefik.enable", default=false) %}backend {{ tolower(s=svc.name) }}
{% for c in svc.containers %}{% if isrunning(s=c.state) %}  server {{ c.name }} {{ c.primary_ip }}:{{ get_int_value(labels=svc.labels, name="traefik.port", default=80) }}
{% endif %}{% endfor %}{% for d in get_string_list(labels=svc.labels, name="traefik.domain") %}  host {{ d }}
{% endfor %}{% endif %}{% endfor %}"#;

#[test]
fn renders_backends_for_enabled_services_only() {
    let out = TemplateEngine::new()
        .render_str("backends.cfg", BACKENDS, &snapshot())
        .expect("render");

    assert!(out.content.contains("backend web"));
    assert!(out.content.contains("server web-1 10.0.0.2:8080"));
    assert!(!out.content.contains("web-2"), "stopped container must be skipped");
    assert!(out.content.contains("host web.example.com"));
    assert!(out.content.contains("host www.example.com"));
    assert!(!out.content.contains("backend db"));
    assert!(out.diagnostics.is_empty());
}

#[test]
fn invalid_port_renders_default_and_reports() {
    let template = r#"{% for svc in services %}{{ svc.name }}={{ get_int_value(labels=svc.labels, name="traefik.port", default=80) }};{% endfor %}"#;
    let out = TemplateEngine::new()
        .render_str("ports", template, &snapshot())
        .expect("render");

    assert_eq!(out.content, "web=8080;db=80;");
    assert_eq!(
        out.diagnostics,
        vec![LabelDiagnostic::InvalidInteger {
            label: "traefik.port".to_string(),
            raw: "not-a-port".to_string(),
            fallback: "80".to_string(),
            reason: "invalid digit found in string".to_string(),
        }]
    );
}

#[test]
fn self_stack_is_reachable_from_root() {
    let out = TemplateEngine::new()
        .render_str("self", "{{ self.stack.name }}", &snapshot())
        .expect("render");
    assert_eq!(out.content, "frontend");
}

#[test]
fn restricted_table_hides_functions() {
    let engine = TemplateEngine::with_functions(FunctionTable::empty());
    let err = engine
        .render_str("x", "{{ tolower(s=\"A\") }}", &json!({}))
        .unwrap_err();
    assert!(err.to_string().contains("template engine error"), "got: {err}");
}
