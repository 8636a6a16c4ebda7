//! # metaform-renderer
//!
//! Tera-based rendering of configuration templates against orchestration
//! metadata, plus the label accessors templates use to read loosely-typed
//! labels.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use metaform_renderer::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new();
//! let data = json!({"labels": {"port": "8080"}});
//! if let Ok(out) = engine.render_str(
//!     "port.tmpl",
//!     "{{ get_int_value(labels=labels, name=\"port\", default=80) }}",
//!     &data,
//! ) {
//!     println!("{}", out.content);
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod labels;

pub use engine::{Rendered, TemplateEngine};
pub use error::RenderError;
pub use functions::FunctionTable;
pub use labels::{LabelDiagnostic, Labels, Lookup};
