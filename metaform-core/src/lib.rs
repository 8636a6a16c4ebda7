//! Metaform core library: declaration types, discovery, loading, errors.
//!
//! - [`types`]: [`DeclarationSpec`]
//! - [`error`]: [`DeclarationError`]
//! - [`declaration`]: discover / load / parse

pub mod declaration;
pub mod error;
pub mod types;

pub use declaration::{discover, load_spec, parse_spec};
pub use error::DeclarationError;
pub use types::{name_from_source, DeclarationSpec};
