//! # metaform-sync
//!
//! Render → hash → write → action reconciliation for template declarations.
//!
//! Load declarations with [`load_all`], then call
//! [`DeclarationSet::apply_all`] once per refresh cycle with a fresh metadata
//! snapshot. Applying unchanged output is fully inert: no write, no action.

pub mod action;
pub mod declaration;
pub mod diff;
pub mod error;
pub mod hash;
pub mod set;
pub mod writer;

pub use action::ActionOutcome;
pub use declaration::{ApplyOutcome, ApplyStatus, DestinationState, TemplateDeclaration};
pub use diff::{preview, Preview};
pub use error::SyncError;
pub use set::{load_all, CycleReport, DeclarationSet, LoadFailure, LoadReport};
