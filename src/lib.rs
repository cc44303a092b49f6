//! Async build-tool lint runner for editor integrations.
//!
//! The host asks for a lint of one document; the engine shells out to the
//! build tool in the project root, keeps at most one process alive per
//! editing context (newer requests preempt older ones), and turns the
//! tool's textual output into location-resolved diagnostics.

pub mod config;
pub mod parser;
pub mod position;
pub mod types;

pub(crate) mod classify;

mod engine;

pub use config::{LintConfig, ToolConfig};
pub use engine::LintEngine;
pub use parser::{OutputGrammar, UnsupportedFileError};
pub use types::{
    ContextId, Diagnostic, DocumentSnapshot, LintCommand, LintCompletion, LintOutcome, RequestId,
    Severity, Span, ToolDiagnostic,
};
