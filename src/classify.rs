//! Exit-status classification.
//!
//! The build-tool contract: 0 = clean, 1 = compile diagnostics present,
//! anything else (or death by signal) = tool-level failure. Exit code 1
//! means "ran and found problems", never "crashed".

use crate::parser::OutputGrammar;
use crate::types::ToolDiagnostic;

/// What a finished run means, before position resolution.
#[derive(Debug)]
pub(crate) enum Classification {
    Clean,
    Issues(Vec<ToolDiagnostic>),
    ToolFailed(String),
}

/// Classify a finished process.
///
/// `code` is `ExitStatus::code()`; `None` means the process did not exit
/// normally. `process` names the invocation for failure descriptions.
pub(crate) fn classify(
    code: Option<i32>,
    captured: &str,
    process: &str,
    grammar: OutputGrammar,
    file_name: &str,
) -> Classification {
    match code {
        Some(0) => Classification::Clean,
        Some(1) => Classification::Issues(grammar.parse(captured, file_name)),
        Some(status) => {
            Classification::ToolFailed(format!("{process} exited with status {status}"))
        }
        None => Classification::ToolFailed(format!("{process} was killed by a signal")),
    }
}
