//! Public types consumed by the editor integration layer.
//!
//! The host constructs [`LintCommand`]s and [`DocumentSnapshot`]s, receives
//! [`LintCompletion`]s from the engine, and anchors [`Diagnostic`]s to
//! on-screen text by their [`Span`]s.

use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of an editing context (one open document instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ContextId(u64);

impl ContextId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one lint invocation.
///
/// Assigned monotonically by the engine. A newer request for the same
/// context supersedes the older one; comparing request ids is how stale
/// completions are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single diagnostic as reported by the build tool, before position
/// resolution.
///
/// Line and column are 1-based, exactly as printed by the tool. Fields are
/// private; construction goes through [`ToolDiagnostic::new`] and the value
/// is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDiagnostic {
    severity: Severity,
    line: u32,
    column: u32,
    message: String,
}

impl ToolDiagnostic {
    #[must_use]
    pub fn new(severity: Severity, line: u32, column: u32, message: String) -> Self {
        Self {
            severity,
            line,
            column,
            message,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A half-open range (`start..end`) of `char` offsets into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Range start offset (inclusive), in Unicode scalar values from the
    /// start of the document.
    pub start: usize,
    /// Range end offset (exclusive).
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A location-resolved diagnostic, ready for on-screen anchoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    span: Span,
    severity: Severity,
    message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(span: Span, severity: Severity, message: String) -> Self {
        Self {
            span,
            severity,
            message,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The document content a lint run applies to, captured when the run starts.
///
/// Diagnostics are resolved against this snapshot, not the live buffer; the
/// window between request and completion is an accepted staleness tolerance.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    path: PathBuf,
    text: String,
}

impl DocumentSnapshot {
    #[must_use]
    pub fn new(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Base file name used for the output relevance filter.
    ///
    /// Empty for paths without a UTF-8 base name; such documents match no
    /// output lines.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// A fully resolved build-tool invocation.
///
/// Built by the host's target-selection policy (or the [`crate::config`]
/// convenience): an executable path, its arguments in order, and the
/// externally detected project root to run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintCommand {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl LintCommand {
    #[must_use]
    pub fn new(program: PathBuf, args: Vec<String>, working_dir: PathBuf) -> Self {
        Self {
            program,
            args,
            working_dir,
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl fmt::Display for LintCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The result of one lint run, as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// The tool exited clean; any existing markers should be cleared.
    Clean,
    /// The tool found compile problems. The list carries those naming the
    /// linted file, in output order; it may be empty.
    Issues(Vec<Diagnostic>),
    /// The tool itself failed: non-0/non-1 exit, or killed by a signal.
    /// Fatal for this request only; future requests proceed normally.
    ToolFailed(String),
}

/// One delivered completion. Superseded runs never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintCompletion {
    pub context: ContextId,
    pub request: RequestId,
    pub outcome: LintOutcome,
}
