//! Build-tool output parsing.
//!
//! Compilers report diagnostics for every file in the compilation unit as
//! free-form text. This module filters the lines naming the linted file and
//! extracts `{severity, line, column, message}` per tool dialect. Parsing is
//! stateless and never fails; lines that don't fit the dialect are skipped.

use std::path::{Path, PathBuf};

use crate::types::{Severity, ToolDiagnostic};

/// File type with no known build-tool output dialect.
#[derive(Debug, thiserror::Error)]
#[error("no lint grammar for {}", path.display())]
pub struct UnsupportedFileError {
    path: PathBuf,
}

/// Line format of one build tool's diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGrammar {
    /// kotlinc-style: `e: /path/File.kt: (row, col): message`.
    Kotlinc,
    /// javac-style: `/path/File.java:11: error: message`.
    Javac,
}

impl OutputGrammar {
    /// Pick the grammar for a source file by extension.
    pub fn detect(path: &Path) -> Result<Self, UnsupportedFileError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("kt" | "kts") => Ok(Self::Kotlinc),
            Some("java") => Ok(Self::Javac),
            _ => Err(UnsupportedFileError {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse captured output into diagnostics for the file named `file_name`.
    ///
    /// Only lines containing `file_name` as a substring are considered — the
    /// tool reports every file in the compilation unit and only the edited
    /// file's lines are relevant. A base name that is a substring of another
    /// file's name can false-positive; kept as-is, since stricter matching
    /// could silently drop legitimate lines. Output order matches input line
    /// order.
    #[must_use]
    pub fn parse(self, output: &str, file_name: &str) -> Vec<ToolDiagnostic> {
        if file_name.is_empty() {
            return Vec::new();
        }
        output
            .lines()
            .filter(|line| line.contains(file_name))
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    fn parse_line(self, line: &str) -> Option<ToolDiagnostic> {
        match self {
            Self::Kotlinc => parse_kotlinc_line(line),
            Self::Javac => parse_javac_line(line),
        }
    }
}

/// `e: /path/File.kt: (10, 46): Expecting ')'` — marker `e` is an error,
/// any other marker a warning; the tail past the location, trimmed, is the
/// message.
fn parse_kotlinc_line(line: &str) -> Option<ToolDiagnostic> {
    let mut fields = line.splitn(4, ':');
    let marker = fields.next()?;
    let _path = fields.next()?;
    let (row, column) = parse_location(fields.next()?)?;
    let message = fields.next()?.trim();

    let severity = if marker == "e" {
        Severity::Error
    } else {
        Severity::Warning
    };
    Some(ToolDiagnostic::new(severity, row, column, message.to_string()))
}

/// ` (10, 46)` → `(10, 46)`.
fn parse_location(field: &str) -> Option<(u32, u32)> {
    let inner = field.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (row, column) = inner.split_once(", ")?;
    Some((row.trim().parse().ok()?, column.trim().parse().ok()?))
}

/// `/path/File.java:11: error: ';' expected` — field 1 is the line number,
/// field 2 (verbatim, leading space and all) the message. javac prints no
/// column; it defaults to 1, and everything surfaced this way is an error.
fn parse_javac_line(line: &str) -> Option<ToolDiagnostic> {
    let mut fields = line.split(':');
    let _path = fields.next()?;
    let row = fields.next()?.trim().parse().ok()?;
    let message = fields.next()?;
    Some(ToolDiagnostic::new(
        Severity::Error,
        row,
        1,
        message.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            OutputGrammar::detect(Path::new("/a/Main.kt")).unwrap(),
            OutputGrammar::Kotlinc
        );
        assert_eq!(
            OutputGrammar::detect(Path::new("build.kts")).unwrap(),
            OutputGrammar::Kotlinc
        );
        assert_eq!(
            OutputGrammar::detect(Path::new("/a/Main.java")).unwrap(),
            OutputGrammar::Javac
        );
    }

    #[test]
    fn test_detect_unsupported() {
        let err = OutputGrammar::detect(Path::new("/a/notes.txt")).unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
        assert!(OutputGrammar::detect(Path::new("Makefile")).is_err());
    }

    #[test]
    fn test_kotlinc_error_line() {
        let output = "e: /kotlin/MainActivity.kt: (10, 46): Expecting ')'";
        let diags = OutputGrammar::Kotlinc.parse(output, "MainActivity.kt");
        assert_eq!(
            diags,
            vec![ToolDiagnostic::new(
                Severity::Error,
                10,
                46,
                "Expecting ')'".to_string()
            )]
        );
    }

    #[test]
    fn test_kotlinc_non_error_marker_is_warning() {
        let output = "w: /kotlin/Main.kt: (3, 5): Variable 'x' is never used";
        let diags = OutputGrammar::Kotlinc.parse(output, "Main.kt");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity(), Severity::Warning);
        assert_eq!(diags[0].line(), 3);
        assert_eq!(diags[0].column(), 5);
    }

    #[test]
    fn test_kotlinc_message_keeps_inner_colons() {
        let output = "e: /kotlin/Main.kt: (1, 2): Expecting ':' before type";
        let diags = OutputGrammar::Kotlinc.parse(output, "Main.kt");
        assert_eq!(diags[0].message(), "Expecting ':' before type");
    }

    #[test]
    fn test_kotlinc_malformed_location_skipped() {
        let output = "e: /kotlin/Main.kt: (ten, 46): Expecting ')'\n\
                      e: /kotlin/Main.kt: 10, 46: Expecting ')'\n\
                      e: /kotlin/Main.kt: (10 46): Expecting ')'";
        assert!(OutputGrammar::Kotlinc.parse(output, "Main.kt").is_empty());
    }

    #[test]
    fn test_kotlinc_too_few_fields_skipped() {
        let output = "warning: Main.kt uses unchecked operations";
        assert!(OutputGrammar::Kotlinc.parse(output, "Main.kt").is_empty());
    }

    #[test]
    fn test_relevance_filter_soundness() {
        let output = "e: /kotlin/Other.kt: (1, 1): broken here\n\
                      e: /kotlin/Main.kt: (2, 3): broken there";
        let diags = OutputGrammar::Kotlinc.parse(output, "Main.kt");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line(), 2);
    }

    #[test]
    fn test_relevance_filter_substring_overlap() {
        // Known limitation: "Foo.kt" matches lines about "FooBar.kt" too.
        let output = "e: /kotlin/FooBar.kt: (1, 1): broken";
        let diags = OutputGrammar::Kotlinc.parse(output, "Foo.kt");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_empty_file_name_matches_nothing() {
        let output = "e: /kotlin/Main.kt: (1, 1): broken";
        assert!(OutputGrammar::Kotlinc.parse(output, "").is_empty());
    }

    #[test]
    fn test_output_order_preserved() {
        let output = "e: /kotlin/Main.kt: (9, 1): second comes later\n\
                      e: /kotlin/Main.kt: (2, 1): first comes first";
        let diags = OutputGrammar::Kotlinc.parse(output, "Main.kt");
        assert_eq!(diags[0].line(), 9);
        assert_eq!(diags[1].line(), 2);
    }

    #[test]
    fn test_javac_error_line() {
        let output = "/java/MainActivity.java:11: error: ';' expected";
        let diags = OutputGrammar::Javac.parse(output, "MainActivity.java");
        assert_eq!(
            diags,
            vec![ToolDiagnostic::new(
                Severity::Error,
                11,
                1,
                " error".to_string()
            )]
        );
    }

    #[test]
    fn test_javac_column_defaults_to_one() {
        let output = "/java/Main.java:3: warning: deprecation";
        let diags = OutputGrammar::Javac.parse(output, "Main.java");
        assert_eq!(diags[0].column(), 1);
        // The dialect carries no severity channel; everything is an error.
        assert_eq!(diags[0].severity(), Severity::Error);
    }

    #[test]
    fn test_javac_note_line_skipped() {
        let output = "Note: Main.java uses unchecked or unsafe operations.";
        assert!(OutputGrammar::Javac.parse(output, "Main.java").is_empty());
    }

    #[test]
    fn test_javac_non_numeric_line_skipped() {
        let output = "/java/Main.java:abc: error: broken";
        assert!(OutputGrammar::Javac.parse(output, "Main.java").is_empty());
    }
}
