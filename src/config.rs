//! Host-facing configuration for the lint subsystem.
//!
//! The host deserializes [`LintConfig`] from its own settings and routes
//! files to tools by extension. Command construction stays in the host's
//! hands; [`LintConfig::command_for`] is a convenience for hosts without
//! their own target-selection policy.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::types::LintCommand;

/// Configuration for the lint subsystem.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintConfig {
    /// Whether lint-on-demand is enabled. Default: false.
    #[serde(default)]
    pub enabled: bool,
    /// Per-tool configurations, keyed by name (e.g. "kotlin").
    #[serde(default)]
    pub tools: HashMap<String, ToolConfig>,
}

/// Configuration for a single build tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Executable path or name (e.g. "kotlinc"); resolution is the host's
    /// job.
    pub command: String,
    /// Arguments to pass before any caller-specific extras.
    #[serde(default)]
    pub args: Vec<String>,
    /// File extensions this tool handles (e.g. `["kt", "kts"]`).
    #[serde(default)]
    pub file_extensions: Vec<String>,
}

impl LintConfig {
    /// Tool configured for `path`, routed by extension.
    ///
    /// Deterministic when several tools claim the same extension: names are
    /// visited in sorted order and the first one wins.
    #[must_use]
    pub fn tool_for(&self, path: &Path) -> Option<&ToolConfig> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();

        let mut chosen: Option<&String> = None;
        for name in names {
            if !self.tools[name].file_extensions.iter().any(|e| e == ext) {
                continue;
            }
            match chosen {
                Some(existing) => {
                    tracing::warn!(
                        "Multiple lint tools configured for extension '{ext}': '{existing}' and '{name}'. Using '{existing}'."
                    );
                }
                None => chosen = Some(name),
            }
        }
        chosen.map(|name| &self.tools[name])
    }

    /// Build the invocation for `path`, rooted at `workspace_root`.
    ///
    /// `extra_args` lands after the configured arguments, matching the
    /// convention that caller-specific flags terminate the argument list.
    #[must_use]
    pub fn command_for(
        &self,
        path: &Path,
        workspace_root: &Path,
        extra_args: &[String],
    ) -> Option<LintCommand> {
        let tool = self.tool_for(path)?;
        let mut args = tool.args.clone();
        args.extend(extra_args.iter().cloned());
        Some(LintCommand::new(
            tool.command.clone().into(),
            args,
            workspace_root.to_path_buf(),
        ))
    }
}
