//! Core type definitions for agent directory resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Supported AI coding agents.
///
/// Each agent reads skills from its own directory layout; see
/// [`AgentLocator::skills_dir`](crate::AgentLocator::skills_dir).
///
/// # Extensibility
///
/// This enum is marked `#[non_exhaustive]` to allow adding new
/// agents in future versions without breaking changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AgentKind {
    /// Claude Code (Anthropic's CLI)
    ClaudeCode,
    /// OpenCode
    OpenCode,
    /// Goose (Block's AI coding assistant)
    Goose,
    /// AMP Code (Sourcegraph's AI coding assistant)
    AmpCode,
    /// GitHub Copilot CLI
    CopilotCli,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl AgentKind {
    /// All supported agents.
    pub const ALL: &'static [Self] = &[
        Self::ClaudeCode,
        Self::OpenCode,
        Self::Goose,
        Self::AmpCode,
        Self::CopilotCli,
    ];

    /// Stable identifier used in the manifest and on the command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillpin_agents::AgentKind;
    ///
    /// assert_eq!(AgentKind::ClaudeCode.id(), "claude-code");
    /// assert_eq!(AgentKind::AmpCode.id(), "amp");
    /// ```
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::OpenCode => "opencode",
            Self::Goose => "goose",
            Self::AmpCode => "amp",
            Self::CopilotCli => "copilot",
        }
    }

    /// Human-readable name of this agent.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "Claude Code",
            Self::OpenCode => "OpenCode",
            Self::Goose => "Goose",
            Self::AmpCode => "AMP Code",
            Self::CopilotCli => "Copilot CLI",
        }
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    /// Parses an agent id. Matching is case-insensitive and accepts a few
    /// common aliases (`claude`, `amp-code`, `copilot-cli`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude-code" | "claude" => Ok(Self::ClaudeCode),
            "opencode" => Ok(Self::OpenCode),
            "goose" => Ok(Self::Goose),
            "amp" | "amp-code" => Ok(Self::AmpCode),
            "copilot" | "copilot-cli" => Ok(Self::CopilotCli),
            _ => Err(Error::UnknownAgent(s.to_string())),
        }
    }
}

/// Where a skill is installed.
///
/// `Local` resolves relative to a project root, `Global` relative to the
/// user's home or config directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallScope {
    /// Project-relative installation (e.g. `.claude/skills/` in the project).
    #[default]
    Local,
    /// User-level installation (e.g. `~/.claude/skills/`).
    Global,
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Global => write!(f, "global"),
        }
    }
}
