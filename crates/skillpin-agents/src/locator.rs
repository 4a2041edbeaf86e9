//! Skill directory resolution per agent and scope.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::platform;
use crate::types::{AgentKind, InstallScope};

/// Environment variable that relocates Claude Code's global directory.
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Resolves where each agent reads its skills from.
///
/// Local scope is resolved against `project_root`; global scope against the
/// user's home or config directory.
#[derive(Debug, Clone)]
pub struct AgentLocator {
    project_root: PathBuf,
}

impl AgentLocator {
    /// Creates a locator rooted at `project_root`.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Creates a locator rooted at the process's current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the current directory is unavailable.
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// The project root used for local scope.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the directory skills are installed into.
    ///
    /// With no agent, skills go to an agent-neutral `.skills/` directory
    /// (under the project root or the home directory).
    ///
    /// | Agent       | Global                      | Local                 |
    /// |-------------|-----------------------------|-----------------------|
    /// | Claude Code | `~/.claude/skills`          | `.claude/skills`      |
    /// | OpenCode    | `<config>/opencode/skill`   | `.opencode/skill`     |
    /// | Goose       | `<config>/goose/skills`     | `.goose/skills`       |
    /// | AMP Code    | `<config>/agents/skills`    | `.agents/skills`      |
    /// | Copilot CLI | `~/.copilot/skills`         | unsupported           |
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedScope`] for combinations the agent does not
    /// support, or an error if the base directory cannot be determined.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillpin_agents::{AgentKind, AgentLocator, InstallScope};
    /// use std::path::PathBuf;
    ///
    /// let locator = AgentLocator::new("/work/app");
    /// let dir = locator.skills_dir(Some(AgentKind::ClaudeCode), InstallScope::Local)?;
    /// assert_eq!(dir, PathBuf::from("/work/app/.claude/skills"));
    /// # Ok::<(), skillpin_agents::Error>(())
    /// ```
    pub fn skills_dir(&self, agent: Option<AgentKind>, scope: InstallScope) -> Result<PathBuf> {
        let root = &self.project_root;
        let Some(agent) = agent else {
            return match scope {
                InstallScope::Local => Ok(root.join(".skills")),
                InstallScope::Global => Ok(platform::home_dir()?.join(".skills")),
            };
        };

        match (agent, scope) {
            (AgentKind::ClaudeCode, InstallScope::Local) => Ok(root.join(".claude").join("skills")),
            (AgentKind::ClaudeCode, InstallScope::Global) => {
                Ok(claude_global_dir()?.join("skills"))
            }
            (AgentKind::OpenCode, InstallScope::Local) => Ok(root.join(".opencode").join("skill")),
            (AgentKind::OpenCode, InstallScope::Global) => {
                Ok(platform::config_dir()?.join("opencode").join("skill"))
            }
            (AgentKind::Goose, InstallScope::Local) => Ok(root.join(".goose").join("skills")),
            (AgentKind::Goose, InstallScope::Global) => {
                Ok(platform::config_dir()?.join("goose").join("skills"))
            }
            (AgentKind::AmpCode, InstallScope::Local) => Ok(root.join(".agents").join("skills")),
            (AgentKind::AmpCode, InstallScope::Global) => {
                Ok(platform::config_dir()?.join("agents").join("skills"))
            }
            (AgentKind::CopilotCli, InstallScope::Global) => {
                Ok(platform::home_dir()?.join(".copilot").join("skills"))
            }
            (AgentKind::CopilotCli, InstallScope::Local) => Err(Error::UnsupportedScope {
                agent: agent.to_string(),
                scope: scope.to_string(),
            }),
        }
    }
}

/// Claude Code's global directory: `$CLAUDE_CONFIG_DIR` if absolute, else `~/.claude`.
fn claude_global_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CLAUDE_CONFIG_DIR_ENV).map(PathBuf::from)
        && dir.is_absolute()
    {
        return Ok(dir);
    }
    Ok(platform::home_dir()?.join(".claude"))
}
