#![doc = include_str!("../README.md")]
//!
//! ## Modules
//!
//! - [`access`] - Request headers, status classification and auth walls
//! - [`remote`] - The [`GitHub`] trait and wire types
//! - [`fetch`] - `ureq`-backed [`GitHubClient`]
//! - [`source`] - Install target parsing
//! - [`frontmatter`] - `SKILL.md` frontmatter parsing
//! - [`discovery`] - Repository tree scanning
//! - [`metadata`] - Concurrent skill metadata retrieval
//! - [`resolve`] - Name resolution and conflict policy
//! - [`install`] - Writing and removing skill directories
//! - [`update`] - Commit-based update checks
//! - [`manifest`] - The local manifest and its stores
//! - [`pipeline`] - Install, upgrade and uninstall orchestration

pub mod access;
pub mod credentials;
pub mod discovery;
mod error;
pub mod fetch;
pub mod frontmatter;
pub mod install;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod remote;
pub mod resolve;
pub mod settings;
pub mod source;
pub mod types;
pub mod update;

pub use access::{Access, AuthWall, WallKind};
pub use credentials::{EnvTokenProvider, StaticToken, TokenProvider};
pub use discovery::{discover, extract_parent_paths};
pub use error::{Error, Result};
pub use fetch::GitHubClient;
pub use frontmatter::{FieldValue, Frontmatter, parse_frontmatter};
pub use install::{install_skill_files, remove_skill_dir};
pub use manifest::{
    InstalledSkill, JsonFileStore, LocalManifest, Manifest, ManifestStore, MemoryStore, RepoConfig,
};
pub use metadata::{fetch_skill, fetch_skills};
pub use pipeline::{
    AgentPaths, Confirm, InstallOptions, InstallOutcome, InstallProgress, Pipeline,
    UninstallOutcome, UpgradeOutcome, UpgradeReport,
};
pub use remote::{GitHub, Visibility};
pub use resolve::{Resolution, ResolvedSkill, SkillSource, resolve};
pub use settings::Settings;
pub use skillpin_agents::{AgentKind, AgentLocator, InstallScope};
pub use source::InstallSource;
pub use types::{DiscoveryResult, RepoId, SkillMetadata, SkillPath, validate_skill_name};
pub use update::{UpdateStatus, check_all, check_update};
