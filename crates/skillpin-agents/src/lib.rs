#![doc = include_str!("../README.md")]
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`locator`] - Skill directory resolution per agent and scope
//! - [`platform`] - Platform base directories
//! - [`types`] - Agent and scope definitions

pub mod error;
pub mod locator;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
pub use locator::{AgentLocator, CLAUDE_CONFIG_DIR_ENV};
pub use types::{AgentKind, InstallScope};
