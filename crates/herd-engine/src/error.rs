//! Errors surfaced by [`Model`](crate::Model) operations.

use std::error::Error;
use std::fmt;

use herd_agents::AgentError;
use herd_core::WorldError;

use crate::config::ConfigError;

/// Failure of a model operation.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// An agent-set operation failed.
    Agent(AgentError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Agent(e) => write!(f, "agents: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Agent(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ModelError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<WorldError> for ModelError {
    fn from(e: WorldError) -> Self {
        Self::Config(ConfigError::World(e))
    }
}

impl From<AgentError> for ModelError {
    fn from(e: AgentError) -> Self {
        Self::Agent(e)
    }
}
