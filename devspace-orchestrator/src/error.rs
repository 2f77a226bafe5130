use thiserror::Error;

use devspace_config::ParseError;
use devspace_core::CoreError;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid environment definition: {0}")]
    Parse(#[from] ParseError),

    #[error("Workspace '{workspace_id}': no backend supports environment type '{env_type}'")]
    UnsupportedEnvironmentType {
        workspace_id: String,
        env_type: String,
    },

    #[error("Workspace '{workspace_id}': environment '{environment}' is already running")]
    EnvironmentAlreadyRunning {
        workspace_id: String,
        environment: String,
    },

    #[error("Workspace '{workspace_id}': no active environment")]
    NoActiveEnvironment { workspace_id: String },

    #[error("Workspace '{workspace_id}': {operation} not supported: {source}")]
    UnsupportedOperation {
        workspace_id: String,
        operation: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Workspace '{workspace_id}': starting machine '{machine}' failed: {source}")]
    EnvironmentStartFailed {
        workspace_id: String,
        machine: String,
        #[source]
        source: CoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Workspace '{workspace_id}': {operation} failed: {source}")]
    Backend {
        workspace_id: String,
        operation: &'static str,
        #[source]
        source: CoreError,
    },
}
