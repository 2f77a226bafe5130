//! Environment backend abstraction.
//!
//! This crate defines the contract between the orchestrator and the pluggable
//! implementations that actually provision machines (container runtimes, VM
//! hypervisors, remote fleets). A backend claims one or more environment type
//! strings and is resolved through the [`registry::BackendRegistry`].
//!
//! Backends are stateless with respect to orchestration bookkeeping: which
//! machines belong to which workspace is the orchestrator's problem, a backend
//! only turns one [`MachineConfig`] into one running [`Machine`] and back.

// External crates
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Internal imports
use devspace_config::MachineConfig;
use devspace_core::{CoreError, Result};

pub mod registry;

// When the `test-helpers` feature is enabled, include the mock backend.
#[cfg(feature = "test-helpers")]
pub mod mock;

pub use registry::{BackendRegistry, RegistryError};

/// Lifecycle status of a running machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Runtime handle for a started machine.
///
/// Created by a backend on successful start; owned exclusively by the
/// orchestrator afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub workspace_id: String,
    pub environment_name: String,
    /// Display name, taken from the config or derived by the backend.
    pub name: String,
    pub is_dev: bool,
    pub status: MachineStatus,
    /// Backend-specific address (e.g. `container-ip:port`), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Machine {
    /// Builds a Running machine handle for a config the backend just started.
    pub fn running(
        workspace_id: &str,
        environment_name: &str,
        config: &MachineConfig,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            environment_name: environment_name.to_string(),
            name: config.display_name().to_string(),
            is_dev: config.is_dev,
            status: MachineStatus::Running,
            endpoint,
            created_at: Utc::now(),
        }
    }
}

/// Start-time context handed to a backend alongside each machine config.
///
/// Carries the environment name and, once the dev machine is up, its endpoint
/// so sibling machines can reference it. The orchestrator starts the dev
/// machine first for exactly this reason.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentContext {
    pub environment_name: String,
    pub dev_machine_endpoint: Option<String>,
}

impl EnvironmentContext {
    pub fn new(environment_name: &str) -> Self {
        Self {
            environment_name: environment_name.to_string(),
            dev_machine_endpoint: None,
        }
    }
}

/// The core trait for all environment backends.
///
/// One implementation per provisioning technology; each claims the environment
/// type strings it understands and is dispatched through the registry.
pub trait Backend: Send + Sync {
    /// Short backend name for logs (e.g. "docker").
    fn name(&self) -> &'static str;

    /// Environment type strings this backend claims. Must be disjoint from
    /// every other registered backend's set.
    fn supported_types(&self) -> &[&str];

    /// Start one machine. Blocks for the duration of provisioning.
    fn start_machine(
        &self,
        workspace_id: &str,
        config: &MachineConfig,
        context: &EnvironmentContext,
    ) -> Result<Machine>;

    /// Stop one machine previously returned by this backend.
    fn stop_machine(&self, workspace_id: &str, machine: &Machine) -> Result<()>;

    /// Start an additional machine in an already-running environment.
    ///
    /// Backends without on-demand scaling keep the default.
    fn start_incremental(&self, _workspace_id: &str, _environment_name: &str) -> Result<Machine> {
        Err(CoreError::Unsupported(format!(
            "backend '{}' does not support incremental machine start",
            self.name()
        )))
    }
}
