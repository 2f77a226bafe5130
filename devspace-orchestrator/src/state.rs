use serde::{Deserialize, Serialize};

use devspace_backend::Machine;
use devspace_config::EnvironmentSpec;

/// Lifecycle phase of a workspace's environment.
///
/// Transitions happen only under the workspace lock:
/// `NoEnvironment → Starting → Running → Stopping → NoEnvironment`, with
/// `Starting → NoEnvironment` on rollback and incremental machine starts
/// keeping `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPhase {
    NoEnvironment,
    Starting,
    Running,
    Stopping,
}

/// Per-workspace aggregate, guarded by the per-workspace lock in the
/// orchestrator's table. Never leaves the orchestrator; callers see clones of
/// the machine list.
#[derive(Debug)]
pub struct WorkspaceEnvironmentState {
    pub workspace_id: String,
    pub active: Option<EnvironmentSpec>,
    pub phase: EnvironmentPhase,
    /// Machines in actual start order; stops run in reverse of this.
    pub machines: Vec<Machine>,
    /// Set once an environment has started successfully. Drives the
    /// not-found-versus-empty distinction in reads.
    pub ever_started: bool,
}

impl WorkspaceEnvironmentState {
    pub fn new(workspace_id: &str) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            active: None,
            phase: EnvironmentPhase::NoEnvironment,
            machines: Vec::new(),
            ever_started: false,
        }
    }

    /// Resets to `NoEnvironment`, dropping the machine set.
    pub fn clear(&mut self) {
        self.active = None;
        self.phase = EnvironmentPhase::NoEnvironment;
        self.machines.clear();
    }
}

/// Outcome of a stop operation. Stop always makes forward progress; individual
/// machine stop failures are demoted to warnings rather than failing the
/// teardown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopReport {
    pub warnings: Vec<String>,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
