//! Read-only projection of machine state.
//!
//! Callers that only observe (health dashboards, status endpoints) take a
//! [`MachineStateView`] instead of the orchestrator itself, so the
//! mutation-capable surface never leaks into read-only consumers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use devspace_backend::{Machine, MachineStatus};

use crate::error::Result;
use crate::orchestrator::EnvironmentOrchestrator;

/// Per-status machine counts for one workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentStatusSummary {
    pub environment: Option<String>,
    pub total: usize,
    pub running: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct MachineStateView {
    orchestrator: Arc<EnvironmentOrchestrator>,
}

impl MachineStateView {
    pub fn new(orchestrator: Arc<EnvironmentOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Current machines of the workspace, in start order.
    pub fn machines(&self, workspace_id: &str) -> Result<Vec<Machine>> {
        self.orchestrator.get_machines(workspace_id)
    }

    /// Aggregated status counts for dashboards.
    pub fn status_summary(&self, workspace_id: &str) -> Result<EnvironmentStatusSummary> {
        let machines = self.orchestrator.get_machines(workspace_id)?;
        let environment = self.orchestrator.active_environment(workspace_id)?;
        Ok(EnvironmentStatusSummary {
            environment,
            total: machines.len(),
            running: count(&machines, MachineStatus::Running),
            failed: count(&machines, MachineStatus::Failed),
        })
    }
}

fn count(machines: &[Machine], status: MachineStatus) -> usize {
    machines.iter().filter(|m| m.status == status).count()
}
