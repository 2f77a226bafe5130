//! The environment lifecycle control core.
//!
//! One orchestrator instance manages every workspace of a deployment. State is
//! held in a lock table: a map from workspace id to its state entry, each entry
//! guarded by its own mutex. The outer map lock is held only long enough to
//! fetch or insert an entry; backend calls run under the per-workspace lock
//! alone, so a slow start on one workspace never delays another.
//!
//! Backend calls do execute while the workspace lock is held. That keeps the
//! single-active-environment invariant airtight at the cost of making lifecycle
//! latency equal provisioning latency, which is acceptable with at most one
//! environment per workspace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use devspace_backend::{Backend, BackendRegistry, EnvironmentContext, Machine};
use devspace_config::{EnvironmentSpec, MachineConfig};

use crate::error::{OrchestratorError, Result};
use crate::state::{EnvironmentPhase, StopReport, WorkspaceEnvironmentState};

type StateEntry = Arc<Mutex<WorkspaceEnvironmentState>>;

pub struct EnvironmentOrchestrator {
    registry: Arc<BackendRegistry>,
    workspaces: Mutex<HashMap<String, StateEntry>>,
}

impl EnvironmentOrchestrator {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            workspaces: Mutex::new(HashMap::new()),
        }
    }

    /// Starts `spec` for the workspace, machine by machine.
    ///
    /// The dev machine starts first so its endpoint is available to siblings.
    /// On any machine failure, already-started machines are stopped in reverse
    /// (best effort) and the workspace returns to `NoEnvironment` before the
    /// error surfaces.
    pub fn start_environment(&self, workspace_id: &str, spec: &EnvironmentSpec) -> Result<()> {
        let entry = self.entry(workspace_id)?;
        let mut state = lock_state(&entry)?;

        if let Some(active) = &state.active {
            return Err(OrchestratorError::EnvironmentAlreadyRunning {
                workspace_id: workspace_id.to_string(),
                environment: active.name.clone(),
            });
        }

        let backend = self.resolve_backend(workspace_id, &spec.kind)?;

        state.phase = EnvironmentPhase::Starting;
        let mut context = EnvironmentContext::new(&spec.name);
        let mut started: Vec<Machine> = Vec::with_capacity(spec.machines.len());

        for config in start_order(spec) {
            match backend.start_machine(workspace_id, config, &context) {
                Ok(machine) => {
                    if machine.is_dev {
                        context.dev_machine_endpoint = machine.endpoint.clone();
                    }
                    started.push(machine);
                }
                Err(source) => {
                    warn!(
                        workspace_id,
                        environment = %spec.name,
                        machine = config.display_name(),
                        error = %source,
                        "machine start failed, rolling back environment"
                    );
                    self.rollback(workspace_id, backend.as_ref(), &mut started);
                    state.clear();
                    return Err(OrchestratorError::EnvironmentStartFailed {
                        workspace_id: workspace_id.to_string(),
                        machine: config.display_name().to_string(),
                        source,
                    });
                }
            }
        }

        info!(
            workspace_id,
            environment = %spec.name,
            machines = started.len(),
            "environment started"
        );
        state.active = Some(spec.clone());
        state.machines = started;
        state.phase = EnvironmentPhase::Running;
        state.ever_started = true;
        Ok(())
    }

    /// Starts one additional machine in the active environment.
    pub fn start_machine(&self, workspace_id: &str) -> Result<Machine> {
        let entry = self
            .existing_entry(workspace_id)?
            .ok_or_else(|| OrchestratorError::NoActiveEnvironment {
                workspace_id: workspace_id.to_string(),
            })?;
        let mut state = lock_state(&entry)?;

        let spec = state
            .active
            .clone()
            .ok_or_else(|| OrchestratorError::NoActiveEnvironment {
                workspace_id: workspace_id.to_string(),
            })?;
        let backend = self.resolve_backend(workspace_id, &spec.kind)?;

        let machine = backend
            .start_incremental(workspace_id, &spec.name)
            .map_err(|source| {
                if source.is_unsupported() {
                    OrchestratorError::UnsupportedOperation {
                        workspace_id: workspace_id.to_string(),
                        operation: "incremental machine start",
                        source,
                    }
                } else {
                    OrchestratorError::Backend {
                        workspace_id: workspace_id.to_string(),
                        operation: "incremental machine start",
                        source,
                    }
                }
            })?;

        info!(
            workspace_id,
            environment = %spec.name,
            machine = %machine.name,
            "machine added to running environment"
        );
        state.machines.push(machine.clone());
        Ok(machine)
    }

    /// Snapshot of the workspace's machines, in start order.
    ///
    /// Taken under the workspace lock and released immediately, so a read
    /// never observes a half-applied mutation.
    pub fn get_machines(&self, workspace_id: &str) -> Result<Vec<Machine>> {
        let entry = self
            .existing_entry(workspace_id)?
            .ok_or_else(|| OrchestratorError::WorkspaceNotFound(workspace_id.to_string()))?;
        let state = lock_state(&entry)?;
        if !state.ever_started {
            return Err(OrchestratorError::WorkspaceNotFound(
                workspace_id.to_string(),
            ));
        }
        Ok(state.machines.clone())
    }

    /// Name of the active environment, if one is running.
    pub fn active_environment(&self, workspace_id: &str) -> Result<Option<String>> {
        let entry = self
            .existing_entry(workspace_id)?
            .ok_or_else(|| OrchestratorError::WorkspaceNotFound(workspace_id.to_string()))?;
        let state = lock_state(&entry)?;
        if !state.ever_started {
            return Err(OrchestratorError::WorkspaceNotFound(
                workspace_id.to_string(),
            ));
        }
        Ok(state.active.as_ref().map(|spec| spec.name.clone()))
    }

    /// Stops the active environment, machines in reverse start order (dev
    /// machine last, dependents release first).
    ///
    /// Idempotent: with nothing active this is a clean no-op. Individual stop
    /// failures never fail the teardown; they come back as warnings and the
    /// workspace is cleared regardless, since a workspace stuck "running"
    /// after a stop request is worse than an imprecise teardown.
    pub fn stop_environment(&self, workspace_id: &str) -> Result<StopReport> {
        let Some(entry) = self.existing_entry(workspace_id)? else {
            return Ok(StopReport::default());
        };
        let mut state = lock_state(&entry)?;

        let Some(spec) = state.active.clone() else {
            return Ok(StopReport::default());
        };

        state.phase = EnvironmentPhase::Stopping;
        let mut report = StopReport::default();

        match self.resolve_backend(workspace_id, &spec.kind) {
            Ok(backend) => {
                for machine in state.machines.iter().rev() {
                    if let Err(e) = backend.stop_machine(workspace_id, machine) {
                        let warning =
                            format!("failed to stop machine '{}': {}", machine.name, e);
                        warn!(workspace_id, environment = %spec.name, "{}", warning);
                        report.warnings.push(warning);
                    }
                }
            }
            Err(e) => {
                // The backend set is fixed at startup, so this indicates the
                // environment was started by a process with a different
                // deployment configuration. Teardown still proceeds.
                report
                    .warnings
                    .push(format!("backend unavailable for teardown: {}", e));
            }
        }

        info!(
            workspace_id,
            environment = %spec.name,
            warnings = report.warnings.len(),
            "environment stopped"
        );
        state.clear();
        Ok(report)
    }

    /// Drops the workspace's lock-table entry. Called when the workspace is
    /// deleted upstream; the table never retains entries for dead workspaces.
    ///
    /// A still-active environment is stopped first (best effort), so removal
    /// never orphans running machines.
    pub fn remove_workspace(&self, workspace_id: &str) -> Result<()> {
        if let Err(e) = self.stop_environment(workspace_id) {
            warn!(
                workspace_id,
                error = %e,
                "environment stop during workspace removal failed"
            );
        }
        self.lock_table()?.remove(workspace_id);
        Ok(())
    }

    fn resolve_backend(&self, workspace_id: &str, kind: &str) -> Result<Arc<dyn Backend>> {
        self.registry.resolve(kind).cloned().ok_or_else(|| {
            OrchestratorError::UnsupportedEnvironmentType {
                workspace_id: workspace_id.to_string(),
                env_type: kind.to_string(),
            }
        })
    }

    /// Best-effort stop of partially started machines, in reverse start order.
    fn rollback(&self, workspace_id: &str, backend: &dyn Backend, started: &mut Vec<Machine>) {
        while let Some(machine) = started.pop() {
            if let Err(e) = backend.stop_machine(workspace_id, &machine) {
                warn!(
                    workspace_id,
                    machine = %machine.name,
                    error = %e,
                    "rollback stop failed"
                );
            }
        }
    }

    fn entry(&self, workspace_id: &str) -> Result<StateEntry> {
        let mut table = self.lock_table()?;
        Ok(Arc::clone(table.entry(workspace_id.to_string()).or_insert_with(
            || Arc::new(Mutex::new(WorkspaceEnvironmentState::new(workspace_id))),
        )))
    }

    fn existing_entry(&self, workspace_id: &str) -> Result<Option<StateEntry>> {
        Ok(self.lock_table()?.get(workspace_id).map(Arc::clone))
    }

    fn lock_table(&self) -> Result<MutexGuard<'_, HashMap<String, StateEntry>>> {
        self.workspaces
            .lock()
            .map_err(|_| OrchestratorError::Internal("workspace table mutex poisoned".to_string()))
    }
}

fn lock_state(entry: &StateEntry) -> Result<MutexGuard<'_, WorkspaceEnvironmentState>> {
    entry
        .lock()
        .map_err(|_| OrchestratorError::Internal("workspace state mutex poisoned".to_string()))
}

/// Spec order, except the dev machine (if any) moves to the front.
fn start_order(spec: &EnvironmentSpec) -> impl Iterator<Item = &MachineConfig> {
    let dev = spec.machines.iter().filter(|m| m.is_dev);
    let rest = spec.machines.iter().filter(|m| !m.is_dev);
    dev.chain(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(name: &str, is_dev: bool) -> MachineConfig {
        MachineConfig {
            name: Some(name.to_string()),
            image: "ubuntu".to_string(),
            is_dev,
            ..Default::default()
        }
    }

    #[test]
    fn start_order_moves_dev_machine_first() {
        let spec = EnvironmentSpec {
            name: "dev".into(),
            kind: "docker".into(),
            machines: vec![machine("db", false), machine("main", true), machine("cache", false)],
        };
        let order: Vec<_> = start_order(&spec).map(|m| m.display_name()).collect();
        assert_eq!(order, vec!["main", "db", "cache"]);
    }

    #[test]
    fn start_order_without_dev_machine_is_spec_order() {
        let spec = EnvironmentSpec {
            name: "dev".into(),
            kind: "docker".into(),
            machines: vec![machine("a", false), machine("b", false)],
        };
        let order: Vec<_> = start_order(&spec).map(|m| m.display_name()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
