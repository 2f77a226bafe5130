//! Inbound operation surface for upstream REST/CLI adapters.
//!
//! Accepts the raw environment JSON as it arrives on the wire and returns
//! typed results; mapping those onto HTTP status codes is the adapter's job.

use std::sync::Arc;

use devspace_backend::Machine;
use devspace_config::EnvironmentSpec;

use crate::error::Result;
use crate::orchestrator::EnvironmentOrchestrator;
use crate::state::StopReport;

#[derive(Clone)]
pub struct EnvironmentService {
    orchestrator: Arc<EnvironmentOrchestrator>,
}

impl EnvironmentService {
    pub fn new(orchestrator: Arc<EnvironmentOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Parses and starts an environment from its raw JSON envelope.
    ///
    /// With `validate` unset the semantic checks (dev-machine count, non-empty
    /// machine list) are skipped; malformed JSON always fails.
    pub fn start(&self, workspace_id: &str, raw_environment: &str, validate: bool) -> Result<()> {
        let spec = if validate {
            EnvironmentSpec::parse(raw_environment)?
        } else {
            EnvironmentSpec::parse_unvalidated(raw_environment)?
        };
        self.orchestrator.start_environment(workspace_id, &spec)
    }

    pub fn start_machine(&self, workspace_id: &str) -> Result<Machine> {
        self.orchestrator.start_machine(workspace_id)
    }

    pub fn list(&self, workspace_id: &str) -> Result<Vec<Machine>> {
        self.orchestrator.get_machines(workspace_id)
    }

    pub fn stop(&self, workspace_id: &str) -> Result<StopReport> {
        self.orchestrator.stop_environment(workspace_id)
    }
}
