//! Scriptable in-memory backend for test suites.
//!
//! No machines are ever provisioned; starts and stops are recorded so tests
//! can assert ordering, rollback, and context propagation. Failure injection
//! and artificial latency are opt-in knobs on the builder-style setters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::{Backend, EnvironmentContext, Machine, MachineStatus};
use devspace_config::MachineConfig;
use devspace_core::{CoreError, Result};

/// One observed backend call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Started { machine: String, dev_endpoint: Option<String> },
    Stopped { machine: String },
}

#[derive(Default)]
pub struct MockBackend {
    types: Vec<&'static str>,
    /// 0-based index of the start call that should fail, if any.
    fail_on_start: Option<usize>,
    /// When set, every stop call fails (nothing is recorded as stopped).
    fail_on_stop: bool,
    start_delay: Option<Duration>,
    supports_incremental: bool,
    starts: AtomicUsize,
    events: Mutex<Vec<MockEvent>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            types: vec!["docker"],
            ..Default::default()
        }
    }

    pub fn with_types(mut self, types: Vec<&'static str>) -> Self {
        self.types = types;
        self
    }

    /// Makes the nth start call (0-based, counted across machines) fail.
    pub fn fail_on_start(mut self, index: usize) -> Self {
        self.fail_on_start = Some(index);
        self
    }

    /// Makes every stop call fail.
    pub fn fail_on_stop(mut self) -> Self {
        self.fail_on_stop = true;
        self
    }

    /// Sleeps this long in every start call, to simulate slow provisioning.
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn with_incremental_support(mut self) -> Self {
        self.supports_incremental = true;
        self
    }

    /// Everything this backend was asked to do, in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn started_machines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Started { machine, .. } => Some(machine),
                MockEvent::Stopped { .. } => None,
            })
            .collect()
    }

    pub fn stopped_machines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Stopped { machine } => Some(machine),
                MockEvent::Started { .. } => None,
            })
            .collect()
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supported_types(&self) -> &[&str] {
        &self.types
    }

    fn start_machine(
        &self,
        workspace_id: &str,
        config: &MachineConfig,
        context: &EnvironmentContext,
    ) -> Result<Machine> {
        if let Some(delay) = self.start_delay {
            std::thread::sleep(delay);
        }

        let call = self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_start == Some(call) {
            return Err(CoreError::Backend(format!(
                "injected start failure for machine '{}'",
                config.display_name()
            )));
        }

        self.events.lock().unwrap().push(MockEvent::Started {
            machine: config.display_name().to_string(),
            dev_endpoint: context.dev_machine_endpoint.clone(),
        });

        let endpoint = Some(format!("mock://{}/{}", workspace_id, config.display_name()));
        Ok(Machine::running(
            workspace_id,
            &context.environment_name,
            config,
            endpoint,
        ))
    }

    fn stop_machine(&self, _workspace_id: &str, machine: &Machine) -> Result<()> {
        if self.fail_on_stop {
            return Err(CoreError::Backend(format!(
                "injected stop failure for machine '{}'",
                machine.name
            )));
        }
        self.events.lock().unwrap().push(MockEvent::Stopped {
            machine: machine.name.clone(),
        });
        Ok(())
    }

    fn start_incremental(&self, workspace_id: &str, environment_name: &str) -> Result<Machine> {
        if !self.supports_incremental {
            return Err(CoreError::Unsupported(
                "mock backend configured without incremental start".to_string(),
            ));
        }
        let n = self.starts.fetch_add(1, Ordering::SeqCst);
        let name = format!("aux-{}", n);
        self.events.lock().unwrap().push(MockEvent::Started {
            machine: name.clone(),
            dev_endpoint: None,
        });
        Ok(Machine {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            environment_name: environment_name.to_string(),
            name,
            is_dev: false,
            status: MachineStatus::Running,
            endpoint: None,
            created_at: chrono::Utc::now(),
        })
    }
}
