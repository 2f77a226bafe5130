//! Workspace environment orchestration business logic
//!
//! This crate contains the control core for managing the isolated execution
//! environments backing cloud development workspaces. It is consumed by an
//! HTTP service or CLI commands through [`service::EnvironmentService`], while
//! read-only dashboards go through [`view::MachineStateView`].

pub mod error;
pub mod orchestrator;
pub mod service;
pub mod state;
pub mod view;

pub use error::{OrchestratorError, Result};
pub use orchestrator::EnvironmentOrchestrator;
pub use service::EnvironmentService;
pub use state::{EnvironmentPhase, StopReport};
pub use view::{EnvironmentStatusSummary, MachineStateView};
