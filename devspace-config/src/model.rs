// Standard library imports
use std::fmt;

// External crate imports
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resource limits for a single machine.
///
/// All fields are optional; a backend applies its own defaults for anything
/// left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
}

/// Declarative description of one machine inside an environment.
///
/// Fields the orchestrator does not understand are captured verbatim in
/// `extra` and handed to the backend untouched, preserving their order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Machine name, unique within its environment when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Image or template reference the backend boots from.
    pub image: String,

    /// Marks the primary development machine of the environment.
    #[serde(default, rename = "isDev")]
    pub is_dev: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<MachineLimits>,

    /// Backend-specific fields, opaque to the orchestrator.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl MachineConfig {
    /// Display name for logs and error messages. Falls back to the image
    /// reference for unnamed machines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.image)
    }
}

/// A parsed, validated environment definition.
///
/// Immutable once constructed; the orchestrator clones it into per-workspace
/// state rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    pub name: String,

    /// Backend type discriminator, e.g. `"docker"`. Selects which registered
    /// backend owns this environment.
    #[serde(rename = "type")]
    pub kind: String,

    pub machines: Vec<MachineConfig>,
}

impl EnvironmentSpec {
    /// The machine flagged `isDev`, if the environment declares one.
    pub fn dev_machine(&self) -> Option<&MachineConfig> {
        self.machines.iter().find(|m| m.is_dev)
    }
}

impl fmt::Display for EnvironmentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} machine(s))",
            self.name,
            self.kind,
            self.machines.len()
        )
    }
}
