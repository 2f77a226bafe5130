use thiserror::Error;

use crate::model::{EnvironmentSpec, MachineConfig};

/// Errors from parsing or validating an environment definition.
///
/// These are client errors: the input is wrong, retrying the same document
/// cannot succeed.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed environment JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment declares no machines")]
    NoMachines,

    #[error("Environment declares more than one dev machine: {first} and {second}")]
    MultipleDevMachines { first: String, second: String },
}

/// Parses a JSON array of machine configs.
///
/// All-or-nothing: a syntax error anywhere in the document fails the whole
/// parse, never a partial list. Validates the dev-machine and non-empty
/// invariants before returning.
pub fn parse_machine_configs(raw: &str) -> Result<Vec<MachineConfig>, ParseError> {
    let machines: Vec<MachineConfig> = serde_json::from_str(raw)?;
    validate_machines(&machines)?;
    Ok(machines)
}

impl EnvironmentSpec {
    /// Parses a full environment envelope (`{"name":…, "type":…,
    /// "machines":[…]}`) and validates it.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let spec = Self::parse_unvalidated(raw)?;
        validate_machines(&spec.machines)?;
        Ok(spec)
    }

    /// Parses without the semantic checks. Malformed JSON still fails; a
    /// document that cannot be deserialized is not a spec at all.
    pub fn parse_unvalidated(raw: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn validate_machines(machines: &[MachineConfig]) -> Result<(), ParseError> {
    if machines.is_empty() {
        return Err(ParseError::NoMachines);
    }
    let mut dev: Option<&MachineConfig> = None;
    for machine in machines {
        if machine.is_dev {
            if let Some(first) = dev {
                return Err(ParseError::MultipleDevMachines {
                    first: first.display_name().to_string(),
                    second: machine.display_name().to_string(),
                });
            }
            dev = Some(machine);
        }
    }
    Ok(())
}
