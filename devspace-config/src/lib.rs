//! Typed environment definitions for workspace orchestration.
//!
//! An environment is a named, typed group of machine configs. This crate owns
//! the in-memory model and the all-or-nothing parser that turns raw JSON into
//! a validated [`EnvironmentSpec`]; it performs no I/O and knows nothing about
//! backends beyond the `type` discriminator string.

pub mod model;
pub mod parser;

pub use model::{EnvironmentSpec, MachineConfig, MachineLimits};
pub use parser::{parse_machine_configs, ParseError};
