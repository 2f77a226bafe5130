//! Type-to-backend dispatch.
//!
//! The registry is built once during process initialization and frozen.
//! Resolution afterwards is a plain map lookup, no locking. Backend sets are
//! fixed by deployment configuration, so runtime re-registration does not
//! exist.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::Backend;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(
        "Environment type '{env_type}' already claimed by backend '{existing}' \
         (rejected registration of '{rejected}')"
    )]
    DuplicateType {
        env_type: String,
        existing: &'static str,
        rejected: &'static str,
    },
}

/// Immutable mapping from environment type string to backend.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn builder() -> BackendRegistryBuilder {
        BackendRegistryBuilder {
            backends: HashMap::new(),
        }
    }

    /// Resolves the backend claiming `env_type`, if any.
    pub fn resolve(&self, env_type: &str) -> Option<&Arc<dyn Backend>> {
        let backend = self.backends.get(env_type);
        debug!(
            env_type,
            backend = backend.map(|b| b.name()),
            "resolved environment backend"
        );
        backend
    }

    /// All claimed environment types, for diagnostics.
    pub fn known_types(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }
}

pub struct BackendRegistryBuilder {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl std::fmt::Debug for BackendRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistryBuilder")
            .field("types", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BackendRegistryBuilder {
    /// Registers a backend under every type it claims.
    ///
    /// Fails on the first type already claimed by an earlier registration;
    /// earlier registrations stay intact, and none of the rejected backend's
    /// claims are recorded.
    pub fn register(mut self, backend: Arc<dyn Backend>) -> Result<Self, RegistryError> {
        for env_type in backend.supported_types() {
            if let Some(existing) = self.backends.get(*env_type) {
                return Err(RegistryError::DuplicateType {
                    env_type: env_type.to_string(),
                    existing: existing.name(),
                    rejected: backend.name(),
                });
            }
        }
        for env_type in backend.supported_types() {
            self.backends
                .insert(env_type.to_string(), Arc::clone(&backend));
        }
        Ok(self)
    }

    pub fn build(self) -> BackendRegistry {
        BackendRegistry {
            backends: self.backends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvironmentContext, Machine};
    use devspace_config::MachineConfig;
    use devspace_core::Result;

    struct FakeBackend {
        name: &'static str,
        types: Vec<&'static str>,
    }

    impl Backend for FakeBackend {
        fn name(&self) -> &'static str {
            self.name
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
            Ok(Machine::running(
                workspace_id,
                &context.environment_name,
                config,
                None,
            ))
        }

        fn stop_machine(&self, _workspace_id: &str, _machine: &Machine) -> Result<()> {
            Ok(())
        }
    }

    fn backend(name: &'static str, types: Vec<&'static str>) -> Arc<dyn Backend> {
        Arc::new(FakeBackend { name, types })
    }

    #[test]
    fn resolve_known_type() {
        let registry = BackendRegistry::builder()
            .register(backend("docker", vec!["docker", "compose"]))
            .unwrap()
            .build();
        assert_eq!(registry.resolve("compose").unwrap().name(), "docker");
    }

    #[test]
    fn resolve_unknown_type_is_none() {
        let registry = BackendRegistry::builder().build();
        assert!(registry.resolve("docker").is_none());
    }

    #[test]
    fn duplicate_type_rejected_and_registry_still_queryable() {
        let builder = BackendRegistry::builder()
            .register(backend("docker", vec!["docker"]))
            .unwrap();

        let err = BackendRegistry::builder()
            .register(backend("docker", vec!["docker"]))
            .unwrap()
            .register(backend("podman", vec!["docker"]))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateType {
                ref env_type,
                existing: "docker",
                rejected: "podman",
            } if env_type == "docker"
        ));

        // The first builder was untouched by the failed path above.
        let registry = builder.build();
        assert_eq!(registry.resolve("docker").unwrap().name(), "docker");
    }

    #[test]
    fn partial_overlap_records_none_of_the_rejected_claims() {
        let err_builder = BackendRegistry::builder()
            .register(backend("docker", vec!["docker"]))
            .unwrap();
        // "kvm" is free but "docker" is taken; the whole registration fails.
        assert!(err_builder
            .register(backend("hybrid", vec!["kvm", "docker"]))
            .is_err());

        let registry = BackendRegistry::builder()
            .register(backend("docker", vec!["docker"]))
            .unwrap()
            .build();
        assert!(registry.resolve("kvm").is_none());
    }
}
