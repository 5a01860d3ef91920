use std::{collections::HashMap, fmt, sync::Arc};

use greenbutton_model::ServiceKind;
use once_cell::sync::OnceCell;

use super::{ElectricityInterpreter, Interpreter};

static GLOBAL_REGISTRY: OnceCell<Arc<InterpreterRegistry>> = OnceCell::new();

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("interpreter registry is already installed")]
    AlreadyInstalled,
}

/// Maps usage point kind codes to interpreters.
#[derive(Clone, Default)]
pub struct InterpreterRegistry {
    interpreters: HashMap<u32, Arc<dyn Interpreter>>,
}

impl fmt::Debug for InterpreterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl InterpreterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the electricity interpreter bound to kind 0.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ServiceKind::Electricity.code(), ElectricityInterpreter);
        registry
    }

    /// Binds `interpreter` to `kind`, returning the one it replaces.
    pub fn register<I>(&mut self, kind: u32, interpreter: I) -> Option<Arc<dyn Interpreter>>
    where
        I: Interpreter + 'static,
    {
        let name = ServiceKind::from_code(kind).map(ServiceKind::name).unwrap_or("custom");
        tracing::debug!(kind, name, "registering interpreter");
        self.interpreters.insert(kind, Arc::new(interpreter))
    }

    pub fn lookup(&self, kind: u32) -> Option<&dyn Interpreter> {
        self.interpreters.get(&kind).map(|i| i.as_ref())
    }

    pub fn kinds(&self) -> Vec<u32> {
        let mut kinds: Vec<u32> = self.interpreters.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

/// Freezes `registry` as the process-wide registry. Only the first call
/// (or the first [`global`] call) wins.
pub fn install(registry: InterpreterRegistry) -> Result<(), RegistryError> {
    GLOBAL_REGISTRY
        .set(Arc::new(registry))
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// The process-wide registry, installing the defaults if none was set.
pub fn global() -> Arc<InterpreterRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(InterpreterRegistry::with_defaults()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::FeedGraph, interpreters::InterpretError, local_time::LocalTimeConverter};
    use greenbutton_model::{DataDescription, Entry};

    struct Fixed;

    impl Interpreter for Fixed {
        fn interpret(
            &self,
            usage_point: &Entry,
            _graph: &FeedGraph,
            _clock: &LocalTimeConverter,
        ) -> Result<DataDescription, InterpretError> {
            Ok(DataDescription::new(usage_point.updated))
        }
    }

    #[test]
    fn defaults_cover_only_electricity() {
        let registry = InterpreterRegistry::with_defaults();
        assert_eq!(registry.kinds(), vec![0]);
        assert!(registry.lookup(0).is_some());
        assert!(registry.lookup(1).is_none());
        assert!(registry.lookup(99).is_none());
    }

    #[test]
    fn register_replaces_existing_binding() {
        let mut registry = InterpreterRegistry::with_defaults();
        assert!(registry.register(1, Fixed).is_none());
        assert!(registry.register(1, Fixed).is_some());
        assert_eq!(registry.kinds(), vec![0, 1]);
    }

    #[test]
    fn global_registry_is_frozen_once_installed() {
        let _ = install(InterpreterRegistry::with_defaults());
        assert_eq!(install(InterpreterRegistry::new()), Err(RegistryError::AlreadyInstalled));
        assert!(global().lookup(0).is_some());
    }
}
