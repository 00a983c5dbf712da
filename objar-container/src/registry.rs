//! Service registry: stores the factory for every defined name.
//!
//! The registry maps [`ServiceName`] to factory functions that know how to
//! create instances. It is consulted lazily, on the first `resolve` of a
//! name, so definitions may be added at any time before that.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::container::Container;
use crate::error::{AlreadyDefinedError, ObjarError};
use crate::name::ServiceName;

/// A resolved service instance.
///
/// Instances are singletons: every `resolve` of a name returns a clone of
/// the same `Arc`, so identity can be checked with [`Arc::ptr_eq`].
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased factory function.
///
/// Receives the container it is resolving in (to resolve its own
/// dependencies) and returns `Ok(None)` when it produced nothing.
pub type FactoryFn = Arc<dyn Fn(&Container) -> Result<Option<Instance>, ObjarError> + Send + Sync>;

/// Stores all service definitions.
#[derive(Default)]
pub(crate) struct Registry {
    definitions: HashMap<ServiceName, FactoryFn>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a factory under `name`.
    ///
    /// Returns `true` if a previous definition was replaced.
    ///
    /// # Errors
    /// Returns [`ObjarError::AlreadyDefined`] if the name is taken and
    /// `allow_redefine` is false.
    pub fn define(
        &mut self,
        name: ServiceName,
        factory: FactoryFn,
        allow_redefine: bool,
    ) -> Result<bool, ObjarError> {
        if !allow_redefine && self.definitions.contains_key(&name) {
            return Err(ObjarError::AlreadyDefined(AlreadyDefinedError { name }));
        }

        let replaced = self.definitions.insert(name.clone(), factory).is_some();
        debug!(service = %name, replaced, "Defined service");
        Ok(replaced)
    }

    /// Looks up the factory for `name`.
    pub fn get(&self, name: &str) -> Option<&FactoryFn> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Returns the number of defined services.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns all defined names, sorted.
    pub fn names(&self) -> Vec<ServiceName> {
        let mut names: Vec<_> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &self.names())
            .finish()
    }
}
