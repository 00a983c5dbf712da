//! # The Container: heart of Objar
//!
//! A registry of named factories that builds each service lazily, on first
//! request, and memoizes the result for the lifetime of the container.
//!
//! Factories receive the container they are resolving in and may resolve
//! other services from it while they run. The dependency graph is therefore
//! discovered edge by edge during resolution; cycles are detected on the
//! fly through the resolution path (see [`crate::path`]).
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──clone()──> Container (same state)
//!                                   │
//!                              downgrade()
//!                                   │
//!                                   ▼
//!                             WeakContainer
//! ```
//!
//! # Examples
//! ```rust
//! use objar_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container
//!     .define("db", |_| {
//!         Ok(Some(Database { url: "postgres://localhost".into() }))
//!     })?
//!     .define("users", |c| {
//!         let db = c.resolve_as::<Database>("db")?;
//!         Ok(Some(UserService { db }))
//!     })?;
//!
//! let users = container.resolve_as::<UserService>("users")?;
//! assert_eq!(users.db.url, "postgres://localhost");
//! # Ok::<(), ObjarError>(())
//! ```

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use objar_support::rendering::{render_chain, suggest_similar};
use parking_lot::ReentrantMutex;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{CircularDependencyError, NotDefinedError, ObjarError, Result};
use crate::invoke::{self, Annotation};
use crate::name::ServiceName;
use crate::path::ResolutionPath;
use crate::provider::Provider;
use crate::registry::{FactoryFn, Instance, Registry};
use crate::snapshot::ContainerSnapshot;

/// How many "did you mean?" names a `NotDefined` error carries.
const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with options and provider modules.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .allow_redefine(false)
///     .add_provider(StorageProvider)
///     .add_provider(MailProvider)
///     .build()?;
/// ```
pub struct ContainerBuilder {
    allow_redefine: bool,
    providers: Vec<Box<dyn Provider>>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            allow_redefine: true,
            providers: Vec::new(),
        }
    }

    /// Allow `define` to overwrite an existing definition (default `true`).
    pub fn allow_redefine(mut self, allow: bool) -> Self {
        self.allow_redefine = allow;
        self
    }

    /// Add a [`Provider`] module, registered in order by [`build`](Self::build).
    pub fn add_provider(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Build the container and run every provider against it.
    ///
    /// # Errors
    /// The first error returned by a provider.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        info!(
            providers = self.providers.len(),
            allow_redefine = self.allow_redefine,
            "Building container"
        );

        let container = Container::with_options(self.allow_redefine);
        for provider in &self.providers {
            container.add_provider(provider.as_ref())?;
        }

        info!(defined = container.len(), "Container built");
        Ok(container)
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("allow_redefine", &self.allow_redefine)
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Everything `resolve` reads and mutates.
struct State {
    registry: Registry,
    resolved: HashMap<ServiceName, Instance>,
    path: ResolutionPath,
}

struct Inner {
    allow_redefine: bool,
    // Held for the whole of `resolve`. Re-entry from factories on the same
    // thread passes; other threads wait. The RefCell is never borrowed
    // while a factory runs.
    state: ReentrantMutex<RefCell<State>>,
}

/// Lazy, memoizing service container.
///
/// Cloning is cheap and yields another handle to the same services.
/// A factory may resolve through the `&Container` it receives or through a
/// handle it captured; both reach the same state and follow the same rules.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Create an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(true)
    }

    /// Create a builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    fn with_options(allow_redefine: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                allow_redefine,
                state: ReentrantMutex::new(RefCell::new(State {
                    registry: Registry::new(),
                    resolved: HashMap::new(),
                    path: ResolutionPath::new(),
                })),
            }),
        }
    }

    // ── Definitions ──

    /// Define a service.
    ///
    /// The factory runs at most once, on the first successful
    /// [`resolve`](Self::resolve) of `name`. Returning `Ok(None)` means it
    /// produced nothing, which fails with [`ObjarError::EmptyDefinition`].
    ///
    /// Redefining a name replaces its factory. A name that was already
    /// resolved keeps its memoized instance.
    ///
    /// # Errors
    /// - [`ObjarError::InvalidDefinition`] for a blank name
    /// - [`ObjarError::AlreadyDefined`] if redefinition is disabled
    pub fn define<T, F>(&self, name: impl Into<ServiceName>, factory: F) -> Result<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<Option<T>> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move |container: &Container| {
            Ok(factory(container)?.map(|value| Arc::new(value) as Instance))
        });
        self.define_factory(name, factory)
    }

    /// Define a service from a pre-built value.
    ///
    /// The value is cloned once, when the service is first resolved.
    pub fn define_value<T>(&self, name: impl Into<ServiceName>, value: T) -> Result<&Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.define(name, move |_| Ok(Some(value.clone())))
    }

    /// Define a service from an already type-erased factory.
    pub fn define_factory(&self, name: impl Into<ServiceName>, factory: FactoryFn) -> Result<&Self> {
        let name = name.into();
        if name.is_blank() {
            return Err(ObjarError::InvalidDefinition {
                name,
                reason: "service names must not be blank".to_string(),
            });
        }

        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.resolved.contains_key(name.as_str()) {
            debug!(service = %name, "Service already resolved, new definition will not be used");
        }
        state.registry.define(name, factory, self.inner.allow_redefine)?;
        Ok(self)
    }

    /// Run a [`Provider`] module against this container.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<&Self> {
        debug!(provider = provider.name(), "Registering provider");
        provider.register(self)?;
        Ok(self)
    }

    /// Returns `true` if `name` has a definition.
    pub fn is_defined(&self, name: &str) -> bool {
        let guard = self.inner.state.lock();
        guard.borrow().registry.contains(name)
    }

    // ── Resolution ──

    /// Resolve the singleton instance for `name`.
    ///
    /// 1. Prune names that have been memoized from the resolution path.
    /// 2. Return the memoized instance if there is one.
    /// 3. Fail with a cycle if `name` is still on the path.
    /// 4. Push `name` on the path.
    /// 5. Look up its factory.
    /// 6. Run the factory with this container.
    /// 7. Reject an empty result.
    /// 8. Memoize and return.
    ///
    /// A failure (a missing definition, a factory error, a cycle detected
    /// by a nested `resolve`) leaves `name` on the path. Every later request
    /// for it reports the same cycle, while unrelated names keep resolving.
    /// An empty factory result is the exception: `name` is released and the
    /// factory runs again on the next request.
    ///
    /// # Errors
    /// - [`ObjarError::CircularDependency`]: `name` is still awaiting its
    ///   own resolution
    /// - [`ObjarError::NotDefined`]: no factory for `name`
    /// - [`ObjarError::EmptyDefinition`]: the factory returned nothing
    /// - anything the factory itself returns, unchanged
    #[instrument(skip(self), level = "debug", name = "resolve")]
    pub fn resolve(&self, name: &str) -> Result<Instance> {
        let guard = self.inner.state.lock();

        let (name, factory) = {
            let mut state = guard.borrow_mut();
            let State {
                registry,
                resolved,
                path,
            } = &mut *state;

            let pruned = path.prune(|in_flight| resolved.contains_key(in_flight));
            if pruned > 0 {
                trace!(pruned, "Pruned resolved services from the resolution path");
            }

            if let Some(instance) = resolved.get(name) {
                trace!("Memo hit");
                return Ok(Arc::clone(instance));
            }

            if path.contains(name) {
                let chain = path.cycle();
                warn!(cycle = %render_chain(&chain), "Circular dependency detected");
                return Err(ObjarError::CircularDependency(CircularDependencyError { chain }));
            }

            let name = ServiceName::from(name);
            path.push(name.clone());

            // stays on the path: a second request reports a cycle
            let Some(factory) = registry.get(name.as_str()).cloned() else {
                return Err(ObjarError::NotDefined(NotDefinedError {
                    suggestions: suggestions(registry, name.as_str()),
                    requested: name,
                }));
            };

            (name, factory)
        };

        debug!(service = %name, "Invoking factory");
        let produced = match factory(self) {
            Ok(produced) => produced,
            Err(err) => {
                debug!(service = %name, error = %err, "Factory failed, service stays in flight");
                return Err(err);
            }
        };

        // the one failure that leaves the path, so the factory runs again next time
        let Some(instance) = produced else {
            guard.borrow_mut().path.remove(name.as_str());
            return Err(ObjarError::EmptyDefinition { name });
        };

        let instance = Arc::clone(guard.borrow_mut().resolved.entry(name.clone()).or_insert(instance));
        debug!(service = %name, "Memoized service");
        Ok(instance)
    }

    /// Resolve `name` and downcast it to `T`.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.resolve_as("db")?;
    /// ```
    ///
    /// # Errors
    /// Everything [`resolve`](Self::resolve) returns, plus
    /// [`ObjarError::TypeMismatch`] if the instance is not a `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.resolve(name)?
            .downcast::<T>()
            .map_err(|_| ObjarError::TypeMismatch {
                name: name.into(),
                expected: type_name::<T>(),
            })
    }

    /// Call an annotated function with its services resolved.
    ///
    /// `annotated` lists service names followed by a callable. Each name is
    /// resolved in order through [`resolve`](Self::resolve), then the
    /// callable receives the instances in the same order. Its return value
    /// is passed back untouched.
    ///
    /// # Errors
    /// [`ObjarError::InvalidInvocation`] for a malformed list; resolution
    /// errors propagate unchanged.
    #[instrument(skip_all, level = "debug", name = "invoke")]
    pub fn invoke<R>(&self, annotated: Vec<Annotation<'_, R>>) -> Result<R> {
        let (names, callable) = invoke::split(annotated)?;
        debug!(dependencies = %render_chain(&names), "Invoking annotated function");

        let args = names
            .iter()
            .map(|name| self.resolve(name.as_str()))
            .collect::<Result<Vec<_>>>()?;

        Ok(callable(args))
    }

    // ── Introspection ──

    /// Returns `true` if `name` has a memoized instance.
    pub fn is_resolved(&self, name: &str) -> bool {
        let guard = self.inner.state.lock();
        guard.borrow().resolved.contains_key(name)
    }

    /// Names currently on the resolution path, oldest first.
    pub fn resolution_path(&self) -> Vec<ServiceName> {
        let guard = self.inner.state.lock();
        guard.borrow().path.names().to_vec()
    }

    /// Number of defined services.
    pub fn len(&self) -> usize {
        let guard = self.inner.state.lock();
        guard.borrow().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture the container's bookkeeping for diagnostics.
    pub fn snapshot(&self) -> ContainerSnapshot {
        let guard = self.inner.state.lock();
        let state = guard.borrow();

        let mut resolved: Vec<_> = state.resolved.keys().cloned().collect();
        resolved.sort();

        ContainerSnapshot {
            defined: state.registry.names(),
            resolved,
            resolution_path: state.path.names().to_vec(),
        }
    }

    /// A handle that does not keep the container alive.
    ///
    /// Factories that want to capture the container should capture this
    /// rather than a clone, which would keep the container alive forever.
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        f.debug_struct("Container")
            .field("defined", &state.registry.len())
            .field("resolved", &state.resolved.len())
            .field("in_flight", &state.path.len())
            .finish()
    }
}

fn suggestions(registry: &Registry, requested: &str) -> Vec<String> {
    let names = registry.names();
    let available: Vec<&str> = names.iter().map(ServiceName::as_str).collect();
    suggest_similar(requested, &available, MAX_SUGGESTIONS)
}

// ═══════════════════════════════════════════
// WeakContainer
// ═══════════════════════════════════════════

/// Non-owning handle to a [`Container`].
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<Inner>,
}

impl WeakContainer {
    /// The container, if it is still alive.
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl fmt::Debug for WeakContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContainer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, WeakContainer};
    pub use crate::error::{ObjarError, Result};
    pub use crate::invoke::Annotation;
    pub use crate::name::ServiceName;
    pub use crate::provider::Provider;
    pub use crate::registry::Instance;
    pub use crate::snapshot::ContainerSnapshot;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
