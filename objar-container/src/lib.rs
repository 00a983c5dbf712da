//! Core container implementation for Objar.
//!
//! A [`Container`] maps service names to factories, builds each service on
//! its first request, memoizes it, and detects dependency cycles while the
//! graph is being discovered.

pub mod container;
pub mod error;
pub mod invoke;
pub mod name;
pub mod path;
pub mod provider;
pub mod registry;
pub mod snapshot;

pub use container::{Container, ContainerBuilder, WeakContainer, prelude};
pub use error::{ObjarError, Result};
pub use invoke::Annotation;
pub use name::ServiceName;
pub use provider::Provider;
pub use registry::{FactoryFn, Instance};
pub use snapshot::ContainerSnapshot;
