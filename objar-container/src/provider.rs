//! Provider trait: a module of related service definitions.
//!
//! Providers group definitions by concern so a large application does not
//! end up with one giant block of `define` calls.
//!
//! # Examples
//! ```rust
//! use objar_container::prelude::*;
//!
//! struct StorageProvider;
//!
//! impl Provider for StorageProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container
//!             .define_value("storage.url", String::from("sqlite::memory:"))?
//!             .define("storage", |c| {
//!                 let url = c.resolve_as::<String>("storage.url")?;
//!                 Ok(Some(format!("storage at {url}")))
//!             })?;
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::builder().add_provider(StorageProvider).build()?;
//! assert!(container.is_defined("storage"));
//! # Ok::<(), ObjarError>(())
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that defines related services in a container.
pub trait Provider: Send + Sync {
    /// Define this provider's services in `container`.
    fn register(&self, container: &Container) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
