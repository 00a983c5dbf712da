//! # Objar: lazy service container for Rust
//!
//! Define services as named factories, resolve them on demand, and get the
//! same instance back every time. Factories resolve their own
//! dependencies from the container while they run; a dependency cycle is
//! reported as soon as it closes, with the full chain of names.
//!
//! ```rust
//! use objar::prelude::*;
//!
//! let container = Container::new();
//! container
//!     .define("config", |_| Ok(Some(String::from("debug"))))?
//!     .define("app", |c| {
//!         let config = c.resolve_as::<String>("config")?;
//!         Ok(Some(format!("app ({config})")))
//!     })?;
//!
//! assert_eq!(container.resolve_as::<String>("app")?.as_str(), "app (debug)");
//! # Ok::<(), ObjarError>(())
//! ```

pub use objar_container::*;
pub use objar_support::*;
