//! Error types for Objar container operations.
//!
//! Every failure is raised synchronously to the immediate caller.
//! Nothing is retried or recovered inside the container.

use std::fmt;

use objar_support::rendering::{render_chain, shorten_type_name};

use crate::name::ServiceName;

/// Main error type for all Objar operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjarError {
    /// A definition was rejected at `define` time.
    #[error("The service \"{name}\" definition is invalid: {reason}")]
    InvalidDefinition { name: ServiceName, reason: String },

    /// Redefinition attempted on a container built with `allow_redefine(false)`.
    #[error("{}", .0)]
    AlreadyDefined(AlreadyDefinedError),

    /// Requested service has no definition.
    #[error("{}", .0)]
    NotDefined(NotDefinedError),

    /// The factory ran but produced no value.
    #[error("The definition of the service \"{name}\" must return it")]
    EmptyDefinition { name: ServiceName },

    /// A service was requested while its own resolution was still in flight.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// `invoke` received a malformed annotation list.
    #[error("invoke() expects an annotated function: {reason}")]
    InvalidInvocation { reason: String },

    /// A resolved instance is not of the requested type.
    #[error("The service \"{name}\" is not a {}", shorten_type_name(.expected))]
    TypeMismatch {
        name: ServiceName,
        expected: &'static str,
    },

    /// A factory failed for a reason of its own.
    #[error("Failed to construct the service \"{name}\": {source}")]
    Factory {
        name: ServiceName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ObjarError {
    /// Wraps an application error raised inside a factory.
    ///
    /// ```
    /// use objar_container::error::ObjarError;
    ///
    /// let err = ObjarError::factory("db", "connection refused");
    /// assert!(err.to_string().contains("connection refused"));
    /// ```
    pub fn factory(
        name: impl Into<ServiceName>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Factory {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Returns the cycle chain if this is a circular dependency error.
    pub fn cycle(&self) -> Option<&[ServiceName]> {
        match self {
            Self::CircularDependency(err) => Some(&err.chain),
            _ => None,
        }
    }
}

/// Error when a service was never defined.
#[derive(Debug)]
pub struct NotDefinedError {
    /// The service that was requested
    pub requested: ServiceName,
    /// Defined services with similar names
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotDefinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The service \"{}\" is not defined", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when a circular dependency is detected.
///
/// The chain starts at the oldest name still awaiting resolution and
/// repeats it at the end to close the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependencyError {
    /// Example: `["A", "B", "C", "A"]`
    pub chain: Vec<ServiceName>,
}

impl CircularDependencyError {
    /// The chain joined with arrows, e.g. `A -> B -> A`.
    pub fn rendered(&self) -> String {
        render_chain(&self.chain)
    }
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected: {}", self.rendered())
    }
}

/// Error when redefinition is disabled and the name already exists.
#[derive(Debug)]
pub struct AlreadyDefinedError {
    pub name: ServiceName,
}

impl fmt::Display for AlreadyDefinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The service \"{}\" is already defined", self.name)?;
        write!(
            f,
            "\n  Hint: build the container with .allow_redefine(true) to overwrite definitions"
        )
    }
}

/// Convenient Result type for Objar operations.
pub type Result<T> = std::result::Result<T, ObjarError>;
