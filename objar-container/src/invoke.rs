//! Annotated invocation.
//!
//! An annotated function is a list of service names followed by a callable.
//! [`Container::invoke`](crate::container::Container::invoke) resolves the
//! names in order and calls the callable with the instances.
//!
//! ```rust
//! use objar_container::prelude::*;
//!
//! let container = Container::new();
//! container.define("greeting", |_| Ok(Some("hello")))?;
//!
//! let shout = container.invoke(vec![
//!     "greeting".into(),
//!     Annotation::call(|args| {
//!         let greeting = args[0].downcast_ref::<&str>().copied().unwrap_or_default();
//!         greeting.to_uppercase()
//!     }),
//! ])?;
//! assert_eq!(shout, "HELLO");
//! # Ok::<(), objar_container::ObjarError>(())
//! ```

use std::fmt;

use crate::error::ObjarError;
use crate::name::ServiceName;
use crate::registry::Instance;

/// Callable at the end of an annotated function.
pub type Callable<'a, R> = Box<dyn FnOnce(Vec<Instance>) -> R + 'a>;

/// One element of an annotated function.
pub enum Annotation<'a, R> {
    /// A service to resolve and pass as the next argument.
    Service(ServiceName),
    /// The function to call with the resolved arguments.
    Callable(Callable<'a, R>),
}

impl<'a, R> Annotation<'a, R> {
    /// Wraps a callable.
    pub fn call(f: impl FnOnce(Vec<Instance>) -> R + 'a) -> Self {
        Self::Callable(Box::new(f))
    }
}

impl<R> From<&str> for Annotation<'_, R> {
    fn from(name: &str) -> Self {
        Self::Service(name.into())
    }
}

impl<R> From<String> for Annotation<'_, R> {
    fn from(name: String) -> Self {
        Self::Service(name.into())
    }
}

impl<R> From<ServiceName> for Annotation<'_, R> {
    fn from(name: ServiceName) -> Self {
        Self::Service(name)
    }
}

impl<R> fmt::Debug for Annotation<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(name) => f.debug_tuple("Service").field(name).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// Splits an annotated function into its service names and callable.
///
/// # Errors
/// [`ObjarError::InvalidInvocation`] when there are fewer than two
/// elements, the last one is not callable, or a callable appears before
/// the last position.
pub(crate) fn split<'a, R>(
    mut annotated: Vec<Annotation<'a, R>>,
) -> Result<(Vec<ServiceName>, Callable<'a, R>), ObjarError> {
    if annotated.len() < 2 {
        return Err(invalid(format!(
            "expected at least one service name and a callable, got {} element(s)",
            annotated.len()
        )));
    }

    let Some(Annotation::Callable(callable)) = annotated.pop() else {
        return Err(invalid("the last element must be callable".to_string()));
    };

    let names = annotated
        .into_iter()
        .enumerate()
        .map(|(position, annotation)| match annotation {
            Annotation::Service(name) => Ok(name),
            Annotation::Callable(_) => Err(invalid(format!(
                "element {position} is a callable, only the last element may be"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((names, callable))
}

fn invalid(reason: String) -> ObjarError {
    ObjarError::InvalidInvocation { reason }
}
