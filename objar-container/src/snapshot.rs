//! Point-in-time view of a container's bookkeeping.

use serde::Serialize;

use crate::name::ServiceName;

/// What a container knows at the moment [`snapshot`] was taken.
///
/// [`snapshot`]: crate::container::Container::snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSnapshot {
    /// Names with a definition, sorted.
    pub defined: Vec<ServiceName>,
    /// Names with a memoized instance, sorted.
    pub resolved: Vec<ServiceName>,
    /// Names still on the resolution path, oldest first.
    pub resolution_path: Vec<ServiceName>,
}

impl ContainerSnapshot {
    /// Names on the path that will never resolve in this container.
    ///
    /// Outside of a running `resolve`, anything left on the path belongs to
    /// a resolution that failed inside its factory.
    pub fn stuck(&self) -> Vec<&ServiceName> {
        self.resolution_path
            .iter()
            .filter(|name| !self.resolved.contains(*name))
            .collect()
    }
}
