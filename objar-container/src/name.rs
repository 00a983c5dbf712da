//! Service identification.
//!
//! [`ServiceName`] uniquely identifies a service definition within the
//! container. Names are plain strings; two definitions with the same name
//! are the same service.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Uniquely identifies a service in the container.
///
/// Cheap to clone (`Arc<str>` inside) and usable as a map key that can be
/// looked up by `&str`.
///
/// # Examples
/// ```
/// use objar_container::name::ServiceName;
///
/// let name = ServiceName::from("database");
/// assert_eq!(name.as_str(), "database");
/// assert_eq!(name, ServiceName::from(String::from("database")));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(Arc<str>);

impl ServiceName {
    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty or whitespace only.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ServiceName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for ServiceName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

// Hash/Eq of Arc<str> delegate to str, so this is consistent.
impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServiceName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceName({:?})", &*self.0)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ServiceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn name_equality() {
        assert_eq!(ServiceName::from("a"), ServiceName::from("a"));
        assert_ne!(ServiceName::from("a"), ServiceName::from("b"));
        assert_eq!(ServiceName::from("a"), "a");
    }

    #[test]
    fn name_in_hashmap_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ServiceName::from("mailer"), 1);
        map.insert(ServiceName::from("logger"), 2);
        assert_eq!(map.get("mailer"), Some(&1));
        assert_eq!(map.get("queue"), None);
    }

    #[test]
    fn blank_names() {
        assert!(ServiceName::from("").is_blank());
        assert!(ServiceName::from("  \t").is_blank());
        assert!(!ServiceName::from("a").is_blank());
    }

    #[test]
    fn display_and_debug() {
        let name = ServiceName::from("db");
        assert_eq!(name.to_string(), "db");
        assert_eq!(format!("{name:?}"), "ServiceName(\"db\")");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ServiceName::from("db")).unwrap();
        assert_eq!(json, "\"db\"");
    }
}
