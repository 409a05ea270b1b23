//! Object paths identify the (namespace, class) pair a filter watches.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A watched object path. The canonical text form `namespace:ClassName` is
/// the identity used to key enumeration pairs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    pub namespace: String,
    pub class_name: String,
}

impl ObjectPath {
    pub fn new(
        namespace: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
        }
    }

    /// Canonical string form.
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.namespace, self.class_name)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.class_name)
    }
}
