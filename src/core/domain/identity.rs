//! Function identity: the (namespace, name) pair every label and lookup keys on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node type label for functions in the flow graph.
pub const NODE_TYPE_FUNC: &str = "func";

/// Node type label for message queue topics in the flow graph.
pub const NODE_TYPE_KAFKA: &str = "kafka";

/// The namespace and name a host was specialized for.
///
/// The legacy specialization path binds no metadata, in which case both
/// parts are empty; see [`FunctionIdentity::is_anonymous`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdentity {
    namespace: String,
    name: String,
}

impl FunctionIdentity {
    /// Create an identity from a namespace and function name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when no metadata was bound.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.namespace.is_empty() && self.name.is_empty()
    }

    /// Flow-graph node name, `func.{namespace}.{name}`.
    #[must_use]
    pub fn flow_source(&self) -> String {
        format!("{NODE_TYPE_FUNC}.{}.{}", self.namespace, self.name)
    }

    /// Metric prefix and push job name, `{namespace}_{name}`.
    #[must_use]
    pub fn metric_prefix(&self) -> String {
        format!("{}_{}", self.namespace, self.name)
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
