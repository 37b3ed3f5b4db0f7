//! Flow-edge telemetry samples.

use std::collections::BTreeMap;

use super::identity::{FunctionIdentity, NODE_TYPE_FUNC, NODE_TYPE_KAFKA};

/// Status label used while delivery results are not tracked.
pub const UNKNOWN_CODE: &str = "unknown";

/// Label set of one counter sample, ordered by label name.
pub type Labels = BTreeMap<String, String>;

/// One hop in the platform's call graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub source: String,
    pub destination: String,
    pub source_type: &'static str,
    pub destination_type: &'static str,
    pub method: &'static str,
    pub code: String,
}

impl FlowEdge {
    /// Edge from a function to a message queue topic.
    #[must_use]
    pub fn function_to_topic(identity: &FunctionIdentity, topic: &str) -> Self {
        Self {
            source: identity.flow_source(),
            destination: format!("{NODE_TYPE_KAFKA}.{topic}"),
            source_type: NODE_TYPE_FUNC,
            destination_type: NODE_TYPE_KAFKA,
            method: NODE_TYPE_KAFKA,
            code: UNKNOWN_CODE.to_string(),
        }
    }

    /// Counter labels for this edge.
    #[must_use]
    pub fn labels(&self) -> Labels {
        [
            ("source", self.source.as_str()),
            ("destination", self.destination.as_str()),
            ("stype", self.source_type),
            ("dtype", self.destination_type),
            ("method", self.method),
            ("code", self.code.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}
