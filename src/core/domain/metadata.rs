//! Specialization request payload.
//!
//! Mirrors the JSON body posted to `/v2/specialize`:
//!
//! ```json
//! {
//!   "filepath": "/userfunc/deployarchive",
//!   "functionName": "handler.main",
//!   "FunctionMetadata": {
//!     "namespace": "default",
//!     "name": "hello",
//!     "managedFields": [{ "time": "2024-05-01T10:00:00Z" }],
//!     "creationTimestamp": "2024-04-01T10:00:00Z"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Update timestamp used when metadata carries none.
pub const UNKNOWN_UPDATE_TIME: &str = "unknown";

/// Body of a `/v2/specialize` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecializeRequest {
    /// Path of the deployed function code.
    pub filepath: String,
    /// Handler string, `module.function`.
    #[serde(rename = "functionName", default)]
    pub function_name: String,
    #[serde(rename = "FunctionMetadata", default)]
    pub metadata: FunctionMetadata,
}

/// Subset of the platform's object metadata the host consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetadata {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub managed_fields: Vec<ManagedField>,
    #[serde(default)]
    pub creation_timestamp: Option<String>,
}

/// One entry of the object's update history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagedField {
    #[serde(default)]
    pub time: Option<String>,
}

impl FunctionMetadata {
    /// Last update time: first update-history entry, then creation time,
    /// then [`UNKNOWN_UPDATE_TIME`].
    #[must_use]
    pub fn update_time(&self) -> String {
        self.managed_fields
            .first()
            .and_then(|field| field.time.as_deref())
            .filter(|time| !time.is_empty())
            .or_else(|| {
                self.creation_timestamp
                    .as_deref()
                    .filter(|time| !time.is_empty())
            })
            .unwrap_or(UNKNOWN_UPDATE_TIME)
            .to_string()
    }
}
