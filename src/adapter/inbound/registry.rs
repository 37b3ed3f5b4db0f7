//! Static entry-point registry.
//!
//! Functions are compiled into the host binary and registered under their
//! `module.function` handler string. Resolution looks the handler up; the
//! code path only identifies the deployment in logs.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::domain::HandlerSpec;
use crate::error::EntryPointError;
use crate::port::inbound::{EntryPoint, EntryPointResolver};

/// Entry points keyed by handler.
#[derive(Clone, Default)]
pub struct EntryPointRegistry {
    entries: HashMap<String, Arc<dyn EntryPoint>>,
}

impl EntryPointRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry_point` under `handler`, replacing any earlier one.
    ///
    /// The handler is normalized the same way specialization parses it, so
    /// `"echo"` registers `main.echo`.
    #[must_use]
    pub fn register(mut self, handler: &str, entry_point: impl EntryPoint + 'static) -> Self {
        let key = HandlerSpec::parse(handler).to_string();
        self.entries.insert(key, Arc::new(entry_point));
        self
    }

    #[must_use]
    pub fn handlers(&self) -> Vec<&str> {
        let mut handlers: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        handlers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EntryPointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPointRegistry")
            .field("handlers", &self.handlers())
            .finish()
    }
}

impl EntryPointResolver for EntryPointRegistry {
    fn resolve(
        &self,
        code_path: &Path,
        handler: &HandlerSpec,
    ) -> Result<Arc<dyn EntryPoint>, EntryPointError> {
        let key = handler.to_string();
        let entry_point = self
            .entries
            .get(&key)
            .cloned()
            .ok_or_else(|| EntryPointError::NotFound {
                handler: key.clone(),
            })?;
        debug!(code_path = %code_path.display(), handler = %key, "entry point resolved");
        Ok(entry_point)
    }
}
