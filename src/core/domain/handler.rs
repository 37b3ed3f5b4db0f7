//! Handler strings of the form `module.function`.

use std::fmt;

/// Module and function used when the handler omits them.
pub const DEFAULT_MODULE: &str = "main";
pub const DEFAULT_FUNCTION: &str = "main";

/// A parsed handler string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerSpec {
    module: String,
    function: String,
}

impl HandlerSpec {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    /// Parse a handler string.
    ///
    /// The last dot separates module from function, so `a.b.run` is module
    /// `a.b`, function `run`. Without a dot the whole string is the function
    /// in module `main`; an empty string is `main.main`.
    #[must_use]
    pub fn parse(handler: &str) -> Self {
        if handler.is_empty() {
            return Self::new(DEFAULT_MODULE, DEFAULT_FUNCTION);
        }
        match handler.rsplit_once('.') {
            Some((module, function)) => Self::new(module, function),
            None => Self::new(DEFAULT_MODULE, handler),
        }
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl Default for HandlerSpec {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE, DEFAULT_FUNCTION)
    }
}

impl fmt::Display for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}
