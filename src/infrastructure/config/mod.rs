//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;

pub use logging::{LogHandle, LoggingConfig};
pub use settings::Config;
