use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    ReadTree {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Entry point resolution errors.
#[derive(Error, Debug)]
pub enum EntryPointError {
    #[error("no entry point registered for handler '{handler}'")]
    NotFound { handler: String },
}

/// Errors that abort specialization. None of them leave the host specialized.
#[derive(Error, Debug)]
pub enum SpecializationError {
    #[error("function metadata is missing {field}")]
    MetadataMissing { field: &'static str },

    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to provision {client} client: {reason}")]
    Provisioning { client: &'static str, reason: String },

    #[error("host is already specialized")]
    AlreadySpecialized,

    #[error("config resolution task failed: {0}")]
    ResolveTask(#[from] tokio::task::JoinError),
}

/// Per-request dispatch errors.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("generic container: no requests supported before specialization")]
    NotSpecialized,

    #[error("entry point failed: {0:#}")]
    Function(anyhow::Error),
}

/// Metrics emission errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("metrics push failed: {0}")]
    Push(#[from] reqwest::Error),

    #[error("metrics push rejected with status {status}")]
    Rejected { status: u16 },

    #[error("invalid metrics endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },
}

/// Message queue errors.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("message producer is not provisioned")]
    Unavailable,

    #[error("failed to send to topic '{topic}': {reason}")]
    Send { topic: String, reason: String },
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("key-value client is not provisioned")]
    Unavailable,

    #[error("key-value operation failed: {0}")]
    Backend(String),
}

/// Outbound function call errors.
#[derive(Error, Debug)]
pub enum OutboundError {
    #[error("invalid target url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("outbound request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("function identity '{value}' is not a valid header value")]
    SourceHeader { value: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Specialization(#[from] SpecializationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Kv(#[from] KvError),

    #[error(transparent)]
    Outbound(#[from] OutboundError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
