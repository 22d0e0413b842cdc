//! Error types for the Connect4 client

use ethers::types::H256;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Connect4 client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to read contract artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed contract artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ABI error: {0}")]
    Abi(#[from] ethers::abi::Error),

    #[error("Contract has no function '{0}'")]
    UnknownFunction(String),

    #[error("Contract has no event named any of {0:?}")]
    UnknownEvent(Vec<&'static str>),

    #[error("Event {event} is missing parameter {param}")]
    MissingEventParam {
        event: &'static str,
        param: &'static str,
    },

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error("Transaction {operation} failed: {message}")]
    Transaction {
        operation: String,
        tx_hash: Option<H256>,
        message: String,
    },

    #[error("No receipt available for transaction {0:?}")]
    MissingReceipt(H256),

    #[error("Node reported no accounts")]
    NoAccounts,

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Configuration error in {field}: {message}")]
    Configuration { message: String, field: String },

    #[error("Console error: {0}")]
    Console(String),

    #[error("Subscription closed for {0}")]
    SubscriptionClosed(String),
}

impl ClientError {
    pub fn transaction(operation: &str, tx_hash: Option<H256>, message: impl Into<String>) -> Self {
        ClientError::Transaction {
            operation: operation.to_string(),
            tx_hash,
            message: message.into(),
        }
    }

    pub fn config(field: &str, message: impl Into<String>) -> Self {
        ClientError::Configuration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        ClientError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Type alias for the main result type used throughout the library
pub type ClientResult<T> = Result<T, ClientError>;

/// Logging configuration and initialization
pub mod logging {
    use std::env;
    use std::str::FromStr;
    use tracing::Level;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum LogFormat {
        Human,
        Json,
    }

    impl FromStr for LogFormat {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "human" | "text" => Ok(LogFormat::Human),
                "json" => Ok(LogFormat::Json),
                other => Err(format!("unknown log format '{}'", other)),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum LogOutput {
        Stdout,
        Stderr,
    }

    impl FromStr for LogOutput {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "stdout" => Ok(LogOutput::Stdout),
                "stderr" => Ok(LogOutput::Stderr),
                other => Err(format!("unknown log output '{}'", other)),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        pub level: Level,
        pub format: LogFormat,
        pub output: LogOutput,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            // Stdout belongs to the prompt.
            Self {
                level: Level::WARN,
                format: LogFormat::Human,
                output: LogOutput::Stderr,
            }
        }
    }

    /// Install the global subscriber. `RUST_LOG` directives refine the
    /// configured level.
    pub fn init_logging(config: LoggingConfig) -> InitResult {
        let filter = EnvFilter::builder()
            .with_default_directive(config.level.into())
            .from_env_lossy()
            .add_directive("tungstenite=warn".parse()?)
            .add_directive("ethers_providers=info".parse()?);

        let writer = match config.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        };

        let layer = match config.format {
            LogFormat::Human => fmt::layer().with_writer(writer).with_target(true).compact().boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(writer)
                .json()
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        };

        tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        Ok(())
    }

    /// Read `C4_LOG_LEVEL`, `C4_LOG_FORMAT` and `C4_LOG_OUTPUT`, keeping the
    /// default for anything unset or unparseable
    pub fn config_from_env() -> LoggingConfig {
        fn var<T: FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|value| value.parse().ok())
        }

        let defaults = LoggingConfig::default();
        LoggingConfig {
            level: var("C4_LOG_LEVEL").unwrap_or(defaults.level),
            format: var("C4_LOG_FORMAT").unwrap_or(defaults.format),
            output: var("C4_LOG_OUTPUT").unwrap_or(defaults.output),
        }
    }

    pub fn init_from_env() -> InitResult {
        init_logging(config_from_env())
    }
}
