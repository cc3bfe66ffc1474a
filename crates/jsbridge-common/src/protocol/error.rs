use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("QuickJS not initialized")]
    NotInitialized,

    #[error("Failed to create QuickJS runtime: {0}")]
    RuntimeCreation(String),

    #[error("Failed to create QuickJS context: {0}")]
    ContextCreation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Host bridge error: {0}")]
    HostBridge(String),

    #[error("Bytecode error: {0}")]
    Codec(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
