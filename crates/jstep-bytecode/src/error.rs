//! Bytecode errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing descriptors or resolving bytecode
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// Malformed type or method descriptor
    #[error("Invalid descriptor `{0}`")]
    InvalidDescriptor(String),

    /// Malformed method identifier
    #[error("Invalid method id `{0}`")]
    InvalidMethodId(String),

    /// The provider has no class of this name
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// The class exists but declares no such method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// A class file could not be decoded
    #[error("Malformed class file {}: {source}", path.display())]
    Malformed {
        /// Path of the offending file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// IO error while reading the class path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
