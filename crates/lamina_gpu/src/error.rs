//! Error types for lamina_gpu

use std::io;
use thiserror::Error;

/// Errors raised by host-side layer record handling.
///
/// The shading kernel itself has no error states; these cover decoding,
/// batching and configuration.
#[derive(Error, Debug)]
pub enum LayerError {
    /// A byte slice did not hold exactly one layer record
    #[error("invalid layer record length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A write targeted a slot past the end of the batch
    #[error("layer slot {slot} out of range (batch holds {len} records)")]
    SlotOutOfRange { slot: usize, len: usize },

    /// `end_layer` was called twice for the same slot
    #[error("layer slot {slot} already closed")]
    SlotClosed { slot: usize },

    /// The batch already holds `max_layers` records
    #[error("layer batch is full ({capacity} records)")]
    BatchFull { capacity: usize },

    /// The layer shader failed to parse or validate
    #[error("layer shader error: {0}")]
    Shader(String),

    /// Malformed renderer configuration
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error when reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for lamina_gpu operations
pub type Result<T> = std::result::Result<T, LayerError>;
