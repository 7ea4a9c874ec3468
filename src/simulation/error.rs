//! Error type shared by the simulation core.

use thiserror::Error;

/// Errors raised by networks, populations and configuration.
///
/// Per-agent runtime conditions (collisions, bad heading, falling behind the
/// viewport) are state transitions and never surface here.
#[derive(Debug, Error)]
pub enum SimError {
    /// Inference input length does not match the network's first layer.
    #[error("input has {actual} values but the network expects {expected}")]
    DimensionMismatch {
        /// Size of the first layer.
        expected: usize,
        /// Length of the vector that was supplied.
        actual: usize,
    },
    /// Copy or construction between incompatible topologies.
    #[error("topology {actual:?} does not match {expected:?}")]
    TopologyMismatch {
        /// Topology of the destination network.
        expected: Vec<usize>,
        /// Topology that was offered.
        actual: Vec<usize>,
    },
    /// A serialized model could not be read back.
    #[error("corrupt model: {0}")]
    CorruptModel(String),
    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Evolution was given a fitness slice of the wrong length.
    #[error("expected {expected} fitness values, got {actual}")]
    FitnessLength {
        /// Population size.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// File access failed while saving or loading.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be (de)serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the simulation core.
pub type Result<T> = std::result::Result<T, SimError>;
