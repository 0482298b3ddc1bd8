//! Error types for cluster position reconstruction.

use crate::types::DetId;
use thiserror::Error;

/// Unified error type for all cluster reconstruction operations.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Cluster has no seed, or its seed is not one of its hit fractions
    #[error("Found a cluster with no seed: seed {seed:?} among {n_fractions} hit fractions")]
    MissingSeed {
        seed: Option<DetId>,
        n_fractions: usize,
    },

    /// A hit contribution carries a NaN or infinite energy
    #[error(
        "rechit {det_id} has a non-finite energy ({energy}); \
         the input of the particle flow clustering seems to be corrupted"
    )]
    CorruptInput { det_id: DetId, energy: f64 },

    /// A finite hit energy whose sample replication count is not representable
    #[error("rechit {det_id} energy {energy} overflows the PCA sample weight")]
    WeightOverflow { det_id: DetId, energy: f64 },

    /// No hit was heavy enough to produce a single weighted sample
    #[error("cluster seeded by {seed} produced no PCA samples (energy {energy})")]
    NoSamples { seed: DetId, energy: f64 },

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// I/O errors (config and event files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClusterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ClusterError::InvalidConfig(message.into())
    }

    /// Whether the error was raised by a single cluster's contents rather than by
    /// the environment. A caller running a batch may skip such clusters.
    pub fn is_cluster_local(&self) -> bool {
        matches!(
            self,
            ClusterError::MissingSeed { .. }
                | ClusterError::CorruptInput { .. }
                | ClusterError::WeightOverflow { .. }
                | ClusterError::NoSamples { .. }
        )
    }
}

/// Result type alias for cluster reconstruction.
pub type Result<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_identity() {
        let err = ClusterError::CorruptInput {
            det_id: DetId(0x1234),
            energy: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x00001234"), "{msg}");
        assert!(msg.contains("corrupted"));

        let err = ClusterError::MissingSeed {
            seed: None,
            n_fractions: 3,
        };
        assert!(err.to_string().contains("no seed"));
    }

    #[test]
    fn test_cluster_local_errors() {
        assert!(ClusterError::NoSamples {
            seed: DetId(1),
            energy: 0.0
        }
        .is_cluster_local());
        assert!(ClusterError::WeightOverflow {
            det_id: DetId(1),
            energy: f64::MAX
        }
        .is_cluster_local());
        assert!(!ClusterError::config("bad").is_cluster_local());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!ClusterError::from(io).is_cluster_local());
    }
}
