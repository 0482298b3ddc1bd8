//! # pfc-core
//!
//! Core types and errors for particle-flow cluster reconstruction.
//!
//! - **Types**: detector hits, hit fractions, clusters, layer tags and the
//!   (rho, eta, phi) position representation
//! - **Errors**: unified error handling with [`ClusterError`]
//!
//! ```text
//! ┌──────────────┐
//! │  pfc-core    │  ← event-data model
//! └──────────────┘
//!        ▲
//! ┌──────┴───────┐
//! │ pfc-position │  ← PCA position calculator, batch driver
//! └──────────────┘
//!        ▲
//! ┌──────┴───────┐
//! │   pfc-cli    │
//! └──────────────┘
//! ```

pub mod errors;
pub mod types;

pub use errors::{ClusterError, Result};
pub use types::{Cluster, DetId, Layer, PositionRep, RecHit, RecHitFraction};
