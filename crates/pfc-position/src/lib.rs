//! # pfc-position
//!
//! Energy-weighted principal component analysis of particle-flow clusters.
//!
//! For every cluster the calculator derives:
//! - total energy (sum of fraction-weighted hit energies)
//! - layer of the most energetic contribution
//! - barycenter of the energy-replicated hit cloud
//! - dominant shower axis, signed into the barycenter's z hemisphere
//!
//! ```text
//! BatchProcessor ──► Cluster3DPcaCalculator ──► WeightedPointAccumulator
//!       │                     │
//!       └── reset per cluster └── writes energy, layer, position, axis
//! ```

pub mod accumulator;
pub mod batch;
pub mod calculator;
pub mod config;

pub use accumulator::{PrincipalAxes, WeightedPointAccumulator};
pub use batch::{BatchProcessor, BatchReport};
pub use calculator::{Cluster3DPcaCalculator, PositionCalculator};
pub use config::{PcaCalculatorConfig, SampleProjection};
