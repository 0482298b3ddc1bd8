//! Event-data model for particle-flow clusters.
//!
//! Hits are produced once per event and shared between every cluster that claims a
//! fraction of them, so clusters hold `Arc<RecHit>` handles rather than copies.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pseudorapidity returned for points on the beam axis, offset by `z`.
const ETA_MAX: f64 = 22756.0;

/// Raw detector identifier of a reconstructed hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetId(pub u32);

impl fmt::Display for DetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Detector layer / depth segment a hit was recorded in.
///
/// Variants follow the particle-flow layer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    #[default]
    None,
    EcalBarrel,
    EcalEndcap,
    Ps1,
    Ps2,
    HcalBarrel1,
    HcalBarrel2,
    HcalEndcap,
    HfEm,
    HfHad,
    Hgcal,
}

/// A single calibrated detector deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecHit {
    pub det_id: DetId,
    /// Calibrated energy (GeV)
    pub energy: f64,
    /// Cartesian position of the cell front face (cm)
    pub position: Point3<f64>,
    pub layer: Layer,
}

impl RecHit {
    pub fn new(det_id: DetId, energy: f64, position: Point3<f64>, layer: Layer) -> Self {
        Self {
            det_id,
            energy,
            position,
            layer,
        }
    }
}

/// Share of one hit's energy attributed to a particular cluster.
#[derive(Debug, Clone)]
pub struct RecHitFraction {
    hit: Arc<RecHit>,
    fraction: f64,
}

impl RecHitFraction {
    pub fn new(hit: Arc<RecHit>, fraction: f64) -> Self {
        Self { hit, fraction }
    }

    pub fn hit(&self) -> &RecHit {
        &self.hit
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Energy this fraction contributes: raw hit energy times the fraction.
    pub fn energy(&self) -> f64 {
        self.hit.energy * self.fraction
    }
}

/// Secondary (rho, eta, phi) representation of a cluster position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionRep {
    pub rho: f64,
    pub eta: f64,
    pub phi: f64,
}

impl PositionRep {
    pub fn from_point(p: &Point3<f64>) -> Self {
        let rho = p.x.hypot(p.y);
        let phi = if rho == 0.0 { 0.0 } else { p.y.atan2(p.x) };
        let eta = if rho > 0.0 {
            (p.z / rho).asinh()
        } else if p.z == 0.0 {
            0.0
        } else if p.z > 0.0 {
            p.z + ETA_MAX
        } else {
            p.z - ETA_MAX
        };
        Self { rho, eta, phi }
    }
}

/// A particle-flow cluster.
///
/// The seed and hit fractions are set by the clustering stage. Energy, layer,
/// position, axis and the derived position-rep are outputs of a position calculator.
#[derive(Debug, Clone)]
pub struct Cluster {
    seed: Option<DetId>,
    fractions: Vec<RecHitFraction>,
    energy: f64,
    layer: Layer,
    position: Point3<f64>,
    axis: Vector3<f64>,
    position_rep: PositionRep,
}

impl Default for Cluster {
    fn default() -> Self {
        Self {
            seed: None,
            fractions: Vec::new(),
            energy: 0.0,
            layer: Layer::None,
            position: Point3::origin(),
            axis: Vector3::zeros(),
            position_rep: PositionRep::default(),
        }
    }
}

impl Cluster {
    pub fn new(seed: Option<DetId>, fractions: Vec<RecHitFraction>) -> Self {
        Self {
            seed,
            fractions,
            ..Self::default()
        }
    }

    pub fn seed(&self) -> Option<DetId> {
        self.seed
    }

    pub fn fractions(&self) -> &[RecHitFraction] {
        &self.fractions
    }

    /// The fraction whose hit is the seed, if the seed is set and present.
    pub fn seed_fraction(&self) -> Option<&RecHitFraction> {
        let seed = self.seed?;
        self.fractions.iter().find(|f| f.hit().det_id == seed)
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn position(&self) -> &Point3<f64> {
        &self.position
    }

    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }

    pub fn position_rep(&self) -> &PositionRep {
        &self.position_rep
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy;
    }

    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn set_axis(&mut self, axis: Vector3<f64>) {
        self.axis = axis;
    }

    /// Recompute the (rho, eta, phi) representation from the current position.
    pub fn calculate_position_rep(&mut self) {
        self.position_rep = PositionRep::from_point(&self.position);
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster seed=")?;
        match self.seed {
            Some(seed) => write!(f, "{seed}")?,
            None => write!(f, "none")?,
        }
        write!(
            f,
            " E={:.4} layer={:?} pos=({:.3}, {:.3}, {:.3}) nhits={}",
            self.energy,
            self.layer,
            self.position.x,
            self.position.y,
            self.position.z,
            self.fractions.len()
        )
    }
}
