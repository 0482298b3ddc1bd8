//! Event file input and result output.
//!
//! Input (JSON):
//! ```json
//! {
//!   "rechits": [
//!     { "det_id": 1, "energy": 10.0, "position": [1.0, 0.0, 0.0], "layer": "HGCAL" }
//!   ],
//!   "clusters": [
//!     { "seed": 1, "fractions": [ { "det_id": 1, "fraction": 1.0 } ] }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use pfc_core::{Cluster, ClusterError, DetId, Layer, PositionRep, RecHit, RecHitFraction};
use pfc_position::{BatchReport, PcaCalculatorConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct EventFile {
    pub rechits: Vec<RecHit>,
    pub clusters: Vec<ClusterRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterRecord {
    #[serde(default)]
    pub seed: Option<DetId>,
    pub fractions: Vec<FractionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct FractionRecord {
    pub det_id: DetId,
    pub fraction: f64,
}

impl EventFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse event file {}", path.display()))
    }

    /// Resolve fraction references against the event's hits.
    pub fn into_clusters(self) -> Result<Vec<Cluster>> {
        let mut hits: HashMap<DetId, Arc<RecHit>> = HashMap::with_capacity(self.rechits.len());
        for hit in self.rechits {
            let det_id = hit.det_id;
            if hits.insert(det_id, Arc::new(hit)).is_some() {
                bail!("rechit {} appears more than once", det_id);
            }
        }

        self.clusters
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let fractions = record
                    .fractions
                    .iter()
                    .map(|f| match hits.get(&f.det_id) {
                        Some(hit) => Ok(RecHitFraction::new(Arc::clone(hit), f.fraction)),
                        None => bail!("cluster {} references unknown rechit {}", index, f.det_id),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Cluster::new(record.seed, fractions))
            })
            .collect()
    }
}

/// Computed outputs of one cluster.
#[derive(Debug, Serialize)]
pub struct ClusterResult {
    pub energy: f64,
    pub layer: Layer,
    pub position: [f64; 3],
    pub axis: [f64; 3],
    pub position_rep: PositionRep,
}

#[derive(Debug, Serialize)]
pub struct ClusterOutput {
    pub index: usize,
    pub seed: Option<DetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ClusterResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClusterOutput {
    pub fn accepted(index: usize, cluster: &Cluster) -> Self {
        let p = cluster.position();
        let a = cluster.axis();
        Self {
            index,
            seed: cluster.seed(),
            result: Some(ClusterResult {
                energy: cluster.energy(),
                layer: cluster.layer(),
                position: [p.x, p.y, p.z],
                axis: [a.x, a.y, a.z],
                position_rep: *cluster.position_rep(),
            }),
            error: None,
        }
    }

    pub fn rejected(index: usize, cluster: &Cluster, err: &ClusterError) -> Self {
        Self {
            index,
            seed: cluster.seed(),
            result: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub config: PcaCalculatorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
    pub rejected: usize,
    pub clusters: Vec<ClusterOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "rechits": [
            { "det_id": 1, "energy": 10.0, "position": [1.0, 0.0, 0.0], "layer": "ECAL_BARREL" },
            { "det_id": 2, "energy": 4.0, "position": [5.0, 0.0, 0.0], "layer": "HCAL_BARREL1" }
        ],
        "clusters": [
            { "seed": 1, "fractions": [ { "det_id": 1, "fraction": 1.0 }, { "det_id": 2, "fraction": 0.5 } ] },
            { "fractions": [ { "det_id": 2, "fraction": 0.5 } ] }
        ]
    }"#;

    #[test]
    fn test_resolves_shared_hits() {
        let event: EventFile = serde_json::from_str(EVENT).unwrap();
        let clusters = event.into_clusters().unwrap();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].seed(), Some(DetId(1)));
        assert_eq!(clusters[1].seed(), None);
        assert_eq!(clusters[0].fractions()[1].hit().layer, Layer::HcalBarrel1);
        assert!(std::ptr::eq(
            clusters[0].fractions()[1].hit(),
            clusters[1].fractions()[0].hit()
        ));
    }

    #[test]
    fn test_unknown_hit_is_an_error() {
        let event: EventFile = serde_json::from_str(
            r#"{ "rechits": [], "clusters": [ { "seed": 3, "fractions": [ { "det_id": 3, "fraction": 1.0 } ] } ] }"#,
        )
        .unwrap();
        let err = event.into_clusters().unwrap_err();
        assert!(err.to_string().contains("unknown rechit"));
    }

    #[test]
    fn test_duplicate_hit_is_an_error() {
        let event: EventFile = serde_json::from_str(
            r#"{ "rechits": [
                { "det_id": 1, "energy": 1.0, "position": [0.0, 0.0, 0.0], "layer": "HGCAL" },
                { "det_id": 1, "energy": 2.0, "position": [0.0, 0.0, 0.0], "layer": "HGCAL" }
            ], "clusters": [] }"#,
        )
        .unwrap();
        assert!(event.into_clusters().is_err());
    }
}
