//! TOML representation of weight profiles.
//!
//! These structs mirror the on-disk format one-to-one and carry no invariants; the
//! [`ProfileRegistry`](super::ProfileRegistry) converts them into validated domain types.
//!
//! ```toml
//! [[profile]]
//! challenge = "challenge1"
//!
//! [[profile.category]]
//! id = "binding"
//! weight = 50.0
//!
//! [[profile.category.metric]]
//! id = "ipsae"
//! weight = 30.0
//! valid-min = 0.0
//! valid-max = 1.0
//! transform = { kind = "linear", floor = 0.4, ceiling = 1.0, direction = "higher-is-better" }
//!
//! [[profile.gate]]
//! metric = "ipsae"
//! at-least = 0.6
//!
//! [[profile]]
//! challenge = "challenge2"
//! derive-from = "challenge1"
//! exclude = ["dockq"]
//! ```

use super::definition::{Bound, Direction};
use crate::core::models::ids::{CategoryId, ChallengeId, MetricId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSetFile {
    #[serde(default, rename = "profile")]
    pub profiles: Vec<ProfileFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProfileFile {
    pub challenge: ChallengeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive_from: Option<ChallengeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<MetricId>,
    #[serde(default, rename = "category", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryFile>,
    #[serde(default, rename = "gate", skip_serializing_if = "Vec::is_empty")]
    pub gates: Vec<GateFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryFile {
    pub id: CategoryId,
    pub weight: f64,
    #[serde(rename = "metric")]
    pub metrics: Vec<MetricFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MetricFile {
    pub id: MetricId,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_max: Option<f64>,
    pub transform: TransformFile,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum TransformFile {
    Linear {
        floor: f64,
        ceiling: f64,
        direction: Direction,
    },
    Piecewise {
        knots: Vec<[f64; 2]>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GateFile {
    pub metric: MetricId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_least: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_most: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProfileSetFile {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn profile_mut(&mut self, challenge: &ChallengeId) -> Option<&mut ProfileFile> {
        self.profiles.iter_mut().find(|p| &p.challenge == challenge)
    }

    /// Default hackathon profiles. Challenge 2 has no docking reference, so its profile is
    /// derived from Challenge 1 by excluding DockQ.
    pub fn builtin() -> Self {
        let challenge1 = ProfileFile {
            challenge: "challenge1".into(),
            derive_from: None,
            exclude: Vec::new(),
            categories: vec![
                CategoryFile {
                    id: "binding".into(),
                    weight: 50.0,
                    metrics: vec![
                        linear("prodigy_dg", 40.0, (-15.0, -5.0), LOWER, (None, None)),
                        linear("ipsae", 30.0, (0.4, 1.0), HIGHER, UNIT),
                        linear("dockq", 30.0, (0.0, 1.0), HIGHER, UNIT),
                    ],
                },
                CategoryFile {
                    id: "developability".into(),
                    weight: 30.0,
                    metrics: vec![
                        linear("netsolp", 60.0, (0.0, 1.0), HIGHER, UNIT),
                        linear("cdr_sasa", 40.0, (250.0, 1000.0), HIGHER, (Some(0.0), None)),
                    ],
                },
                CategoryFile {
                    id: "novelty".into(),
                    weight: 20.0,
                    metrics: vec![linear(
                        "cdrh3_identity",
                        100.0,
                        (0.0, 100.0),
                        LOWER,
                        (Some(0.0), Some(100.0)),
                    )],
                },
            ],
            gates: vec![
                gate("ipsae", Bound::AtLeast(0.6), "ipSAE < 0.60"),
                gate("netsolp", Bound::AtLeast(0.5), "NetSolP < 0.50"),
                gate("prodigy_dg", Bound::AtMost(-6.0), "DeltaG > -6 kcal/mol"),
                gate("cdr_sasa", Bound::Above(250.0), "CDR SASA <= 250 A^2"),
                gate("cdrh3_identity", Bound::Below(95.0), "CDR3 identity >= 95 percent"),
            ],
        };

        let challenge2 = ProfileFile {
            challenge: "challenge2".into(),
            derive_from: Some("challenge1".into()),
            exclude: vec!["dockq".into()],
            categories: Vec::new(),
            gates: Vec::new(),
        };

        Self {
            profiles: vec![challenge1, challenge2],
        }
    }
}

const HIGHER: Direction = Direction::HigherIsBetter;
const LOWER: Direction = Direction::LowerIsBetter;
const UNIT: (Option<f64>, Option<f64>) = (Some(0.0), Some(1.0));

fn linear(
    id: &str,
    weight: f64,
    (floor, ceiling): (f64, f64),
    direction: Direction,
    (valid_min, valid_max): (Option<f64>, Option<f64>),
) -> MetricFile {
    MetricFile {
        id: id.into(),
        weight,
        valid_min,
        valid_max,
        transform: TransformFile::Linear {
            floor,
            ceiling,
            direction,
        },
    }
}

fn gate(metric: &str, bound: Bound, reason: &str) -> GateFile {
    let mut file = GateFile {
        metric: metric.into(),
        at_least: None,
        at_most: None,
        above: None,
        below: None,
        reason: Some(reason.to_string()),
    };
    match bound {
        Bound::AtLeast(t) => file.at_least = Some(t),
        Bound::AtMost(t) => file.at_most = Some(t),
        Bound::Above(t) => file.above = Some(t),
        Bound::Below(t) => file.below = Some(t),
    }
    file
}
