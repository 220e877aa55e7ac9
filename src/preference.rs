// src/preference.rs
//
// Ground-truth success probability of a pass.
//
// Each model is a product of three logistic gates:
//   p = σ(k_a (a - c_a)) · σ(k_d (d - c_d)) · σ(k_n (n - c_n))
//
// The transmitter never sees these probabilities; it only observes the
// Bernoulli outcomes drawn from them.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::types::ContinuousState;

/// Standard logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// One logistic gate `σ(k (x - c))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticGate {
    pub slope: f64,
    pub center: f64,
}

impl LogisticGate {
    pub const fn new(slope: f64, center: f64) -> Self {
        Self { slope, center }
    }

    pub fn eval(&self, x: f64) -> f64 {
        sigmoid(self.slope * (x - self.center))
    }
}

/// Fixed set of ground-truth preference shapes.
///
/// `HighAngleShortPass` uses the gates (0.5, 70), (-0.5, 20), (-1, -102).
/// An older revision defined model 3 as
/// `σ(0.5(a-30))·σ(0.5(d-10))·σ(-(n+96))`; that shape is not provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceModel {
    /// Model 1: high angle, long duration, low noise.
    #[serde(rename = "high-angle-long")]
    HighAngleLongPass,
    /// Model 2: mid-high angle, mid-long duration, mid-low noise.
    #[serde(rename = "mid-angle-mid")]
    MidAngleMidPass,
    /// Model 3: high angle, short duration, low noise.
    #[serde(rename = "high-angle-short")]
    HighAngleShortPass,
}

impl PreferenceModel {
    pub const ALL: [PreferenceModel; 3] = [
        PreferenceModel::HighAngleLongPass,
        PreferenceModel::MidAngleMidPass,
        PreferenceModel::HighAngleShortPass,
    ];

    /// Gates in (angle, duration, noise) order.
    pub fn gates(self) -> [LogisticGate; 3] {
        match self {
            PreferenceModel::HighAngleLongPass => [
                LogisticGate::new(0.5, 70.0),
                LogisticGate::new(0.5, 35.0),
                LogisticGate::new(-1.0, -102.0),
            ],
            PreferenceModel::MidAngleMidPass => [
                LogisticGate::new(0.5, 50.0),
                LogisticGate::new(0.5, 20.0),
                LogisticGate::new(-1.0, -99.0),
            ],
            PreferenceModel::HighAngleShortPass => [
                LogisticGate::new(0.5, 70.0),
                LogisticGate::new(-0.5, 20.0),
                LogisticGate::new(-1.0, -102.0),
            ],
        }
    }

    /// Probability in (0, 1) that a transmission on this pass succeeds.
    pub fn success_probability(self, state: &ContinuousState) -> f64 {
        let [ga, gd, gn] = self.gates();
        ga.eval(state.elevation_deg) * gd.eval(state.duration_min) * gn.eval(state.noise_dbm as f64)
    }

    /// 1-based model number used on the command line.
    pub fn number(self) -> u8 {
        match self {
            PreferenceModel::HighAngleLongPass => 1,
            PreferenceModel::MidAngleMidPass => 2,
            PreferenceModel::HighAngleShortPass => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PreferenceModel::HighAngleLongPass => "high-angle-long",
            PreferenceModel::MidAngleMidPass => "mid-angle-mid",
            PreferenceModel::HighAngleShortPass => "high-angle-short",
        }
    }

    /// Accepts the model number or its name (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, SimError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "high-angle-long" => Ok(PreferenceModel::HighAngleLongPass),
            "2" | "mid-angle-mid" => Ok(PreferenceModel::MidAngleMidPass),
            "3" | "high-angle-short" => Ok(PreferenceModel::HighAngleShortPass),
            _ => Err(SimError::UnknownPreferenceModel {
                value: s.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for PreferenceModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
