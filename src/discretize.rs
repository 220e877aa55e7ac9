// src/discretize.rs
//
// Continuous pass features -> 5x5x5 bucket indices.
//
// Thresholds use strict comparisons; anything not above the lowest
// threshold (including NaN) lands in bucket 1.

use crate::types::{ContinuousState, DiscreteState};

const ANGLE_THRESHOLDS_DEG: [f64; 4] = [75.0, 60.0, 45.0, 30.0];
const DURATION_THRESHOLDS_MIN: [f64; 4] = [50.0, 40.0, 30.0, 20.0];
const NOISE_THRESHOLDS_DBM: [i32; 4] = [-104, -101, -98, -95];

fn bucket_above(x: f64, thresholds: &[f64; 4]) -> u8 {
    for (i, t) in thresholds.iter().enumerate() {
        if x > *t {
            return 5 - i as u8;
        }
    }
    1
}

/// Angle bucket: >75 -> 5, >60 -> 4, >45 -> 3, >30 -> 2, else 1.
pub fn angle_bucket(angle_deg: f64) -> u8 {
    bucket_above(angle_deg, &ANGLE_THRESHOLDS_DEG)
}

/// Duration bucket: >50 -> 5, >40 -> 4, >30 -> 3, >20 -> 2, else 1.
pub fn duration_bucket(duration_min: f64) -> u8 {
    bucket_above(duration_min, &DURATION_THRESHOLDS_MIN)
}

/// Noise bucket: lower noise is better, so <-104 -> 5 down to else 1.
pub fn noise_bucket(noise_dbm: i32) -> u8 {
    for (i, t) in NOISE_THRESHOLDS_DBM.iter().enumerate() {
        if noise_dbm < *t {
            return 5 - i as u8;
        }
    }
    1
}

/// Map raw pass features to their discrete state.
pub fn discretize(angle_deg: f64, duration_min: f64, noise_dbm: i32) -> DiscreteState {
    DiscreteState {
        angle: angle_bucket(angle_deg),
        duration: duration_bucket(duration_min),
        noise: noise_bucket(noise_dbm),
    }
}

impl From<&ContinuousState> for DiscreteState {
    fn from(s: &ContinuousState) -> Self {
        discretize(s.elevation_deg, s.duration_min, s.noise_dbm)
    }
}
