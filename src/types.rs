// src/types.rs
//
// Common shared types for the pass-selection learner.

use serde::{Deserialize, Serialize};

/// Number of buckets per state axis.
pub const BUCKETS_PER_AXIS: usize = 5;

/// Size of the discrete state space (5 x 5 x 5).
pub const STATE_COUNT: usize = BUCKETS_PER_AXIS * BUCKETS_PER_AXIS * BUCKETS_PER_AXIS;

/// Observable geometry and channel conditions of one satellite pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousState {
    /// Peak elevation angle in degrees, ~(15, 90].
    pub elevation_deg: f64,
    /// Pass duration in minutes, ~(10, 60].
    pub duration_min: f64,
    /// Background noise floor in dBm, ~[-107, -93].
    pub noise_dbm: i32,
}

/// Bucketed pass state. Each axis is in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteState {
    pub angle: u8,
    pub duration: u8,
    pub noise: u8,
}

impl DiscreteState {
    /// Build a state from 1-based bucket indices, clamping each to 1..=5.
    pub fn new(angle: u8, duration: u8, noise: u8) -> Self {
        let hi = BUCKETS_PER_AXIS as u8;
        Self {
            angle: angle.clamp(1, hi),
            duration: duration.clamp(1, hi),
            noise: noise.clamp(1, hi),
        }
    }

    /// Flat row-major index into a 125-entry table.
    pub fn index(self) -> usize {
        let b = BUCKETS_PER_AXIS;
        (self.angle as usize - 1) * b * b + (self.duration as usize - 1) * b + (self.noise as usize - 1)
    }

    /// Inverse of [`DiscreteState::index`].
    pub fn from_index(idx: usize) -> Self {
        let b = BUCKETS_PER_AXIS;
        let idx = idx.min(STATE_COUNT - 1);
        Self {
            angle: (idx / (b * b)) as u8 + 1,
            duration: ((idx / b) % b) as u8 + 1,
            noise: (idx % b) as u8 + 1,
        }
    }

    pub fn as_tuple(self) -> (u8, u8, u8) {
        (self.angle, self.duration, self.noise)
    }
}

/// One transmission opportunity offered to a transmitter in an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassCandidate {
    pub state: ContinuousState,
    /// Hours until the pass begins, ~U(0, 48).
    pub time_until_pass_h: f64,
}
