// src/candidates.rs
//
// Candidate pass generation.
//
// Pass geometry is modelled as i.i.d. draws, not orbital mechanics:
// - elevation     ~ U(15, 90) deg
// - duration      ~ U(10, 60) min
// - time to pass  ~ U(0, 48) h
// - noise floor   depends on NoiseMode
//
// All sampling goes through a caller-supplied RNG, so a seeded run is
// reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::types::{ContinuousState, PassCandidate};

/// Default batch size per epoch.
pub const DEFAULT_NUM_PASSES: usize = 100;

pub const ELEVATION_RANGE_DEG: (f64, f64) = (15.0, 90.0);
pub const DURATION_RANGE_MIN: (f64, f64) = (10.0, 60.0);
pub const TIME_UNTIL_PASS_RANGE_H: (f64, f64) = (0.0, 48.0);

/// Noise floor used by `NoiseMode::Constant`.
pub const CONSTANT_NOISE_DBM: i32 = -106;
/// Inclusive range used by `NoiseMode::Bucket` (a single noise bucket).
pub const BUCKET_NOISE_RANGE_DBM: (i32, i32) = (-107, -105);
/// Inclusive range used by `NoiseMode::Random`.
pub const RANDOM_NOISE_RANGE_DBM: (i32, i32) = (-107, -93);

/// How the noise floor of each candidate is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseMode {
    /// Always -106 dBm.
    Constant,
    /// Uniform integer in {-107, -106, -105}.
    Bucket,
    /// Uniform integer in {-107, ..., -93}.
    Random,
}

impl NoiseMode {
    pub const ALL: [NoiseMode; 3] = [NoiseMode::Constant, NoiseMode::Bucket, NoiseMode::Random];

    pub fn name(self) -> &'static str {
        match self {
            NoiseMode::Constant => "constant",
            NoiseMode::Bucket => "bucket",
            NoiseMode::Random => "random",
        }
    }

    /// Case-insensitive parse. Unknown names are an error, never a default.
    pub fn parse(s: &str) -> Result<Self, SimError> {
        let key = s.trim().to_ascii_lowercase();
        let key = match key.as_str() {
            "const" => "constant",
            "rand" => "random",
            other => other,
        };
        NoiseMode::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| SimError::UnknownNoiseMode {
                value: s.to_string(),
            })
    }

    /// Draw one noise floor value.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> i32 {
        match self {
            NoiseMode::Constant => CONSTANT_NOISE_DBM,
            NoiseMode::Bucket => rng.gen_range(BUCKET_NOISE_RANGE_DBM.0..=BUCKET_NOISE_RANGE_DBM.1),
            NoiseMode::Random => rng.gen_range(RANDOM_NOISE_RANGE_DBM.0..=RANDOM_NOISE_RANGE_DBM.1),
        }
    }
}

impl std::str::FromStr for NoiseMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Produces one batch of candidate passes per epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassCandidateGenerator {
    noise_mode: NoiseMode,
    num_passes: usize,
}

impl PassCandidateGenerator {
    pub fn new(noise_mode: NoiseMode, num_passes: usize) -> Self {
        Self {
            noise_mode,
            num_passes,
        }
    }

    pub fn noise_mode(&self) -> NoiseMode {
        self.noise_mode
    }

    pub fn num_passes(&self) -> usize {
        self.num_passes
    }

    /// Draw a single candidate.
    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> PassCandidate {
        let elevation_deg = rng.gen_range(ELEVATION_RANGE_DEG.0..ELEVATION_RANGE_DEG.1);
        let duration_min = rng.gen_range(DURATION_RANGE_MIN.0..DURATION_RANGE_MIN.1);
        let time_until_pass_h = rng.gen_range(TIME_UNTIL_PASS_RANGE_H.0..TIME_UNTIL_PASS_RANGE_H.1);
        let noise_dbm = self.noise_mode.sample(rng);
        PassCandidate {
            state: ContinuousState {
                elevation_deg,
                duration_min,
                noise_dbm,
            },
            time_until_pass_h,
        }
    }

    /// Replace the contents of `out` with a fresh batch.
    pub fn fill_batch<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Vec<PassCandidate>) {
        out.clear();
        out.reserve(self.num_passes);
        for _ in 0..self.num_passes {
            out.push(self.sample_one(rng));
        }
    }

    /// Allocate and return a fresh batch.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<PassCandidate> {
        let mut out = Vec::with_capacity(self.num_passes);
        self.fill_batch(rng, &mut out);
        out
    }
}
