// src/config.rs
//
// Run configuration for the pass-selection learner.
//
// `SimConfig::default()` is the reference setup (100 transmitters,
// 1000 epochs, 100 candidate passes per epoch, λ = 0.9, full-range noise,
// preference model 1). Research sweeps override it through environment
// variables or CLI flags; CLI flags win.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::candidates::{NoiseMode, DEFAULT_NUM_PASSES};
use crate::error::SimError;
use crate::preference::PreferenceModel;

pub const DEFAULT_TRANSMITTERS: usize = 100;
pub const DEFAULT_EPOCHS: usize = 1000;
pub const DEFAULT_LAMBDA: f64 = 0.9;
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of independently simulated transmitters.
    pub num_transmitters: usize,
    /// Decision epochs per transmitter.
    pub num_epochs: usize,
    /// Candidate passes offered per epoch.
    pub num_passes: usize,
    /// Discount factor λ ∈ [0, 1] applied per hour of waiting.
    pub lambda: f64,
    /// Noise floor generation mode.
    pub noise_mode: NoiseMode,
    /// Ground-truth preference model shared by all transmitters.
    pub preference_model: PreferenceModel,
    /// Base seed. Transmitter i uses `seed + i`.
    pub seed: u64,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Keep every value-table layer for inspection (O(125 · epochs) memory).
    pub record_history: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_transmitters: DEFAULT_TRANSMITTERS,
            num_epochs: DEFAULT_EPOCHS,
            num_passes: DEFAULT_NUM_PASSES,
            lambda: DEFAULT_LAMBDA,
            noise_mode: NoiseMode::Random,
            preference_model: PreferenceModel::HighAngleLongPass,
            seed: DEFAULT_SEED,
            threads: None,
            record_history: false,
        }
    }
}

impl SimConfig {
    /// Fail fast on configurations that would silently produce wrong or
    /// empty output.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_transmitters == 0 {
            return Err(SimError::validation("num_transmitters", "must be >= 1"));
        }
        if self.num_epochs == 0 {
            return Err(SimError::validation("num_epochs", "must be >= 1"));
        }
        if self.num_passes == 0 {
            return Err(SimError::validation("num_passes", "must be >= 1"));
        }
        if !self.lambda.is_finite() || !(0.0..=1.0).contains(&self.lambda) {
            return Err(SimError::validation(
                "lambda",
                format!("must be in [0, 1], got {}", self.lambda),
            ));
        }
        if self.threads == Some(0) {
            return Err(SimError::validation("threads", "must be >= 1 when set"));
        }
        Ok(())
    }

    /// Seed for the transmitter at `index`.
    pub fn transmitter_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }

    /// Defaults plus environment overrides:
    ///
    ///   - PASSLEARN_TRANSMITTERS  (usize)
    ///   - PASSLEARN_EPOCHS        (usize)
    ///   - PASSLEARN_PASSES        (usize)
    ///   - PASSLEARN_LAMBDA        (f64)
    ///   - PASSLEARN_NOISE_MODE    (constant | bucket | random)
    ///   - PASSLEARN_MODEL         (1 | 2 | 3 or model name)
    ///   - PASSLEARN_SEED          (u64)
    ///
    /// Any variable that fails to parse is ignored with a warning.
    /// Range checks are left to [`SimConfig::validate`].
    pub fn from_env_or_default() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "PASSLEARN_TRANSMITTERS", |s| s.parse::<usize>().ok()) {
            self.num_transmitters = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_EPOCHS", |s| s.parse::<usize>().ok()) {
            self.num_epochs = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_PASSES", |s| s.parse::<usize>().ok()) {
            self.num_passes = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_LAMBDA", |s| s.parse::<f64>().ok()) {
            self.lambda = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_NOISE_MODE", |s| NoiseMode::parse(s).ok()) {
            self.noise_mode = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_MODEL", |s| PreferenceModel::parse(s).ok()) {
            self.preference_model = v;
        }
        if let Some(v) = parse_override(&lookup, "PASSLEARN_SEED", |s| s.parse::<u64>().ok()) {
            self.seed = v;
        }
        self
    }
}

fn parse_override<F, T, P>(lookup: &F, key: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::fmt::Debug,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(key)?;
    match parse(raw.trim()) {
        Some(v) => {
            info!(key, value = ?v, "config override");
            Some(v)
        }
        None => {
            warn!(key, raw = %raw, "could not parse config override; using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sizes_fail_fast() {
        for field in ["num_transmitters", "num_epochs", "num_passes"] {
            let mut cfg = SimConfig::default();
            match field {
                "num_transmitters" => cfg.num_transmitters = 0,
                "num_epochs" => cfg.num_epochs = 0,
                _ => cfg.num_passes = 0,
            }
            match cfg.validate() {
                Err(SimError::ValidationError { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn lambda_out_of_range_fails() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let cfg = SimConfig {
                lambda: bad,
                ..SimConfig::default()
            };
            assert!(cfg.validate().is_err(), "lambda {bad} accepted");
        }
        for ok in [0.0, 1.0] {
            let cfg = SimConfig {
                lambda: ok,
                ..SimConfig::default()
            };
            assert!(cfg.validate().is_ok());
        }
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = SimConfig::default().with_env_overrides(lookup(&[
            ("PASSLEARN_TRANSMITTERS", "7"),
            ("PASSLEARN_EPOCHS", "250"),
            ("PASSLEARN_LAMBDA", "0.5"),
            ("PASSLEARN_NOISE_MODE", "bucket"),
            ("PASSLEARN_MODEL", "3"),
            ("PASSLEARN_SEED", "99"),
        ]));
        assert_eq!(cfg.num_transmitters, 7);
        assert_eq!(cfg.num_epochs, 250);
        assert_eq!(cfg.lambda, 0.5);
        assert_eq!(cfg.noise_mode, NoiseMode::Bucket);
        assert_eq!(cfg.preference_model, PreferenceModel::HighAngleShortPass);
        assert_eq!(cfg.seed, 99);
    }

    #[test]
    fn unparsable_env_values_are_ignored() {
        let cfg = SimConfig::default().with_env_overrides(lookup(&[
            ("PASSLEARN_EPOCHS", "lots"),
            ("PASSLEARN_NOISE_MODE", "loud"),
        ]));
        assert_eq!(cfg.num_epochs, DEFAULT_EPOCHS);
        assert_eq!(cfg.noise_mode, NoiseMode::Random);
    }

    #[test]
    fn transmitter_seeds_are_offsets() {
        let cfg = SimConfig {
            seed: u64::MAX,
            ..SimConfig::default()
        };
        assert_eq!(cfg.transmitter_seed(0), u64::MAX);
        assert_eq!(cfg.transmitter_seed(1), 0);
    }
}
