// src/baseline.rs
//
// Non-learning control: same candidate pipeline, uniform choice, no
// value-table updates. Its long-run success rate is the expectation of the
// preference model over the candidate distribution.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::candidates::{NoiseMode, PassCandidateGenerator};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::policy::{PassSelector, UniformChoice};
use crate::preference::PreferenceModel;
use crate::simulator::{success_curve, success_rate, with_pool, Transmitter};

/// Success matrix of a baseline run, indexed `[transmitter][epoch]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineResult {
    pub success: Vec<Vec<bool>>,
}

impl BaselineResult {
    pub fn num_transmitters(&self) -> usize {
        self.success.len()
    }

    pub fn num_epochs(&self) -> usize {
        self.success.first().map(Vec::len).unwrap_or(0)
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(&self.success)
    }

    pub fn success_curve(&self) -> Vec<f64> {
        success_curve(&self.success)
    }
}

/// Uniform-random control simulator.
#[derive(Debug, Clone)]
pub struct BaselineSimulator {
    config: SimConfig,
}

impl BaselineSimulator {
    /// `lambda` and `record_history` in the config are ignored.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// One row per entry of `models`.
    pub fn run_models(&self, models: &[PreferenceModel]) -> Result<BaselineResult, SimError> {
        if models.is_empty() {
            return Err(SimError::validation("transmitters", "must not be empty"));
        }
        let cfg = &self.config;
        let generator = PassCandidateGenerator::new(cfg.noise_mode, cfg.num_passes);

        info!(
            transmitters = models.len(),
            epochs = cfg.num_epochs,
            noise_mode = cfg.noise_mode.name(),
            policy = UniformChoice.name(),
            seed = cfg.seed,
            "baseline start"
        );

        let success: Vec<Vec<bool>> = with_pool(cfg.threads, || {
            models
                .par_iter()
                .enumerate()
                .map(|(i, &model)| {
                    let mut rng = ChaCha8Rng::seed_from_u64(cfg.transmitter_seed(i));
                    // Scratch transmitter: update = false keeps its table at
                    // the optimistic layer, and UniformChoice never reads it.
                    let mut tx = Transmitter::new(model);
                    (0..cfg.num_epochs)
                        .map(|_| tx.step(&generator, &UniformChoice, false, &mut rng).success)
                        .collect::<Vec<bool>>()
                })
                .collect()
        })?;

        let result = BaselineResult { success };
        info!(success_rate = result.success_rate(), "baseline done");
        Ok(result)
    }

    /// `num_transmitters` rows, all using the configured preference model.
    pub fn run(&self) -> Result<BaselineResult, SimError> {
        let models = vec![self.config.preference_model; self.config.num_transmitters];
        self.run_models(&models)
    }
}

/// Run the baseline for the given transmitters (their preference models are
/// used; their value tables are not touched).
pub fn run_baseline(
    transmitters: &[Transmitter],
    epochs: usize,
    noise_mode: NoiseMode,
    seed: u64,
) -> Result<BaselineResult, SimError> {
    let config = SimConfig {
        num_transmitters: transmitters.len(),
        num_epochs: epochs,
        noise_mode,
        seed,
        ..SimConfig::default()
    };
    let models: Vec<PreferenceModel> = transmitters.iter().map(Transmitter::model).collect();
    BaselineSimulator::new(config)?.run_models(&models)
}

/// Monte Carlo estimate of E[p] over the candidate distribution, i.e. the
/// success rate a uniform chooser converges to.
pub fn expected_success_rate<R: Rng + ?Sized>(
    model: PreferenceModel,
    noise_mode: NoiseMode,
    samples: usize,
    rng: &mut R,
) -> f64 {
    if samples == 0 {
        return 0.0;
    }
    let generator = PassCandidateGenerator::new(noise_mode, 1);
    let sum: f64 = (0..samples)
        .map(|_| model.success_probability(&generator.sample_one(rng).state))
        .sum();
    sum / samples as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_untouched_tables() {
        let txs = vec![
            Transmitter::new(PreferenceModel::HighAngleLongPass),
            Transmitter::new(PreferenceModel::MidAngleMidPass),
        ];
        let r = run_baseline(&txs, 30, NoiseMode::Bucket, 5).unwrap();
        assert_eq!(r.num_transmitters(), 2);
        assert_eq!(r.num_epochs(), 30);
        for tx in &txs {
            assert!(tx.table().current_layer().iter().all(|&v| v == 1.0));
            assert_eq!(tx.visits().total(), 0);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let cfg = SimConfig {
            num_transmitters: 3,
            num_epochs: 40,
            num_passes: 10,
            ..SimConfig::default()
        };
        let a = BaselineSimulator::new(cfg.clone()).unwrap().run().unwrap();
        let b = BaselineSimulator::new(cfg).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expected_rate_is_a_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for m in PreferenceModel::ALL {
            let e = expected_success_rate(m, NoiseMode::Random, 2000, &mut rng);
            assert!((0.0..=1.0).contains(&e));
        }
    }

    #[test]
    fn rejects_empty_input() {
        assert!(run_baseline(&[], 10, NoiseMode::Random, 1).is_err());
    }
}
