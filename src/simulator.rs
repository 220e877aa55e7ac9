// src/simulator.rs
//
// Online value-learning simulation.
//
// Per transmitter, each epoch:
//   1. generate a candidate batch
//   2. score candidates with the discounted softmax over the current layer
//   3. sample one candidate
//   4. bump the visit count of its discrete state
//   5. draw the outcome from the ground-truth preference model
//   6. record outcome and time-until-pass
//   7. (all but the last epoch) advance the value table at that state
//
// Transmitters are independent and run on a rayon pool. Each one owns a
// ChaCha8Rng seeded with `seed + index`, so results do not depend on the
// number of worker threads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::candidates::{NoiseMode, PassCandidateGenerator};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::metrics::{moving_average, RunningStats};
use crate::policy::{DiscountedSoftmax, PassSelector};
use crate::preference::PreferenceModel;
use crate::types::{DiscreteState, PassCandidate};
use crate::value_table::{ValueEstimateTable, VisitCounts};

/// One simulated ground device.
#[derive(Debug, Clone)]
pub struct Transmitter {
    model: PreferenceModel,
    table: ValueEstimateTable,
    visits: VisitCounts,
    batch: Vec<PassCandidate>,
}

/// What happened in a single epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochOutcome {
    pub selected_index: usize,
    pub candidate: PassCandidate,
    pub state: DiscreteState,
    pub success: bool,
    /// Visit count of `state` including this epoch.
    pub visit_count: u32,
}

/// Outcome rows for one transmitter over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransmitterRun {
    pub success: Vec<bool>,
    pub time_to_tx_h: Vec<f64>,
}

impl Transmitter {
    /// Fresh transmitter with an optimistic table and zero visit counts.
    pub fn new(model: PreferenceModel) -> Self {
        Self {
            model,
            table: ValueEstimateTable::optimistic(),
            visits: VisitCounts::new(),
            batch: Vec::new(),
        }
    }

    /// Like [`Transmitter::new`] but keeps every value-table layer.
    pub fn with_history(model: PreferenceModel) -> Self {
        Self {
            table: ValueEstimateTable::optimistic_with_history(),
            ..Self::new(model)
        }
    }

    pub fn model(&self) -> PreferenceModel {
        self.model
    }

    pub fn table(&self) -> &ValueEstimateTable {
        &self.table
    }

    pub fn visits(&self) -> &VisitCounts {
        &self.visits
    }

    /// Run one epoch. When `update` is false the value table is left as is
    /// (used for the final epoch of a run); visit counts still advance.
    pub fn step<S, R>(
        &mut self,
        generator: &PassCandidateGenerator,
        selector: &S,
        update: bool,
        rng: &mut R,
    ) -> EpochOutcome
    where
        S: PassSelector,
        R: Rng + ?Sized,
    {
        generator.fill_batch(rng, &mut self.batch);
        let selected_index = selector.select(&self.batch, &self.table, rng);
        let candidate = self.batch[selected_index];
        let state = DiscreteState::from(&candidate.state);

        // Count before reading the divisor so it is never zero.
        let visit_count = self.visits.increment(state);

        let p = self.model.success_probability(&candidate.state);
        let success = rng.gen_bool(p.clamp(0.0, 1.0));

        if update {
            let outcome = if success { 1.0 } else { 0.0 };
            self.table.advance(state, outcome, visit_count);
        }

        EpochOutcome {
            selected_index,
            candidate,
            state,
            success,
            visit_count,
        }
    }

    /// Forget everything learned: optimistic table, zero visit counts.
    /// Whether the table keeps history is preserved.
    pub fn reset(&mut self) {
        self.table = if self.table.keeps_history() {
            ValueEstimateTable::optimistic_with_history()
        } else {
            ValueEstimateTable::optimistic()
        };
        self.visits = VisitCounts::new();
    }

    /// Run `epochs` sequential epochs with the discounted softmax policy.
    ///
    /// Each run starts from a fresh table (see [`Transmitter::reset`]), so
    /// rerunning with the same RNG seed reproduces the same rows. `lambda`
    /// outside [0, 1] is rejected.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        epochs: usize,
        lambda: f64,
        generator: &PassCandidateGenerator,
        rng: &mut R,
    ) -> Result<TransmitterRun, SimError> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(SimError::validation(
                "lambda",
                format!("must be in [0, 1], got {lambda}"),
            ));
        }
        self.reset();

        let policy = DiscountedSoftmax::new(lambda);
        let mut out = TransmitterRun {
            success: Vec::with_capacity(epochs),
            time_to_tx_h: Vec::with_capacity(epochs),
        };
        for e in 0..epochs {
            let last = e + 1 == epochs;
            let o = self.step(generator, &policy, !last, rng);
            out.success.push(o.success);
            out.time_to_tx_h.push(o.candidate.time_until_pass_h);
        }
        Ok(out)
    }
}

/// Result matrices of a learning run, indexed `[transmitter][epoch]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub success: Vec<Vec<bool>>,
    pub time_to_tx_h: Vec<Vec<f64>>,
}

impl SimulationResult {
    fn from_runs(runs: Vec<TransmitterRun>) -> Self {
        let (success, time_to_tx_h) = runs.into_iter().map(|r| (r.success, r.time_to_tx_h)).unzip();
        Self {
            success,
            time_to_tx_h,
        }
    }

    pub fn num_transmitters(&self) -> usize {
        self.success.len()
    }

    pub fn num_epochs(&self) -> usize {
        self.success.first().map(Vec::len).unwrap_or(0)
    }

    /// Fraction of successful epochs over all transmitters.
    pub fn success_rate(&self) -> f64 {
        success_rate(&self.success)
    }

    /// Success rate of one transmitter.
    pub fn transmitter_success_rate(&self, index: usize) -> f64 {
        self.success.get(index).map(|row| row_rate(row)).unwrap_or(0.0)
    }

    /// Statistics of the realised time-until-pass over all epochs.
    pub fn time_to_tx_stats(&self) -> RunningStats {
        self.time_to_tx_h.iter().flatten().copied().collect()
    }

    /// Mean success per epoch, averaged over transmitters.
    pub fn success_curve(&self) -> Vec<f64> {
        success_curve(&self.success)
    }

    /// Moving average of [`SimulationResult::success_curve`].
    pub fn smoothed_success_curve(&self, window: usize) -> Vec<f64> {
        moving_average(&self.success_curve(), window)
    }
}

pub(crate) fn row_rate(row: &[bool]) -> f64 {
    if row.is_empty() {
        return 0.0;
    }
    row.iter().filter(|&&s| s).count() as f64 / row.len() as f64
}

pub(crate) fn success_rate(rows: &[Vec<bool>]) -> f64 {
    let total: usize = rows.iter().map(Vec::len).sum();
    if total == 0 {
        return 0.0;
    }
    let hits: usize = rows.iter().map(|r| r.iter().filter(|&&s| s).count()).sum();
    hits as f64 / total as f64
}

pub(crate) fn success_curve(rows: &[Vec<bool>]) -> Vec<f64> {
    let epochs = rows.first().map(Vec::len).unwrap_or(0);
    let n = rows.len().max(1) as f64;
    (0..epochs)
        .map(|e| rows.iter().filter(|r| r.get(e).copied().unwrap_or(false)).count() as f64 / n)
        .collect()
}

/// Run `f` on a dedicated pool of `threads` workers, or inline on the
/// global pool when `threads` is `None`.
pub(crate) fn with_pool<T, F>(threads: Option<usize>, f: F) -> Result<T, SimError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match threads {
        None => Ok(f()),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| SimError::ThreadPool {
                    message: e.to_string(),
                })?;
            Ok(pool.install(f))
        }
    }
}

/// Learning simulator for a population of transmitters.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimConfig,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Build `num_transmitters` fresh transmitters for the configured model.
    pub fn make_transmitters(&self) -> Vec<Transmitter> {
        (0..self.config.num_transmitters)
            .map(|_| {
                if self.config.record_history {
                    Transmitter::with_history(self.config.preference_model)
                } else {
                    Transmitter::new(self.config.preference_model)
                }
            })
            .collect()
    }

    /// Create transmitters from the config and run them.
    pub fn run(&self) -> Result<(SimulationResult, Vec<Transmitter>), SimError> {
        let mut transmitters = self.make_transmitters();
        let result = self.simulate(&mut transmitters)?;
        Ok((result, transmitters))
    }

    /// Run every transmitter for `num_epochs` epochs, mutating them in place.
    /// Transmitters are reset first, so earlier runs do not carry over.
    ///
    /// The slice length decides the number of rows; `num_transmitters` in
    /// the config is only used by [`Simulator::make_transmitters`].
    pub fn simulate(&self, transmitters: &mut [Transmitter]) -> Result<SimulationResult, SimError> {
        if transmitters.is_empty() {
            return Err(SimError::validation("transmitters", "must not be empty"));
        }
        let cfg = &self.config;
        let generator = PassCandidateGenerator::new(cfg.noise_mode, cfg.num_passes);

        info!(
            transmitters = transmitters.len(),
            epochs = cfg.num_epochs,
            passes = cfg.num_passes,
            lambda = cfg.lambda,
            noise_mode = cfg.noise_mode.name(),
            policy = DiscountedSoftmax::new(cfg.lambda).name(),
            seed = cfg.seed,
            "simulation start"
        );

        let runs: Vec<TransmitterRun> = with_pool(cfg.threads, || {
            transmitters
                .par_iter_mut()
                .enumerate()
                .map(|(i, tx)| {
                    let mut rng = ChaCha8Rng::seed_from_u64(cfg.transmitter_seed(i));
                    let run = tx.run(cfg.num_epochs, cfg.lambda, &generator, &mut rng)?;
                    debug!(
                        transmitter = i,
                        success_rate = row_rate(&run.success),
                        visited_states = tx.visits().visited_states(),
                        "transmitter done"
                    );
                    Ok(run)
                })
                .collect::<Result<Vec<_>, SimError>>()
        })??;

        let result = SimulationResult::from_runs(runs);
        info!(success_rate = result.success_rate(), "simulation done");
        Ok(result)
    }
}

/// Run a learning simulation over existing transmitters.
pub fn simulate(
    transmitters: &mut [Transmitter],
    epochs: usize,
    lambda: f64,
    noise_mode: NoiseMode,
    seed: u64,
) -> Result<SimulationResult, SimError> {
    let config = SimConfig {
        num_transmitters: transmitters.len(),
        num_epochs: epochs,
        lambda,
        noise_mode,
        seed,
        ..SimConfig::default()
    };
    Simulator::new(config)?.simulate(transmitters)
}
