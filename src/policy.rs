// src/policy.rs
//
// Pass selection policies.
//
// Design:
// - PassSelector trait: pick one candidate index from a batch
// - DiscountedSoftmax: learned policy, weight_i = λ^t_i · V(s_i), softmax sample
// - UniformChoice: control policy, ignores estimates and λ
//
// Both take the RNG explicitly; neither holds mutable state.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::types::{DiscreteState, PassCandidate};
use crate::value_table::ValueEstimateTable;

/// Chooses which candidate pass to attempt in an epoch.
pub trait PassSelector {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Index into `candidates` of the chosen pass.
    ///
    /// `candidates` is never empty when called by the simulators.
    fn select<R: Rng + ?Sized>(
        &self,
        candidates: &[PassCandidate],
        table: &ValueEstimateTable,
        rng: &mut R,
    ) -> usize;
}

/// Numerically stable softmax.
///
/// Subtracts the maximum before exponentiating. All-equal inputs (including
/// all zeros) give a uniform distribution. Empty input gives an empty vector.
pub fn softmax(weights: &[f64]) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let max = weights
        .iter()
        .copied()
        .filter(|w| !w.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        let u = 1.0 / weights.len() as f64;
        return vec![u; weights.len()];
    }

    let mut out: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_nan() { 0.0 } else { (w - max).exp() })
        .collect();
    // The max entry contributes exp(0) = 1, so the sum is >= 1.
    let sum: f64 = out.iter().sum();
    for p in &mut out {
        *p /= sum;
    }
    out
}

/// Discounted softmax over learned value estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountedSoftmax {
    lambda: f64,
}

impl DiscountedSoftmax {
    /// `lambda` is clamped into [0, 1].
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: lambda.clamp(0.0, 1.0),
        }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// λ^t. With λ = 1 this is exactly 1 for every t.
    pub fn discount(&self, time_until_pass_h: f64) -> f64 {
        if self.lambda == 1.0 {
            1.0
        } else {
            self.lambda.powf(time_until_pass_h)
        }
    }

    /// Per-candidate weight `λ^t · V(discretize(state))`.
    pub fn weights(&self, candidates: &[PassCandidate], table: &ValueEstimateTable) -> Vec<f64> {
        candidates
            .iter()
            .map(|c| self.discount(c.time_until_pass_h) * table.get(DiscreteState::from(&c.state)))
            .collect()
    }

    /// Selection probabilities for a batch.
    pub fn probabilities(&self, candidates: &[PassCandidate], table: &ValueEstimateTable) -> Vec<f64> {
        softmax(&self.weights(candidates, table))
    }
}

/// Draw an index from a probability vector.
///
/// Falls back to a uniform draw if the vector cannot form a distribution.
pub fn sample_index<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(probs) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..probs.len().max(1)),
    }
}

impl PassSelector for DiscountedSoftmax {
    fn name(&self) -> &'static str {
        "discounted-softmax"
    }

    fn select<R: Rng + ?Sized>(
        &self,
        candidates: &[PassCandidate],
        table: &ValueEstimateTable,
        rng: &mut R,
    ) -> usize {
        let probs = self.probabilities(candidates, table);
        sample_index(&probs, rng)
    }
}

/// Uniform choice over the batch. Used by the non-learning baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformChoice;

impl PassSelector for UniformChoice {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn select<R: Rng + ?Sized>(
        &self,
        candidates: &[PassCandidate],
        _table: &ValueEstimateTable,
        rng: &mut R,
    ) -> usize {
        rng.gen_range(0..candidates.len().max(1))
    }
}
