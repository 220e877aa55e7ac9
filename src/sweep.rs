// src/sweep.rs
//
// λ sweep: run the learner at several discount factors and map each
// operating point through the energy model.
//
// One attempt is made per epoch, at the selected pass. The attempt rate is
// taken as the inverse of the mean realised time-until-pass, so a more
// patient policy (large λ) attempts less often.

use serde::Serialize;

use crate::config::SimConfig;
use crate::energy::AttemptProfile;
use crate::error::SimError;
use crate::simulator::Simulator;

/// Pass parameters used to turn an operating point into power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassEnergyParams {
    /// Fraction of the pass listened to before a successful upload.
    pub eps_pass: f64,
    /// Pass length in seconds.
    pub t_pass_s: f64,
}

impl Default for PassEnergyParams {
    fn default() -> Self {
        Self {
            eps_pass: 0.5,
            t_pass_s: 1500.0,
        }
    }
}

/// One point of the λ tradeoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub lambda: f64,
    pub success_rate: f64,
    pub mean_time_to_tx_h: f64,
    /// Attempts per second, `None` if the mean wait was zero.
    pub attempt_rate_hz: Option<f64>,
    /// Average power in W, `None` when the energy model is undefined
    /// (zero success rate or zero attempt rate).
    pub power_w: Option<f64>,
}

/// Build a point from simulated statistics.
pub fn operating_point(
    lambda: f64,
    success_rate: f64,
    mean_time_to_tx_h: f64,
    params: &PassEnergyParams,
) -> SweepPoint {
    let attempt_rate_hz = (mean_time_to_tx_h > 0.0).then(|| 1.0 / (mean_time_to_tx_h * 3600.0));
    let power_w = attempt_rate_hz.and_then(|r| {
        let profile = AttemptProfile::new(r, success_rate, params.eps_pass, params.t_pass_s);
        profile.validate().ok().map(|_| profile.power())
    });
    SweepPoint {
        lambda,
        success_rate,
        mean_time_to_tx_h,
        attempt_rate_hz,
        power_w,
    }
}

/// Run `base` once per λ (same seed each time) and collect the points.
pub fn sweep_lambdas(
    base: &SimConfig,
    lambdas: &[f64],
    params: &PassEnergyParams,
) -> Result<Vec<SweepPoint>, SimError> {
    if lambdas.is_empty() {
        return Err(SimError::validation("lambdas", "must not be empty"));
    }
    lambdas
        .iter()
        .map(|&lambda| {
            let cfg = SimConfig {
                lambda,
                record_history: false,
                ..base.clone()
            };
            let (result, _) = Simulator::new(cfg)?.run()?;
            Ok(operating_point(
                lambda,
                result.success_rate(),
                result.time_to_tx_stats().mean(),
                params,
            ))
        })
        .collect()
}

/// `n` evenly spaced values covering [lo, hi].
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}
