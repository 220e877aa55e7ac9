// src/metrics.rs
//
// Summary statistics over simulated runs.
// - RunningStats: single-pass mean / spread / range of a sample stream
//   (time-until-pass, per-transmitter rates). Collects from iterators.
// - moving_average: trailing-window smoothing for learning curves.

use serde::Serialize;

/// Streaming mean, sample standard deviation and range.
///
/// Non-finite samples are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    sum_sq_dev: f64,
    range: Option<(f64, f64)>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.count += 1;
        let before = x - self.mean;
        self.mean += before / self.count as f64;
        self.sum_sq_dev += before * (x - self.mean);
        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(x), hi.max(x)),
            None => (x, x),
        });
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the accepted samples, 0 when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (n - 1 denominator), 0 below two samples.
    pub fn stddev(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => (self.sum_sq_dev / (n - 1) as f64).sqrt(),
        }
    }

    /// `(min, max)` of the accepted samples.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    pub fn summary(&self) -> StatsSummary {
        let (min, max) = self.range.unwrap_or((0.0, 0.0));
        StatsSummary {
            n: self.count as u64,
            mean: self.mean,
            stddev: self.stddev(),
            min,
            max,
        }
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

/// Serializable snapshot of a [`RunningStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub n: u64,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Trailing moving average. Entry i averages `xs[i+1-window ..= i]`,
/// using fewer points at the start. `window == 0` is treated as 1.
pub fn moving_average(xs: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(xs.len());
    let mut sum = 0.0;
    for (i, &x) in xs.iter().enumerate() {
        sum += x;
        if i >= window {
            sum -= xs[i - window];
        }
        let n = (i + 1).min(window);
        out.push(sum / n as f64);
    }
    out
}
