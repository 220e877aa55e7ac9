// src/value_table.rs
//
// Learned value estimates and visit counts for one transmitter.
//
// Conceptually the table is indexed (a, d, n, epoch). Layer e+1 is layer e
// with exactly one entry replaced by its incremental-mean update, so only
// two layers are kept (current and next). Full history is opt-in.

use serde::Serialize;

use crate::types::{DiscreteState, STATE_COUNT};

/// Initial estimate for every state (the maximum possible outcome).
pub const OPTIMISTIC_INIT: f64 = 1.0;

/// One 5x5x5 layer of value estimates.
pub type ValueLayer = [f64; STATE_COUNT];

/// Per-state selection counts. Strictly non-decreasing over a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitCounts {
    #[serde(with = "counts_as_vec")]
    counts: [u32; STATE_COUNT],
}

impl Default for VisitCounts {
    fn default() -> Self {
        Self {
            counts: [0; STATE_COUNT],
        }
    }
}

impl VisitCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one selection and return the updated count (always >= 1).
    pub fn increment(&mut self, state: DiscreteState) -> u32 {
        let c = &mut self.counts[state.index()];
        *c = c.saturating_add(1);
        *c
    }

    pub fn get(&self, state: DiscreteState) -> u32 {
        self.counts[state.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Number of distinct states selected at least once.
    pub fn visited_states(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }
}

mod counts_as_vec {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(counts: &[u32; super::STATE_COUNT], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(counts.iter())
    }
}

/// Double-buffered value table with optional per-epoch history.
#[derive(Debug, Clone)]
pub struct ValueEstimateTable {
    current: Box<ValueLayer>,
    next: Box<ValueLayer>,
    epoch: usize,
    history: Option<Vec<ValueLayer>>,
}

impl Default for ValueEstimateTable {
    fn default() -> Self {
        Self::optimistic()
    }
}

impl ValueEstimateTable {
    /// All estimates at `OPTIMISTIC_INIT`, no history.
    pub fn optimistic() -> Self {
        Self::with_initial(OPTIMISTIC_INIT, false)
    }

    /// Optimistic table that also keeps a copy of every layer.
    pub fn optimistic_with_history() -> Self {
        Self::with_initial(OPTIMISTIC_INIT, true)
    }

    pub fn with_initial(value: f64, keep_history: bool) -> Self {
        let layer = Box::new([value; STATE_COUNT]);
        let history = keep_history.then(|| vec![*layer]);
        Self {
            next: layer.clone(),
            current: layer,
            epoch: 0,
            history,
        }
    }

    /// Estimate for `state` in the current layer.
    pub fn get(&self, state: DiscreteState) -> f64 {
        self.current[state.index()]
    }

    pub fn current_layer(&self) -> &ValueLayer {
        &self.current
    }

    /// Number of layers produced since initialisation.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Every layer so far (layer 0 is the initial one), if history is kept.
    pub fn history(&self) -> Option<&[ValueLayer]> {
        self.history.as_deref()
    }

    pub fn keeps_history(&self) -> bool {
        self.history.is_some()
    }

    /// Produce the next layer: copy the current one and move the entry for
    /// `state` toward `outcome` by `1 / count`.
    ///
    /// `count` is the visit count *after* this visit was recorded, so the
    /// entry becomes the running mean of all outcomes seen at `state`.
    pub fn advance(&mut self, state: DiscreteState, outcome: f64, count: u32) {
        let count = count.max(1) as f64;
        let idx = state.index();

        *self.next = *self.current;
        let old = self.current[idx];
        self.next[idx] = old + (outcome - old) / count;

        std::mem::swap(&mut self.current, &mut self.next);
        self.epoch += 1;

        if let Some(h) = self.history.as_mut() {
            h.push(*self.current);
        }
    }
}
