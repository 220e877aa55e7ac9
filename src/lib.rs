//! passlearn core library.
//!
//! A battery-powered sensor decides, once per epoch, which of a batch of
//! upcoming satellite passes to attempt. It learns which passes are worth
//! it purely from its own transmission outcomes. This crate exposes the
//! learning simulator, the uniform-choice baseline, and the closed-form
//! energy/power model. The binary (`src/main.rs`) is a thin research
//! harness around these components.
//!
//! # Pipeline
//!
//! - **candidates**: i.i.d. pass candidates per epoch (noise mode is
//!   configurable).
//! - **discretize**: continuous pass features → 5×5×5 bucket state.
//! - **policy**: discounted softmax over learned values (and a uniform
//!   control policy).
//! - **preference**: ground-truth success probability, hidden from the
//!   learner.
//! - **value_table**: incremental-mean value estimates and visit counts.
//! - **simulator** / **baseline**: run populations of transmitters in
//!   parallel with per-transmitter seeded RNGs.
//! - **energy**: average power of an attempt-rate / success-rate operating
//!   point.

pub mod baseline;
pub mod candidates;
pub mod config;
pub mod discretize;
pub mod energy;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod policy;
pub mod preference;
pub mod simulator;
pub mod sweep;
pub mod types;
pub mod value_table;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::SimConfig;
pub use error::SimError;

pub use baseline::{expected_success_rate, run_baseline, BaselineResult, BaselineSimulator};

pub use candidates::{NoiseMode, PassCandidateGenerator, DEFAULT_NUM_PASSES};

pub use discretize::discretize;

pub use energy::{energy, power, AttemptProfile, EnergyBreakdown};

pub use logging::{log_result, EventSink, FileSink, NoopSink, TransmitterRecord};

pub use metrics::{moving_average, RunningStats, StatsSummary};

pub use policy::{softmax, DiscountedSoftmax, PassSelector, UniformChoice};

pub use preference::PreferenceModel;

pub use simulator::{simulate, EpochOutcome, SimulationResult, Simulator, Transmitter};

pub use sweep::{sweep_lambdas, PassEnergyParams, SweepPoint};

pub use types::{ContinuousState, DiscreteState, PassCandidate, STATE_COUNT};

pub use value_table::{ValueEstimateTable, VisitCounts, OPTIMISTIC_INIT};
