// tests/learning_properties_tests.rs
//
// Value-learning invariants, driven through the public Transmitter API:
// - value estimates are the running mean of observed outcomes
// - each epoch changes at most one table entry
// - the final epoch of a run never updates the table
// - with λ = 1 the policy ignores time-until-pass
// - runs reject λ outside [0, 1]

use std::collections::HashMap;

use passlearn::policy::PassSelector;
use passlearn::{
    BaselineSimulator, DiscountedSoftmax, DiscreteState, NoiseMode, PassCandidate,
    PassCandidateGenerator, PreferenceModel, SimConfig, Simulator, Transmitter,
    ValueEstimateTable, OPTIMISTIC_INIT, STATE_COUNT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn assert_running_mean(num_passes: usize, lambda: f64, seed: u64) {
    let generator = PassCandidateGenerator::new(NoiseMode::Random, num_passes);
    let policy = DiscountedSoftmax::new(lambda);
    let mut tx = Transmitter::new(PreferenceModel::HighAngleLongPass);
    let mut r = rng(seed);

    let mut outcomes: HashMap<usize, Vec<f64>> = HashMap::new();
    for _ in 0..1000 {
        let o = tx.step(&generator, &policy, true, &mut r);
        outcomes
            .entry(o.state.index())
            .or_default()
            .push(if o.success { 1.0 } else { 0.0 });
        assert_eq!(o.visit_count as usize, outcomes[&o.state.index()].len());
    }

    for (&idx, obs) in &outcomes {
        let mean = obs.iter().sum::<f64>() / obs.len() as f64;
        let state = DiscreteState::from_index(idx);
        assert!(
            (tx.table().get(state) - mean).abs() < 1e-9,
            "passes {num_passes}, lambda {lambda}, state {idx}: estimate {} vs mean {mean}",
            tx.table().get(state)
        );
        assert_eq!(tx.visits().get(state) as usize, obs.len());
    }

    // Unvisited states keep the optimistic value.
    for idx in 0..STATE_COUNT {
        if !outcomes.contains_key(&idx) {
            assert_eq!(tx.table().get(DiscreteState::from_index(idx)), OPTIMISTIC_INIT);
        }
    }
}

#[test]
fn estimate_is_mean_of_outcomes_per_state() {
    let mut seed = 11;
    for num_passes in [1, 5, 20, 100] {
        for lambda in [0.0, 0.5, 0.9, 1.0] {
            assert_running_mean(num_passes, lambda, seed);
            seed += 1;
        }
    }
}

#[test]
fn run_rejects_lambda_outside_unit_interval() {
    let generator = PassCandidateGenerator::new(NoiseMode::Random, 10);
    let mut tx = Transmitter::new(PreferenceModel::HighAngleLongPass);
    for bad in [1.5, -0.1, f64::NAN] {
        assert!(tx.run(10, bad, &generator, &mut rng(1)).is_err(), "lambda {bad}");
    }
    assert_eq!(tx.visits().total(), 0);
}

#[test]
fn each_layer_differs_from_previous_in_at_most_one_entry() {
    let generator = PassCandidateGenerator::new(NoiseMode::Bucket, 30);
    let mut tx = Transmitter::with_history(PreferenceModel::MidAngleMidPass);
    let mut r = rng(3);
    let run = tx.run(300, 0.8, &generator, &mut r).unwrap();
    assert_eq!(run.success.len(), 300);

    let history = tx.table().history().expect("history enabled");
    // Initial layer plus one per updating epoch; the last epoch does not update.
    assert_eq!(history.len(), 300);
    assert_eq!(tx.table().epoch(), 299);
    assert!(history[0].iter().all(|&v| v == OPTIMISTIC_INIT));

    for pair in history.windows(2) {
        let changed = pair[0]
            .iter()
            .zip(pair[1].iter())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed <= 1, "layer changed {changed} entries");
    }
    assert_eq!(tx.table().current_layer(), history.last().unwrap());
}

#[test]
fn final_epoch_counts_visit_but_does_not_update() {
    let generator = PassCandidateGenerator::new(NoiseMode::Random, 10);
    let mut tx = Transmitter::new(PreferenceModel::HighAngleShortPass);
    let mut r = rng(5);
    tx.run(1, 0.9, &generator, &mut r).unwrap();

    assert_eq!(tx.visits().total(), 1);
    assert_eq!(tx.table().epoch(), 0);
    assert!(tx.table().current_layer().iter().all(|&v| v == OPTIMISTIC_INIT));
}

#[test]
fn lambda_one_weights_equal_values() {
    let generator = PassCandidateGenerator::new(NoiseMode::Random, 50);
    let mut r = rng(8);
    let batch: Vec<PassCandidate> = generator.generate(&mut r);

    let mut table = ValueEstimateTable::optimistic();
    // Move a few entries off the optimistic value.
    for (i, c) in batch.iter().take(5).enumerate() {
        let state = DiscreteState::from(&c.state);
        table.advance(state, (i % 2) as f64, 2);
    }

    let policy = DiscountedSoftmax::new(1.0);
    let weights = policy.weights(&batch, &table);
    for (w, c) in weights.iter().zip(&batch) {
        let v = table.get(DiscreteState::from(&c.state));
        assert_eq!(*w, v);
    }
}

#[test]
fn softmax_selection_stays_in_range() {
    let generator = PassCandidateGenerator::new(NoiseMode::Constant, 7);
    let policy = DiscountedSoftmax::new(0.5);
    let table = ValueEstimateTable::optimistic();
    let mut r = rng(21);
    for _ in 0..500 {
        let batch = generator.generate(&mut r);
        let i = policy.select(&batch, &table, &mut r);
        assert!(i < batch.len());
    }
}

#[test]
fn learner_beats_uniform_baseline() {
    let cfg = SimConfig {
        num_transmitters: 20,
        num_epochs: 1000,
        num_passes: 100,
        lambda: 1.0,
        noise_mode: NoiseMode::Random,
        preference_model: PreferenceModel::HighAngleLongPass,
        seed: 42,
        ..SimConfig::default()
    };
    let (learned, _) = Simulator::new(cfg.clone()).unwrap().run().unwrap();
    let baseline = BaselineSimulator::new(cfg).unwrap().run().unwrap();

    let l = learned.success_rate();
    let b = baseline.success_rate();
    assert!(l > b + 0.01, "learner {l} vs baseline {b}");
}
