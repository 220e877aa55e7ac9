// tests/baseline_energy_tests.rs
//
// Baseline convergence to E[p] and the closed-form energy model.

use passlearn::energy::{E_TX_J, P_SLEEP_W};
use passlearn::{
    energy, expected_success_rate, power, AttemptProfile, BaselineSimulator, NoiseMode,
    PreferenceModel, SimConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn baseline_rate_converges_to_expected_probability() {
    for (model, mode) in [
        (PreferenceModel::HighAngleLongPass, NoiseMode::Random),
        (PreferenceModel::MidAngleMidPass, NoiseMode::Bucket),
    ] {
        let cfg = SimConfig {
            num_transmitters: 50,
            num_epochs: 1000,
            num_passes: 10,
            noise_mode: mode,
            preference_model: model,
            seed: 77,
            ..SimConfig::default()
        };
        let observed = BaselineSimulator::new(cfg).unwrap().run().unwrap().success_rate();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let expected = expected_success_rate(model, mode, 200_000, &mut rng);
        assert!(
            (observed - expected).abs() < 0.015,
            "{}: observed {observed} expected {expected}",
            model.name()
        );
    }
}

#[test]
fn energy_regression_value() {
    // success: 1.98 sleep + 6.9 gps + 97.5 rx + 8.16 tx = 114.54
    // fail:    1.98 sleep + 6.9 gps + 195 rx = 203.88
    let e = energy(1.0 / 3600.0, 0.5, 0.5, 1500.0);
    assert!((e - 159.21).abs() < 1e-9, "energy {e}");
    // 3600 + 30 + 375 + 750 s
    let p = power(1.0 / 3600.0, 0.5, 0.5, 1500.0);
    assert!((p - 159.21 / 4755.0).abs() < 1e-12, "power {p}");
}

#[test]
fn certain_success_costs_one_upload() {
    let profile = AttemptProfile::new(1.0 / 600.0, 1.0, 0.0, 1500.0);
    // No listening and no failures: sleep, GPS fix, and the packets
    // generated during one 600 s attempt interval.
    let expected = P_SLEEP_W * 600.0 + 0.230 * 30.0 + E_TX_J * 600.0 / 10_800.0;
    assert!((profile.energy() - expected).abs() < 1e-9);
    assert!((profile.elapsed_s() - 630.0).abs() < 1e-9);
    assert!(profile.power() > P_SLEEP_W);
}

#[test]
fn invalid_operating_points_are_rejected() {
    assert!(AttemptProfile::new(0.0, 0.5, 0.5, 1500.0).validate().is_err());
    assert!(AttemptProfile::new(1e-3, 0.0, 0.5, 1500.0).validate().is_err());
    assert!(AttemptProfile::new(1e-3, 0.5, 1.5, 1500.0).validate().is_err());
}
