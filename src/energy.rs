// src/energy.rs
//
// Closed-form energy / average power model for one transmission attempt.
//
// An attempt wakes from sleep, acquires a GPS fix, then listens for the
// pass. On success the sensor only listens for a fraction `eps_pass` of
// the pass before its queued packets are sent; on failure it listens for
// the whole pass and sends nothing.
//
// Units: W, J, s, Hz throughout.

use serde::Serialize;

use crate::error::SimError;

/// Sleep power (550 µW).
pub const P_SLEEP_W: f64 = 550e-6;
/// GPS receiver power (230 mW).
pub const P_GPS_W: f64 = 0.230;
/// Satellite receiver power (130 mW).
pub const P_RX_W: f64 = 0.130;
/// Energy per packet transmission.
pub const E_TX_J: f64 = 12.24;
/// GPS acquisition time.
pub const T_GPS_S: f64 = 30.0;
/// Packet generation rate (one packet every 3 h).
pub const R_PKT_HZ: f64 = 1.0 / 10_800.0;

/// Inputs to the energy model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptProfile {
    /// Transmission attempts per second.
    pub r_attempt_hz: f64,
    /// Probability an attempt succeeds.
    pub p_success: f64,
    /// Fraction of the pass spent listening before a successful upload.
    pub eps_pass: f64,
    /// Pass length in seconds.
    pub t_pass_s: f64,
}

impl AttemptProfile {
    pub fn new(r_attempt_hz: f64, p_success: f64, eps_pass: f64, t_pass_s: f64) -> Self {
        Self {
            r_attempt_hz,
            p_success,
            eps_pass,
            t_pass_s,
        }
    }

    /// Reject inputs the closed form is undefined for.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.r_attempt_hz.is_finite() && self.r_attempt_hz > 0.0) {
            return Err(SimError::validation("r_attempt", "must be finite and > 0"));
        }
        if !(self.p_success > 0.0 && self.p_success <= 1.0) {
            return Err(SimError::validation("p_success", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.eps_pass) {
            return Err(SimError::validation("eps_pass", "must be in [0, 1]"));
        }
        if !(self.t_pass_s.is_finite() && self.t_pass_s >= 0.0) {
            return Err(SimError::validation("t_pass", "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Energy spent on an attempt that succeeds.
    pub fn energy_success(&self) -> f64 {
        let r = self.r_attempt_hz;
        P_SLEEP_W / r
            + P_GPS_W * T_GPS_S
            + self.eps_pass * P_RX_W * self.t_pass_s
            + E_TX_J * (R_PKT_HZ / (self.p_success * r))
    }

    /// Energy spent on an attempt that fails.
    pub fn energy_fail(&self) -> f64 {
        P_SLEEP_W / self.r_attempt_hz + P_GPS_W * T_GPS_S + P_RX_W * self.t_pass_s
    }

    /// Expected energy per attempt.
    pub fn energy(&self) -> f64 {
        let p = self.p_success;
        p * self.energy_success() + (1.0 - p) * self.energy_fail()
    }

    /// Expected wall time covered by one attempt, including sleep.
    pub fn elapsed_s(&self) -> f64 {
        let p = self.p_success;
        1.0 / self.r_attempt_hz
            + T_GPS_S
            + p * self.eps_pass * self.t_pass_s
            + (1.0 - p) * self.t_pass_s
    }

    /// Average power: expected energy over expected elapsed time.
    pub fn power(&self) -> f64 {
        self.energy() / self.elapsed_s()
    }

    /// `energy * r_attempt`. Kept for comparison with older results only;
    /// it ignores the time spent awake and overstates power.
    pub fn power_rate_scaled(&self) -> f64 {
        self.energy() * self.r_attempt_hz
    }

    pub fn breakdown(&self) -> EnergyBreakdown {
        EnergyBreakdown {
            profile: *self,
            energy_success_j: self.energy_success(),
            energy_fail_j: self.energy_fail(),
            energy_j: self.energy(),
            elapsed_s: self.elapsed_s(),
            power_w: self.power(),
            power_rate_scaled_w: self.power_rate_scaled(),
        }
    }
}

/// All intermediate quantities of the model for one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    pub profile: AttemptProfile,
    pub energy_success_j: f64,
    pub energy_fail_j: f64,
    pub energy_j: f64,
    pub elapsed_s: f64,
    pub power_w: f64,
    pub power_rate_scaled_w: f64,
}

/// Expected energy (J) per attempt.
pub fn energy(r_attempt: f64, p_success: f64, eps_pass: f64, t_pass: f64) -> f64 {
    AttemptProfile::new(r_attempt, p_success, eps_pass, t_pass).energy()
}

/// Average power (W) over the elapsed time of an attempt.
pub fn power(r_attempt: f64, p_success: f64, eps_pass: f64, t_pass: f64) -> f64 {
    AttemptProfile::new(r_attempt, p_success, eps_pass, t_pass).power()
}
