use parking_lot::Mutex;

use crate::state::{
    DrivingMode, Metrics, SpeedRates, StateSnapshot, APPROACH_GAIN, EMERGENCY_GAIN, IDLE_RPM,
    MAX_FUEL, MAX_SPEED, OIL_SMOOTHING, RESET_MAX_TEMP, RESET_MIN_VOLTAGE, RPM_PER_KMH,
    RPM_REFERENCE, SPEED_DEADBAND, TEMP_SMOOTHING, VOLTAGE_SMOOTHING,
};

struct Inner {
    current_speed: f64,
    target_speed: f64,
    assisted_speed: f64,
    driving_mode: DrivingMode,
    is_emergency_braking: bool,
    post_crash: bool,
    metrics: Metrics,
}

impl Inner {
    // Normal speed setters are gated while either flag is raised. The
    // emergency flag self-clears at zero speed; post_crash only clears
    // through a successful airbag reset.
    fn speed_locked(&self) -> bool {
        self.is_emergency_braking || self.post_crash
    }

    fn halt(&mut self) {
        self.is_emergency_braking = true;
        self.target_speed = 0.0;
        self.current_speed = 0.0;
        self.metrics.current_speed = 0.0;
    }
}

/// Lock-guarded owner of [`crate::Metrics`] and the vehicle speed state.
///
/// Every operation acquires the single internal lock for its whole body, so
/// each call is atomic with respect to every other. No guard ever escapes,
/// and no caller can hold the lock across a blocking operation.
pub struct VehicleStore {
    inner: Mutex<Inner>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current_speed: 0.0,
                target_speed: 0.0,
                assisted_speed: 0.0,
                driving_mode: DrivingMode::Manual,
                is_emergency_braking: false,
                post_crash: false,
                metrics: Metrics::default(),
            }),
        }
    }

    /// Sets the speed the controller steers toward, clamped to [0, 180].
    ///
    /// Silently ignored while emergency braking or post-crash lockout is
    /// active; that is expected traffic during an emergency, not an error.
    /// A target of exactly 0 also zeroes the current speed immediately.
    pub fn set_target_speed(&self, speed: f64) {
        let mut s = self.inner.lock();
        if s.speed_locked() {
            return;
        }
        s.target_speed = speed.clamp(0.0, MAX_SPEED);
        if speed == 0.0 {
            s.current_speed = 0.0;
            s.metrics.current_speed = 0.0;
        }
    }

    /// Overwrites the current speed, clamped to [0, 180]. Same gating as
    /// [`Self::set_target_speed`].
    pub fn set_current_speed(&self, speed: f64) {
        let mut s = self.inner.lock();
        if s.speed_locked() {
            return;
        }
        s.current_speed = speed.clamp(0.0, MAX_SPEED);
        s.metrics.current_speed = s.current_speed;
    }

    /// Switches driving mode. Entering `Assisted` snapshots the current
    /// speed as the cruising speed the ACC feature later restores.
    pub fn set_driving_mode(&self, mode: DrivingMode) {
        let mut s = self.inner.lock();
        s.driving_mode = mode;
        if mode == DrivingMode::Assisted {
            s.assisted_speed = s.current_speed;
        }
    }

    /// Forces both speeds to zero and raises the emergency flag.
    ///
    /// Unconditional: it takes the same lock every setter takes, and all
    /// subsequent setters are gated on the flag, so it wins any race.
    pub fn emergency_brake(&self) {
        self.inner.lock().halt();
    }

    /// Airbag-deployment halt: [`Self::emergency_brake`] plus the post-crash
    /// lockout that keeps normal setters inert until an explicit reset.
    pub fn post_crash_halt(&self) {
        let mut s = self.inner.lock();
        s.post_crash = true;
        s.halt();
    }

    /// Atomically checks the reset predicates and clears the post-crash
    /// lockout if all hold: speed exactly 0, temperature at most 100,
    /// voltage at least 11.0, emergency flag clear. Returns whether the
    /// lockout was cleared.
    pub fn try_clear_post_crash(&self) -> bool {
        let mut s = self.inner.lock();
        let safe = s.current_speed == 0.0
            && s.metrics.temp <= RESET_MAX_TEMP
            && s.metrics.voltage >= RESET_MIN_VOLTAGE
            && !s.is_emergency_braking;
        if safe {
            s.post_crash = false;
        }
        safe
    }

    /// Returns a copy of the telemetry, never a live reference.
    pub fn get_metrics(&self) -> Metrics {
        self.inner.lock().metrics
    }

    /// Sets the fuel gauge, clamped to [0, 100]. Independent of emergency
    /// state; the gauge is decremented by the dashboard, not simulated here.
    pub fn set_fuel_level(&self, level: f64) {
        self.inner.lock().metrics.fuel = level.clamp(0.0, MAX_FUEL);
    }

    /// Point-in-time copy of speeds, mode and flags.
    pub fn state(&self) -> StateSnapshot {
        let s = self.inner.lock();
        StateSnapshot {
            current_speed: s.current_speed,
            target_speed: s.target_speed,
            assisted_speed: s.assisted_speed,
            driving_mode: s.driving_mode,
            is_emergency_braking: s.is_emergency_braking,
            post_crash: s.post_crash,
        }
    }

    /// One speed-controller step, performed entirely under the lock.
    ///
    /// Under emergency braking: shed `min(emergency_rate, speed * 0.1)` per
    /// tick; once the speed lands inside the deadband it snaps to zero and
    /// the emergency flag self-clears. Otherwise: proportional approach
    /// toward the target with a per-tick rate cap, which converges without
    /// overshoot. The result is mirrored into the telemetry and returned.
    pub fn speed_tick(&self, rates: &SpeedRates) -> f64 {
        let mut s = self.inner.lock();
        if s.is_emergency_braking {
            let shed = rates
                .emergency_deceleration
                .min(s.current_speed * EMERGENCY_GAIN);
            let next = (s.current_speed - shed).max(0.0);
            s.current_speed = if next < SPEED_DEADBAND { 0.0 } else { next };
            if s.current_speed == 0.0 {
                s.is_emergency_braking = false;
            }
        } else {
            let diff = s.target_speed - s.current_speed;
            if diff.abs() > SPEED_DEADBAND {
                let change = if diff > 0.0 {
                    rates.acceleration.min(diff * APPROACH_GAIN)
                } else {
                    (-rates.deceleration).max(diff * APPROACH_GAIN)
                };
                s.current_speed = (s.current_speed + change).clamp(0.0, MAX_SPEED);
            }
        }
        s.metrics.current_speed = s.current_speed;
        s.current_speed
    }

    /// One metrics-simulator step: recompute rpm from the mirrored speed,
    /// then move temperature, voltage and oil pressure toward their
    /// rpm-derived targets by their smoothing factors. First-order lag;
    /// factors in (0, 1) mean no jumps and no overshoot.
    pub fn metrics_tick(&self) {
        let mut s = self.inner.lock();
        let rpm = (IDLE_RPM as f64 + s.metrics.current_speed * RPM_PER_KMH) as u32;
        s.metrics.rpm = rpm;

        let load = rpm as f64 / RPM_REFERENCE;
        let m = &mut s.metrics;
        approach(&mut m.temp, 90.0 + load * 20.0, TEMP_SMOOTHING);
        approach(&mut m.voltage, 12.0 - load * 0.5, VOLTAGE_SMOOTHING);
        approach(&mut m.oil, 45.0 + load * 15.0, OIL_SMOOTHING);
    }
}

impl Default for VehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

fn approach(value: &mut f64, target: f64, factor: f64) {
    *value += (target - *value) * factor;
}
