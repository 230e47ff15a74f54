//! State records and tuning constants for the vehicle store.

/// Speed ceiling in km/h; both current and target speed clamp to this.
pub const MAX_SPEED: f64 = 180.0;

/// Fuel gauge ceiling in percent.
pub const MAX_FUEL: f64 = 100.0;

/// Speed differences below this are treated as "arrived" by the controller.
pub const SPEED_DEADBAND: f64 = 0.1;

/// Proportional gain applied to the speed error each controller tick.
pub const APPROACH_GAIN: f64 = 0.05;

/// Fraction of current speed shed per tick under emergency braking, before
/// the per-tick rate cap.
pub const EMERGENCY_GAIN: f64 = 0.1;

/// Idle engine speed.
pub const IDLE_RPM: u32 = 800;

/// Linear rpm contribution per km/h of road speed.
pub const RPM_PER_KMH: f64 = 50.0;

/// Reference rpm used to scale the telemetry targets.
pub const RPM_REFERENCE: f64 = 6000.0;

/// Exponential smoothing factor for engine temperature.
pub const TEMP_SMOOTHING: f64 = 0.1;

/// Exponential smoothing factor for battery voltage.
pub const VOLTAGE_SMOOTHING: f64 = 0.05;

/// Exponential smoothing factor for oil pressure.
pub const OIL_SMOOTHING: f64 = 0.15;

/// Engine temperature above which an airbag reset is refused.
pub const RESET_MAX_TEMP: f64 = 100.0;

/// Battery voltage below which an airbag reset is refused.
pub const RESET_MIN_VOLTAGE: f64 = 11.0;

/// Driving mode selected by the driver or a higher-level feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrivingMode {
    Manual,
    Assisted,
    Autonomous,
}

/// Per-tick speed change caps, in km/h per controller tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedRates {
    pub acceleration: f64,
    pub deceleration: f64,
    pub emergency_deceleration: f64,
}

impl Default for SpeedRates {
    fn default() -> Self {
        Self {
            acceleration: 0.3,
            deceleration: 0.3,
            emergency_deceleration: 0.5,
        }
    }
}

/// Smoothed engine telemetry derived from road speed.
///
/// `current_speed` mirrors the store's authoritative speed so a single
/// snapshot carries everything a gauge needs. Fuel only changes through
/// [`crate::VehicleStore::set_fuel_level`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub rpm: u32,
    pub temp: f64,
    pub voltage: f64,
    pub oil: f64,
    pub fuel: f64,
    pub current_speed: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            rpm: IDLE_RPM,
            temp: 90.0,
            voltage: 12.0,
            oil: 45.0,
            fuel: MAX_FUEL,
            current_speed: 0.0,
        }
    }
}

/// Point-in-time copy of the non-telemetry state, for producers that decide
/// based on speeds and flags without holding the lock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateSnapshot {
    pub current_speed: f64,
    pub target_speed: f64,
    pub assisted_speed: f64,
    pub driving_mode: DrivingMode,
    pub is_emergency_braking: bool,
    pub post_crash: bool,
}
