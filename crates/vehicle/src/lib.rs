//! Authoritative vehicle state behind a single lock.
//!
//! This crate owns the shared record of speed, driving mode, emergency state
//! and engine telemetry. Every other component reads and writes it through
//! the accessor surface of [`VehicleStore`]; nothing else sees the fields.

mod state;
mod store;

pub use state::{
    DrivingMode, Metrics, SpeedRates, StateSnapshot, APPROACH_GAIN, EMERGENCY_GAIN, IDLE_RPM,
    MAX_FUEL, MAX_SPEED, OIL_SMOOTHING, RESET_MAX_TEMP, RESET_MIN_VOLTAGE, RPM_PER_KMH,
    RPM_REFERENCE, SPEED_DEADBAND, TEMP_SMOOTHING, VOLTAGE_SMOOTHING,
};
pub use store::VehicleStore;
