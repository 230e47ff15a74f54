//! Driver-assist feature set, implemented as a task producer.
//!
//! Each feature turns into a one-shot [`hub::Task`] submitted through the
//! kernel's sink; activation is gated by feature flags so re-engaging an
//! active feature is a no-op. Road inputs come from a [`Road`]
//! implementation: deterministic simulation in production, fixed stubs in
//! tests. There is no hazard detection here, only the simulation contract.

mod features;
mod road;
mod tasks;

pub use features::{
    Adas, FeatureStatus, DECEL_THRESHOLD, HEADWAY_FACTOR, LANE_DRIFT_LIMIT, MIN_LEAD_DISTANCE,
    SPEED_THRESHOLD, STEERING_GAIN,
};
pub use road::{Road, RoadHandle, SimulatedRoad};
