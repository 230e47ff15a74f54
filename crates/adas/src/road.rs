use std::sync::Arc;
use std::time::Instant;

/// Road inputs consumed by the driver-assist tasks.
pub trait Road: Send + Sync {
    /// Distance to the lead vehicle, in distance-units.
    fn lead_distance(&self) -> f64;

    /// Lateral offset from lane center, in [-1, 1]; 0 is centered.
    fn lane_offset(&self) -> f64;
}

pub type RoadHandle = Arc<dyn Road>;

/// Deterministic simulated road: smooth periodic signals derived from wall
/// time, standing in for real sensors.
pub struct SimulatedRoad {
    epoch: Instant,
}

impl SimulatedRoad {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    fn elapsed(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for SimulatedRoad {
    fn default() -> Self {
        Self::new()
    }
}

impl Road for SimulatedRoad {
    fn lead_distance(&self) -> f64 {
        30.0 + 20.0 * self.elapsed().sin()
    }

    fn lane_offset(&self) -> f64 {
        (self.elapsed() * 0.5).sin()
    }
}
