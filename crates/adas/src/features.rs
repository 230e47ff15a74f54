use std::sync::Arc;
use std::time::Instant;

use log::info;
use parking_lot::Mutex;

use hub::{SubmitOutcome, Task, TaskPriority, TaskSinkHandle};
use vehicle::VehicleStore;

use crate::road::{RoadHandle, SimulatedRoad};
use crate::tasks::{
    AirbagDeployment, AirbagReset, CollisionCheck, CruiseControl, EmergencyBraking, LaneKeeping,
};

/// Speed above which sudden deceleration is treated as a collision signal.
pub const SPEED_THRESHOLD: f64 = 30.0;

/// Deceleration magnitude (speed-units per second) that triggers airbag
/// deployment.
pub const DECEL_THRESHOLD: f64 = 5.0;

/// Lead distance below which cruise control backs off.
pub const MIN_LEAD_DISTANCE: f64 = 50.0;

/// Fraction of current speed kept when backing off from a lead vehicle.
pub const HEADWAY_FACTOR: f64 = 0.8;

/// Lateral offset beyond which lane keeping issues a correction.
pub const LANE_DRIFT_LIMIT: f64 = 0.5;

/// Steering degrees per unit of lateral offset.
pub const STEERING_GAIN: f64 = 0.1;

#[derive(Debug, Default)]
pub(crate) struct FeatureFlags {
    pub acc_active: bool,
    pub lka_active: bool,
    pub airbag_deployed: bool,
    pub collision_warning_active: bool,
}

/// Copy of the engagement flags, for dashboards and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureStatus {
    pub acc_active: bool,
    pub lka_active: bool,
    pub airbag_deployed: bool,
    pub collision_warning_active: bool,
}

/// Speed sample used to measure instantaneous deceleration between checks.
pub(crate) struct DecelMonitor {
    last_speed: f64,
    last_sample: Instant,
}

impl DecelMonitor {
    fn new() -> Self {
        Self {
            last_speed: 0.0,
            last_sample: Instant::now(),
        }
    }

    /// Returns the speed change rate since the previous observation, in
    /// speed-units per second, and refreshes the sample.
    pub fn observe(&mut self, speed: f64, now: Instant) -> f64 {
        let dt = now.duration_since(self.last_sample).as_secs_f64();
        let rate = if dt > 0.0 {
            (speed - self.last_speed) / dt
        } else {
            0.0
        };
        self.last_speed = speed;
        self.last_sample = now;
        rate
    }
}

/// Safety feature set producing tasks against the kernel's queue.
///
/// Activation is idempotent per feature: engaging an already-active feature
/// submits nothing. Each activation enqueues exactly one task instance;
/// recurring checks are the caller's loop, not the feature's.
pub struct Adas {
    store: Arc<VehicleStore>,
    sink: TaskSinkHandle,
    road: RoadHandle,
    flags: Arc<Mutex<FeatureFlags>>,
    monitor: Arc<Mutex<DecelMonitor>>,
}

impl Adas {
    pub fn new(store: Arc<VehicleStore>, sink: TaskSinkHandle) -> Self {
        Self::with_road(store, sink, Arc::new(SimulatedRoad::new()))
    }

    pub fn with_road(store: Arc<VehicleStore>, sink: TaskSinkHandle, road: RoadHandle) -> Self {
        Self {
            store,
            sink,
            road,
            flags: Arc::new(Mutex::new(FeatureFlags::default())),
            monitor: Arc::new(Mutex::new(DecelMonitor::new())),
        }
    }

    pub fn status(&self) -> FeatureStatus {
        let flags = self.flags.lock();
        FeatureStatus {
            acc_active: flags.acc_active,
            lka_active: flags.lka_active,
            airbag_deployed: flags.airbag_deployed,
            collision_warning_active: flags.collision_warning_active,
        }
    }

    /// Engages adaptive cruise control: keeps headway to the simulated lead
    /// vehicle, restoring the assisted-mode cruising speed when clear.
    pub fn engage_cruise_control(&self) {
        let mut flags = self.flags.lock();
        if flags.acc_active {
            return;
        }
        let task = Task::new(
            "adaptive-cruise-control",
            TaskPriority::High,
            CruiseControl {
                store: Arc::clone(&self.store),
                road: Arc::clone(&self.road),
            },
        );
        if self.sink.try_submit(task) == SubmitOutcome::Accepted {
            flags.acc_active = true;
            info!("acc engaged");
        }
    }

    pub fn disengage_cruise_control(&self) {
        let mut flags = self.flags.lock();
        if flags.acc_active {
            flags.acc_active = false;
            info!("acc disengaged");
        }
    }

    /// Engages lane keeping: watches the lateral offset and logs a
    /// corrective steering value when drifting. No actuator model.
    pub fn engage_lane_keeping(&self) {
        let mut flags = self.flags.lock();
        if flags.lka_active {
            return;
        }
        let task = Task::new(
            "lane-keeping-assist",
            TaskPriority::High,
            LaneKeeping {
                road: Arc::clone(&self.road),
            },
        );
        if self.sink.try_submit(task) == SubmitOutcome::Accepted {
            flags.lka_active = true;
            info!("lka engaged");
        }
    }

    pub fn disengage_lane_keeping(&self) {
        let mut flags = self.flags.lock();
        if flags.lka_active {
            flags.lka_active = false;
            info!("lka disengaged");
        }
    }

    /// Requests an emergency stop: the task checks for collision-grade
    /// deceleration (deploying airbags if found), then applies the
    /// emergency brake on the store.
    pub fn request_emergency_braking(&self) {
        let task = Task::new(
            "emergency-braking",
            TaskPriority::Emergency,
            EmergencyBraking {
                store: Arc::clone(&self.store),
                sink: Arc::clone(&self.sink),
                flags: Arc::clone(&self.flags),
                monitor: Arc::clone(&self.monitor),
            },
        );
        self.sink.try_submit(task);
    }

    /// Submits a collision-risk check: measures deceleration since the last
    /// sample and deploys airbags when it exceeds the threshold at speed.
    pub fn check_collision_risk(&self) {
        let task = Task::new(
            "collision-check",
            TaskPriority::High,
            CollisionCheck {
                store: Arc::clone(&self.store),
                sink: Arc::clone(&self.sink),
                flags: Arc::clone(&self.flags),
                monitor: Arc::clone(&self.monitor),
            },
        );
        self.sink.try_submit(task);
    }

    /// Requests airbag deployment. One-shot: a no-op while already deployed.
    pub fn deploy_airbags(&self) {
        let flags = self.flags.lock();
        if flags.airbag_deployed {
            return;
        }
        drop(flags);
        submit_airbag_deployment(&self.store, &self.sink, &self.flags);
    }

    /// Requests an airbag reset. Only submitted while deployed; the reset
    /// itself is refused unless every safety predicate holds.
    pub fn reset_airbags(&self) {
        let flags = self.flags.lock();
        if !flags.airbag_deployed {
            return;
        }
        drop(flags);
        let task = Task::new(
            "airbag-reset",
            TaskPriority::Normal,
            AirbagReset {
                store: Arc::clone(&self.store),
                flags: Arc::clone(&self.flags),
            },
        );
        self.sink.try_submit(task);
    }
}

/// Enqueues the one-shot airbag deployment task. Shared by the explicit
/// deploy request and the deceleration triggers inside running tasks.
pub(crate) fn submit_airbag_deployment(
    store: &Arc<VehicleStore>,
    sink: &TaskSinkHandle,
    flags: &Arc<Mutex<FeatureFlags>>,
) -> SubmitOutcome {
    let task = Task::new(
        "airbag-deployment",
        TaskPriority::Emergency,
        AirbagDeployment {
            store: Arc::clone(store),
            flags: Arc::clone(flags),
        },
    );
    sink.try_submit(task)
}
