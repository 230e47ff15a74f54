//! Task contexts executed by the kernel's processor.
//!
//! Each struct carries exactly the handles its action needs; nothing is
//! captured implicitly. Actions mutate the store only through its accessor
//! surface, so they inherit its emergency and post-crash gating.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use parking_lot::Mutex;

use hub::{TaskAction, TaskResult, TaskSinkHandle};
use vehicle::VehicleStore;

use crate::features::{
    submit_airbag_deployment, DecelMonitor, FeatureFlags, DECEL_THRESHOLD, HEADWAY_FACTOR,
    LANE_DRIFT_LIMIT, MIN_LEAD_DISTANCE, SPEED_THRESHOLD, STEERING_GAIN,
};
use crate::road::RoadHandle;

/// Keeps headway to the lead vehicle while assisted cruising is on.
pub(crate) struct CruiseControl {
    pub store: Arc<VehicleStore>,
    pub road: RoadHandle,
}

impl TaskAction for CruiseControl {
    fn run(&mut self) -> TaskResult {
        let state = self.store.state();
        if state.current_speed <= 0.0 {
            return Ok(());
        }
        let distance = self.road.lead_distance();
        if distance < MIN_LEAD_DISTANCE {
            let reduced = state.current_speed * HEADWAY_FACTOR;
            self.store.set_target_speed(reduced);
            warn!("acc: lead vehicle at {distance:.1}, reducing target to {reduced:.1} km/h");
        } else {
            self.store.set_target_speed(state.assisted_speed);
        }
        Ok(())
    }
}

/// Logs a corrective steering value when the vehicle drifts off center.
pub(crate) struct LaneKeeping {
    pub road: RoadHandle,
}

impl TaskAction for LaneKeeping {
    fn run(&mut self) -> TaskResult {
        let offset = self.road.lane_offset();
        if offset.abs() > LANE_DRIFT_LIMIT {
            let correction = -offset * STEERING_GAIN;
            info!("lka: correcting steering by {correction:.2} degrees");
        }
        Ok(())
    }
}

/// Emergency stop: deploys airbags on collision-grade deceleration, then
/// applies the emergency brake.
pub(crate) struct EmergencyBraking {
    pub store: Arc<VehicleStore>,
    pub sink: TaskSinkHandle,
    pub flags: Arc<Mutex<FeatureFlags>>,
    pub monitor: Arc<Mutex<DecelMonitor>>,
}

impl TaskAction for EmergencyBraking {
    fn run(&mut self) -> TaskResult {
        let speed = self.store.get_metrics().current_speed;
        let rate = self.monitor.lock().observe(speed, Instant::now());
        if speed > SPEED_THRESHOLD && rate.abs() > DECEL_THRESHOLD {
            warn!("emergency: sudden deceleration detected ({rate:.1} km/h/s)");
            submit_airbag_deployment(&self.store, &self.sink, &self.flags);
        }
        self.store.emergency_brake();
        Ok(())
    }
}

/// Collision-risk check: same deceleration trigger as emergency braking,
/// but only raises the warning latch; it does not brake by itself.
pub(crate) struct CollisionCheck {
    pub store: Arc<VehicleStore>,
    pub sink: TaskSinkHandle,
    pub flags: Arc<Mutex<FeatureFlags>>,
    pub monitor: Arc<Mutex<DecelMonitor>>,
}

impl TaskAction for CollisionCheck {
    fn run(&mut self) -> TaskResult {
        let speed = self.store.get_metrics().current_speed;
        let rate = self.monitor.lock().observe(speed, Instant::now());
        let risky = speed > SPEED_THRESHOLD && rate.abs() > DECEL_THRESHOLD;
        if risky {
            warn!("collision: sudden deceleration detected ({rate:.1} km/h/s)");
            submit_airbag_deployment(&self.store, &self.sink, &self.flags);
        }
        self.flags.lock().collision_warning_active = risky;
        Ok(())
    }
}

/// One-shot airbag deployment with the post-crash lockout.
pub(crate) struct AirbagDeployment {
    pub store: Arc<VehicleStore>,
    pub flags: Arc<Mutex<FeatureFlags>>,
}

impl TaskAction for AirbagDeployment {
    fn run(&mut self) -> TaskResult {
        {
            let mut flags = self.flags.lock();
            if flags.airbag_deployed {
                return Ok(());
            }
            flags.airbag_deployed = true;
        }
        warn!("airbag: deploying for passenger safety");
        self.store.post_crash_halt();
        info!("post-crash: hazard lights activated");
        info!("post-crash: doors unlocked for emergency exit");
        Ok(())
    }
}

/// Clears the deployment if, and only if, the store's reset predicates hold.
pub(crate) struct AirbagReset {
    pub store: Arc<VehicleStore>,
    pub flags: Arc<Mutex<FeatureFlags>>,
}

impl TaskAction for AirbagReset {
    fn run(&mut self) -> TaskResult {
        let mut flags = self.flags.lock();
        if !flags.airbag_deployed {
            return Ok(());
        }
        if self.store.try_clear_post_crash() {
            flags.airbag_deployed = false;
            info!("airbag: system reset");
        } else {
            // A refusal is an expected answer, not a failure.
            warn!("airbag: reset refused, safety conditions not met");
        }
        Ok(())
    }
}
