//! Vehicle state tracker: folds autopilot telemetry into a state snapshot.

use crate::mapping::{battery_failsafe, ekf_is_bad, gps_status_from_fix_type, is_arming_failure};
use crate::parser::{Frame, MavMessage};
use notify_core::{StateSnapshot, StateSource};

/// Component ID of the primary autopilot.
pub const MAV_COMP_ID_AUTOPILOT1: u8 = 1;

/// Heartbeat silence after which the link is considered lost.
pub const CONNECTION_TIMEOUT_MS: u32 = 5_000;

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerConfig {
    /// System ID to accept telemetry from (0 = any).
    pub target_system: u8,
    /// Battery failsafe below this remaining capacity (percent).
    pub low_battery_pct: u8,
    /// Normalised EKF variance treated as failing.
    pub ekf_variance_threshold: f32,
    /// Treat `PreArm:` status texts as arming failures.
    pub prearm_as_arming_failure: bool,
}

impl TrackerConfig {
    pub const DEFAULT: Self = Self {
        target_system: 0,
        low_battery_pct: 15,
        ekf_variance_threshold: 0.8,
        prearm_as_arming_failure: false,
    };
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Latest vehicle state as seen through MAVLink telemetry.
///
/// `vehicle_lost` has no telemetry source and is never raised here.
pub struct VehicleStateTracker {
    config: TrackerConfig,
    state: StateSnapshot,
    last_heartbeat_ms: Option<u32>,
}

impl VehicleStateTracker {
    /// Create a tracker with default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_config(TrackerConfig::DEFAULT)
    }

    /// Create a tracker with custom configuration.
    #[must_use]
    pub const fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            state: StateSnapshot::idle(),
            last_heartbeat_ms: None,
        }
    }

    /// Set target system ID to filter messages (0 = accept all).
    pub fn set_target_system(&mut self, system_id: u8) {
        self.config.target_system = system_id;
    }

    /// Current state without consuming pending events.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Check if the frame comes from the tracked autopilot.
    #[must_use]
    pub fn accepts(&self, frame: &Frame) -> bool {
        frame.component_id == MAV_COMP_ID_AUTOPILOT1
            && (self.config.target_system == 0 || frame.system_id == self.config.target_system)
    }

    /// Fold one frame into the state. Returns `false` if the frame was
    /// filtered out.
    pub fn apply(&mut self, frame: &Frame, now_ms: u32) -> bool {
        if !self.accepts(frame) {
            return false;
        }

        match &frame.message {
            MavMessage::Heartbeat(hb) => {
                self.state.armed = hb.is_armed();
                self.last_heartbeat_ms = Some(now_ms);
            }
            MavMessage::SysStatus(status) => {
                self.state.failsafe_battery =
                    battery_failsafe(status.battery_remaining, self.config.low_battery_pct);
            }
            MavMessage::GpsRawInt(gps) => {
                self.state.gps_status = gps_status_from_fix_type(gps.fix_type);
            }
            MavMessage::EkfStatusReport(report) => {
                self.state.ekf_bad = ekf_is_bad(report, self.config.ekf_variance_threshold);
            }
            MavMessage::StatusText(text) => {
                if is_arming_failure(text.text(), self.config.prearm_as_arming_failure) {
                    self.state.arming_failed = true;
                }
            }
            MavMessage::Unknown(_) => {}
        }
        true
    }

    /// Check if any autopilot heartbeat has been received.
    #[inline]
    #[must_use]
    pub fn has_heartbeat(&self) -> bool {
        self.last_heartbeat_ms.is_some()
    }

    /// Check if an autopilot heartbeat arrived within the timeout.
    #[must_use]
    pub fn is_connected(&self, now_ms: u32) -> bool {
        match self.last_heartbeat_ms {
            Some(last) => now_ms.wrapping_sub(last) < CONNECTION_TIMEOUT_MS,
            None => false,
        }
    }
}

impl Default for VehicleStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSource for VehicleStateTracker {
    /// Copy the current state and clear the one-shot arming failure.
    fn snapshot(&mut self) -> StateSnapshot {
        let state = self.state;
        self.state.arming_failed = false;
        state
    }

    /// Nothing is authoritative before the first autopilot heartbeat.
    fn poll(&mut self) -> Option<StateSnapshot> {
        if self.has_heartbeat() {
            Some(self.snapshot())
        } else {
            None
        }
    }
}
