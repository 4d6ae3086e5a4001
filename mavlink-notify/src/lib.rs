//! MAVLink telemetry parsing and vehicle state tracking.
//!
//! This crate turns the telemetry stream of a MAVLink autopilot into the
//! [`StateSnapshot`](notify_core::StateSnapshot)s consumed by the buzzer
//! annunciator. It has no chip-specific dependencies and is fully testable
//! on host.
//!
//! # Features
//!
//! - Minimal MAVLink 1/2 parser (signed frames, truncated payloads)
//! - Decodes HEARTBEAT, SYS_STATUS, GPS_RAW_INT, EKF_STATUS_REPORT, STATUSTEXT
//! - [`VehicleStateTracker`] implementing [`StateSource`](notify_core::StateSource)
//!
//! # Example
//!
//! ```ignore
//! use mavlink_notify::{MavlinkParser, VehicleStateTracker};
//!
//! let mut parser = MavlinkParser::new();
//! let mut tracker = VehicleStateTracker::new();
//!
//! // Feed bytes from UART
//! for byte in uart_bytes {
//!     if let Ok(Some(frame)) = parser.push_byte(byte) {
//!         tracker.apply(&frame, now_ms);
//!     }
//! }
//! ```
//!
//! # State mapping
//!
//! | Telemetry | Flag |
//! |-----------|------|
//! | HEARTBEAT `base_mode` armed bit | `armed` |
//! | GPS_RAW_INT `fix_type` | `gps_status` |
//! | SYS_STATUS `battery_remaining` | `failsafe_battery` |
//! | EKF_STATUS_REPORT variances | `ekf_bad` |
//! | STATUSTEXT `Arm: ...` | `arming_failed` (one-shot) |
//!
//! # UART Configuration
//!
//! MAVLink commonly uses:
//! - 57600 baud for telemetry radios
//! - 115200 baud for direct serial connections
//! - 8N1 (8 data bits, no parity, 1 stop bit)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod mapping;
pub mod parser;
pub mod tracker;

// Re-export main types from parser
pub use parser::{
    EkfStatusReport, Frame, GpsRawInt, Heartbeat, MavMessage, MavlinkParser, ParseError,
    StatusText, SysStatus, MAVLINK_STX_V1, MAVLINK_STX_V2, MAX_FRAME_SIZE, MSG_ID_EKF_STATUS_REPORT,
    MSG_ID_GPS_RAW_INT, MSG_ID_HEARTBEAT, MSG_ID_STATUSTEXT, MSG_ID_SYS_STATUS,
};

// Re-export main types from mapping and tracker
pub use mapping::{battery_failsafe, ekf_is_bad, gps_status_from_fix_type, is_arming_failure};
pub use tracker::{TrackerConfig, VehicleStateTracker, CONNECTION_TIMEOUT_MS, MAV_COMP_ID_AUTOPILOT1};

/// Common MAVLink baud rates.
pub const MAVLINK_BAUDRATE_TELEMETRY: u32 = 57_600;
pub const MAVLINK_BAUDRATE_SERIAL: u32 = 115_200;
