//! Telemetry field to vehicle-state flag mapping.

use crate::parser::EkfStatusReport;
use notify_core::GpsStatus;

/// GPS_FIX_TYPE values above RTK fixed.
const GPS_FIX_TYPE_STATIC: u8 = 7;
const GPS_FIX_TYPE_PPP: u8 = 8;

/// Convert a GPS_RAW_INT `fix_type` to the annunciator's GPS status.
///
/// `STATIC` counts as a 3D fix and `PPP` as differential. Unknown values
/// are treated as no GPS.
#[must_use]
pub const fn gps_status_from_fix_type(fix_type: u8) -> GpsStatus {
    match fix_type {
        0..=6 => GpsStatus::from_raw(fix_type),
        GPS_FIX_TYPE_STATIC => GpsStatus::Fix3D,
        GPS_FIX_TYPE_PPP => GpsStatus::Dgps,
        _ => GpsStatus::NoGps,
    }
}

/// Check if SYS_STATUS `battery_remaining` is below the failsafe threshold.
///
/// Negative values mean the autopilot does not know the capacity.
#[inline]
#[must_use]
pub const fn battery_failsafe(battery_remaining: i8, threshold_pct: u8) -> bool {
    battery_remaining >= 0 && (battery_remaining as u8) < threshold_pct
}

/// Check if the navigation filter should be considered bad.
///
/// Bad when at least two of the velocity, horizontal position and compass
/// variances reach `threshold`.
#[must_use]
pub fn ekf_is_bad(report: &EkfStatusReport, threshold: f32) -> bool {
    let over = [
        report.velocity_variance,
        report.pos_horiz_variance,
        report.compass_variance,
    ]
    .iter()
    .filter(|&&variance| variance >= threshold)
    .count();
    over >= 2
}

/// Prefix the autopilot uses when an arming attempt is rejected.
pub const ARM_FAILURE_PREFIX: &[u8] = b"Arm: ";

/// Prefix of pre-arm check failures.
pub const PREARM_FAILURE_PREFIX: &[u8] = b"PreArm: ";

/// Check if a STATUSTEXT reports a failed arming attempt.
///
/// Pre-arm failures are also reported periodically while disarmed, so they
/// only count when `include_prearm` is set.
#[must_use]
pub fn is_arming_failure(text: &[u8], include_prearm: bool) -> bool {
    text.starts_with(ARM_FAILURE_PREFIX)
        || (include_prearm && text.starts_with(PREARM_FAILURE_PREFIX))
}
