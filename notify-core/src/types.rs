//! Vehicle state snapshot consumed by the pattern selector.

/// Satellite fix quality reported by the vehicle.
///
/// Ordinals follow the flight controller's GPS status numbering.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GpsStatus {
    /// No receiver attached.
    #[default]
    NoGps = 0,
    /// Receiver attached, no lock.
    NoFix = 1,
    Fix2D = 2,
    Fix3D = 3,
    /// Differential corrections applied.
    Dgps = 4,
    RtkFloat = 5,
    RtkFixed = 6,
}

impl GpsStatus {
    /// Convert a raw status ordinal. Values above 6 are treated as RTK fixed.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::NoGps,
            1 => Self::NoFix,
            2 => Self::Fix2D,
            3 => Self::Fix3D,
            4 => Self::Dgps,
            5 => Self::RtkFloat,
            _ => Self::RtkFixed,
        }
    }

    /// Raw status ordinal.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// Read-only view of the vehicle state taken once per tick.
///
/// `arming_failed` is an event rather than a level: publishers raise it for
/// a single snapshot.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateSnapshot {
    pub armed: bool,
    pub ekf_bad: bool,
    pub failsafe_battery: bool,
    pub vehicle_lost: bool,
    pub arming_failed: bool,
    pub gps_status: GpsStatus,
}

impl StateSnapshot {
    /// Disarmed vehicle with no alerts and no GPS.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            armed: false,
            ekf_bad: false,
            failsafe_battery: false,
            vehicle_lost: false,
            arming_failed: false,
            gps_status: GpsStatus::NoGps,
        }
    }
}
