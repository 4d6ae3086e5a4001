//! Collaborators read once per tick: the vehicle state publisher and the
//! millisecond clock.

use crate::types::StateSnapshot;

/// Publisher of vehicle state flags.
///
/// Implementations return a consistent copy of the current state. One-shot
/// events (such as a rejected arming attempt) should be reported in exactly
/// one snapshot and cleared afterwards.
pub trait StateSource {
    /// Take the current state snapshot.
    fn snapshot(&mut self) -> StateSnapshot;

    /// Take a snapshot once the state is authoritative.
    ///
    /// Returns `None` while the publisher has not heard from the vehicle
    /// yet; pending one-shot events are kept until then. Sources that are
    /// authoritative from the start can rely on the default.
    fn poll(&mut self) -> Option<StateSnapshot> {
        Some(self.snapshot())
    }
}

/// Monotonic millisecond counter.
///
/// The counter is allowed to wrap; all consumers use wrapping subtraction.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u32;
}
