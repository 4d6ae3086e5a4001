//! Pattern selection: decides which alert to sound on each tick.
//!
//! The selector walks a fixed priority cascade of [`Rule`]s. The first rule
//! that matches ends the walk, whether or not it produced a pattern. Edge
//! rules compare the snapshot against a cache of the values seen the last
//! time that rule was reached; level rules fire whenever the spacing gate is
//! open.
//!
//! Cached values are only refreshed by the rule that owns them. A rule that
//! is not reached on a tick (because an earlier rule matched) leaves its
//! cache stale, so an edge can be reported late or, for GPS status, missed
//! entirely if the status changes back before the rule is reached again.

use crate::pattern::{Pattern, WINDOW_MS};
use crate::types::{GpsStatus, StateSnapshot};

/// Steps of the selection cascade, highest priority first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rule {
    /// Arming attempt rejected. Ignores spacing and preempts playback.
    ArmingFailed,
    /// Minimum spacing between patterns has not elapsed.
    Spacing,
    /// Armed state changed.
    ArmedEdge,
    /// Navigation filter health changed.
    EkfEdge,
    /// Lost-vehicle beacon requested.
    VehicleLost,
    /// Battery failsafe active.
    BatteryFailsafe,
    /// GPS fix quality changed.
    GpsEdge,
}

impl Rule {
    /// Evaluation order.
    pub const CASCADE: [Rule; 7] = [
        Rule::ArmingFailed,
        Rule::Spacing,
        Rule::ArmedEdge,
        Rule::EkfEdge,
        Rule::VehicleLost,
        Rule::BatteryFailsafe,
        Rule::GpsEdge,
    ];

    /// Check if the rule may interrupt a pattern that is still playing.
    #[inline]
    #[must_use]
    pub const fn is_preemptive(self) -> bool {
        matches!(self, Rule::ArmingFailed)
    }
}

/// A pattern chosen by the selector, with the rule that chose it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Selection {
    pub pattern: Pattern,
    pub rule: Rule,
}

/// Last observed values of the edge-triggered inputs.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreviousStateCache {
    pub armed: bool,
    pub ekf_bad: bool,
    pub gps_status: GpsStatus,
}

/// Result of applying one rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// Rule did not match; try the next one.
    Continue,
    /// Rule matched; stop the cascade, optionally playing a pattern.
    Stop(Option<Pattern>),
}

/// Priority-ordered pattern selector.
#[derive(Clone, Debug, Default)]
pub struct PatternSelector {
    cache: PreviousStateCache,
    last_start_ms: Option<u32>,
}

impl PatternSelector {
    /// Create a selector with an all-false cache and no pattern history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: PreviousStateCache {
                armed: false,
                ekf_bad: false,
                gps_status: GpsStatus::NoGps,
            },
            last_start_ms: None,
        }
    }

    /// Create a selector whose armed cache matches the boot-time state.
    ///
    /// Vehicles that power up armed would otherwise sound the arming tone
    /// on the first tick.
    #[must_use]
    pub fn seeded(initial: &StateSnapshot) -> Self {
        let mut selector = Self::new();
        selector.seed(initial);
        selector
    }

    /// Adopt the armed state of `state` without announcing it.
    pub fn seed(&mut self, state: &StateSnapshot) {
        self.cache.armed = state.armed;
    }

    /// Record a pattern started outside the cascade so the spacing rule
    /// covers it.
    pub fn record_start(&mut self, now_ms: u32) {
        self.last_start_ms = Some(now_ms);
    }

    /// Cached values used for edge detection.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &PreviousStateCache {
        &self.cache
    }

    /// Start time of the most recently selected pattern.
    #[inline]
    #[must_use]
    pub fn last_start_ms(&self) -> Option<u32> {
        self.last_start_ms
    }

    /// Check if a non-preemptive pattern may start at `now_ms`.
    #[must_use]
    pub fn spacing_elapsed(&self, now_ms: u32) -> bool {
        match self.last_start_ms {
            Some(start) => now_ms.wrapping_sub(start) >= WINDOW_MS,
            None => true,
        }
    }

    /// Run the cascade against `state`.
    ///
    /// Returns the pattern to start at `now_ms`, if any. A returned pattern
    /// is recorded as the latest start for the spacing rule.
    pub fn evaluate(&mut self, state: &StateSnapshot, now_ms: u32) -> Option<Selection> {
        for rule in Rule::CASCADE {
            match self.apply(rule, state, now_ms) {
                Step::Continue => {}
                Step::Stop(pattern) => {
                    let pattern = pattern?;
                    self.last_start_ms = Some(now_ms);
                    return Some(Selection { pattern, rule });
                }
            }
        }
        None
    }

    fn apply(&mut self, rule: Rule, state: &StateSnapshot, now_ms: u32) -> Step {
        match rule {
            Rule::ArmingFailed => {
                if state.arming_failed {
                    Step::Stop(Some(Pattern::SingleBuzz))
                } else {
                    Step::Continue
                }
            }
            Rule::Spacing => {
                if self.spacing_elapsed(now_ms) {
                    Step::Continue
                } else {
                    Step::Stop(None)
                }
            }
            Rule::ArmedEdge => {
                if self.cache.armed == state.armed {
                    return Step::Continue;
                }
                self.cache.armed = state.armed;
                if state.armed {
                    Step::Stop(Some(Pattern::ArmingBuzz))
                } else {
                    Step::Stop(Some(Pattern::SingleBuzz))
                }
            }
            Rule::EkfEdge => {
                if self.cache.ekf_bad == state.ekf_bad {
                    return Step::Continue;
                }
                self.cache.ekf_bad = state.ekf_bad;
                // Recovery is silent but still ends the cascade.
                Step::Stop(state.ekf_bad.then_some(Pattern::EkfBad))
            }
            Rule::VehicleLost => {
                if state.vehicle_lost {
                    Step::Stop(Some(Pattern::DoubleBuzz))
                } else {
                    Step::Continue
                }
            }
            Rule::BatteryFailsafe => {
                if state.failsafe_battery {
                    Step::Stop(Some(Pattern::SingleBuzz))
                } else {
                    Step::Continue
                }
            }
            Rule::GpsEdge => {
                let changed = self.cache.gps_status != state.gps_status;
                self.cache.gps_status = state.gps_status;
                if !changed {
                    return Step::Continue;
                }
                match state.gps_status {
                    GpsStatus::NoGps | GpsStatus::NoFix | GpsStatus::Fix2D => Step::Continue,
                    GpsStatus::Fix3D => Step::Stop(Some(Pattern::DoubleBuzz)),
                    GpsStatus::Dgps | GpsStatus::RtkFloat | GpsStatus::RtkFixed => {
                        Step::Stop(Some(Pattern::TripleBuzz))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> StateSnapshot {
        StateSnapshot {
            armed: true,
            ..StateSnapshot::idle()
        }
    }

    fn pattern(selection: Option<Selection>) -> Option<Pattern> {
        selection.map(|s| s.pattern)
    }

    #[test]
    fn test_cascade_order() {
        assert_eq!(Rule::CASCADE[0], Rule::ArmingFailed);
        assert_eq!(Rule::CASCADE[1], Rule::Spacing);
        assert_eq!(Rule::CASCADE[6], Rule::GpsEdge);
        let preemptive = Rule::CASCADE.iter().filter(|r| r.is_preemptive()).count();
        assert_eq!(preemptive, 1);
    }

    #[test]
    fn test_idle_state_selects_nothing() {
        let mut selector = PatternSelector::new();
        assert_eq!(selector.evaluate(&StateSnapshot::idle(), 0), None);
        assert_eq!(selector.last_start_ms(), None);
    }

    #[test]
    fn test_arm_and_disarm_edges() {
        let mut selector = PatternSelector::new();

        let sel = selector.evaluate(&armed(), 0).unwrap();
        assert_eq!(sel.pattern, Pattern::ArmingBuzz);
        assert_eq!(sel.rule, Rule::ArmedEdge);

        // Unchanged armed state never re-triggers.
        for t in (3200..20_000).step_by(20) {
            assert_eq!(selector.evaluate(&armed(), t), None);
        }

        let sel = selector.evaluate(&StateSnapshot::idle(), 20_000).unwrap();
        assert_eq!(sel.pattern, Pattern::SingleBuzz);
        assert_eq!(sel.rule, Rule::ArmedEdge);
    }

    #[test]
    fn test_edge_during_spacing_is_deferred() {
        let mut selector = PatternSelector::new();
        let battery = StateSnapshot {
            failsafe_battery: true,
            ..StateSnapshot::idle()
        };
        assert_eq!(pattern(selector.evaluate(&battery, 0)), Some(Pattern::SingleBuzz));

        let armed_battery = StateSnapshot {
            armed: true,
            ..battery
        };
        assert_eq!(selector.evaluate(&armed_battery, 1000), None);
        assert!(!selector.cache().armed);

        // Armed edge outranks the battery level once spacing opens.
        let sel = selector.evaluate(&armed_battery, 3200).unwrap();
        assert_eq!(sel.pattern, Pattern::ArmingBuzz);
        assert!(selector.cache().armed);
    }

    #[test]
    fn test_spacing_boundary() {
        let mut selector = PatternSelector::new();
        let lost = StateSnapshot {
            vehicle_lost: true,
            ..StateSnapshot::idle()
        };
        assert_eq!(pattern(selector.evaluate(&lost, 100)), Some(Pattern::DoubleBuzz));
        assert_eq!(selector.evaluate(&lost, 3299), None);
        assert_eq!(pattern(selector.evaluate(&lost, 3300)), Some(Pattern::DoubleBuzz));
        assert_eq!(selector.last_start_ms(), Some(3300));
    }

    #[test]
    fn test_battery_failsafe_repeats_after_spacing() {
        let mut selector = PatternSelector::new();
        let battery = StateSnapshot {
            failsafe_battery: true,
            ..StateSnapshot::idle()
        };
        let sel = selector.evaluate(&battery, 0).unwrap();
        assert_eq!(sel.pattern, Pattern::SingleBuzz);
        assert_eq!(sel.rule, Rule::BatteryFailsafe);
        assert_eq!(selector.evaluate(&battery, 1000), None);
        assert_eq!(pattern(selector.evaluate(&battery, 3300)), Some(Pattern::SingleBuzz));
    }

    #[test]
    fn test_vehicle_lost_outranks_battery() {
        let mut selector = PatternSelector::new();
        let state = StateSnapshot {
            vehicle_lost: true,
            failsafe_battery: true,
            ..StateSnapshot::idle()
        };
        let sel = selector.evaluate(&state, 0).unwrap();
        assert_eq!(sel.rule, Rule::VehicleLost);
        assert_eq!(sel.pattern, Pattern::DoubleBuzz);
    }

    #[test]
    fn test_arming_failed_preempts_spacing() {
        let mut selector = PatternSelector::new();
        assert!(selector.evaluate(&armed(), 0).is_some());

        let failed = StateSnapshot {
            arming_failed: true,
            ..armed()
        };
        let sel = selector.evaluate(&failed, 150).unwrap();
        assert_eq!(sel.pattern, Pattern::SingleBuzz);
        assert_eq!(sel.rule, Rule::ArmingFailed);
        assert_eq!(selector.last_start_ms(), Some(150));
    }

    #[test]
    fn test_ekf_bad_rising_and_falling_edge() {
        let mut selector = PatternSelector::new();
        let bad = StateSnapshot {
            ekf_bad: true,
            ..StateSnapshot::idle()
        };
        let sel = selector.evaluate(&bad, 0).unwrap();
        assert_eq!(sel.pattern, Pattern::EkfBad);
        assert_eq!(sel.rule, Rule::EkfEdge);

        // Recovery updates the cache silently.
        assert_eq!(selector.evaluate(&StateSnapshot::idle(), 4000), None);
        assert!(!selector.cache().ekf_bad);
        assert_eq!(selector.last_start_ms(), Some(0));
    }

    #[test]
    fn test_ekf_recovery_ends_cascade() {
        let mut selector = PatternSelector::new();
        let bad = StateSnapshot {
            ekf_bad: true,
            ..StateSnapshot::idle()
        };
        selector.evaluate(&bad, 0);

        // Recovery tick swallows the battery failsafe.
        let battery = StateSnapshot {
            failsafe_battery: true,
            ..StateSnapshot::idle()
        };
        assert_eq!(selector.evaluate(&battery, 4000), None);
        assert_eq!(pattern(selector.evaluate(&battery, 4020)), Some(Pattern::SingleBuzz));
    }

    #[test]
    fn test_gps_edges() {
        let mut selector = PatternSelector::new();
        let gps = |status| StateSnapshot {
            gps_status: status,
            ..StateSnapshot::idle()
        };

        assert_eq!(selector.evaluate(&gps(GpsStatus::NoFix), 0), None);
        assert_eq!(selector.cache().gps_status, GpsStatus::NoFix);
        assert_eq!(selector.evaluate(&gps(GpsStatus::Fix2D), 20), None);

        let sel = selector.evaluate(&gps(GpsStatus::Fix3D), 500).unwrap();
        assert_eq!(sel.pattern, Pattern::DoubleBuzz);
        assert_eq!(sel.rule, Rule::GpsEdge);

        assert_eq!(selector.evaluate(&gps(GpsStatus::Fix3D), 4000), None);
        assert_eq!(
            pattern(selector.evaluate(&gps(GpsStatus::RtkFixed), 4020)),
            Some(Pattern::TripleBuzz)
        );
        assert_eq!(
            pattern(selector.evaluate(&gps(GpsStatus::Dgps), 8000)),
            Some(Pattern::TripleBuzz)
        );
        // Dropping back to 3D is an edge to 3.
        assert_eq!(
            pattern(selector.evaluate(&gps(GpsStatus::Fix3D), 12_000)),
            Some(Pattern::DoubleBuzz)
        );
    }

    #[test]
    fn test_gps_edge_during_spacing_reported_late() {
        let mut selector = PatternSelector::new();
        let lost = StateSnapshot {
            vehicle_lost: true,
            ..StateSnapshot::idle()
        };
        selector.evaluate(&lost, 0);

        let fix = StateSnapshot {
            gps_status: GpsStatus::Fix3D,
            ..StateSnapshot::idle()
        };
        assert_eq!(selector.evaluate(&fix, 1000), None);
        assert_eq!(selector.cache().gps_status, GpsStatus::NoGps);
        assert_eq!(pattern(selector.evaluate(&fix, 3200)), Some(Pattern::DoubleBuzz));
    }

    #[test]
    fn test_gps_cache_stale_while_earlier_rule_matches() {
        let mut selector = PatternSelector::new();
        let battery_fix = StateSnapshot {
            failsafe_battery: true,
            gps_status: GpsStatus::Fix3D,
            ..StateSnapshot::idle()
        };
        selector.evaluate(&battery_fix, 0);
        assert_eq!(selector.cache().gps_status, GpsStatus::NoGps);

        // Status drops back before the GPS rule runs again: edge is lost.
        let nofix = StateSnapshot {
            gps_status: GpsStatus::NoGps,
            ..StateSnapshot::idle()
        };
        assert_eq!(selector.evaluate(&nofix, 3200), None);
    }

    #[test]
    fn test_seeded_selector_skips_boot_arming_tone() {
        let mut selector = PatternSelector::seeded(&armed());
        assert!(selector.cache().armed);
        assert_eq!(selector.evaluate(&armed(), 0), None);
    }

    #[test]
    fn test_recorded_start_closes_spacing_gate() {
        let mut selector = PatternSelector::new();
        selector.record_start(500);
        assert!(!selector.spacing_elapsed(520));
        let battery = StateSnapshot {
            failsafe_battery: true,
            ..StateSnapshot::idle()
        };
        assert_eq!(selector.evaluate(&battery, 520), None);
        assert_eq!(
            pattern(selector.evaluate(&battery, 3700)),
            Some(Pattern::SingleBuzz)
        );
    }

    #[test]
    fn test_spacing_is_wrap_safe() {
        let mut selector = PatternSelector::new();
        let lost = StateSnapshot {
            vehicle_lost: true,
            ..StateSnapshot::idle()
        };
        let start = u32::MAX - 1000;
        assert!(selector.evaluate(&lost, start).is_some());
        assert_eq!(selector.evaluate(&lost, 1000), None);
        assert!(selector.evaluate(&lost, start.wrapping_add(3200)).is_some());
    }
}
