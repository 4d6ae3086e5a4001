//! Annunciator: connects a state source and a clock to a buzzer.

use crate::buzzer::{Buzzer, BuzzerConfig, TickReport};
use crate::input::{Clock, StateSource};
use crate::output::{OutputError, OutputSink};
use crate::types::StateSnapshot;

/// Drives a [`Buzzer`] from a state publisher and a millisecond clock.
///
/// This abstraction keeps the tick entrypoint free of arguments so it can
/// be called straight from a periodic scheduler.
///
/// The armed cache is seeded from the first authoritative snapshot (see
/// [`StateSource::poll`]) rather than at construction, so a vehicle that
/// is already armed when telemetry starts is not announced.
pub struct Annunciator<S, C, O> {
    source: S,
    clock: C,
    buzzer: Buzzer<O>,
    seeded: bool,
}

impl<S: StateSource, C: Clock, O: OutputSink> Annunciator<S, C, O> {
    /// Initialise the buzzer and wire it to its collaborators.
    ///
    /// Does not read `source`; pending one-shot events are delivered on the
    /// first [`update`](Self::update).
    pub fn new(source: S, clock: C, config: &BuzzerConfig, sink: O) -> Self {
        let buzzer = Buzzer::init(config, sink, &StateSnapshot::idle());
        Self {
            source,
            clock,
            buzzer,
            seeded: false,
        }
    }

    /// Run one tick: read the state and clock, then select and render.
    ///
    /// Until the source is authoritative the buzzer runs on an idle state.
    pub fn update(&mut self) -> Result<TickReport, OutputError> {
        let state = match self.source.poll() {
            Some(state) => {
                if !self.seeded {
                    self.buzzer.seed(&state);
                    self.seeded = true;
                }
                state
            }
            None => StateSnapshot::idle(),
        };
        let now_ms = self.clock.now_ms();
        self.buzzer.tick(&state, now_ms)
    }

    /// Check if the armed cache has been seeded from the source.
    #[inline]
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Get a reference to the buzzer.
    pub fn buzzer(&self) -> &Buzzer<O> {
        &self.buzzer
    }

    /// Get a mutable reference to the buzzer.
    pub fn buzzer_mut(&mut self) -> &mut Buzzer<O> {
        &mut self.buzzer
    }

    /// Get a reference to the state source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the state source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Decompose the annunciator into its state source, clock and buzzer.
    pub fn into_parts(self) -> (S, C, Buzzer<O>) {
        (self.source, self.clock, self.buzzer)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::buzzer::BuzzerStatus;
    use crate::pattern::Pattern;
    use core::cell::Cell;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    // Replays scripted snapshots; repeats the last one when exhausted.
    struct ScriptedSource {
        states: Vec<StateSnapshot>,
        index: usize,
    }

    impl StateSource for ScriptedSource {
        fn snapshot(&mut self) -> StateSnapshot {
            let state = self.states[self.index.min(self.states.len() - 1)];
            self.index += 1;
            state
        }
    }

    // Unknown until `online` is set, then a fixed state with a latched
    // one-shot arming failure.
    struct LateSource {
        online: bool,
        state: StateSnapshot,
    }

    impl StateSource for LateSource {
        fn snapshot(&mut self) -> StateSnapshot {
            let state = self.state;
            self.state.arming_failed = false;
            state
        }

        fn poll(&mut self) -> Option<StateSnapshot> {
            self.online.then(|| self.snapshot())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<u32>>);

    impl Clock for ManualClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct MockSink {
        writes: Vec<bool>,
    }

    impl OutputSink for MockSink {
        fn write(&mut self, on: bool) -> Result<(), OutputError> {
            self.writes.push(on);
            Ok(())
        }
    }

    const ENABLED: BuzzerConfig = BuzzerConfig {
        enabled: true,
        pin: Some(3),
        ..BuzzerConfig::DEFAULT
    };

    #[test]
    fn test_update_reads_source_and_clock() {
        let armed = StateSnapshot {
            armed: true,
            ..StateSnapshot::idle()
        };
        let source = ScriptedSource {
            states: vec![StateSnapshot::idle(), armed],
            index: 0,
        };
        let time = Rc::new(Cell::new(0));
        let clock = ManualClock(time.clone());

        let mut annunciator = Annunciator::new(source, clock, &ENABLED, MockSink::default());
        assert_eq!(annunciator.buzzer().status(), BuzzerStatus::Enabled { pin: 3 });
        assert_eq!(annunciator.source().index, 0);

        time.set(230);
        assert!(annunciator.update().unwrap().started.is_none());
        assert!(annunciator.is_seeded());

        time.set(250);
        let report = annunciator.update().unwrap();
        assert_eq!(report.started.unwrap().pattern, Pattern::ArmingBuzz);
        assert_eq!(annunciator.buzzer().session().unwrap().start_ms, 250);

        time.set(270);
        assert!(annunciator.update().unwrap().started.is_none());

        let (source, _, buzzer) = annunciator.into_parts();
        assert_eq!(source.index, 3);
        assert_eq!(buzzer.sink().writes, vec![false, true]);
    }

    #[test]
    fn test_initial_snapshot_seeds_armed_cache() {
        let armed = StateSnapshot {
            armed: true,
            ..StateSnapshot::idle()
        };
        let source = ScriptedSource {
            states: vec![armed],
            index: 0,
        };
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut annunciator = Annunciator::new(source, clock, &ENABLED, MockSink::default());
        for _ in 0..10 {
            assert!(annunciator.update().unwrap().started.is_none());
        }
    }

    #[test]
    fn test_seeding_waits_for_authoritative_state() {
        let armed = StateSnapshot {
            armed: true,
            ..StateSnapshot::idle()
        };
        let source = LateSource {
            online: false,
            state: armed,
        };
        let time = Rc::new(Cell::new(0));
        let mut annunciator =
            Annunciator::new(source, ManualClock(time.clone()), &ENABLED, MockSink::default());

        for t in 0..5 {
            time.set(t * 20);
            assert!(annunciator.update().unwrap().started.is_none());
        }
        assert!(!annunciator.is_seeded());

        annunciator.source_mut().online = true;
        for t in 5..200 {
            time.set(t * 20);
            assert!(annunciator.update().unwrap().started.is_none());
        }
        assert!(annunciator.is_seeded());
        assert_eq!(annunciator.buzzer().sink().writes, vec![false]);
    }

    #[test]
    fn test_pending_arming_failure_survives_construction() {
        let source = LateSource {
            online: true,
            state: StateSnapshot {
                arming_failed: true,
                ..StateSnapshot::idle()
            },
        };
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut annunciator = Annunciator::new(source, clock, &ENABLED, MockSink::default());
        assert!(annunciator.source().state.arming_failed);

        let report = annunciator.update().unwrap();
        assert_eq!(report.started.unwrap().pattern, Pattern::SingleBuzz);
        assert!(!annunciator.source().state.arming_failed);
    }
}
