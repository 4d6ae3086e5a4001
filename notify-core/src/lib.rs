//! Platform-agnostic audible annunciation for flight controllers.
//!
//! This crate decides which alert a status buzzer should sound from a
//! snapshot of vehicle state and renders the alert as a timed on/off
//! pattern. It has no platform dependencies and can be used both in
//! embedded `no_std` firmware and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Vehicle state snapshot ([`StateSnapshot`], [`GpsStatus`])
//! - [`pattern`]: Pattern masks and the alert catalog ([`PatternMask`], [`PatternCatalog`])
//! - [`selector`]: Priority cascade choosing what to play ([`PatternSelector`])
//! - [`player`]: Slot-by-slot playback with debounced output ([`PatternPlayer`])
//! - [`output`]: Output sink trait ([`OutputSink`])
//! - [`input`]: State source and clock traits ([`StateSource`], [`Clock`])
//! - [`buzzer`]: Init and per-tick entrypoint ([`Buzzer`])
//! - [`annunciator`]: Wires source, clock and buzzer together ([`Annunciator`])
//!
//! # Timing
//!
//! A pattern is a 32-bit mask played MSB first at 100 ms per bit, so every
//! pattern occupies a 3.2 s window. A new pattern may only start once the
//! previous window has elapsed, except for the arming-failed alert which
//! always preempts. The clock is a wrapping `u32` millisecond counter.
//!
//! # Example
//!
//! ```rust
//! use notify_core::{Buzzer, BuzzerConfig, OutputError, OutputSink, Pattern, StateSnapshot};
//!
//! struct Pin(bool);
//!
//! impl OutputSink for Pin {
//!     fn write(&mut self, on: bool) -> Result<(), OutputError> {
//!         self.0 = on;
//!         Ok(())
//!     }
//! }
//!
//! let config = BuzzerConfig { enabled: true, pin: Some(15), ..BuzzerConfig::DEFAULT };
//! let mut buzzer = Buzzer::init(&config, Pin(false), &StateSnapshot::idle());
//!
//! let armed = StateSnapshot { armed: true, ..StateSnapshot::idle() };
//! let report = buzzer.tick(&armed, 0).unwrap();
//! assert_eq!(report.started.map(|s| s.pattern), Some(Pattern::ArmingBuzz));
//! assert!(buzzer.sink().0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`embedded-hal`**: [`PinSink`] for any `embedded_hal::digital::OutputPin`
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod annunciator;
pub mod buzzer;
pub mod input;
pub mod output;
pub mod pattern;
#[cfg(any(test, feature = "embedded-hal"))]
pub mod pin;
pub mod player;
pub mod selector;
pub mod types;

// Re-export main types at crate root
pub use annunciator::Annunciator;
pub use buzzer::{Buzzer, BuzzerConfig, BuzzerStatus, InitError, TickReport};
pub use input::{Clock, StateSource};
pub use output::{OutputError, OutputSink, Polarity};
pub use pattern::{Pattern, PatternCatalog, PatternMask, SLOTS, SLOT_MS, WINDOW_MS};
#[cfg(any(test, feature = "embedded-hal"))]
pub use pin::PinSink;
pub use player::{PatternPlayer, PlaybackSession, Render};
pub use selector::{PatternSelector, PreviousStateCache, Rule, Selection};
pub use types::{GpsStatus, StateSnapshot};
