//! Pattern playback: renders the active pattern one 100 ms slot at a time.

use crate::output::{OutputError, OutputSink};
use crate::pattern::{PatternMask, SLOT_MS, WINDOW_MS};

/// One in-flight rendering of a pattern mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackSession {
    pub mask: PatternMask,
    pub start_ms: u32,
}

impl PlaybackSession {
    /// Milliseconds since the session started (wrap-safe).
    #[inline]
    #[must_use]
    pub const fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.start_ms)
    }

    /// Level for the slot current at `now_ms`, or `None` once the window
    /// has elapsed.
    #[must_use]
    pub const fn level_at(&self, now_ms: u32) -> Option<bool> {
        let delta = self.elapsed(now_ms);
        if delta >= WINDOW_MS {
            None
        } else {
            Some(self.mask.level_at(delta / SLOT_MS))
        }
    }
}

/// Output of one player tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Render {
    /// Level requested for this tick.
    pub level: bool,
    /// Whether the sink was written.
    pub wrote: bool,
}

/// Plays at most one pattern at a time and debounces sink writes.
#[derive(Clone, Debug, Default)]
pub struct PatternPlayer {
    session: Option<PlaybackSession>,
    level: bool,
}

impl PatternPlayer {
    /// Create an idle player with the output assumed off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: None,
            level: false,
        }
    }

    /// Start playing `mask` at `now_ms`, replacing any active session.
    pub fn start(&mut self, mask: PatternMask, now_ms: u32) {
        self.session = Some(PlaybackSession {
            mask,
            start_ms: now_ms,
        });
    }

    /// Active session, if any.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Check if a session is active.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// Last level written to the sink.
    #[inline]
    #[must_use]
    pub fn level(&self) -> bool {
        self.level
    }

    /// Level requested at `now_ms`. Ends the session once its window is over.
    pub fn requested_level(&mut self, now_ms: u32) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        match session.level_at(now_ms) {
            Some(level) => level,
            None => {
                self.session = None;
                false
            }
        }
    }

    /// Render the current slot, writing the sink only when the level changes.
    ///
    /// A failed write leaves the recorded level untouched so it is retried
    /// on the next tick.
    pub fn tick<O: OutputSink>(&mut self, now_ms: u32, sink: &mut O) -> Result<Render, OutputError> {
        let level = self.requested_level(now_ms);
        if level == self.level {
            return Ok(Render { level, wrote: false });
        }
        sink.write(level)?;
        self.level = level;
        Ok(Render { level, wrote: true })
    }

    /// Drop any session and drive the sink off unconditionally.
    pub fn force_off<O: OutputSink>(&mut self, sink: &mut O) -> Result<(), OutputError> {
        self.session = None;
        sink.write(false)?;
        self.level = false;
        Ok(())
    }
}
