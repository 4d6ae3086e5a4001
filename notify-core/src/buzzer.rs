//! Buzzer device: configuration, init and the per-tick entrypoint.

use crate::output::{OutputError, OutputSink, Polarity};
use crate::pattern::{Pattern, PatternCatalog};
use crate::player::{PatternPlayer, PlaybackSession};
use crate::selector::{PatternSelector, Selection};
use crate::types::StateSnapshot;

/// Buzzer configuration.
///
/// # Example
///
/// ```
/// use notify_core::{BuzzerConfig, InitError};
///
/// let config = BuzzerConfig {
///     enabled: true,
///     pin: Some(15),
///     ..BuzzerConfig::DEFAULT
/// };
/// assert_eq!(config.validate(), Ok(15));
/// assert_eq!(BuzzerConfig::DEFAULT.validate(), Err(InitError::Disabled));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BuzzerConfig {
    /// Feature switch. A disabled buzzer never touches its output.
    pub enabled: bool,
    /// GPIO the buzzer is wired to.
    pub pin: Option<u8>,
    /// Electrical level that sounds the buzzer.
    pub polarity: Polarity,
    /// Masks played for each alert.
    pub catalog: PatternCatalog,
}

impl BuzzerConfig {
    /// Disabled, no pin, stock tones.
    pub const DEFAULT: Self = Self {
        enabled: false,
        pin: None,
        polarity: Polarity::ActiveHigh,
        catalog: PatternCatalog::DEFAULT,
    };

    /// Check the configuration and return the pin to drive.
    pub const fn validate(&self) -> Result<u8, InitError> {
        if !self.enabled {
            return Err(InitError::Disabled);
        }
        match self.pin {
            Some(pin) => Ok(pin),
            None => Err(InitError::NoPin),
        }
    }
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Reason a buzzer failed to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Feature switched off.
    Disabled,
    /// No output pin configured.
    NoPin,
    /// Output could not be configured or forced off.
    Output(OutputError),
}

impl From<OutputError> for InitError {
    fn from(err: OutputError) -> Self {
        InitError::Output(err)
    }
}

/// Whether the buzzer is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuzzerStatus {
    Enabled { pin: u8 },
    Disabled(InitError),
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Pattern started on this tick.
    pub started: Option<Selection>,
    /// Requested output level.
    pub level: bool,
    /// Whether the output was written.
    pub wrote: bool,
}

/// Audible annunciator: selects alert patterns and plays them on a sink.
pub struct Buzzer<O> {
    sink: O,
    status: BuzzerStatus,
    catalog: PatternCatalog,
    selector: PatternSelector,
    player: PatternPlayer,
}

impl<O: OutputSink> Buzzer<O> {
    /// Bring up the buzzer.
    ///
    /// Configures the sink and forces it off. `initial` seeds the armed-state
    /// cache so the current arming state is not announced at boot. Failure
    /// is not fatal: the buzzer reports itself disabled and every tick is a
    /// no-op.
    pub fn init(config: &BuzzerConfig, mut sink: O, initial: &StateSnapshot) -> Self {
        let mut player = PatternPlayer::new();
        let status = match Self::bring_up(config, &mut sink, &mut player) {
            Ok(pin) => BuzzerStatus::Enabled { pin },
            Err(err) => BuzzerStatus::Disabled(err),
        };
        Self {
            sink,
            status,
            catalog: config.catalog,
            selector: PatternSelector::seeded(initial),
            player,
        }
    }

    fn bring_up(
        config: &BuzzerConfig,
        sink: &mut O,
        player: &mut PatternPlayer,
    ) -> Result<u8, InitError> {
        let pin = config.validate()?;
        sink.configure()?;
        player.force_off(sink)?;
        Ok(pin)
    }

    /// Select and render for this tick.
    ///
    /// Call at a steady rate (about 50 Hz) with the current state and
    /// clock. Disabled buzzers return an empty report.
    ///
    /// An `Err` only reports a failed sink write so the caller can log it.
    /// Selection and playback state have already advanced and the write is
    /// retried on the next tick; the buzzer never stops because of it.
    pub fn tick(&mut self, state: &StateSnapshot, now_ms: u32) -> Result<TickReport, OutputError> {
        if !self.is_enabled() {
            return Ok(TickReport::default());
        }

        let started = self.selector.evaluate(state, now_ms);
        if let Some(selection) = started {
            self.player.start(self.catalog.mask(selection.pattern), now_ms);
        }

        let render = self.player.tick(now_ms, &mut self.sink)?;
        Ok(TickReport {
            started,
            level: render.level,
            wrote: render.wrote,
        })
    }

    /// Start `pattern` immediately, bypassing selection.
    ///
    /// The start counts towards spacing, so only an arming failure can
    /// interrupt it. The output follows on the next [`tick`](Self::tick).
    pub fn play(&mut self, pattern: Pattern, now_ms: u32) {
        if self.is_enabled() {
            self.selector.record_start(now_ms);
            self.player.start(self.catalog.mask(pattern), now_ms);
        }
    }

    /// Re-seed the armed cache from the first authoritative state.
    pub fn seed(&mut self, state: &StateSnapshot) {
        self.selector.seed(state);
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> BuzzerStatus {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self.status, BuzzerStatus::Enabled { .. })
    }

    /// Active playback session, if any.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.player.session()
    }

    #[inline]
    #[must_use]
    pub fn selector(&self) -> &PatternSelector {
        &self.selector
    }

    /// Get a reference to the output sink.
    pub fn sink(&self) -> &O {
        &self.sink
    }

    /// Get a mutable reference to the output sink.
    pub fn sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }

    /// Release the output sink.
    pub fn into_sink(self) -> O {
        self.sink
    }
}
