//! Output sink trait and error types.

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// GPIO / driver I/O error.
    Io,
    /// Output has not been configured.
    NotReady,
}

/// Electrical level that sounds the buzzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pin high = buzzer on.
    #[default]
    ActiveHigh,
    /// Pin low = buzzer on.
    ActiveLow,
}

impl Polarity {
    /// Pin level (`true` = high) that realises the logical state `on`.
    #[inline]
    #[must_use]
    pub const fn pin_level(self, on: bool) -> bool {
        match self {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        }
    }
}

/// Binary digital output driving the buzzer.
///
/// Writes are logical: `true` means sounding. Implementations apply their
/// own electrical polarity. Writes take effect immediately and repeated
/// writes of the same level are harmless.
pub trait OutputSink {
    /// Prepare the output for use. Called once during buzzer init.
    fn configure(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// Drive the output on or off.
    fn write(&mut self, on: bool) -> Result<(), OutputError>;
}
