//! [`OutputSink`] over an `embedded-hal` digital output pin.

use crate::output::{OutputError, OutputSink, Polarity};
use embedded_hal::digital::OutputPin;

/// Buzzer wired to a GPIO pin.
pub struct PinSink<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin> PinSink<P> {
    /// Wrap a pin that is already in push-pull output mode.
    #[must_use]
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Configured polarity.
    #[inline]
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Release the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> OutputSink for PinSink<P> {
    fn write(&mut self, on: bool) -> Result<(), OutputError> {
        let result = if self.polarity.pin_level(on) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| OutputError::Io)
    }
}
