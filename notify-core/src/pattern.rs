//! Buzzer pattern masks and the catalog mapping alerts to masks.
//!
//! A pattern is a 32-bit mask played most-significant bit first, one bit per
//! 100 ms slot, giving a fixed 3.2 s playback window. A set bit sounds the
//! buzzer for that slot.

/// Duration of one pattern slot in milliseconds.
pub const SLOT_MS: u32 = 100;

/// Number of slots in a pattern.
pub const SLOTS: u32 = 32;

/// Total playback window of a pattern in milliseconds.
pub const WINDOW_MS: u32 = SLOT_MS * SLOTS;

/// A 32-slot on/off pattern, read MSB first.
///
/// # Example
///
/// ```
/// use notify_core::PatternMask;
///
/// let mask = PatternMask(0b1010_0000 << 24);
/// assert!(mask.level_at(0));
/// assert!(!mask.level_at(1));
/// assert!(mask.level_at(2));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternMask(pub u32);

impl PatternMask {
    /// Mask that never sounds.
    pub const SILENT: Self = Self(0);

    /// Output level for the given slot (0 = first 100 ms).
    ///
    /// Slots past the end of the window are silent.
    #[inline]
    #[must_use]
    pub const fn level_at(self, slot: u32) -> bool {
        if slot >= SLOTS {
            return false;
        }
        self.0 & (1 << (SLOTS - 1 - slot)) != 0
    }

    /// Check if the mask never sounds.
    #[inline]
    #[must_use]
    pub const fn is_silent(self) -> bool {
        self.0 == 0
    }

    /// Get the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Alerts the buzzer can sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// Disarm, battery failsafe, arming failure.
    SingleBuzz,
    /// Vehicle lost, 3D GPS lock.
    DoubleBuzz,
    /// DGPS / RTK lock.
    TripleBuzz,
    /// Vehicle armed.
    ArmingBuzz,
    /// Navigation filter went bad.
    EkfBad,
}

/// Mapping from [`Pattern`] to the mask that is played for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternCatalog {
    pub single_buzz: PatternMask,
    pub double_buzz: PatternMask,
    pub triple_buzz: PatternMask,
    pub arming_buzz: PatternMask,
    pub ekf_bad: PatternMask,
}

impl PatternCatalog {
    /// Stock tones.
    pub const DEFAULT: Self = Self {
        single_buzz: PatternMask(0b10000000_00000000_00000000_00000000),
        double_buzz: PatternMask(0b10100000_00000000_00000000_00000000),
        triple_buzz: PatternMask(0b10101000_00000000_00000000_00000000),
        arming_buzz: PatternMask(0b11111111_11111111_11111111_11111100),
        ekf_bad: PatternMask(0b11101101_01000000_00000000_00000000),
    };

    /// Look up the mask for a pattern.
    #[inline]
    #[must_use]
    pub const fn mask(&self, pattern: Pattern) -> PatternMask {
        match pattern {
            Pattern::SingleBuzz => self.single_buzz,
            Pattern::DoubleBuzz => self.double_buzz,
            Pattern::TripleBuzz => self.triple_buzz,
            Pattern::ArmingBuzz => self.arming_buzz,
            Pattern::EkfBad => self.ekf_bad,
        }
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::DEFAULT
    }
}
