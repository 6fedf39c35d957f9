//! Per-board configuration.
//!
//! The published firmware revisions of both boards disagree on a handful
//! of details: whether the status LED next to the switch is part of the
//! strip, which range the per-LED hardware brightness byte uses, and which
//! level means "pressed". Rather than hard-coding one revision these are
//! knobs on [`AngleConfig`] and [`EncoderConfig`].
//!
//! [`AngleConfig::default()`] and [`EncoderConfig::default()`] match the
//! current M5Stack firmware.

use crate::registers::{angle, encoder, CHANNEL_COUNT, MAX_LEDS};

// ── Knobs ────────────────────────────────────────────────────────────────

/// Number of addressable LEDs on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCount {
    /// One LED per channel.
    Channels,
    /// One LED per channel plus the status LED next to the switch.
    #[default]
    WithStatus,
}

impl LedCount {
    pub const fn get(self) -> usize {
        match self {
            LedCount::Channels => CHANNEL_COUNT,
            LedCount::WithStatus => MAX_LEDS,
        }
    }
}

/// Range of the hardware brightness byte stored with each angle LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrightnessScale {
    /// 0–100.
    #[default]
    Percent,
    /// 0–255.
    Byte,
}

impl BrightnessScale {
    /// Largest accepted value, also used for frames sent by `show()`.
    pub const fn max(self) -> u8 {
        match self {
            BrightnessScale::Percent => 100,
            BrightnessScale::Byte => u8::MAX,
        }
    }
}

/// Which raw level of a boolean input reads as "on" / "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Nonzero byte means active.
    ActiveHigh,
    /// Zero byte means active.
    ActiveLow,
}

impl Polarity {
    pub const fn is_active(self, raw: u8) -> bool {
        match self {
            Polarity::ActiveHigh => raw != 0,
            Polarity::ActiveLow => raw == 0,
        }
    }
}

/// Resolution used by the generic angle queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Precision {
    Bits8,
    #[default]
    Bits12,
}

impl Precision {
    pub const fn bits(self) -> u8 {
        match self {
            Precision::Bits8 => 8,
            Precision::Bits12 => 12,
        }
    }
}

/// Rejected precision width, see [`Precision::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPrecision(pub u8);

impl TryFrom<u8> for Precision {
    type Error = InvalidPrecision;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(Precision::Bits8),
            12 => Ok(Precision::Bits12),
            other => Err(InvalidPrecision(other)),
        }
    }
}

// ── AngleConfig ──────────────────────────────────────────────────────────

/// Configuration of a [`Unit8Angle`](crate::Unit8Angle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleConfig {
    /// 7-bit I2C address. Default: `0x43`.
    pub address: u8,
    /// Initial precision of [`angle`](crate::Unit8Angle::angle). Default: 12 bits.
    pub precision: Precision,
    /// LEDs driven by the pixel buffer. Default: 9.
    pub led_count: LedCount,
    /// Range of `set_led`'s brightness argument. Default: 0–100.
    pub led_brightness_scale: BrightnessScale,
    /// Polarity of the toggle switch. Default: active-high.
    pub switch_polarity: Polarity,
    /// Initial software brightness of the pixel buffer. Default: 1.0.
    pub brightness: f32,
    /// Transmit on every pixel mutation. Default: `true`.
    pub auto_write: bool,
    /// Pause between two transactions, in microseconds. Default: 800.
    pub settle_us: u32,
}

impl Default for AngleConfig {
    fn default() -> Self {
        Self {
            address: angle::DEFAULT_ADDRESS,
            precision: Precision::Bits12,
            led_count: LedCount::WithStatus,
            led_brightness_scale: BrightnessScale::Percent,
            switch_polarity: Polarity::ActiveHigh,
            brightness: 1.0,
            auto_write: true,
            settle_us: angle::SETTLE_US,
        }
    }
}

impl AngleConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_led_count(mut self, led_count: LedCount) -> Self {
        self.led_count = led_count;
        self
    }

    pub fn with_led_brightness_scale(mut self, scale: BrightnessScale) -> Self {
        self.led_brightness_scale = scale;
        self
    }

    pub fn with_switch_polarity(mut self, polarity: Polarity) -> Self {
        self.switch_polarity = polarity;
        self
    }

    /// Values outside `0.0..=1.0` are clamped when the device is built.
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_auto_write(mut self, auto_write: bool) -> Self {
        self.auto_write = auto_write;
        self
    }

    pub fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }
}

// ── EncoderConfig ────────────────────────────────────────────────────────

/// Configuration of a [`Unit8Encoder`](crate::Unit8Encoder).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    /// 7-bit I2C address. Default: `0x41`.
    pub address: u8,
    /// LEDs driven by the pixel buffer. Default: 9.
    pub led_count: LedCount,
    /// Polarity of the push buttons. Default: active-low.
    pub button_polarity: Polarity,
    /// Polarity of the toggle switch. Default: active-high.
    pub switch_polarity: Polarity,
    /// Initial software brightness of the pixel buffer. Default: 1.0.
    pub brightness: f32,
    /// Transmit on every pixel mutation. Default: `true`.
    pub auto_write: bool,
    /// Pause between two transactions, in microseconds. Default: 0.
    pub settle_us: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            address: encoder::DEFAULT_ADDRESS,
            led_count: LedCount::WithStatus,
            button_polarity: Polarity::ActiveLow,
            switch_polarity: Polarity::ActiveHigh,
            brightness: 1.0,
            auto_write: true,
            settle_us: 0,
        }
    }
}

impl EncoderConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_led_count(mut self, led_count: LedCount) -> Self {
        self.led_count = led_count;
        self
    }

    pub fn with_button_polarity(mut self, polarity: Polarity) -> Self {
        self.button_polarity = polarity;
        self
    }

    pub fn with_switch_polarity(mut self, polarity: Polarity) -> Self {
        self.switch_polarity = polarity;
        self
    }

    /// Values outside `0.0..=1.0` are clamped when the device is built.
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_auto_write(mut self, auto_write: bool) -> Self {
        self.auto_write = auto_write;
        self
    }

    pub fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_accepts_only_8_and_12() {
        assert_eq!(Precision::try_from(8), Ok(Precision::Bits8));
        assert_eq!(Precision::try_from(12), Ok(Precision::Bits12));
        assert_eq!(Precision::try_from(16), Err(InvalidPrecision(16)));
        assert_eq!(Precision::try_from(0), Err(InvalidPrecision(0)));
    }

    #[test]
    fn precision_bits_round_trip() {
        for precision in [Precision::Bits8, Precision::Bits12] {
            assert_eq!(Precision::try_from(precision.bits()), Ok(precision));
        }
        assert_eq!(Precision::default().bits(), 12);
    }

    #[test]
    fn polarity_inverts_active_low() {
        assert!(Polarity::ActiveHigh.is_active(1));
        assert!(!Polarity::ActiveHigh.is_active(0));
        assert!(Polarity::ActiveLow.is_active(0));
        assert!(!Polarity::ActiveLow.is_active(0xFF));
    }

    #[test]
    fn defaults_match_current_firmware() {
        let angle = AngleConfig::default();
        assert_eq!(angle.address, 0x43);
        assert_eq!(angle.led_count.get(), 9);
        assert_eq!(angle.settle_us, 800);
        assert_eq!(angle.led_brightness_scale.max(), 100);

        let encoder = EncoderConfig::default();
        assert_eq!(encoder.address, 0x41);
        assert_eq!(encoder.button_polarity, Polarity::ActiveLow);
        assert_eq!(encoder.settle_us, 0);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = AngleConfig::default()
            .with_led_count(LedCount::Channels)
            .with_led_brightness_scale(BrightnessScale::Byte)
            .with_auto_write(false);
        assert_eq!(config.led_count.get(), 8);
        assert_eq!(config.led_brightness_scale.max(), 255);
        assert!(!config.auto_write);
        assert_eq!(config.address, 0x43);
    }
}
