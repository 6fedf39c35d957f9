//! High-level interface for the M5Stack Unit8 Angle.
//!
//! [`Unit8Angle`] wraps the register transaction engine with input
//! validation, the angle register map, 16-bit normalization and the LED
//! strip.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use smart_leds::RGB8;

use crate::color::Color;
use crate::config::{AngleConfig, Precision};
use crate::driver::{channel_register, led_register, RegisterBus};
use crate::error::Error;
use crate::pixels::{PixelBuffer, Pixels, Transmit};
use crate::registers::{angle, Region, CHANNEL_COUNT};

/// Rescale a raw 8-bit reading to `0..=65535`, rounding down.
pub const fn normalize_8bit(raw: u8) -> u16 {
    (raw as u32 * 0xFFFF / angle::MAX_8BIT) as u16
}

/// Rescale a raw 12-bit reading to `0..=65535`, rounding down.
///
/// Readings above 4095 are treated as 4095.
pub const fn normalize_12bit(raw: u16) -> u16 {
    let raw = if raw as u32 > angle::MAX_12BIT {
        angle::MAX_12BIT
    } else {
        raw as u32
    };
    (raw * 0xFFFF / angle::MAX_12BIT) as u16
}

/// High-level interface for the M5Stack Unit8 Angle.
///
/// Eight potentiometers readable at 8-bit or 12-bit resolution, a toggle
/// switch, and a strip of RGB LEDs with a per-LED hardware brightness.
///
/// The firmware needs a settle time between transactions, so the
/// all-channel reads pause between channels (800 µs by default).
///
/// # Example
///
/// ```no_run
/// # fn demo<I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(i2c: I2C, delay: D)
/// #     -> Result<(), unit8_driver::Error<I2C::Error>> {
/// use unit8_driver::Unit8Angle;
///
/// let mut angles = Unit8Angle::new(i2c, delay);
///
/// // 12-bit readings rescaled to 0..=65535
/// let positions = angles.angles()?;
///
/// // LED under knob 0 follows its value
/// let level = angles.angle_8bit(0)?;
/// angles.set_led(0, (level, 0, 255 - level), 100)?;
/// # Ok(())
/// # }
/// ```
pub struct Unit8Angle<I2C, D> {
    bus: RegisterBus<I2C, D>,
    pixels: PixelBuffer,
    config: AngleConfig,
}

impl<I2C, D> Unit8Angle<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create an interface with the default configuration (address 0x43).
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, AngleConfig::default())
    }

    /// Create an interface with an explicit configuration.
    ///
    /// No I2C traffic is generated.
    pub fn with_config(i2c: I2C, delay: D, config: AngleConfig) -> Self {
        Self {
            bus: RegisterBus::new(i2c, delay, config.address, config.settle_us),
            pixels: PixelBuffer::new(config.led_count.get(), config.brightness, config.auto_write),
            config,
        }
    }

    pub fn config(&self) -> &AngleConfig {
        &self.config
    }

    /// Give back the I2C peripheral and the delay provider.
    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }

    // -----------------------------------------------------------------------
    // Precision
    // -----------------------------------------------------------------------

    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    /// Select the register range used by [`angle`](Self::angle) and
    /// [`angles`](Self::angles).
    pub fn set_precision(&mut self, precision: Precision) {
        #[cfg(feature = "defmt")]
        defmt::debug!("unit8 angle: {}-bit precision", precision.bits());

        self.config.precision = precision;
    }

    /// Like [`set_precision`](Self::set_precision), from a bit width.
    ///
    /// # Errors
    /// [`Error::InvalidPrecision`] unless `bits` is 8 or 12; the current
    /// precision is kept.
    pub fn set_precision_bits(&mut self, bits: u8) -> Result<(), Error<I2C::Error>> {
        let precision = Precision::try_from(bits).map_err(|_| Error::InvalidPrecision(bits))?;
        self.set_precision(precision);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Angles
    // -----------------------------------------------------------------------

    /// Value of one potentiometer, rescaled to `0..=65535` from the
    /// current precision.
    ///
    /// # Errors
    /// * [`Error::ChannelOutOfRange`] if `channel >= 8`
    /// * [`Error::Bus`] on communication failure
    pub fn angle(&mut self, channel: u8) -> Result<u16, Error<I2C::Error>> {
        match self.config.precision {
            Precision::Bits8 => self.angle_8bit(channel).map(normalize_8bit),
            Precision::Bits12 => self.angle_12bit(channel).map(normalize_12bit),
        }
    }

    /// All eight potentiometers, rescaled to `0..=65535`.
    pub fn angles(&mut self) -> Result<[u16; CHANNEL_COUNT], Error<I2C::Error>> {
        match self.config.precision {
            Precision::Bits8 => self.angles_8bit().map(|raw| raw.map(normalize_8bit)),
            Precision::Bits12 => self.angles_12bit().map(|raw| raw.map(normalize_12bit)),
        }
    }

    /// Raw 12-bit value (0–4095) of one potentiometer.
    ///
    /// # Errors
    /// * [`Error::ChannelOutOfRange`] if `channel >= 8`
    /// * [`Error::Bus`] on communication failure
    pub fn angle_12bit(&mut self, channel: u8) -> Result<u16, Error<I2C::Error>> {
        let register = channel_register(angle::ANGLE_12BIT, channel)?;
        let bytes = self.bus.write_then_read(register, 0..2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Raw 12-bit values of all eight potentiometers.
    ///
    /// Eight transactions with the settle time between them. Returns the
    /// first bus error encountered.
    pub fn angles_12bit(&mut self) -> Result<[u16; CHANNEL_COUNT], Error<I2C::Error>> {
        let bytes = self.bus.read_channels(angle::ANGLE_12BIT)?;

        let mut angles = [0u16; CHANNEL_COUNT];
        for (value, chunk) in angles.iter_mut().zip(bytes.chunks_exact(2)) {
            *value = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(angles)
    }

    /// Raw 8-bit value (0–255) of one potentiometer.
    pub fn angle_8bit(&mut self, channel: u8) -> Result<u8, Error<I2C::Error>> {
        let register = channel_register(angle::ANGLE_8BIT, channel)?;
        let bytes = self.bus.write_then_read(register, 0..1)?;
        Ok(bytes[0])
    }

    /// Raw 8-bit values of all eight potentiometers.
    pub fn angles_8bit(&mut self) -> Result<[u8; CHANNEL_COUNT], Error<I2C::Error>> {
        let bytes = self.bus.read_channels(angle::ANGLE_8BIT)?;

        let mut angles = [0u8; CHANNEL_COUNT];
        angles.copy_from_slice(&bytes[..CHANNEL_COUNT]);
        Ok(angles)
    }

    /// State of the toggle switch.
    pub fn switch(&mut self) -> Result<bool, Error<I2C::Error>> {
        let bytes = self.bus.write_then_read(angle::SWITCH.base, 0..1)?;
        Ok(self.config.switch_polarity.is_active(bytes[0]))
    }

    // -----------------------------------------------------------------------
    // LEDs
    // -----------------------------------------------------------------------

    /// Set one LED directly, with its hardware brightness.
    ///
    /// The colour is also stored in the pixel buffer so that a later
    /// [`Pixels::show`] keeps it. The buffer's software brightness is
    /// not applied here.
    ///
    /// # Arguments
    /// * `position`: LED index (0–8, or 0–7 without the status LED)
    /// * `color`: packed `0xRRGGBB` or an `(r, g, b)` triple
    /// * `brightness`: hardware brightness, up to the configured scale
    ///
    /// # Errors
    /// * [`Error::LedOutOfRange`] for a position past the strip
    /// * [`Error::LedBrightnessOutOfRange`] above the brightness scale
    /// * [`Error::InvalidColor`] if `color` is not an RGB triple
    /// * [`Error::Bus`] on communication failure
    pub fn set_led<'c>(
        &mut self,
        position: u8,
        color: impl Into<Color<'c>>,
        brightness: u8,
    ) -> Result<(), Error<I2C::Error>> {
        let register = led_register(angle::PIXELS, position, self.pixels.len())?;
        self.check_led_brightness(brightness)?;
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;

        self.bus
            .write_register(register, &[color.r, color.g, color.b, brightness])?;
        self.pixels.store(position as usize, color);
        Ok(())
    }

    /// Read back the colour stored in one LED record.
    pub fn get_led(&mut self, position: u8) -> Result<RGB8, Error<I2C::Error>> {
        let register = led_register(angle::PIXELS, position, self.pixels.len())?;
        let bytes = self.bus.write_then_read(register, 0..angle::PIXELS.width as usize)?;
        Ok(RGB8::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Set every LED to the same colour and hardware brightness.
    ///
    /// One record per LED with the settle time between records.
    pub fn fill_leds<'c>(
        &mut self,
        color: impl Into<Color<'c>>,
        brightness: u8,
    ) -> Result<(), Error<I2C::Error>> {
        self.check_led_brightness(brightness)?;
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("unit8 angle: fill {} LEDs", self.pixels.len());

        let strip = Region {
            count: self.pixels.len() as u8,
            ..angle::PIXELS
        };
        self.bus.write_channels(strip, |_, record| {
            record.copy_from_slice(&[color.r, color.g, color.b, brightness]);
        })?;
        for index in 0..self.pixels.len() {
            self.pixels.store(index, color);
        }
        Ok(())
    }

    /// Buffered, brightness-scaled access to the LED strip.
    pub fn pixels(&mut self) -> Pixels<'_, AngleLeds<'_, I2C, D>> {
        let leds = AngleLeds {
            bus: &mut self.bus,
            brightness: self.config.led_brightness_scale.max(),
        };
        Pixels::new(&mut self.pixels, leds)
    }

    fn check_led_brightness(&self, brightness: u8) -> Result<(), Error<I2C::Error>> {
        let max = self.config.led_brightness_scale.max();
        if brightness > max {
            return Err(Error::LedBrightnessOutOfRange { value: brightness, max });
        }
        Ok(())
    }
}

/// [`Transmit`] side of the Unit8 Angle's LED strip.
///
/// The angle firmware cannot take a pixel burst, so each LED is written as
/// its own `[register, r, g, b, brightness]` frame, with the settle time
/// between frames.
pub struct AngleLeds<'a, I2C, D> {
    bus: &'a mut RegisterBus<I2C, D>,
    brightness: u8,
}

impl<I2C, D> Transmit for AngleLeds<'_, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type BusError = I2C::Error;

    fn transmit(&mut self, frame: &[u8]) -> Result<(), Error<I2C::Error>> {
        let brightness = self.brightness;
        let strip = Region {
            count: (frame.len() / 3).min(angle::PIXELS.count as usize) as u8,
            ..angle::PIXELS
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("unit8 angle: show {} LEDs", strip.count);

        self.bus.write_channels(strip, |led, record| {
            let start = led as usize * 3;
            record[..3].copy_from_slice(&frame[start..start + 3]);
            record[3] = brightness;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_8bit_is_floor_division() {
        for raw in 0..=u8::MAX {
            assert_eq!(u32::from(normalize_8bit(raw)), u32::from(raw) * 65535 / 255);
        }
        assert_eq!(normalize_8bit(255), 65535);
    }

    #[test]
    fn normalize_12bit_is_floor_division() {
        for raw in 0..=4095u16 {
            assert_eq!(u32::from(normalize_12bit(raw)), u32::from(raw) * 65535 / 4095);
        }
        assert_eq!(normalize_12bit(256), 4096);
        assert_eq!(normalize_12bit(4095), 65535);
    }

    #[test]
    fn normalize_12bit_saturates_out_of_spec_readings() {
        assert_eq!(normalize_12bit(4096), 65535);
        assert_eq!(normalize_12bit(u16::MAX), 65535);
    }
}
