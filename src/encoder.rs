//! High-level interface for the M5Stack Unit8 Encoder.
//!
//! [`Unit8Encoder`] wraps the register transaction engine with input
//! validation, encoder-specific register addressing, batch reads and
//! writes, and the LED strip.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use smart_leds::RGB8;

use crate::color::Color;
use crate::config::EncoderConfig;
use crate::driver::{channel_register, led_register, RegisterBus};
use crate::error::Error;
use crate::pixels::{PixelBuffer, Pixels, Transmit, FRAME_CAPACITY};
use crate::registers::{encoder, Region, CHANNEL_COUNT};

/// High-level interface for the M5Stack Unit8 Encoder.
///
/// Eight rotary encoders with push buttons, a toggle switch, and a strip
/// of RGB LEDs that accepts the whole strip in one write.
///
/// # Example
///
/// ```no_run
/// # fn demo<I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(i2c: I2C, delay: D)
/// #     -> Result<(), unit8_driver::Error<I2C::Error>> {
/// use unit8_driver::Unit8Encoder;
///
/// let mut board = Unit8Encoder::new(i2c, delay);
///
/// // Read a single encoder
/// let pos = board.position(0)?;
///
/// // Read all eight encoders at once
/// let positions = board.positions()?;
///
/// // Start over
/// board.reset()?;
/// # Ok(())
/// # }
/// ```
pub struct Unit8Encoder<I2C, D> {
    bus: RegisterBus<I2C, D>,
    pixels: PixelBuffer,
    config: EncoderConfig,
}

impl<I2C, D> Unit8Encoder<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create an interface with the default configuration (address 0x41).
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, EncoderConfig::default())
    }

    /// Create an interface with an explicit configuration.
    ///
    /// No I2C traffic is generated.
    pub fn with_config(i2c: I2C, delay: D, config: EncoderConfig) -> Self {
        Self {
            bus: RegisterBus::new(i2c, delay, config.address, config.settle_us),
            pixels: PixelBuffer::new(config.led_count.get(), config.brightness, config.auto_write),
            config,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Give back the I2C peripheral and the delay provider.
    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    /// Read the absolute position of a specific encoder.
    ///
    /// The firmware accumulates ticks as a 32-bit signed integer with no
    /// artificial limits.
    ///
    /// # Arguments
    /// * `encoder`: Encoder index (0–7)
    ///
    /// # Errors
    /// * [`Error::ChannelOutOfRange`] if `encoder >= 8`
    /// * [`Error::Bus`] on communication failure
    pub fn position(&mut self, encoder: u8) -> Result<i32, Error<I2C::Error>> {
        self.read_i32(encoder::POSITION, encoder)
    }

    /// Read all eight encoder positions in sequence.
    ///
    /// The firmware has no burst reads, so this is 8 individual
    /// transactions. Returns the first I2C error encountered; no partial
    /// results are returned.
    pub fn positions(&mut self) -> Result<[i32; CHANNEL_COUNT], Error<I2C::Error>> {
        self.read_all_i32(encoder::POSITION)
    }

    /// Set the absolute position of a specific encoder.
    ///
    /// # Errors
    /// * [`Error::ChannelOutOfRange`] if `encoder >= 8`
    /// * [`Error::Bus`] on communication failure
    pub fn set_position(&mut self, encoder: u8, value: i32) -> Result<(), Error<I2C::Error>> {
        let register = channel_register(encoder::POSITION, encoder)?;
        self.bus.write_register(register, &value.to_le_bytes())
    }

    /// Load all eight positions, one write per encoder.
    ///
    /// # Errors
    /// * [`Error::LengthMismatch`] unless `values` holds exactly 8 entries
    /// * [`Error::Bus`] on communication failure; encoders before the
    ///   failing one keep their new value
    pub fn set_positions(&mut self, values: &[i32]) -> Result<(), Error<I2C::Error>> {
        if values.len() != CHANNEL_COUNT {
            return Err(Error::LengthMismatch {
                expected: CHANNEL_COUNT,
                actual: values.len(),
            });
        }

        self.bus.write_channels(encoder::POSITION, |channel, record| {
            record.copy_from_slice(&values[channel as usize].to_le_bytes());
        })
    }

    /// Zero all eight positions.
    ///
    /// Writes the trigger value to each encoder's reset register in turn.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("unit8 encoder: reset all positions");

        self.bus.write_channels(encoder::RESET, |_, record| {
            record[0] = encoder::RESET_TRIGGER_VALUE;
        })
    }

    // -----------------------------------------------------------------------
    // Increments
    // -----------------------------------------------------------------------

    /// Read the movement of one encoder since its increment was last read.
    ///
    /// This is a consuming read: the firmware resets the increment to zero,
    /// so two consecutive calls without movement return the value, then 0.
    pub fn increment(&mut self, encoder: u8) -> Result<i32, Error<I2C::Error>> {
        self.read_i32(encoder::INCREMENT, encoder)
    }

    /// Read (and reset) all eight increments.
    pub fn increments(&mut self) -> Result<[i32; CHANNEL_COUNT], Error<I2C::Error>> {
        self.read_all_i32(encoder::INCREMENT)
    }

    // -----------------------------------------------------------------------
    // Buttons and switch
    // -----------------------------------------------------------------------

    /// `true` while the encoder's push button is pressed.
    ///
    /// The firmware reports the raw, active-low level; it is corrected
    /// according to the configured polarity.
    pub fn button(&mut self, encoder: u8) -> Result<bool, Error<I2C::Error>> {
        let register = channel_register(encoder::BUTTONS, encoder)?;
        let bytes = self.bus.write_then_read(register, 0..1)?;
        Ok(self.config.button_polarity.is_active(bytes[0]))
    }

    /// State of all eight push buttons.
    pub fn buttons(&mut self) -> Result<[bool; CHANNEL_COUNT], Error<I2C::Error>> {
        let polarity = self.config.button_polarity;
        let bytes = self.bus.read_channels(encoder::BUTTONS)?;

        let mut buttons = [false; CHANNEL_COUNT];
        for (pressed, raw) in buttons.iter_mut().zip(bytes) {
            *pressed = polarity.is_active(*raw);
        }
        Ok(buttons)
    }

    /// State of the toggle switch.
    pub fn switch(&mut self) -> Result<bool, Error<I2C::Error>> {
        let bytes = self.bus.write_then_read(encoder::SWITCH.base, 0..1)?;
        Ok(self.config.switch_polarity.is_active(bytes[0]))
    }

    // -----------------------------------------------------------------------
    // LEDs
    // -----------------------------------------------------------------------

    /// Set one LED directly.
    ///
    /// The colour is also stored in the pixel buffer. The buffer's
    /// software brightness is not applied here.
    ///
    /// # Errors
    /// * [`Error::LedOutOfRange`] for a position past the strip
    /// * [`Error::InvalidColor`] if `color` is not an RGB triple
    /// * [`Error::Bus`] on communication failure
    pub fn set_led<'c>(&mut self, position: u8, color: impl Into<Color<'c>>) -> Result<(), Error<I2C::Error>> {
        let register = led_register(encoder::PIXELS, position, self.pixels.len())?;
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;

        self.bus.write_register(register, &[color.r, color.g, color.b])?;
        self.pixels.store(position as usize, color);
        Ok(())
    }

    /// Read back the colour of one LED.
    pub fn get_led(&mut self, position: u8) -> Result<RGB8, Error<I2C::Error>> {
        let register = led_register(encoder::PIXELS, position, self.pixels.len())?;
        let bytes = self.bus.write_then_read(register, 0..encoder::PIXELS.width as usize)?;
        Ok(RGB8::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Set every LED to the same colour in a single write.
    pub fn fill_leds<'c>(&mut self, color: impl Into<Color<'c>>) -> Result<(), Error<I2C::Error>> {
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;

        let mut frame = [0u8; FRAME_CAPACITY];
        let len = self.pixels.len() * 3;
        for chunk in frame[..len].chunks_exact_mut(3) {
            chunk.copy_from_slice(&[color.r, color.g, color.b]);
        }
        self.bus.write_register(encoder::PIXELS.base, &frame[..len])?;

        for index in 0..self.pixels.len() {
            self.pixels.store(index, color);
        }
        Ok(())
    }

    /// Buffered, brightness-scaled access to the LED strip.
    pub fn pixels(&mut self) -> Pixels<'_, EncoderLeds<'_, I2C, D>> {
        let leds = EncoderLeds { bus: &mut self.bus };
        Pixels::new(&mut self.pixels, leds)
    }

    // -----------------------------------------------------------------------
    // Typed read helpers
    // -----------------------------------------------------------------------

    fn read_i32(&mut self, region: Region, encoder: u8) -> Result<i32, Error<I2C::Error>> {
        let register = channel_register(region, encoder)?;
        let bytes = self.bus.write_then_read(register, 0..4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_all_i32(&mut self, region: Region) -> Result<[i32; CHANNEL_COUNT], Error<I2C::Error>> {
        let bytes = self.bus.read_channels(region)?;

        let mut values = [0i32; CHANNEL_COUNT];
        for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(values)
    }
}

/// [`Transmit`] side of the Unit8 Encoder's LED strip.
///
/// The encoder firmware accepts the whole strip as one burst starting at
/// the first LED register.
pub struct EncoderLeds<'a, I2C, D> {
    bus: &'a mut RegisterBus<I2C, D>,
}

impl<I2C, D> Transmit for EncoderLeds<'_, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type BusError = I2C::Error;

    fn transmit(&mut self, frame: &[u8]) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("unit8 encoder: show {} LEDs", frame.len() / 3);

        self.bus.write_register(encoder::PIXELS.base, frame)
    }
}
