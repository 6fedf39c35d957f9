//! Buffered, brightness-scaled view of the on-board LED strip.
//!
//! [`PixelBuffer`] holds the colours, a software brightness and the
//! auto-write flag. It never talks to the bus: [`Pixels`] pairs the buffer
//! with a [`Transmit`] implementation supplied by the owning device, and
//! hands it the serialized frame whenever the strip must be refreshed.
//!
//! ```text
//! set / set_range / fill ──► PixelBuffer ──(auto-write or show)──► serialize
//!                                                                    │
//!                                         Transmit::transmit(frame) ◄┘
//! ```

use core::ops::Range;

use heapless::Vec;
use smart_leds::RGB8;

use crate::color::Color;
use crate::error::Error;
use crate::registers::MAX_LEDS;

/// Bytes in the largest serialized frame (R, G, B per LED).
pub const FRAME_CAPACITY: usize = MAX_LEDS * 3;

/// Sink for serialized pixel frames.
///
/// `frame` holds `len * 3` bytes in R, G, B order with the software
/// brightness already applied. Each device re-frames it into its own
/// register writes.
pub trait Transmit {
    /// Error type of the transport underneath.
    type BusError;

    fn transmit(&mut self, frame: &[u8]) -> Result<(), Error<Self::BusError>>;
}

// ── PixelBuffer ──────────────────────────────────────────────────────────

/// Colour storage for an LED strip of up to [`MAX_LEDS`] pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    colors: Vec<RGB8, MAX_LEDS>,
    brightness: f32,
    auto_write: bool,
    dirty: bool,
}

impl PixelBuffer {
    /// Create a buffer of `len` black pixels.
    ///
    /// `len` is capped at [`MAX_LEDS`]; `brightness` is clamped to
    /// `0.0..=1.0` (NaN becomes 1.0).
    pub fn new(len: usize, brightness: f32, auto_write: bool) -> Self {
        let mut colors = Vec::new();
        // Cannot fail: `len` is capped at the capacity.
        let _ = colors.resize_default(len.min(MAX_LEDS));

        let brightness = if brightness.is_nan() {
            1.0
        } else {
            brightness.clamp(0.0, 1.0)
        };

        Self {
            colors,
            brightness,
            auto_write,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Stored (unscaled) colour of pixel `index`.
    pub fn get(&self, index: usize) -> Option<RGB8> {
        self.colors.get(index).copied()
    }

    /// All stored (unscaled) colours.
    pub fn colors(&self) -> &[RGB8] {
        &self.colors
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    /// `true` when a mutation has not been transmitted yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a colour that was written to the hardware directly.
    pub(crate) fn store(&mut self, index: usize, color: RGB8) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    /// Serialize the strip into `out`, applying the software brightness.
    ///
    /// Returns the number of bytes written (`len * 3`).
    pub fn serialize(&self, out: &mut [u8; FRAME_CAPACITY]) -> usize {
        for (color, chunk) in self.colors.iter().zip(out.chunks_exact_mut(3)) {
            chunk[0] = scale(color.r, self.brightness);
            chunk[1] = scale(color.g, self.brightness);
            chunk[2] = scale(color.b, self.brightness);
        }
        self.colors.len() * 3
    }
}

/// `round(component * brightness)`, for brightness within `0.0..=1.0`.
fn scale(component: u8, brightness: f32) -> u8 {
    // Both factors are non-negative, so adding 0.5 and truncating rounds
    // half away from zero. The cast saturates at 255.
    (f32::from(component) * brightness + 0.5) as u8
}

// ── Pixels ───────────────────────────────────────────────────────────────

/// A [`PixelBuffer`] bound to the device that displays it.
///
/// Obtained from [`Unit8Angle::pixels`](crate::Unit8Angle::pixels) or
/// [`Unit8Encoder::pixels`](crate::Unit8Encoder::pixels). With auto-write
/// on, every mutation transmits the whole strip once; with it off, nothing
/// reaches the hardware until [`show`](Self::show).
///
/// # Example
///
/// ```no_run
/// # fn demo<T: unit8_driver::Transmit>(mut pixels: unit8_driver::Pixels<'_, T>)
/// #     -> Result<(), unit8_driver::Error<T::BusError>> {
/// pixels.set_auto_write(false);
/// pixels.fill(0x000000u32)?;
/// pixels.set(8, (0, 255, 0))?;
/// pixels.show()?;
/// # Ok(())
/// # }
/// ```
pub struct Pixels<'a, T> {
    buffer: &'a mut PixelBuffer,
    transmitter: T,
}

impl<'a, T> Pixels<'a, T>
where
    T: Transmit,
{
    pub fn new(buffer: &'a mut PixelBuffer, transmitter: T) -> Self {
        Self { buffer, transmitter }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RGB8> {
        self.buffer.get(index)
    }

    pub fn colors(&self) -> &[RGB8] {
        self.buffer.colors()
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    pub fn auto_write(&self) -> bool {
        self.buffer.auto_write()
    }

    /// Switch auto-write on or off. Does not transmit by itself.
    pub fn set_auto_write(&mut self, auto_write: bool) {
        self.buffer.auto_write = auto_write;
    }

    pub fn brightness(&self) -> f32 {
        self.buffer.brightness()
    }

    /// Set the software brightness applied when the strip is serialized.
    ///
    /// # Errors
    /// * [`Error::BrightnessOutOfRange`] outside `0.0..=1.0` (including NaN)
    /// * [`Error::Bus`] if auto-write is on and the refresh fails
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), Error<T::BusError>> {
        if !(0.0..=1.0).contains(&brightness) {
            return Err(Error::BrightnessOutOfRange);
        }
        self.buffer.brightness = brightness;
        self.buffer.dirty = true;
        self.commit()
    }

    /// Set one pixel.
    ///
    /// # Errors
    /// * [`Error::PixelOutOfRange`] if `index >= len()`
    /// * [`Error::InvalidColor`] if `color` is not an RGB triple
    /// * [`Error::Bus`] if auto-write is on and the transmit fails
    pub fn set<'c>(&mut self, index: usize, color: impl Into<Color<'c>>) -> Result<(), Error<T::BusError>> {
        let len = self.buffer.len();
        if index >= len {
            return Err(Error::PixelOutOfRange { index, len });
        }
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;

        self.buffer.colors[index] = color;
        self.buffer.dirty = true;
        self.commit()
    }

    /// Set a contiguous run of pixels, transmitting at most once.
    ///
    /// Every colour is validated before any pixel changes.
    ///
    /// # Errors
    /// * [`Error::PixelOutOfRange`] if `range` leaves the buffer
    /// * [`Error::InvalidColor`] if any colour is not an RGB triple
    /// * [`Error::LengthMismatch`] if `colors` does not yield exactly
    ///   `range.len()` items. At most one extra item is pulled, so `actual`
    ///   is capped at `range.len() + 1` and unbounded iterators are fine.
    /// * [`Error::Bus`] if auto-write is on and the transmit fails
    pub fn set_range<'c, I>(&mut self, range: Range<usize>, colors: I) -> Result<(), Error<T::BusError>>
    where
        I: IntoIterator,
        I::Item: Into<Color<'c>>,
    {
        let len = self.buffer.len();
        if range.start > range.end {
            return Err(Error::PixelOutOfRange { index: range.start, len });
        }
        if range.end > len {
            return Err(Error::PixelOutOfRange { index: range.end - 1, len });
        }

        let mut staged: Vec<RGB8, MAX_LEDS> = Vec::new();
        let mut count = 0;
        for color in colors.into_iter().take(range.len() + 1) {
            count += 1;
            let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;
            // Overflow only happens on a length mismatch, reported below.
            let _ = staged.push(color);
        }
        if count != range.len() {
            return Err(Error::LengthMismatch {
                expected: range.len(),
                actual: count,
            });
        }

        self.buffer.colors[range].copy_from_slice(&staged);
        self.buffer.dirty = true;
        self.commit()
    }

    /// Set every pixel to `color`, transmitting at most once.
    pub fn fill<'c>(&mut self, color: impl Into<Color<'c>>) -> Result<(), Error<T::BusError>> {
        let color = color.into().to_rgb().ok_or(Error::InvalidColor)?;
        self.buffer.colors.iter_mut().for_each(|slot| *slot = color);
        self.buffer.dirty = true;
        self.commit()
    }

    /// Transmit the whole strip, whether or not anything changed.
    pub fn show(&mut self) -> Result<(), Error<T::BusError>> {
        let mut frame = [0u8; FRAME_CAPACITY];
        let len = self.buffer.serialize(&mut frame);
        self.transmitter.transmit(&frame[..len])?;
        self.buffer.dirty = false;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error<T::BusError>> {
        if self.buffer.auto_write {
            self.show()
        } else {
            Ok(())
        }
    }
}
