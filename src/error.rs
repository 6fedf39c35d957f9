//! Error types for the Unit8 drivers.

/// Errors that can occur when talking to a Unit8 board.
///
/// `E` is the error type of the underlying I2C transport. Every variant
/// except [`Error::Bus`] is raised before any bus traffic, so the device
/// and the driver state are untouched when one of them is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Underlying I2C bus error.
    #[error("I2C error: {0:?}")]
    Bus(E),

    /// Sensor/encoder channel outside the board's channels.
    #[error("channel {index} out of range (must be below {count})")]
    ChannelOutOfRange { index: u8, count: u8 },

    /// LED position outside the configured LED strip.
    #[error("LED {index} out of range (must be below {count})")]
    LedOutOfRange { index: u8, count: u8 },

    /// Pixel index outside the pixel buffer.
    #[error("pixel {index} out of range (buffer holds {len})")]
    PixelOutOfRange { index: usize, len: usize },

    /// Software brightness outside `0.0..=1.0`.
    #[error("brightness must be within 0.0 and 1.0")]
    BrightnessOutOfRange,

    /// Hardware per-LED brightness above the configured scale.
    #[error("LED brightness {value} out of range (max {max})")]
    LedBrightnessOutOfRange { value: u8, max: u8 },

    /// Colour value that cannot be read as an RGB triple.
    #[error("color must be a packed 0xRRGGBB value or an (r, g, b) triple")]
    InvalidColor,

    /// Precision other than 8 or 12 bits.
    #[error("precision must be 8 or 12 bits, got {0}")]
    InvalidPrecision(u8),

    /// Bulk payload with the wrong number of elements.
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// An index or brightness outside its documented bound.
    Range,
    /// A payload of the wrong shape, or an invalid mode.
    Value,
    /// The transport failed mid-transaction.
    Bus,
}

impl<E> Error<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Bus(_) => ErrorKind::Bus,
            Error::ChannelOutOfRange { .. }
            | Error::LedOutOfRange { .. }
            | Error::PixelOutOfRange { .. }
            | Error::BrightnessOutOfRange
            | Error::LedBrightnessOutOfRange { .. } => ErrorKind::Range,
            Error::InvalidColor | Error::InvalidPrecision(_) | Error::LengthMismatch { .. } => {
                ErrorKind::Value
            }
        }
    }
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Bus(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let range: Error<()> = Error::ChannelOutOfRange { index: 8, count: 8 };
        assert_eq!(range.kind(), ErrorKind::Range);
        assert_eq!(Error::<()>::BrightnessOutOfRange.kind(), ErrorKind::Range);
        assert_eq!(Error::<()>::InvalidPrecision(10).kind(), ErrorKind::Value);
        assert_eq!(
            Error::<()>::LengthMismatch { expected: 8, actual: 7 }.kind(),
            ErrorKind::Value
        );
        assert_eq!(Error::Bus(()).kind(), ErrorKind::Bus);
    }

    #[test]
    fn bus_errors_convert_with_question_mark() {
        fn fails() -> Result<(), Error<&'static str>> {
            Err("nack")?;
            Ok(())
        }
        assert_eq!(fails(), Err(Error::Bus("nack")));
    }

    #[test]
    fn display_names_the_bound() {
        let err: Error<()> = Error::LedOutOfRange { index: 9, count: 9 };
        assert_eq!(err.to_string(), "LED 9 out of range (must be below 9)");
    }
}
