//! Blocking driver for the M5Stack Unit8 Angle and Unit8 Encoder.
//!
//! This crate provides `embedded-hal` 1.0 I2C drivers for the two M5Stack
//! "Unit8" breakouts: eight potentiometers ([`Unit8Angle`]) and eight
//! rotary encoders with push buttons ([`Unit8Encoder`]). Both boards also
//! carry a strip of RGB LEDs.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private): the register transaction engine. Register
//!   select and read are two separate bus operations, since the firmware
//!   needs a STOP between them. Settle time goes between transactions and
//!   one scratch buffer is reused throughout.
//! - **[`registers`]**: per-board register map constants.
//! - **[`PixelBuffer`] / [`Pixels`]**: buffered, brightness-scaled LED
//!   strip that hands serialized frames to a [`Transmit`] implementation.
//! - **[`Unit8Angle`] / [`Unit8Encoder`]** (public): validated,
//!   high-level APIs.
//!
//! Every validation error ([`ErrorKind::Range`], [`ErrorKind::Value`]) is
//! raised before any bus traffic.
//!
//! # Quick start
//!
//! ```no_run
//! # fn demo<I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(i2c: I2C, delay: D)
//! #     -> Result<(), unit8_driver::Error<I2C::Error>> {
//! use unit8_driver::Unit8Encoder;
//!
//! // Construct with any `embedded-hal` I2C implementation and delay
//! let mut board = Unit8Encoder::new(i2c, delay);
//!
//! // Read all eight encoder positions
//! let positions = board.positions()?;
//!
//! // Colour the status LED, scaled by the software brightness
//! let mut pixels = board.pixels();
//! pixels.set_brightness(0.2)?;
//! pixels.set(8, 0x00FF00u32)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: Enable `defmt::Format` implementations on error and
//!   configuration types, and transaction tracing.

#![cfg_attr(not(test), no_std)]

pub use angle::{normalize_12bit, normalize_8bit, AngleLeds, Unit8Angle};
pub use color::Color;
pub use config::{
    AngleConfig, BrightnessScale, EncoderConfig, InvalidPrecision, LedCount, Polarity, Precision,
};
pub use encoder::{EncoderLeds, Unit8Encoder};
pub use error::{Error, ErrorKind};
pub use pixels::{PixelBuffer, Pixels, Transmit};
pub use registers::{CHANNEL_COUNT, MAX_LEDS};
pub use smart_leds::RGB8;

mod angle;
mod color;
mod config;
mod driver;
mod encoder;
mod error;
mod pixels;
pub mod registers;
