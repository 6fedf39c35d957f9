//! Register transaction engine shared by both Unit8 boards.
//!
//! Implements the I2C communication primitives the Unit8 firmware expects:
//! a register select followed by a **separate** read (the firmware needs a
//! full STOP between the two and does not answer repeated-start reads),
//! and optional settle time between consecutive transactions.
//!
//! Consumers interact with [`Unit8Angle`](crate::Unit8Angle) and
//! [`Unit8Encoder`](crate::Unit8Encoder) instead.

use core::ops::Range;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::registers::Region;

/// Size of the scratch buffer reused by every transaction.
///
/// Large enough for all eight 32-bit encoder readings, and for the
/// register byte plus a full nine-LED RGB frame.
pub const SCRATCH_LEN: usize = 32;

/// Register transaction engine.
///
/// Owns the I2C peripheral, the delay provider and a scratch buffer. All
/// primitives take `&mut self`, so a multi-step operation holds exclusive
/// access to the bus and the buffer until it returns, on success and on
/// error alike.
pub(crate) struct RegisterBus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    settle_us: u32,
    scratch: [u8; SCRATCH_LEN],
}

impl<I2C, D> RegisterBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new engine.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access)
    /// * `delay`: delay provider used for settle time
    /// * `address`: 7-bit I2C device address
    /// * `settle_us`: pause between consecutive transactions, 0 for none
    pub fn new(i2c: I2C, delay: D, address: u8, settle_us: u32) -> Self {
        Self {
            i2c,
            delay,
            address,
            settle_us,
            scratch: [0; SCRATCH_LEN],
        }
    }

    /// Give back the I2C peripheral and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // -----------------------------------------------------------------------
    // Core protocol primitives
    // -----------------------------------------------------------------------

    /// Select a register, then read `range.len()` bytes into `scratch[range]`.
    ///
    /// Uses separate `write()` and `read()` operations rather than
    /// `write_read()`: the latter uses a repeated start, and the Unit8
    /// firmware only answers after a STOP.
    pub fn write_then_read(
        &mut self,
        register: u8,
        range: Range<usize>,
    ) -> Result<&[u8], Error<I2C::Error>> {
        if range.end > SCRATCH_LEN || range.start > range.end {
            return Err(Error::LengthMismatch {
                expected: SCRATCH_LEN,
                actual: range.end,
            });
        }

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "i2c {=u8:#x}: read {} bytes from {=u8:#x}",
            self.address,
            range.len(),
            register
        );

        self.i2c.write(self.address, &[register])?;
        self.i2c.read(self.address, &mut self.scratch[range.clone()])?;

        Ok(&self.scratch[range])
    }

    /// Write `[register, payload...]` as a single frame.
    pub fn write_register(
        &mut self,
        register: u8,
        payload: &[u8],
    ) -> Result<(), Error<I2C::Error>> {
        let len = payload.len() + 1;
        if len > SCRATCH_LEN {
            return Err(Error::LengthMismatch {
                expected: SCRATCH_LEN - 1,
                actual: payload.len(),
            });
        }

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "i2c {=u8:#x}: write {} bytes to {=u8:#x}",
            self.address,
            payload.len(),
            register
        );

        self.scratch[0] = register;
        self.scratch[1..len].copy_from_slice(payload);
        self.i2c.write(self.address, &self.scratch[..len])?;

        Ok(())
    }

    /// Pause for the configured settle time, if any.
    pub fn settle(&mut self) {
        if self.settle_us > 0 {
            self.delay.delay_us(self.settle_us);
        }
    }

    // -----------------------------------------------------------------------
    // Multi-channel helpers
    // -----------------------------------------------------------------------

    /// Read every channel of `region` into consecutive `width`-byte slices
    /// of the scratch buffer.
    ///
    /// The firmware has no burst reads, so this is one transaction per
    /// channel, with the settle time between consecutive channels. Returns
    /// the first `region.span()` bytes of the scratch buffer.
    pub fn read_channels(&mut self, region: Region) -> Result<&[u8], Error<I2C::Error>> {
        let width = region.width as usize;

        for channel in 0..region.count {
            if channel > 0 {
                self.settle();
            }
            let start = channel as usize * width;
            let register = region.base + channel * region.stride;
            self.write_then_read(register, start..start + width)?;
        }

        Ok(&self.scratch[..region.span()])
    }

    /// Write the same payload layout to every channel of `region`, one
    /// frame per channel, with the settle time between frames.
    ///
    /// `payload(channel)` supplies the bytes for each channel.
    pub fn write_channels<F>(&mut self, region: Region, mut payload: F) -> Result<(), Error<I2C::Error>>
    where
        F: FnMut(u8, &mut [u8]),
    {
        let width = region.width as usize;
        let mut frame = [0u8; SCRATCH_LEN];

        for channel in 0..region.count {
            if channel > 0 {
                self.settle();
            }
            payload(channel, &mut frame[..width]);
            let register = region.base + channel * region.stride;
            self.write_register(register, &frame[..width])?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Index validation
// ---------------------------------------------------------------------------

/// Register of sensor/encoder channel `index` in `region`.
///
/// # Errors
/// [`Error::ChannelOutOfRange`] if `index >= region.count`.
pub(crate) fn channel_register<E>(region: Region, index: u8) -> Result<u8, Error<E>> {
    region.address(index).ok_or(Error::ChannelOutOfRange {
        index,
        count: region.count,
    })
}

/// Register of LED `index` in `region`, for a strip of `count` LEDs.
///
/// # Errors
/// [`Error::LedOutOfRange`] if `index >= count`.
pub(crate) fn led_register<E>(region: Region, index: u8, count: usize) -> Result<u8, Error<E>> {
    let count = count.min(region.count as usize) as u8;
    if index >= count {
        return Err(Error::LedOutOfRange { index, count });
    }
    region.address(index).ok_or(Error::LedOutOfRange { index, count })
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;
    use crate::registers::{angle, encoder};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Write(Vec<u8>),
        Read(usize),
    }

    /// Answers every read with `fill`, logs writes and reads.
    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
        fill: u8,
        fail: bool,
    }

    impl ErrorType for Recorder {
        type Error = ErrorKind;
    }

    impl I2c for Recorder {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.ops.push(Op::Write(bytes.to_vec())),
                    Operation::Read(buffer) => {
                        buffer.fill(self.fill);
                        self.ops.push(Op::Read(buffer.len()));
                    }
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Delays(Vec<u32>);

    impl DelayNs for Delays {
        fn delay_ns(&mut self, ns: u32) {
            self.0.push(ns);
        }
    }

    #[test]
    fn read_is_a_write_followed_by_a_separate_read() {
        let recorder = Recorder { fill: 0xAB, ..Default::default() };
        let mut bus = RegisterBus::new(recorder, Delays::default(), 0x43, 0);

        let bytes = bus.write_then_read(0x06, 0..2).unwrap().to_vec();
        assert_eq!(bytes, vec![0xAB, 0xAB]);

        let (recorder, _) = bus.release();
        assert_eq!(recorder.ops, vec![Op::Write(vec![0x06]), Op::Read(2)]);
    }

    #[test]
    fn write_prefixes_register_in_one_frame() {
        let mut bus = RegisterBus::new(Recorder::default(), Delays::default(), 0x41, 0);
        bus.write_register(0x70, &[1, 2, 3]).unwrap();

        let (recorder, _) = bus.release();
        assert_eq!(recorder.ops, vec![Op::Write(vec![0x70, 1, 2, 3])]);
    }

    #[test]
    fn oversized_payload_is_rejected_before_io() {
        let mut bus = RegisterBus::new(Recorder::default(), Delays::default(), 0x41, 0);
        let payload = [0u8; SCRATCH_LEN];
        assert_eq!(
            bus.write_register(0x70, &payload),
            Err(Error::LengthMismatch { expected: SCRATCH_LEN - 1, actual: SCRATCH_LEN })
        );

        let (recorder, _) = bus.release();
        assert!(recorder.ops.is_empty());
    }

    #[test]
    fn channel_loop_settles_between_transactions_only() {
        let mut bus = RegisterBus::new(Recorder::default(), Delays::default(), 0x43, 800);
        let bytes = bus.read_channels(angle::ANGLE_12BIT).unwrap();
        assert_eq!(bytes.len(), 16);

        let (recorder, delays) = bus.release();
        assert_eq!(recorder.ops.len(), 16);
        assert_eq!(delays.0, vec![800_000; 7]);
        assert_eq!(recorder.ops[14], Op::Write(vec![0x0E]));
    }

    #[test]
    fn zero_settle_time_never_delays() {
        let mut bus = RegisterBus::new(Recorder::default(), Delays::default(), 0x41, 0);
        bus.read_channels(encoder::POSITION).unwrap();

        let (_, delays) = bus.release();
        assert!(delays.0.is_empty());
    }

    #[test]
    fn write_channels_targets_each_register() {
        let mut bus = RegisterBus::new(Recorder::default(), Delays::default(), 0x41, 0);
        bus.write_channels(encoder::RESET, |_, frame| frame[0] = 1).unwrap();

        let (recorder, _) = bus.release();
        let expected: Vec<Op> = (0..8u8).map(|i| Op::Write(vec![0x40 + i, 1])).collect();
        assert_eq!(recorder.ops, expected);
    }

    #[test]
    fn index_helpers_validate_before_computing() {
        assert_eq!(channel_register::<()>(angle::ANGLE_8BIT, 7), Ok(0x17));
        assert_eq!(
            channel_register::<()>(angle::ANGLE_8BIT, 8),
            Err(Error::ChannelOutOfRange { index: 8, count: 8 })
        );
        assert_eq!(led_register::<()>(encoder::PIXELS, 8, 9), Ok(0x88));
        assert_eq!(
            led_register::<()>(encoder::PIXELS, 8, 8),
            Err(Error::LedOutOfRange { index: 8, count: 8 })
        );
    }

    #[test]
    fn bus_failure_surfaces_as_bus_error() {
        let recorder = Recorder { fail: true, ..Default::default() };
        let mut bus = RegisterBus::new(recorder, Delays::default(), 0x41, 0);
        assert_eq!(
            bus.write_then_read(0x00, 0..4).map(|_| ()),
            Err(Error::Bus(ErrorKind::Other))
        );
    }
}
