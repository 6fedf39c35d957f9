//! Register map constants for the M5Stack Unit8 Angle and Unit8 Encoder.
//!
//! Both boards use a flat one-byte register address space. Every quantity
//! occupies a contiguous [`Region`]; the register for channel `n` is
//! `base + n * stride`. There is no runtime discovery: all addresses below
//! are fixed by the firmware.

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A contiguous block of per-channel registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    /// Register of channel 0.
    pub base: u8,
    /// Distance between two consecutive channels.
    pub stride: u8,
    /// Number of channels in the region.
    pub count: u8,
    /// Bytes actually transferred per channel (may be less than `stride`).
    pub width: u8,
}

impl Region {
    pub const fn new(base: u8, stride: u8, count: u8, width: u8) -> Self {
        Self {
            base,
            stride,
            count,
            width,
        }
    }

    /// Register address for channel `index`, or `None` when the index is
    /// outside `0..count` or the address would not fit in one byte.
    pub const fn address(&self, index: u8) -> Option<u8> {
        if index >= self.count {
            return None;
        }
        match index.checked_mul(self.stride) {
            Some(offset) => self.base.checked_add(offset),
            None => None,
        }
    }

    /// One past the last register byte covered by this region.
    pub const fn end(&self) -> u16 {
        self.base as u16 + self.count as u16 * self.stride as u16
    }

    /// Number of bytes needed to hold one reading from every channel.
    pub const fn span(&self) -> usize {
        self.count as usize * self.width as usize
    }

    const fn overlaps(&self, other: &Region) -> bool {
        (self.base as u16) < other.end() && (other.base as u16) < self.end()
    }
}

/// Number of sensor/encoder channels on either board.
pub const CHANNEL_COUNT: usize = 8;

/// Number of LEDs including the status LED next to the switch.
pub const MAX_LEDS: usize = 9;

// ---------------------------------------------------------------------------
// Unit8 Angle
// ---------------------------------------------------------------------------

/// Register map of the Unit8 Angle (eight potentiometers).
pub mod angle {
    use super::Region;

    /// Default 7-bit I2C address.
    pub const DEFAULT_ADDRESS: u8 = 0x43;

    /// Raw 12-bit readings, little-endian `u16` per channel.
    pub const ANGLE_12BIT: Region = Region::new(0x00, 2, 8, 2);

    /// Raw 8-bit readings, one byte per channel.
    pub const ANGLE_8BIT: Region = Region::new(0x10, 1, 8, 1);

    /// Toggle switch state.
    pub const SWITCH: Region = Region::new(0x20, 1, 1, 1);

    /// LED records: `[r, g, b, brightness]` per LED.
    pub const PIXELS: Region = Region::new(0x30, 4, 9, 4);

    /// Settle time the firmware needs between two transactions.
    pub const SETTLE_US: u32 = 800;

    /// Full-scale value of an 8-bit reading.
    pub const MAX_8BIT: u32 = 0xFF;

    /// Full-scale value of a 12-bit reading.
    pub const MAX_12BIT: u32 = 0xFFF;

    pub(crate) const ALL: [Region; 4] = [ANGLE_12BIT, ANGLE_8BIT, SWITCH, PIXELS];
}

// ---------------------------------------------------------------------------
// Unit8 Encoder
// ---------------------------------------------------------------------------

/// Register map of the Unit8 Encoder (eight rotary encoders with buttons).
pub mod encoder {
    use super::Region;

    /// Default 7-bit I2C address.
    pub const DEFAULT_ADDRESS: u8 = 0x41;

    /// Absolute position, little-endian `i32` per channel (read/write).
    pub const POSITION: Region = Region::new(0x00, 4, 8, 4);

    /// Movement since the last read, little-endian `i32` per channel.
    /// Reading resets the firmware counter to zero.
    pub const INCREMENT: Region = Region::new(0x20, 4, 8, 4);

    /// Writing `RESET_TRIGGER_VALUE` zeroes the channel's position (write-only).
    pub const RESET: Region = Region::new(0x40, 1, 8, 1);

    /// Push button per encoder, active-low (read-only).
    pub const BUTTONS: Region = Region::new(0x50, 1, 8, 1);

    /// Toggle switch state.
    pub const SWITCH: Region = Region::new(0x60, 1, 1, 1);

    /// LED records: `[r, g, b]` per LED, writable as one burst.
    pub const PIXELS: Region = Region::new(0x70, 3, 9, 3);

    /// Payload written to a reset-trigger register.
    pub const RESET_TRIGGER_VALUE: u8 = 0x01;

    pub(crate) const ALL: [Region; 6] = [POSITION, INCREMENT, RESET, BUTTONS, SWITCH, PIXELS];
}

/// Returns `true` when no two regions of a map share a register.
pub(crate) const fn disjoint(regions: &[Region]) -> bool {
    let mut i = 0;
    while i < regions.len() {
        let mut j = i + 1;
        while j < regions.len() {
            if regions[i].overlaps(&regions[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(disjoint(&angle::ALL));
const _: () = assert!(disjoint(&encoder::ALL));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_follows_base_and_stride() {
        assert_eq!(angle::ANGLE_12BIT.address(3), Some(0x06));
        assert_eq!(angle::ANGLE_8BIT.address(7), Some(0x17));
        assert_eq!(angle::PIXELS.address(8), Some(0x50));
        assert_eq!(encoder::INCREMENT.address(1), Some(0x24));
        assert_eq!(encoder::PIXELS.address(8), Some(0x88));
    }

    #[test]
    fn address_rejects_out_of_range_index() {
        assert_eq!(angle::ANGLE_12BIT.address(8), None);
        assert_eq!(encoder::SWITCH.address(1), None);
        assert_eq!(encoder::PIXELS.address(9), None);
    }

    #[test]
    fn address_past_the_register_space_is_none() {
        let high = Region::new(0xF0, 4, 8, 4);
        assert_eq!(high.address(3), Some(0xFC));
        assert_eq!(high.address(4), None);
        assert_eq!(high.address(7), None);

        let wide = Region::new(0x00, 64, 8, 1);
        assert_eq!(wide.address(3), Some(0xC0));
        assert_eq!(wide.address(4), None);
    }

    #[test]
    fn regions_never_alias_within_a_variant() {
        assert!(disjoint(&angle::ALL));
        assert!(disjoint(&encoder::ALL));
    }

    #[test]
    fn overlapping_regions_are_detected() {
        let a = Region::new(0x00, 4, 8, 4);
        let b = Region::new(0x1C, 1, 1, 1);
        assert!(!disjoint(&[a, b]));
    }

    #[test]
    fn span_covers_every_channel() {
        assert_eq!(encoder::POSITION.span(), 32);
        assert_eq!(angle::ANGLE_12BIT.span(), 16);
        assert_eq!(angle::ANGLE_8BIT.span(), 8);
    }
}
