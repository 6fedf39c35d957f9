//! Simple Unit8 Angle example
//!
//! Reads the eight potentiometers of a Unit8 Angle on the Raspberry Pi
//! Pico 2, logs them via defmt and shows each knob's position as a
//! green-to-red LED colour. The status LED follows the switch.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                        |
//! |-----------|------------|------------------------------|
//! | I2C0 SDA  | GP20       |                              |
//! | I2C0 SCL  | GP21       |                              |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use unit8_driver::{AngleConfig, Precision, Unit8Angle, RGB8};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

/// Knob readings that move less than this are treated as noise.
const DEADBAND: u16 = 512;

fn knob_color(angle: u16) -> RGB8 {
    let level = (angle >> 8) as u8;
    RGB8::new(level, 255 - level, 0)
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // --- I2C bus (GP20 = SDA, GP21 = SCL), blocking mode ---
    let i2c = I2c::new_blocking(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        i2c::Config::default(),
    );

    // --- Angle board, buffered LEDs so one show() covers all knobs ---
    let config = AngleConfig::default()
        .with_precision(Precision::Bits12)
        .with_brightness(0.3)
        .with_auto_write(false);
    let mut angle = Unit8Angle::with_config(i2c, Delay, config);

    info!("Angle example started, turn the knobs");

    let mut last = [0u16; 8];
    let mut last_switch = None;

    loop {
        let angles = match angle.angles() {
            Ok(angles) => angles,
            Err(e) => {
                error!("Angle read failed: {}", e);
                Timer::after(Duration::from_millis(100)).await;
                continue;
            }
        };
        let switch = match angle.switch() {
            Ok(switch) => switch,
            Err(e) => {
                error!("Switch read failed: {}", e);
                Timer::after(Duration::from_millis(100)).await;
                continue;
            }
        };

        let moved = angles
            .iter()
            .zip(last.iter())
            .any(|(now, before)| now.abs_diff(*before) >= DEADBAND);

        if moved || last_switch != Some(switch) {
            last = angles;
            last_switch = Some(switch);
            info!("Angles: {} | Switch: {}", angles, switch);

            let mut pixels = angle.pixels();
            let result = pixels
                .set_range(0..8, angles.map(knob_color))
                .and_then(|()| pixels.set(8, if switch { 0xFFFFFFu32 } else { 0 }))
                .and_then(|()| pixels.show());
            if let Err(e) = result {
                error!("LED update failed: {}", e);
            }
        }

        Timer::after(Duration::from_millis(20)).await;
    }
}
