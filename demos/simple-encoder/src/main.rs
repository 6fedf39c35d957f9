//! Simple Unit8 Encoder example
//!
//! Demonstrates basic usage of the unit8-driver crate on the Raspberry Pi
//! Pico 2. Polls the encoder board, logs positions, increments, buttons and
//! the switch via defmt, and mirrors the state on the LEDs.
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
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use unit8_driver::{Error, Unit8Encoder, RGB8};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

/// Map a position onto a red/blue blend, 64 ticks per half turn.
fn position_color(position: i32) -> RGB8 {
    let level = (position.rem_euclid(128) * 2) as u8;
    RGB8::new(level, 0, 255 - level)
}

type Board = Unit8Encoder<I2c<'static, I2C0, i2c::Blocking>, Delay>;
type Snapshot = ([i32; 8], [i32; 8], [bool; 8], bool);

fn poll(encoder: &mut Board) -> Result<Snapshot, Error<i2c::Error>> {
    Ok((
        encoder.positions()?,
        encoder.increments()?,
        encoder.buttons()?,
        encoder.switch()?,
    ))
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

    // --- Encoder board ---
    let mut encoder = Unit8Encoder::new(i2c, Delay);

    // Read once at startup so we have a baseline in the log.
    match encoder.positions() {
        Ok(positions) => info!("Initial positions: {}", positions),
        Err(e) => error!("Initial read failed: {}", e),
    }

    if let Err(e) = encoder.pixels().set_brightness(0.2) {
        error!("Failed to set brightness: {}", e);
    }

    info!("Encoder example started, rotate knobs to see position changes");

    let mut last = None;

    loop {
        let (positions, increments, buttons, switch) = match poll(&mut encoder) {
            Ok(state) => state,
            Err(e) => {
                error!("Read failed: {}", e);
                Timer::after(Duration::from_millis(100)).await;
                continue;
            }
        };

        if last != Some((positions, buttons, switch)) {
            last = Some((positions, buttons, switch));
            info!(
                "Positions: {} | Increments: {} | Buttons: {} | Switch: {}",
                positions, increments, buttons, switch
            );

            // Pressing the first and last buttons together zeroes everything.
            if buttons[0] && buttons[7] {
                if let Err(e) = encoder.reset() {
                    error!("Reset failed: {}", e);
                }
            }

            let mut pixels = encoder.pixels();
            let colors = positions.map(position_color);
            let status = if switch { 0x00FF00 } else { 0xFF0000 };
            let result = pixels
                .set_range(0..8, colors)
                .and_then(|()| pixels.set(8, status as u32));
            if let Err(e) = result {
                error!("LED update failed: {}", e);
            }
        }

        Timer::after(Duration::from_millis(10)).await;
    }
}
