//! Register-file fake of a Unit8 board for integration tests.
//!
//! Models the firmware's addressing: a write selects a register (first
//! byte) and stores any remaining bytes from there on; a read returns bytes
//! from the last selected register onwards. Every bus operation and delay
//! is logged so tests can assert on exact traffic.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write(Vec<u8>),
    Read { register: u8, len: usize },
    Delay { ns: u32 },
}

#[derive(Debug)]
pub struct State {
    pub address: u8,
    pub registers: [u8; 256],
    pub ops: Vec<Op>,
    pointer: u8,
    /// Zero an encoder increment after it has been read.
    pub consume_increments: bool,
    /// Zero the matching position when a reset trigger is written.
    pub model_reset: bool,
    /// Fail every bus operation once this many have succeeded.
    pub fail_after: Option<usize>,
}

/// Shared handle: one clone goes into the driver, the other stays in the
/// test for inspection.
#[derive(Debug, Clone)]
pub struct FakeBoard {
    state: Rc<RefCell<State>>,
}

impl FakeBoard {
    pub fn new(address: u8) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                address,
                registers: [0; 256],
                ops: Vec::new(),
                pointer: 0,
                consume_increments: false,
                model_reset: false,
                fail_after: None,
            })),
        }
    }

    /// Unit8 Angle at its default address.
    pub fn angle() -> Self {
        Self::new(0x43)
    }

    /// Unit8 Encoder at its default address, with firmware side effects.
    pub fn encoder() -> Self {
        let board = Self::new(0x41);
        {
            let mut state = board.state.borrow_mut();
            state.consume_increments = true;
            state.model_reset = true;
        }
        board
    }

    pub fn state(&self) -> std::cell::RefMut<'_, State> {
        self.state.borrow_mut()
    }

    pub fn poke(&self, register: u8, bytes: &[u8]) {
        let mut state = self.state.borrow_mut();
        let start = register as usize;
        state.registers[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn peek(&self, register: u8, len: usize) -> Vec<u8> {
        let state = self.state.borrow();
        let start = register as usize;
        state.registers[start..start + len].to_vec()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.borrow().ops.clone()
    }

    /// Bus operations only, delays filtered out.
    pub fn bus_ops(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, Op::Delay { .. }))
            .collect()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Write(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Delay { ns } => Some(ns),
                _ => None,
            })
            .collect()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            state: Rc::clone(&self.state),
        }
    }
}

impl ErrorType for FakeBoard {
    type Error = ErrorKind;
}

impl i2c::I2c for FakeBoard {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if address != state.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            let completed = state
                .ops
                .iter()
                .filter(|op| !matches!(op, Op::Delay { .. }))
                .count();
            if state.fail_after.is_some_and(|limit| completed >= limit) {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
            }

            match operation {
                Operation::Write(bytes) => {
                    state.ops.push(Op::Write(bytes.to_vec()));
                    let Some((&register, payload)) = bytes.split_first() else {
                        continue;
                    };
                    state.pointer = register;
                    let start = register as usize;
                    state.registers[start..start + payload.len()].copy_from_slice(payload);

                    if state.model_reset && (0x40..0x48).contains(&register) && payload == [1] {
                        let position = (register - 0x40) as usize * 4;
                        state.registers[position..position + 4].fill(0);
                    }
                }
                Operation::Read(buffer) => {
                    let register = state.pointer;
                    let start = register as usize;
                    buffer.copy_from_slice(&state.registers[start..start + buffer.len()]);
                    state.ops.push(Op::Read {
                        register,
                        len: buffer.len(),
                    });

                    if state.consume_increments && (0x20..0x40).contains(&register) {
                        state.registers[start..start + buffer.len()].fill(0);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay provider that logs into the board's operation list.
#[derive(Debug)]
pub struct FakeDelay {
    state: Rc<RefCell<State>>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.state.borrow_mut().ops.push(Op::Delay { ns });
    }
}
