//! CPU state and faults
//!
//! Four 16-bit registers, a program counter and a single zero flag. Register
//! arithmetic wraps at 2^16 and never faults.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::isa::Register;

/// How CMP treats the zero flag when the operands differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareMode {
    /// Z = (A == imm16)
    #[default]
    ClearOnMismatch,
    /// Z is only ever set; a mismatch leaves it as it was
    Sticky,
}

/// Execution context of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuState {
    pub a: u16,
    pub b: u16,
    pub c: u16,
    pub d: u16,
    /// Offset of the next opcode in the code region.
    ///
    /// `usize` so that `pc + instruction length` cannot overflow before the
    /// bounds check sees it.
    pub pc: usize,
    /// Zero flag
    pub zero: bool,
}

impl CpuState {
    /// All registers zero, PC at 0, Z clear
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reg(&self, reg: Register) -> u16 {
        match reg {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
        }
    }

    pub fn reg_mut(&mut self, reg: Register) -> &mut u16 {
        match reg {
            Register::A => &mut self.a,
            Register::B => &mut self.b,
            Register::C => &mut self.c,
            Register::D => &mut self.d,
        }
    }

    pub fn set_reg(&mut self, reg: Register, value: u16) {
        *self.reg_mut(reg) = value;
    }

    /// Compare A with `value` and update Z according to `mode`
    pub fn compare_a(&mut self, value: u16, mode: CompareMode) {
        let equal = self.a == value;
        match mode {
            CompareMode::ClearOnMismatch => self.zero = equal,
            CompareMode::Sticky => self.zero |= equal,
        }
    }
}

impl fmt::Display for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={:04X} B={:04X} C={:04X} D={:04X} PC={:04X} Z={}",
            self.a, self.b, self.c, self.d, self.pc, self.zero as u8
        )
    }
}

/// Fatal execution errors. Every fault ends the run.
#[derive(Debug, Error)]
pub enum Fault {
    /// The opcode's operand bytes run past the end of the code region
    #[error("Truncated instruction 0x{opcode:02X} at PC={pc}")]
    TruncatedInstruction { opcode: u8, pc: usize },
    /// A LOAD/STORE address lies outside the data region
    #[error("RAM out of bounds: 0x{address:04X} at PC={pc}")]
    InvalidAddress { address: usize, pc: usize },
    /// The fetched byte is not an instruction
    #[error("Unknown opcode: 0x{opcode:02X} at PC={pc}")]
    UnknownOpcode { opcode: u8, pc: usize },
    /// Reading or writing the console failed
    #[error("console I/O failed at PC={pc}: {source}")]
    Console {
        pc: usize,
        #[source]
        source: io::Error,
    },
}

impl Fault {
    /// Program counter of the faulting instruction
    pub fn pc(&self) -> usize {
        match self {
            Fault::TruncatedInstruction { pc, .. }
            | Fault::InvalidAddress { pc, .. }
            | Fault::UnknownOpcode { pc, .. }
            | Fault::Console { pc, .. } => *pc,
        }
    }
}
