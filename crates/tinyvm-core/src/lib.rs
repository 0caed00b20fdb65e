//! tinyvm core - a small bounds-checked 8/16-bit CPU
//!
//! Programs are flat binary images executed from a 32KB code region against a
//! separate 64KB data region. Every code fetch and data access is validated
//! before it happens, so a bad image ends in a [`Fault`] rather than undefined
//! behaviour.
//!
//! ```
//! use tinyvm_core::{BufferConsole, CodeImage, Machine, RunState};
//!
//! // MOV A, 5; ADD A, 3; OUT_DEC A; HALT
//! let image = CodeImage::from_bytes(&[0x10, 0x05, 0x00, 0x03, 0x2E, 0xFF]);
//! let mut machine = Machine::new(image, BufferConsole::default());
//!
//! assert_eq!(machine.run().unwrap(), RunState::Halted);
//! assert_eq!(machine.console().output(), b"8");
//! ```

#![forbid(unsafe_code)]

/// Program image loading
pub mod image;
/// Code and data regions with their bounds checks
pub mod memory;
/// Opcode table and operand decoding
pub mod isa;
/// CPU registers, flags and faults
pub mod cpu;
/// Console I/O abstraction
pub mod console;
/// Fetch-decode-execute engine
pub mod machine;

pub use console::{BufferConsole, Console, StdConsole};
pub use cpu::{CompareMode, CpuState, Fault};
pub use image::{CodeImage, ImageError, CODE_SIZE};
pub use isa::{decode_opcode, Instruction, Operand, OperandWidth, Operation, Register};
pub use machine::{EndOfCode, Machine, MachineConfig, RunState};
pub use memory::{code_range_fits, data_address_fits, DATA_SIZE};
