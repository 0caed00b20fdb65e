//! Instruction set
//!
//! Every instruction is one opcode byte followed by zero, one or two operand
//! bytes. Register families occupy four consecutive opcodes in A, B, C, D
//! order; existing images depend on that ordering.

use std::fmt;

/// General-purpose register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    B,
    C,
    D,
}

impl Register {
    /// All registers in opcode order
    pub const ALL: [Register; 4] = [Register::A, Register::B, Register::C, Register::D];

    /// Register selected by the low two bits of a family offset
    pub const fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => Register::A,
            1 => Register::B,
            2 => Register::C,
            _ => Register::D,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::D => "D",
        };
        f.write_str(name)
    }
}

/// Number of operand bytes trailing the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandWidth {
    None,
    /// imm8
    Byte,
    /// imm16, little-endian
    Word,
}

impl OperandWidth {
    pub const fn bytes(self) -> usize {
        match self {
            OperandWidth::None => 0,
            OperandWidth::Byte => 1,
            OperandWidth::Word => 2,
        }
    }
}

/// What an instruction does, with its register operand if it has one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add(Register),
    Sub(Register),
    Inc(Register),
    Dec(Register),
    Mov(Register),
    Jmp,
    /// Compare A with an immediate, updating the zero flag
    CmpA,
    Jz,
    Jnz,
    Load(Register),
    Store(Register),
    OutAscii,
    InByte,
    OutDec,
    OutBits,
    InDec,
    InBin,
    Halt,
}

impl Operation {
    /// Instruction family name
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Operation::Add(_) => "ADD",
            Operation::Sub(_) => "SUB",
            Operation::Inc(_) => "INC",
            Operation::Dec(_) => "DEC",
            Operation::Mov(_) => "MOV",
            Operation::Jmp => "JMP",
            Operation::CmpA => "CMP",
            Operation::Jz => "JZ",
            Operation::Jnz => "JNZ",
            Operation::Load(_) => "LOAD",
            Operation::Store(_) => "STORE",
            Operation::OutAscii => "OUT_ASCII",
            Operation::InByte => "IN_BYTE",
            Operation::OutDec => "OUT_DEC",
            Operation::OutBits => "OUT_BITS",
            Operation::InDec => "IN_DEC",
            Operation::InBin => "IN_BIN",
            Operation::Halt => "HALT",
        }
    }

    /// True for instructions that may overwrite the program counter
    pub const fn is_jump(self) -> bool {
        matches!(self, Operation::Jmp | Operation::Jz | Operation::Jnz)
    }
}

/// Opcode table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub operation: Operation,
    pub width: OperandWidth,
}

impl Instruction {
    /// Encoded length including the opcode byte
    pub const fn length(&self) -> usize {
        1 + self.width.bytes()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imm = match self.width {
            OperandWidth::Word => "imm16",
            _ => "imm8",
        };
        let name = self.operation.mnemonic();
        // Rendered whole so width and alignment flags apply to the full text
        let text = match self.operation {
            Operation::Add(r) | Operation::Sub(r) | Operation::Mov(r) => {
                format!("{name} {r}, {imm}")
            }
            Operation::Inc(r) | Operation::Dec(r) => format!("{name} {r}"),
            Operation::Jmp | Operation::Jz | Operation::Jnz => format!("{name} {imm}"),
            Operation::CmpA => format!("{name} A, {imm}"),
            Operation::Load(r) | Operation::Store(r) => format!("{name} {r}, [{imm}]"),
            Operation::OutAscii
            | Operation::InByte
            | Operation::OutDec
            | Operation::OutBits
            | Operation::InDec
            | Operation::InBin => format!("{name} A"),
            Operation::Halt => name.to_string(),
        };
        f.pad(&text)
    }
}

/// Decoded immediate operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Byte(u8),
    Word(u16),
}

impl Operand {
    /// Decode the bytes following an opcode.
    ///
    /// Returns `None` when fewer than `width.bytes()` bytes are supplied.
    pub fn decode(width: OperandWidth, bytes: &[u8]) -> Option<Self> {
        match (width, bytes) {
            (OperandWidth::None, _) => Some(Operand::None),
            (OperandWidth::Byte, [value, ..]) => Some(Operand::Byte(*value)),
            (OperandWidth::Word, [lo, hi, ..]) => Some(Operand::Word(u16::from_le_bytes([*lo, *hi]))),
            _ => None,
        }
    }

    /// Operand zero-extended to 16 bits
    pub fn value(self) -> u16 {
        match self {
            Operand::None => 0,
            Operand::Byte(v) => u16::from(v),
            Operand::Word(v) => v,
        }
    }
}

/// Opcode byte to instruction, `None` for undefined opcodes
pub static OPCODE_TABLE: [Option<Instruction>; 256] = build_table();

const fn entry(opcode: usize, operation: Operation, width: OperandWidth) -> Option<Instruction> {
    Some(Instruction {
        opcode: opcode as u8,
        operation,
        width,
    })
}

const fn build_table() -> [Option<Instruction>; 256] {
    use OperandWidth::{Byte, Word};

    let mut table: [Option<Instruction>; 256] = [None; 256];

    let mut i = 0;
    while i < 4 {
        let r = Register::from_index(i as u8);
        table[0x00 + i] = entry(0x00 + i, Operation::Add(r), Byte);
        table[0x04 + i] = entry(0x04 + i, Operation::Sub(r), Byte);
        table[0x08 + i] = entry(0x08 + i, Operation::Inc(r), OperandWidth::None);
        table[0x0C + i] = entry(0x0C + i, Operation::Dec(r), OperandWidth::None);
        table[0x10 + i] = entry(0x10 + i, Operation::Mov(r), Byte);
        table[0x15 + i] = entry(0x15 + i, Operation::Add(r), Word);
        table[0x19 + i] = entry(0x19 + i, Operation::Sub(r), Word);
        table[0x1D + i] = entry(0x1D + i, Operation::Mov(r), Word);
        table[0x24 + i] = entry(0x24 + i, Operation::Load(r), Word);
        table[0x28 + i] = entry(0x28 + i, Operation::Store(r), Word);
        i += 1;
    }

    table[0x14] = entry(0x14, Operation::Jmp, Word);
    table[0x21] = entry(0x21, Operation::CmpA, Word);
    table[0x22] = entry(0x22, Operation::Jz, Word);
    table[0x23] = entry(0x23, Operation::Jnz, Word);
    table[0x2C] = entry(0x2C, Operation::OutAscii, OperandWidth::None);
    table[0x2D] = entry(0x2D, Operation::InByte, OperandWidth::None);
    table[0x2E] = entry(0x2E, Operation::OutDec, OperandWidth::None);
    table[0x2F] = entry(0x2F, Operation::OutBits, OperandWidth::None);
    table[0x30] = entry(0x30, Operation::InDec, OperandWidth::None);
    table[0x31] = entry(0x31, Operation::InBin, OperandWidth::None);
    table[0xFF] = entry(0xFF, Operation::Halt, OperandWidth::None);

    table
}

/// Look up an opcode byte
pub fn decode_opcode(opcode: u8) -> Option<Instruction> {
    OPCODE_TABLE[opcode as usize]
}

/// Iterate over every defined instruction in opcode order
pub fn all_instructions() -> impl Iterator<Item = Instruction> {
    OPCODE_TABLE.iter().filter_map(|entry| *entry)
}
