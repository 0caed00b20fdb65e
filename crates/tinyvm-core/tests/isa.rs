//! Opcode table tests

use tinyvm_core::isa::{all_instructions, OPCODE_TABLE};
use tinyvm_core::{decode_opcode, OperandWidth, Operation, Register};

#[test]
fn test_register_order_in_every_family() {
    let bases: [(u8, fn(Register) -> Operation); 10] = [
        (0x00, Operation::Add),
        (0x04, Operation::Sub),
        (0x08, Operation::Inc),
        (0x0C, Operation::Dec),
        (0x10, Operation::Mov),
        (0x15, Operation::Add),
        (0x19, Operation::Sub),
        (0x1D, Operation::Mov),
        (0x24, Operation::Load),
        (0x28, Operation::Store),
    ];

    for (base, family) in bases {
        for (offset, reg) in Register::ALL.into_iter().enumerate() {
            let opcode = base + offset as u8;
            let instr = decode_opcode(opcode).unwrap();
            assert_eq!(instr.operation, family(reg), "opcode 0x{opcode:02X}");
        }
    }
}

#[test]
fn test_operand_widths() {
    let expect = |range: std::ops::RangeInclusive<u8>, width: OperandWidth| {
        for opcode in range {
            assert_eq!(decode_opcode(opcode).unwrap().width, width, "opcode 0x{opcode:02X}");
        }
    };

    expect(0x00..=0x07, OperandWidth::Byte);
    expect(0x08..=0x0F, OperandWidth::None);
    expect(0x10..=0x13, OperandWidth::Byte);
    expect(0x14..=0x2B, OperandWidth::Word);
    expect(0x2C..=0x31, OperandWidth::None);
    expect(0xFF..=0xFF, OperandWidth::None);
}

#[test]
fn test_single_opcodes() {
    let singles = [
        (0x14, Operation::Jmp),
        (0x21, Operation::CmpA),
        (0x22, Operation::Jz),
        (0x23, Operation::Jnz),
        (0x2C, Operation::OutAscii),
        (0x2D, Operation::InByte),
        (0x2E, Operation::OutDec),
        (0x2F, Operation::OutBits),
        (0x30, Operation::InDec),
        (0x31, Operation::InBin),
        (0xFF, Operation::Halt),
    ];
    for (opcode, op) in singles {
        assert_eq!(decode_opcode(opcode).unwrap().operation, op);
    }
}

#[test]
fn test_everything_else_is_undefined() {
    for opcode in 0x32..=0xFE {
        assert!(OPCODE_TABLE[opcode as usize].is_none(), "opcode 0x{opcode:02X}");
    }
}

#[test]
fn test_jumps_are_flagged() {
    let jumps: Vec<u8> = all_instructions()
        .filter(|instr| instr.operation.is_jump())
        .map(|instr| instr.opcode)
        .collect();
    assert_eq!(jumps, vec![0x14, 0x22, 0x23]);
}

#[test]
fn test_lengths() {
    assert_eq!(decode_opcode(0x08).unwrap().length(), 1);
    assert_eq!(decode_opcode(0x10).unwrap().length(), 2);
    assert_eq!(decode_opcode(0x28).unwrap().length(), 3);
}
