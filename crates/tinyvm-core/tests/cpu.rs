//! CPU tests: register arithmetic, flags, jumps and data memory

use tinyvm_core::{
    BufferConsole, CodeImage, CompareMode, Machine, MachineConfig, Register, RunState,
};

fn run(program: &[u8]) -> Machine<BufferConsole> {
    let mut machine = Machine::new(CodeImage::from_bytes(program), BufferConsole::default());
    assert_eq!(machine.run().unwrap(), RunState::Halted);
    machine
}

fn run_with(program: &[u8], config: MachineConfig) -> Machine<BufferConsole> {
    let image = CodeImage::from_bytes(program);
    let mut machine = Machine::with_config(image, BufferConsole::default(), config);
    assert_eq!(machine.run().unwrap(), RunState::Halted);
    machine
}

#[test]
fn test_cpu_initial_state() {
    let machine = Machine::new(CodeImage::from_bytes(&[]), BufferConsole::default());
    let cpu = machine.cpu();

    assert_eq!(cpu.a, 0);
    assert_eq!(cpu.b, 0);
    assert_eq!(cpu.c, 0);
    assert_eq!(cpu.d, 0);
    assert_eq!(cpu.pc, 0);
    assert!(!cpu.zero);
    assert_eq!(machine.state(), RunState::Running);
}

#[test]
fn test_mov_imm8_each_register() {
    let m = run(&[0x10, 0x01, 0x11, 0x02, 0x12, 0x03, 0x13, 0x04, 0xFF]);
    let cpu = m.cpu();
    assert_eq!((cpu.a, cpu.b, cpu.c, cpu.d), (1, 2, 3, 4));
}

#[test]
fn test_imm16_is_little_endian() {
    // MOV C, 0x1234
    let m = run(&[0x1F, 0x34, 0x12, 0xFF]);
    assert_eq!(m.cpu().c, 0x1234);
}

#[test]
fn test_add_sub_wrap_at_16_bits() {
    // MOV A, 0xFFFF; ADD A, 2; MOV B, 0; SUB B, 0x0003
    let m = run(&[0x1D, 0xFF, 0xFF, 0x00, 0x02, 0x11, 0x00, 0x1A, 0x03, 0x00, 0xFF]);
    assert_eq!(m.cpu().a, 1);
    assert_eq!(m.cpu().b, 0xFFFD);
}

#[test]
fn test_add_imm8_carries_past_a_byte() {
    // MOV D, 0xFF; ADD D, 0x01
    let m = run(&[0x13, 0xFF, 0x03, 0x01, 0xFF]);
    assert_eq!(m.cpu().d, 0x0100);
}

#[test]
fn test_inc_dec_wrap() {
    // DEC A; INC B x2; MOV C, 0xFFFF; INC C
    let m = run(&[0x0C, 0x09, 0x09, 0x1F, 0xFF, 0xFF, 0x0A, 0xFF]);
    assert_eq!(m.cpu().a, 0xFFFF);
    assert_eq!(m.cpu().b, 2);
    assert_eq!(m.cpu().c, 0);
}

#[test]
fn test_jmp_skips_code() {
    // JMP 5; MOV A, 1; MOV B, 1; HALT
    let m = run(&[0x14, 0x05, 0x00, 0x10, 0x01, 0x11, 0x01, 0xFF]);
    assert_eq!(m.cpu().a, 0);
    assert_eq!(m.cpu().b, 1);
}

#[test]
fn test_countdown_loop_with_jnz() {
    // MOV A, 3; loop: OUT_DEC; DEC A; CMP A, 0; JNZ loop; HALT
    let m = run(&[0x10, 0x03, 0x2E, 0x0C, 0x21, 0x00, 0x00, 0x23, 0x02, 0x00, 0xFF]);
    assert_eq!(m.console().output(), b"321");
    assert!(m.cpu().zero);
}

/// MOV A, 1; CMP A, 1; CMP A, 2; JZ taken; MOV B, 1; HALT; taken: MOV B, 2; HALT
const COMPARE_TWICE: [u8; 17] = [
    0x10, 0x01, 0x21, 0x01, 0x00, 0x21, 0x02, 0x00, 0x22, 0x0E, 0x00, 0x11, 0x01, 0xFF, 0x11,
    0x02, 0xFF,
];

#[test]
fn test_cmp_clears_zero_on_mismatch() {
    let m = run(&COMPARE_TWICE);
    assert!(!m.cpu().zero);
    assert_eq!(m.cpu().b, 1);
}

#[test]
fn test_sticky_cmp_keeps_zero() {
    let config = MachineConfig {
        compare: CompareMode::Sticky,
        ..MachineConfig::default()
    };
    let m = run_with(&COMPARE_TWICE, config);
    assert!(m.cpu().zero);
    assert_eq!(m.cpu().b, 2);
}

#[test]
fn test_jz_not_taken_advances() {
    // CMP A, 1 (A is 0); JZ 0; MOV A, 7; HALT
    let m = run(&[0x21, 0x01, 0x00, 0x22, 0x00, 0x00, 0x10, 0x07, 0xFF]);
    assert_eq!(m.cpu().a, 7);
}

#[test]
fn test_store_writes_low_byte_and_load_zero_extends() {
    // MOV D, 0x1234; STORE D, [0xFFFF]; MOV A, 0xFFFF; LOAD A, [0xFFFF]
    let m = run(&[
        0x20, 0x34, 0x12, 0x2B, 0xFF, 0xFF, 0x1D, 0xFF, 0xFF, 0x24, 0xFF, 0xFF, 0xFF,
    ]);
    assert_eq!(m.data().get(0xFFFF), Some(0x34));
    assert_eq!(m.cpu().a, 0x0034);
}

#[test]
fn test_load_from_untouched_ram_is_zero() {
    // MOV B, 9; LOAD B, [0x4000]
    let m = run(&[0x11, 0x09, 0x25, 0x00, 0x40, 0xFF]);
    assert_eq!(m.cpu().reg(Register::B), 0);
}

#[test]
fn test_data_and_code_are_disjoint() {
    // STORE A, [0x0000] must not touch the opcode at code offset 0
    let m = run(&[0x10, 0x99, 0x28, 0x00, 0x00, 0xFF]);
    assert_eq!(m.data().get(0), Some(0x99));
    assert_eq!(m.code().get(0), Some(0x10));
}
