//! Dispatch loop throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tinyvm_core::{BufferConsole, CodeImage, Machine, RunState};

/// Count A down from 0xFFFF with a STORE/LOAD round trip per iteration
const COUNTDOWN: [u8; 19] = [
    0x1D, 0xFF, 0xFF, // MOV A, 0xFFFF
    0x0C, //             loop: DEC A
    0x28, 0x00, 0x10, // STORE A, [0x1000]
    0x25, 0x00, 0x10, // LOAD B, [0x1000]
    0x21, 0x00, 0x00, // CMP A, 0
    0x23, 0x03, 0x00, // JNZ loop
    0x14, 0x00, 0x80, // JMP past the end of the code region
];

fn bench_countdown(c: &mut Criterion) {
    let mut machine = Machine::new(CodeImage::from_bytes(&COUNTDOWN), BufferConsole::default());

    c.bench_function("countdown_65535", |b| {
        b.iter(|| {
            machine.reset();
            let state = machine.run().unwrap();
            assert_eq!(state, RunState::Exhausted);
            black_box(machine.steps())
        })
    });
}

fn bench_zero_filled_image(c: &mut Criterion) {
    let mut machine = Machine::new(CodeImage::from_bytes(&[]), BufferConsole::default());

    c.bench_function("zero_filled_image", |b| {
        b.iter(|| {
            machine.reset();
            black_box(machine.run().unwrap())
        })
    });
}

criterion_group!(benches, bench_countdown, bench_zero_filled_image);
criterion_main!(benches);
