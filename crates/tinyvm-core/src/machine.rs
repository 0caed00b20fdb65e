//! Machine
//!
//! Owns the CPU state, both memory regions and the console, and runs the
//! fetch-decode-execute cycle:
//!
//! 1. stop as Exhausted once PC leaves the code region
//! 2. fetch the opcode and look it up in [`OPCODE_TABLE`](crate::isa::OPCODE_TABLE)
//! 3. check that the operand bytes fit in the code region
//! 4. decode the operand and check any data address it names
//! 5. apply the effect, then advance PC unless a jump was taken
//!
//! Jump targets are not checked when the jump executes; the next fetch does it.

use crate::console::Console;
use crate::cpu::{CompareMode, CpuState, Fault};
use crate::image::CodeImage;
use crate::isa::{decode_opcode, Instruction, Operand, OperandWidth, Operation};
use crate::memory::{code_range_fits, data_address_fits, CodeRegion, DataRegion};

/// What running off the end of the code region means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfCode {
    /// Treat like HALT
    #[default]
    Succeed,
    /// Treat as a failure (catches programs missing their HALT)
    Fail,
}

/// Run-time options
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineConfig {
    /// Zero-flag behaviour of CMP
    pub compare: CompareMode,
    /// How [`RunState::Exhausted`] is judged by [`MachineConfig::accepts`]
    pub end_of_code: EndOfCode,
    /// Print one line per executed instruction on stderr
    pub trace: bool,
}

impl MachineConfig {
    /// Does a run ending in `state` count as a success?
    pub fn accepts(&self, state: RunState) -> bool {
        match state {
            RunState::Halted => true,
            RunState::Exhausted => self.end_of_code == EndOfCode::Succeed,
            RunState::Running | RunState::Faulted => false,
        }
    }
}

/// Machine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// HALT executed
    Halted,
    /// PC reached the end of the code region without a HALT
    Exhausted,
    /// A [`Fault`] ended the run
    Faulted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        self != RunState::Running
    }
}

/// Control flow after one instruction
enum Flow {
    Next,
    Jump(usize),
    Halt,
}

/// The virtual machine
pub struct Machine<C: Console> {
    cpu: CpuState,
    code: CodeRegion,
    data: DataRegion,
    console: C,
    config: MachineConfig,
    state: RunState,
    /// Instructions retired
    steps: u64,
}

impl<C: Console> Machine<C> {
    /// Create a machine with the default configuration
    pub fn new(image: CodeImage, console: C) -> Self {
        Self::with_config(image, console, MachineConfig::default())
    }

    pub fn with_config(image: CodeImage, console: C, config: MachineConfig) -> Self {
        Self {
            cpu: CpuState::new(),
            code: CodeRegion::new(image),
            data: DataRegion::new(),
            console,
            config,
            state: RunState::Running,
            steps: 0,
        }
    }

    /// Return to the power-on state, keeping the loaded image and console
    pub fn reset(&mut self) {
        self.cpu = CpuState::new();
        self.data = DataRegion::new();
        self.state = RunState::Running;
        self.steps = 0;
    }

    /// Execute one instruction.
    ///
    /// Once the machine has reached a terminal state this returns that state
    /// again without doing anything.
    pub fn step(&mut self) -> Result<RunState, Fault> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        match self.cycle() {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(fault) => {
                self.state = RunState::Faulted;
                Err(fault)
            }
        }
    }

    /// Run until HALT, a fault, or the end of the code region
    pub fn run(&mut self) -> Result<RunState, Fault> {
        self.drive(None)
    }

    /// Run at most `max_steps` instructions.
    ///
    /// Returns [`RunState::Running`] when the budget is used up first.
    pub fn run_for(&mut self, max_steps: u64) -> Result<RunState, Fault> {
        self.drive(Some(max_steps))
    }

    fn drive(&mut self, budget: Option<u64>) -> Result<RunState, Fault> {
        let result = self.drive_inner(budget);
        // Flush on every exit path, faults included
        let flushed = self
            .console
            .flush()
            .map_err(|source| Fault::Console { pc: self.cpu.pc, source });
        let state = result?;
        flushed?;
        Ok(state)
    }

    fn drive_inner(&mut self, mut budget: Option<u64>) -> Result<RunState, Fault> {
        loop {
            if budget == Some(0) {
                return Ok(self.state);
            }
            let state = self.step()?;
            if state.is_terminal() {
                return Ok(state);
            }
            if let Some(remaining) = budget.as_mut() {
                *remaining -= 1;
            }
        }
    }

    fn cycle(&mut self) -> Result<RunState, Fault> {
        let pc = self.cpu.pc;

        if !code_range_fits(pc, 1) {
            return Ok(RunState::Exhausted);
        }
        let opcode = self.code.as_bytes()[pc];

        let instr = decode_opcode(opcode).ok_or(Fault::UnknownOpcode { opcode, pc })?;

        let len = instr.length();
        if !code_range_fits(pc, len) {
            return Err(Fault::TruncatedInstruction { opcode, pc });
        }
        let operand = Operand::decode(instr.width, &self.code.as_bytes()[pc + 1..pc + len])
            .ok_or(Fault::TruncatedInstruction { opcode, pc })?;

        if self.config.trace {
            self.trace(pc, &instr, operand);
        }

        let flow = self.execute(instr, operand, pc)?;
        self.steps += 1;

        match flow {
            Flow::Next => {
                self.cpu.pc = pc + len;
                Ok(RunState::Running)
            }
            Flow::Jump(target) => {
                self.cpu.pc = target;
                Ok(RunState::Running)
            }
            Flow::Halt => Ok(RunState::Halted),
        }
    }

    fn execute(&mut self, instr: Instruction, operand: Operand, pc: usize) -> Result<Flow, Fault> {
        let value = operand.value();

        match instr.operation {
            Operation::Add(r) => {
                let reg = self.cpu.reg_mut(r);
                *reg = reg.wrapping_add(value);
            }
            Operation::Sub(r) => {
                let reg = self.cpu.reg_mut(r);
                *reg = reg.wrapping_sub(value);
            }
            Operation::Inc(r) => {
                let reg = self.cpu.reg_mut(r);
                *reg = reg.wrapping_add(1);
            }
            Operation::Dec(r) => {
                let reg = self.cpu.reg_mut(r);
                *reg = reg.wrapping_sub(1);
            }
            Operation::Mov(r) => self.cpu.set_reg(r, value),
            Operation::Jmp => return Ok(Flow::Jump(usize::from(value))),
            Operation::CmpA => self.cpu.compare_a(value, self.config.compare),
            Operation::Jz => {
                if self.cpu.zero {
                    return Ok(Flow::Jump(usize::from(value)));
                }
            }
            Operation::Jnz => {
                if !self.cpu.zero {
                    return Ok(Flow::Jump(usize::from(value)));
                }
            }
            Operation::Load(r) => {
                let address = check_data_address(usize::from(value), pc)?;
                let byte = self.data.read(address);
                self.cpu.set_reg(r, u16::from(byte));
            }
            Operation::Store(r) => {
                let address = check_data_address(usize::from(value), pc)?;
                self.data.write(address, self.cpu.reg(r) as u8);
            }
            Operation::OutAscii => {
                let byte = self.cpu.a as u8;
                self.write(pc, &[byte])?;
            }
            Operation::InByte => {
                let byte = self.read(pc)?.unwrap_or(0);
                self.cpu.a = u16::from(byte);
            }
            Operation::OutDec => {
                let text = self.cpu.a.to_string();
                self.write(pc, text.as_bytes())?;
            }
            Operation::OutBits => {
                let text = format!("{:08b}\n", self.cpu.a as u8);
                self.write(pc, text.as_bytes())?;
            }
            Operation::InDec => {
                // Only the low byte is kept, so accumulating in u8 gives the same result
                let mut value = 0u8;
                while let Some(c) = self.read(pc)? {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    value = value.wrapping_mul(10).wrapping_add(c - b'0');
                }
                self.cpu.a = u16::from(value);
            }
            Operation::InBin => {
                let mut value = 0u8;
                while let Some(c) = self.read(pc)? {
                    if c != b'0' && c != b'1' {
                        break;
                    }
                    value = (value << 1) | (c - b'0');
                }
                self.cpu.a = u16::from(value);
            }
            Operation::Halt => return Ok(Flow::Halt),
        }

        Ok(Flow::Next)
    }

    fn read(&mut self, pc: usize) -> Result<Option<u8>, Fault> {
        self.console
            .read_byte()
            .map_err(|source| Fault::Console { pc, source })
    }

    fn write(&mut self, pc: usize, bytes: &[u8]) -> Result<(), Fault> {
        self.console
            .write_bytes(bytes)
            .map_err(|source| Fault::Console { pc, source })
    }

    fn trace(&self, pc: usize, instr: &Instruction, operand: Operand) {
        let operand = match instr.width {
            OperandWidth::None => String::new(),
            OperandWidth::Byte => format!("{:02X}", operand.value()),
            OperandWidth::Word => format!("{:04X}", operand.value()),
        };
        eprintln!(
            "{:04X}  {:02X} {:<4}  {:<16} {}",
            pc, instr.opcode, operand, instr, self.cpu
        );
    }

    /// Get CPU state
    pub fn cpu(&self) -> &CpuState {
        &self.cpu
    }

    /// Get the code region
    pub fn code(&self) -> &CodeRegion {
        &self.code
    }

    /// Get the data region
    pub fn data(&self) -> &DataRegion {
        &self.data
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Consume the machine, handing back its console
    pub fn into_console(self) -> C {
        self.console
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of instructions executed since creation or the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Validate a data address named by the instruction at `pc`
fn check_data_address(address: usize, pc: usize) -> Result<usize, Fault> {
    if data_address_fits(address) {
        Ok(address)
    } else {
        Err(Fault::InvalidAddress { address, pc })
    }
}
