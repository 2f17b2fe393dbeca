//! Fetch/decode/execute core for the Hack CPU.
//!
//! The machine has a 24577-word data memory (RAM plus the memory-mapped
//! screen and keyboard), a separate instruction memory, two registers (A, D)
//! and a program counter. All data paths are 16-bit two's complement.

use crate::error::{EmulatorError, Result};

/// Total addressable data memory: 16K RAM + 8K screen + 1 keyboard word.
pub const MEMORY_SIZE: usize = 24577;
/// First word of the memory-mapped screen.
pub const SCREEN_ADDRESS: u16 = 16384;
/// The memory-mapped keyboard word.
pub const KEYBOARD_ADDRESS: u16 = 24576;

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `@value`: load a 15-bit constant into A.
    Address(i16),
    /// `dest=comp;jump`.
    Compute(Compute),
}

/// The control fields of a C-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Compute {
    /// The `a` bit: feed M (RAM[A]) instead of A into the ALU.
    pub use_memory: bool,
    /// Six-bit ALU computation code.
    pub comp: u8,
    pub dest_a: bool,
    pub dest_d: bool,
    pub dest_m: bool,
    pub jgt: bool,
    pub jeq: bool,
    pub jlt: bool,
}

/// Decodes a raw instruction word. Never fails: every 16-bit pattern maps to
/// an instruction shape; illegal computation codes surface at execute time.
pub fn decode(word: i16) -> Instruction {
    if word & (1 << 15) == 0 {
        return Instruction::Address(word & 0x7FFF);
    }
    Instruction::Compute(Compute {
        use_memory: word >> 12 & 1 != 0,
        comp: (word >> 6 & 0x3F) as u8,
        dest_m: word >> 3 & 1 != 0,
        dest_d: word >> 4 & 1 != 0,
        dest_a: word >> 5 & 1 != 0,
        jlt: word >> 2 & 1 != 0,
        jeq: word >> 1 & 1 != 0,
        jgt: word & 1 != 0,
    })
}

/// The 18-function Hack ALU. Returns `None` for codes outside the table.
#[inline]
fn alu(comp: u8, d: i16, a: i16) -> Option<i16> {
    let result = match comp {
        0b101010 => 0,
        0b111111 => 1,
        0b111010 => -1,
        0b001100 => d,
        0b110000 => a,
        0b001101 => !d,
        0b110001 => !a,
        0b001111 => d.wrapping_neg(),
        0b110011 => a.wrapping_neg(),
        0b011111 => d.wrapping_add(1),
        0b110111 => a.wrapping_add(1),
        0b001110 => d.wrapping_sub(1),
        0b110010 => a.wrapping_sub(1),
        0b000010 => d.wrapping_add(a),
        0b010011 => d.wrapping_sub(a),
        0b000111 => a.wrapping_sub(d),
        0b000000 => d & a,
        0b010101 => d | a,
        _ => return None,
    };
    Some(result)
}

/// The Hack CPU together with its data and instruction memories.
pub struct Cpu {
    ram: Vec<i16>,
    rom: Vec<i16>,
    a: i16,
    d: i16,
    pc: u16,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            ram: vec![0; MEMORY_SIZE],
            rom: Vec::new(),
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Installs a program and resets the program counter. Registers and RAM
    /// keep their contents so tests and the driver can pre-seed memory.
    pub fn load_program(&mut self, words: Vec<i16>) -> Result<()> {
        if words.len() > 0x8000 {
            return Err(EmulatorError::ProgramTooLarge { words: words.len() });
        }
        self.rom = words;
        self.pc = 0;
        Ok(())
    }

    /// Executes one instruction. Returns `Ok(false)` once the program counter
    /// points past the end of the loaded program.
    pub fn step(&mut self) -> Result<bool> {
        let Some(&word) = self.rom.get(usize::from(self.pc)) else {
            return Ok(false);
        };
        match decode(word) {
            Instruction::Address(value) => {
                self.a = value;
                self.pc += 1;
            }
            Instruction::Compute(c) => self.execute(c)?,
        }
        Ok(true)
    }

    fn execute(&mut self, c: Compute) -> Result<()> {
        let operand = if c.use_memory {
            self.checked_read(self.a as u16)?
        } else {
            self.a
        };
        let result = alu(c.comp, self.d, operand).ok_or(EmulatorError::IllegalCompCode {
            code: c.comp,
            pc: self.pc,
        })?;

        // M is stored through whatever A holds after the A write.
        if c.dest_d {
            self.d = result;
        }
        if c.dest_a {
            self.a = result;
        }
        if c.dest_m {
            self.checked_write(self.a as u16, result)?;
        }

        let jump = (c.jgt && result > 0) || (c.jeq && result == 0) || (c.jlt && result < 0);
        if jump {
            self.pc = self.a as u16;
        } else {
            self.pc += 1;
        }
        Ok(())
    }

    /// Runs until the program halts or `max_steps` instructions have
    /// executed. Returns the number of instructions executed.
    pub fn run(&mut self, max_steps: u64) -> Result<u64> {
        let mut steps = 0;
        while steps < max_steps && self.step()? {
            steps += 1;
        }
        Ok(steps)
    }

    fn checked_read(&self, address: u16) -> Result<i16> {
        self.ram
            .get(usize::from(address))
            .copied()
            .ok_or(EmulatorError::IllegalMemoryAccess {
                address,
                pc: self.pc,
            })
    }

    fn checked_write(&mut self, address: u16, value: i16) -> Result<()> {
        let pc = self.pc;
        let slot =
            self.ram
                .get_mut(usize::from(address))
                .ok_or(EmulatorError::IllegalMemoryAccess { address, pc })?;
        *slot = value;
        Ok(())
    }

    pub fn a_register(&self) -> i16 {
        self.a
    }

    pub fn d_register(&self) -> i16 {
        self.d
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Reads a data-memory word, enforcing the address range.
    pub fn ram(&self, address: u16) -> Result<i16> {
        self.checked_read(address)
    }

    /// Writes a data-memory word, enforcing the address range.
    pub fn set_ram(&mut self, address: u16, value: i16) -> Result<()> {
        self.checked_write(address, value)
    }

    /// The word currently addressed by A.
    pub fn m_value(&self) -> Result<i16> {
        self.checked_read(self.a as u16)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
