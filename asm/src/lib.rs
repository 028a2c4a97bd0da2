//! Typed representation of the small AArch64 subset the generator emits,
//! together with its GNU `as` textual form.

#![deny(clippy::print_stdout)]

use std::fmt;

use itertools::Itertools;

/// A general purpose 64-bit AArch64 register, `x0` to `x30`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Reg {
    value: u8,
}

impl Reg {
    pub const X0: Reg = Reg { value: 0 };
    pub const X1: Reg = Reg { value: 1 };
    pub const X2: Reg = Reg { value: 2 };
    pub const X3: Reg = Reg { value: 3 };

    pub fn new(value: u8) -> Self {
        assert!(value < 31, "Invalid register x{value}");
        Self { value }
    }

    pub fn addr(&self) -> u8 {
        self.value
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.value)
    }
}

/// One AArch64 instruction of the shift/add/sub subset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// `mov rd, #imm`
    MovImm { rd: Reg, imm: i64 },
    /// `mov rd, rs`
    Mov { rd: Reg, rs: Reg },
    /// `lsl rd, rs, #shift`, with `shift` in `0..=63`
    Lsl { rd: Reg, rs: Reg, shift: u32 },
    /// `add rd, rs1, rs2`
    Add { rd: Reg, rs1: Reg, rs2: Reg },
    /// `sub rd, rs1, rs2`
    Sub { rd: Reg, rs1: Reg, rs2: Reg },
    /// `neg rd, rs`
    Neg { rd: Reg, rs: Reg },
    /// `ret`
    Ret,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::MovImm { rd, imm } => write!(f, "mov {rd}, #{imm}"),
            Instruction::Mov { rd, rs } => write!(f, "mov {rd}, {rs}"),
            Instruction::Lsl { rd, rs, shift } => write!(f, "lsl {rd}, {rs}, #{shift}"),
            Instruction::Add { rd, rs1, rs2 } => write!(f, "add {rd}, {rs1}, {rs2}"),
            Instruction::Sub { rd, rs1, rs2 } => write!(f, "sub {rd}, {rs1}, {rs2}"),
            Instruction::Neg { rd, rs } => write!(f, "neg {rd}, {rs}"),
            Instruction::Ret => write!(f, "ret"),
        }
    }
}

/// A named, label-introduced, linear instruction sequence.
///
/// Its `Display` impl renders a complete assembly file body: `.text`, the
/// global label and the instructions, one per line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Routine {
    name: String,
    instructions: Vec<Instruction>,
}

impl Routine {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            instructions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".text")?;
        writeln!(f, ".global {}", self.name)?;
        writeln!(f, "{}:", self.name)?;
        writeln!(
            f,
            "{}",
            self.instructions
                .iter()
                .map(|i| format!("    {i}"))
                .join("\n")
        )
    }
}
