//! Interpreter for generated routines.
//!
//! The original toolchain linked the emitted assembly into a C driver and ran
//! it on hardware. Here the routine is executed by interpretation over a
//! 64-bit register file with the same wrapping arithmetic, so results can be
//! checked without an AArch64 assembler on the host.

#![deny(clippy::print_stdout)]

use kefel_asm::{Instruction, Reg, Routine};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("routine ended without ret")]
    MissingRet,
    #[error("shift amount {0} out of range")]
    ShiftOutOfRange(u32),
}

/// The 31 general purpose registers, all zero at entry.
struct RegisterFile {
    regs: [i64; 31],
}

impl RegisterFile {
    fn new() -> Self {
        Self { regs: [0; 31] }
    }

    fn get(&self, reg: Reg) -> i64 {
        self.regs[reg.addr() as usize]
    }

    fn set(&mut self, reg: Reg, value: i64) {
        self.regs[reg.addr() as usize] = value;
    }
}

/// Runs `routine` with `x` in `x0` and returns the value of `x0` at `ret`.
pub fn execute(routine: &Routine, x: i64) -> Result<i64, ExecutionError> {
    let mut regs = RegisterFile::new();
    regs.set(Reg::X0, x);

    for instruction in routine.instructions() {
        match *instruction {
            Instruction::MovImm { rd, imm } => regs.set(rd, imm),
            Instruction::Mov { rd, rs } => regs.set(rd, regs.get(rs)),
            Instruction::Lsl { rd, rs, shift } => {
                if shift >= 64 {
                    return Err(ExecutionError::ShiftOutOfRange(shift));
                }
                regs.set(rd, regs.get(rs).wrapping_shl(shift));
            }
            Instruction::Add { rd, rs1, rs2 } => {
                regs.set(rd, regs.get(rs1).wrapping_add(regs.get(rs2)))
            }
            Instruction::Sub { rd, rs1, rs2 } => {
                regs.set(rd, regs.get(rs1).wrapping_sub(regs.get(rs2)))
            }
            Instruction::Neg { rd, rs } => regs.set(rd, regs.get(rs).wrapping_neg()),
            Instruction::Ret => return Ok(regs.get(Reg::X0)),
        }
    }

    Err(ExecutionError::MissingRet)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shift_and_add() {
        // 5 * x as (x << 2) + x
        let routine = Routine::new(
            "kefel",
            vec![
                Instruction::Mov {
                    rd: Reg::X1,
                    rs: Reg::X0,
                },
                Instruction::Lsl {
                    rd: Reg::X1,
                    rs: Reg::X1,
                    shift: 2,
                },
                Instruction::Add {
                    rd: Reg::X0,
                    rs1: Reg::X1,
                    rs2: Reg::X0,
                },
                Instruction::Ret,
            ],
        );
        assert_eq!(execute(&routine, 7), Ok(35));
        assert_eq!(execute(&routine, -3), Ok(-15));
    }

    #[test]
    fn shift_wraps() {
        let routine = Routine::new(
            "kefel",
            vec![
                Instruction::Lsl {
                    rd: Reg::X0,
                    rs: Reg::X0,
                    shift: 63,
                },
                Instruction::Ret,
            ],
        );
        assert_eq!(execute(&routine, 2), Ok(0));
        assert_eq!(execute(&routine, 1), Ok(i64::MIN));
    }

    #[test]
    fn missing_ret() {
        let routine = Routine::new(
            "kefel",
            vec![Instruction::Mov {
                rd: Reg::X1,
                rs: Reg::X0,
            }],
        );
        assert_eq!(execute(&routine, 1), Err(ExecutionError::MissingRet));
    }

    #[test]
    fn shift_out_of_range() {
        let routine = Routine::new(
            "kefel",
            vec![
                Instruction::Lsl {
                    rd: Reg::X0,
                    rs: Reg::X0,
                    shift: 64,
                },
                Instruction::Ret,
            ],
        );
        assert_eq!(execute(&routine, 1), Err(ExecutionError::ShiftOutOfRange(64)));
    }
}
