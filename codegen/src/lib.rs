//! Lowers multiplication by a constant `k` to an AArch64 routine built from
//! register moves, logical left shifts, additions and subtractions, avoiding
//! the `mul` instruction.
//!
//! The operand arrives in `x0`, the product is returned in `x0`. Arithmetic
//! runs on the 64-bit registers; callers wanting C `int` semantics truncate
//! the result to 32 bits.

#![deny(clippy::print_stdout)]

use itertools::Itertools;
use kefel_asm::{Instruction, Reg, Routine};

/// The decomposition of a multiplier into shift terms, selected by
/// [`MulPlan::for_multiplier`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MulPlan {
    /// `0 * x = 0`
    Zero,
    /// `1 * x = x`
    Identity,
    /// `k = 2^shift`
    SingleShift(u32),
    /// `k = 2^high + 2^low` with `high == low + 1`
    ShiftPair { high: u32, low: u32 },
    /// `k = 2^high - 2^low`, a contiguous run of three or more set bits
    RunDifference { high: u32, low: u32 },
    /// General case, one term per set bit, most significant first
    ShiftSum(Vec<u32>),
    /// `k < 0`: the plan for `|k|` followed by a negation
    Negated(Box<MulPlan>),
}

impl MulPlan {
    /// Classifies `k`.
    ///
    /// The pattern rules only fire when the magnitude consists of exactly
    /// that pattern; everything else falls through to the shift sum.
    pub fn for_multiplier(k: i32) -> Self {
        if k < 0 {
            return MulPlan::Negated(Box::new(Self::for_magnitude(k.unsigned_abs())));
        }
        Self::for_magnitude(k as u32)
    }

    fn for_magnitude(m: u32) -> Self {
        match m {
            0 => return MulPlan::Zero,
            1 => return MulPlan::Identity,
            _ => {}
        }

        if m.is_power_of_two() {
            return MulPlan::SingleShift(m.trailing_zeros());
        }

        // Exactly two adjacent set bits.
        if m.count_ones() == 2 && m & (m >> 1) != 0 {
            return MulPlan::ShiftPair {
                high: 31 - m.leading_zeros(),
                low: m.trailing_zeros(),
            };
        }

        // A contiguous run of set bits, m = 2^high - 2^low.
        let low = m.trailing_zeros();
        let run = m >> low;
        if run & (run + 1) == 0 && run.count_ones() >= 3 {
            return MulPlan::RunDifference {
                high: low + run.count_ones(),
                low,
            };
        }

        MulPlan::ShiftSum((0..32u32).rev().filter(|bit| m & (1 << bit) != 0).collect())
    }

    fn lower(&self) -> Vec<Instruction> {
        match self {
            MulPlan::Zero => vec![
                Instruction::MovImm {
                    rd: Reg::X0,
                    imm: 0,
                },
                Instruction::Ret,
            ],
            MulPlan::Identity => vec![Instruction::Ret],
            MulPlan::SingleShift(shift) => {
                let mut instructions = vec![];
                if *shift != 0 {
                    instructions.push(Instruction::Lsl {
                        rd: Reg::X0,
                        rs: Reg::X0,
                        shift: *shift,
                    });
                }
                instructions.push(Instruction::Ret);
                instructions
            }
            MulPlan::ShiftPair { high, low } => {
                let mut instructions = vec![
                    Instruction::Mov {
                        rd: Reg::X1,
                        rs: Reg::X0,
                    },
                    Instruction::Lsl {
                        rd: Reg::X1,
                        rs: Reg::X1,
                        shift: *high,
                    },
                    Instruction::Mov {
                        rd: Reg::X2,
                        rs: Reg::X0,
                    },
                ];
                if *low != 0 {
                    instructions.push(Instruction::Lsl {
                        rd: Reg::X2,
                        rs: Reg::X2,
                        shift: *low,
                    });
                }
                instructions.push(Instruction::Add {
                    rd: Reg::X0,
                    rs1: Reg::X1,
                    rs2: Reg::X2,
                });
                instructions.push(Instruction::Ret);
                instructions
            }
            MulPlan::RunDifference { high, low } => {
                let mut instructions = vec![
                    Instruction::Mov {
                        rd: Reg::X1,
                        rs: Reg::X0,
                    },
                    Instruction::Lsl {
                        rd: Reg::X0,
                        rs: Reg::X0,
                        shift: *high,
                    },
                ];
                if *low != 0 {
                    instructions.push(Instruction::Lsl {
                        rd: Reg::X1,
                        rs: Reg::X1,
                        shift: *low,
                    });
                }
                instructions.push(Instruction::Sub {
                    rd: Reg::X0,
                    rs1: Reg::X0,
                    rs2: Reg::X1,
                });
                instructions.push(Instruction::Ret);
                instructions
            }
            MulPlan::ShiftSum(shifts) => {
                // x3 keeps the original operand across the accumulation.
                let mut instructions = vec![Instruction::Mov {
                    rd: Reg::X3,
                    rs: Reg::X0,
                }];
                for (index, shift) in shifts.iter().enumerate() {
                    let term = if index == 0 { Reg::X0 } else { Reg::X1 };
                    instructions.push(Instruction::Mov {
                        rd: term,
                        rs: Reg::X3,
                    });
                    if *shift != 0 {
                        instructions.push(Instruction::Lsl {
                            rd: term,
                            rs: term,
                            shift: *shift,
                        });
                    }
                    if index != 0 {
                        instructions.push(Instruction::Add {
                            rd: Reg::X0,
                            rs1: Reg::X0,
                            rs2: Reg::X1,
                        });
                    }
                }
                instructions.push(Instruction::Ret);
                instructions
            }
            MulPlan::Negated(inner) => {
                let mut instructions = inner.lower();
                assert_eq!(instructions.pop(), Some(Instruction::Ret));
                instructions.push(Instruction::Neg {
                    rd: Reg::X0,
                    rs: Reg::X0,
                });
                instructions.push(Instruction::Ret);
                instructions
            }
        }
    }
}

/// Generates the multiply-by-`k` routine under the conventional name `kefel`.
pub fn generate(k: i32) -> Routine {
    generate_named(k, "kefel")
}

/// Generates the multiply-by-`k` routine under the given symbol name.
pub fn generate_named(k: i32, name: &str) -> Routine {
    let plan = MulPlan::for_multiplier(k);
    log::debug!(
        "Multiplier {k} planned as {plan:?}, shifts [{}]",
        plan.shifts().iter().join(", ")
    );
    Routine::new(name, plan.lower())
}

impl MulPlan {
    /// The shift amounts the plan uses, for reporting.
    pub fn shifts(&self) -> Vec<u32> {
        match self {
            MulPlan::Zero | MulPlan::Identity => vec![],
            MulPlan::SingleShift(shift) => vec![*shift],
            MulPlan::ShiftPair { high, low } | MulPlan::RunDifference { high, low } => {
                vec![*high, *low]
            }
            MulPlan::ShiftSum(shifts) => shifts.clone(),
            MulPlan::Negated(inner) => inner.shifts(),
        }
    }
}
