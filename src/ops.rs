//! The operation library: four pure arithmetic functions and the enum that
//! names them. No state, no I/O.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The four operations the calculator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation \"{0}\"")]
pub struct UnknownOperation(pub String);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("division by zero")]
pub struct DivisionByZero;

impl Op {
    /// Apply the operation named by this variant to the two operands.
    pub fn apply(self, lhs: i32, rhs: i32) -> Result<i32, DivisionByZero> {
        match self {
            Op::Add => Ok(add(lhs, rhs)),
            Op::Subtract => Ok(subtract(lhs, rhs)),
            Op::Multiply => Ok(multiply(lhs, rhs)),
            Op::Divide => divide(lhs, rhs),
        }
    }

    /// The name this operation goes by in batch input.
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Subtract => "subtract",
            Op::Multiply => "multiply",
            Op::Divide => "divide",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = UnknownOperation;

    // Names match exactly and case-sensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Op::Add),
            "subtract" => Ok(Op::Subtract),
            "multiply" => Ok(Op::Multiply),
            "divide" => Ok(Op::Divide),
            _ => Err(UnknownOperation(s.to_string())),
        }
    }
}

pub fn add(lhs: i32, rhs: i32) -> i32 {
    lhs.wrapping_add(rhs)
}

pub fn subtract(lhs: i32, rhs: i32) -> i32 {
    lhs.wrapping_sub(rhs)
}

pub fn multiply(lhs: i32, rhs: i32) -> i32 {
    lhs.wrapping_mul(rhs)
}

/// Truncating division. A zero divisor is an error; the one overflowing
/// quotient, `i32::MIN / -1`, wraps instead of panicking.
pub fn divide(lhs: i32, rhs: i32) -> Result<i32, DivisionByZero> {
    if rhs == 0 {
        return Err(DivisionByZero);
    }
    Ok(lhs.wrapping_div(rhs))
}
