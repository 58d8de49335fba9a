//! Four-operation calculator used by the `calc` subcommand.

use clap::ValueEnum;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Calculator failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

/// Arithmetic operation selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    /// Apply the operation to `x` and `y`
    pub fn apply(self, x: f64, y: f64) -> Result<f64, CalcError> {
        match self {
            Self::Add => Ok(add(x, y)),
            Self::Sub => Ok(sub(x, y)),
            Self::Mul => Ok(mul(x, y)),
            Self::Div => div(x, y),
        }
    }
}

pub fn add(x: f64, y: f64) -> f64 {
    x + y
}

pub fn sub(x: f64, y: f64) -> f64 {
    x - y
}

pub fn mul(x: f64, y: f64) -> f64 {
    x * y
}

/// Divide `x` by `y`, rejecting a zero divisor instead of returning infinity
pub fn div(x: f64, y: f64) -> Result<f64, CalcError> {
    if y == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    Ok(x / y)
}
