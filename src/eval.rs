//! Evaluator for parsed math expressions.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{MagnitudeError, Result};
use crate::magnitude::Magnitude;
use crate::parser::Parser;
use crate::scalar::ScalarMagnitude;

/// Tokenizes, parses, and evaluates an expression in one call.
///
/// Usage: `evaluate_source("2 + 3 * 4")` -> `1.4e1`
pub fn evaluate_source(source: &str) -> Result<Magnitude> {
    if source.trim().is_empty() {
        return Err(MagnitudeError::Parse {
            message: "empty expression".to_string(),
            position: 0,
        });
    }
    let mut parser = Parser::from_source(source)?;
    let expr = parser.parse()?;
    evaluate(&expr)
}

pub fn evaluate(expr: &Expr) -> Result<Magnitude> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand)?;
            match op {
                UnaryOp::Negate => Ok(value.neg()),
                UnaryOp::Factorial => factorial(value.to_f64()),
                UnaryOp::DoubleFactorial => double_factorial(value.to_f64()),
            }
        }
        Expr::Binary { op, left, right } => {
            let a = evaluate(left)?;
            let b = evaluate(right)?;
            match op {
                BinaryOp::Add => Ok(a.add(&b)),
                BinaryOp::Subtract => Ok(a.subtract(&b)),
                BinaryOp::Multiply => Ok(a.multiply(&b)),
                BinaryOp::Divide => a.divide(&b),
                BinaryOp::Power => Ok(a.pow(b.to_f64())),
                BinaryOp::Modulo => modulo(&a, &b),
            }
        }
        Expr::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg)?);
            }
            apply_function(name, &values)
        }
    }
}

fn apply_function(name: &str, args: &[Magnitude]) -> Result<Magnitude> {
    match name {
        "pow" => {
            let (base, exponent) = two_args(name, args)?;
            Ok(base.pow(exponent.to_f64()))
        }
        "sqrt" => Ok(one_arg(name, args)?.sqrt()),
        "abs" => Ok(one_arg(name, args)?.abs()),
        "round" => {
            let value = one_arg(name, args)?;
            Ok(round_to_integer(&value))
        }
        "log" => match args {
            // log defaults to the natural logarithm, log(x, b) takes a base
            [value] => Ok(value.log(std::f64::consts::E)),
            [value, base] => Ok(value.log(base.to_f64())),
            _ => Err(MagnitudeError::Arity {
                name: name.to_string(),
                expected: "1 or 2",
                actual: args.len(),
            }),
        },
        "sin" => Ok(native_unary(&one_arg(name, args)?, f64::sin)),
        "cos" => Ok(native_unary(&one_arg(name, args)?, f64::cos)),
        "tan" => Ok(native_unary(&one_arg(name, args)?, f64::tan)),
        "mod" => {
            let (a, b) = two_args(name, args)?;
            modulo(&a, &b)
        }
        _ => Err(MagnitudeError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}

fn one_arg(name: &str, args: &[Magnitude]) -> Result<Magnitude> {
    match args {
        [value] => Ok(*value),
        _ => Err(MagnitudeError::Arity {
            name: name.to_string(),
            expected: "1",
            actual: args.len(),
        }),
    }
}

fn two_args(name: &str, args: &[Magnitude]) -> Result<(Magnitude, Magnitude)> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(MagnitudeError::Arity {
            name: name.to_string(),
            expected: "2",
            actual: args.len(),
        }),
    }
}

fn native_unary(value: &Magnitude, f: impl Fn(f64) -> f64) -> Magnitude {
    Magnitude::from_f64(f(value.to_f64()))
}

/// Rounds to the nearest integer. Values already integral beyond native
/// precision come back unchanged.
fn round_to_integer(value: &Magnitude) -> Magnitude {
    let native = value.to_f64();
    if native.is_finite() {
        Magnitude::from_f64(native.round())
    } else {
        *value
    }
}

fn modulo(a: &Magnitude, b: &Magnitude) -> Result<Magnitude> {
    if b.is_zero() {
        return Err(MagnitudeError::DivisionByZero);
    }
    Ok(Magnitude::from_f64(a.to_f64() % b.to_f64()))
}

fn factorial(n: f64) -> Result<Magnitude> {
    if n < 0.0 {
        return Err(MagnitudeError::NegativeFactorial);
    }
    if !n.is_finite() {
        return Ok(Magnitude::Scalar(ScalarMagnitude::INFINITY));
    }
    let mut result = ScalarMagnitude::ONE;
    let mut i = 2.0;
    while i <= n.floor() {
        result = result.multiply(&ScalarMagnitude::from_f64(i));
        i += 1.0;
    }
    Ok(Magnitude::Scalar(result))
}

fn double_factorial(n: f64) -> Result<Magnitude> {
    if n < 0.0 {
        return Err(MagnitudeError::NegativeFactorial);
    }
    if !n.is_finite() {
        return Ok(Magnitude::Scalar(ScalarMagnitude::INFINITY));
    }
    let mut result = ScalarMagnitude::ONE;
    let mut i = n.floor();
    while i > 1.0 {
        result = result.multiply(&ScalarMagnitude::from_f64(i));
        i -= 2.0;
    }
    Ok(Magnitude::Scalar(result))
}
