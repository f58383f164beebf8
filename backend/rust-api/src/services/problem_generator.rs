use rand::Rng;
use std::ops::RangeInclusive;

use crate::models::problem::{Difficulty, Operator, Problem};

const OPERATORS: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

/// Operand range for addition and subtraction, keyed by tier.
fn additive_range(tier: Difficulty) -> RangeInclusive<i64> {
    match tier {
        Difficulty::Easy => 10..=99,
        Difficulty::Medium => 100..=499,
        Difficulty::Hard => 100..=999,
    }
}

fn factor_range(tier: Difficulty) -> RangeInclusive<i64> {
    match tier {
        Difficulty::Easy => 2..=12,
        Difficulty::Medium => 12..=25,
        Difficulty::Hard => 25..=99,
    }
}

fn divisor_range(tier: Difficulty) -> RangeInclusive<i64> {
    match tier {
        Difficulty::Easy => 2..=10,
        Difficulty::Medium => 2..=12,
        Difficulty::Hard => 12..=25,
    }
}

fn quotient_range(tier: Difficulty) -> RangeInclusive<i64> {
    match tier {
        Difficulty::Easy => 1..=9,
        Difficulty::Medium => 10..=25,
        Difficulty::Hard => 25..=99,
    }
}

/// Produces a fully-specified problem for the given tier. Pure apart from the
/// random draws: no side effects, no shared state.
///
/// Division draws a divisor and a quotient independently and sets the
/// dividend to their product, so the answer is always an exact integer.
/// Subtraction swaps operands when needed so the result is never negative.
pub fn generate_problem<R: Rng + ?Sized>(tier: Difficulty, rng: &mut R) -> Problem {
    let operator = OPERATORS[rng.random_range(0..OPERATORS.len())];

    let (first, second, answer) = match operator {
        Operator::Add => {
            let range = additive_range(tier);
            let a = rng.random_range(range.clone());
            let b = rng.random_range(range);
            (a, b, (a + b) as f64)
        }
        Operator::Sub => {
            let range = additive_range(tier);
            let a = rng.random_range(range.clone());
            let b = rng.random_range(range);
            let (minuend, subtrahend) = if a >= b { (a, b) } else { (b, a) };
            (minuend, subtrahend, (minuend - subtrahend) as f64)
        }
        Operator::Mul => {
            let range = factor_range(tier);
            let a = rng.random_range(range.clone());
            let b = rng.random_range(range);
            (a, b, (a * b) as f64)
        }
        Operator::Div => {
            let divisor = rng.random_range(divisor_range(tier));
            let quotient = rng.random_range(quotient_range(tier));
            (divisor * quotient, divisor, quotient as f64)
        }
    };

    Problem {
        first_operand: first,
        second_operand: second,
        operator,
        answer,
    }
}
