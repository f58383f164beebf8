use serde::{Deserialize, Serialize};

use crate::config::{HARD_TIER_STREAK, MEDIUM_TIER_STREAK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// Human-readable operation name used as the `topic` of roast requests.
    pub fn topic(&self) -> &'static str {
        match self {
            Operator::Add => "addition",
            Operator::Sub => "subtraction",
            Operator::Mul => "multiplication",
            Operator::Div => "division",
        }
    }
}

/// One arithmetic question. Immutable once installed into a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub first_operand: i64,
    pub second_operand: i64,
    pub operator: Operator,
    pub answer: f64,
}

impl Problem {
    /// The question text shown to the player: "A op B = ?"
    pub fn question_text(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.first_operand,
            self.operator.symbol(),
            self.second_operand
        )
    }

    /// The bare expression forwarded to the feedback generator.
    pub fn expression(&self) -> String {
        format!(
            "{} {} {}",
            self.first_operand,
            self.operator.symbol(),
            self.second_operand
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Difficulty is a pure function of the current streak: monotonic
    /// non-decreasing, back to Easy the moment the streak resets.
    pub fn for_streak(streak: u32) -> Self {
        if streak >= HARD_TIER_STREAK {
            Difficulty::Hard
        } else if streak >= MEDIUM_TIER_STREAK {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }
}
