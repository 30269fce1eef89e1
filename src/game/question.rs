use rand::Rng;

/// The four arithmetic operators the drill supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

pub const ALL_OPERATIONS: [Operation; 4] = [
    Operation::Addition,
    Operation::Subtraction,
    Operation::Multiplication,
    Operation::Division,
];

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "addition" => Some(Operation::Addition),
            "subtraction" => Some(Operation::Subtraction),
            "multiplication" => Some(Operation::Multiplication),
            "division" => Some(Operation::Division),
            _ => None,
        }
    }

    /// Capitalized name for display.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operation::Addition => '+',
            Operation::Subtraction => '−',
            Operation::Multiplication => '×',
            Operation::Division => '÷',
        }
    }
}

/// Named tier controlling operand magnitude and per-question time limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

pub const ALL_DIFFICULTIES: [Difficulty; 3] =
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Capitalized name for display.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Inclusive operand range for this tier.
    pub fn operand_range(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (1, 10),
            Difficulty::Medium => (1, 20),
            Difficulty::Hard => (1, 100),
        }
    }

    /// Answer time limit in milliseconds. Harder tiers get less time.
    pub fn answer_time_limit_ms(self) -> u64 {
        match self {
            Difficulty::Easy => 15_000,
            Difficulty::Medium => 10_000,
            Difficulty::Hard => 7_000,
        }
    }
}

/// One arithmetic problem. Answers are always non-negative integers:
/// subtraction operands are ordered and division is constructed to be exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Question {
    pub operand1: u32,
    pub operand2: u32,
    pub operation: Operation,
    pub correct_answer: u32,
}

impl Question {
    pub fn generate<R: Rng>(operation: Operation, difficulty: Difficulty, rng: &mut R) -> Self {
        let (min, max) = difficulty.operand_range();
        let mut operand1 = rng.gen_range(min..=max);
        let mut operand2 = rng.gen_range(min..=max);

        let correct_answer = match operation {
            Operation::Addition => operand1 + operand2,
            Operation::Subtraction => {
                // Order the operands so the answer never goes negative.
                if operand1 < operand2 {
                    std::mem::swap(&mut operand1, &mut operand2);
                }
                operand1 - operand2
            }
            Operation::Multiplication => operand1 * operand2,
            Operation::Division => {
                // First draw becomes the quotient; scale operand1 so the
                // division comes out exact (min is 1, so operand2 != 0).
                let quotient = operand1;
                operand1 = quotient * operand2;
                quotient
            }
        };

        Self {
            operand1,
            operand2,
            operation,
            correct_answer,
        }
    }

    pub fn display(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.operand1,
            self.operation.symbol(),
            self.operand2
        )
    }
}
