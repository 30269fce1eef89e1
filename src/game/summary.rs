use crate::game::question::{Difficulty, Operation};
use crate::game::round::{MAX_POINTS_PER_QUESTION, SESSION_QUESTION_TARGET};

/// Final tally handed from the round engine to the results screen and the
/// stats ledger once a session completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub questions_resolved: u32,
    pub max_streak: u32,
    pub operation: Operation,
    pub difficulty: Difficulty,
}

impl Default for SessionSummary {
    /// Fallback for a results stage reached without a real summary.
    fn default() -> Self {
        Self {
            score: 0,
            questions_resolved: SESSION_QUESTION_TARGET,
            max_streak: 0,
            operation: Operation::Addition,
            difficulty: Difficulty::Easy,
        }
    }
}

impl SessionSummary {
    /// Score as a percentage of the best possible award, rounded.
    pub fn percentage(&self) -> u32 {
        if self.questions_resolved == 0 {
            return 0;
        }
        let max = (self.questions_resolved * MAX_POINTS_PER_QUESTION) as f64;
        (self.score as f64 / max * 100.0).round() as u32
    }

    pub fn message(&self) -> &'static str {
        match self.percentage() {
            90.. => "Outstanding!",
            80.. => "Great job!",
            60.. => "Good work!",
            40.. => "Keep practicing!",
            _ => "Try again!",
        }
    }
}
