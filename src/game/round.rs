use std::time::{Duration, Instant};

use rand::rngs::SmallRng;

use crate::game::GameSettings;
use crate::game::question::Question;
use crate::game::summary::SessionSummary;

/// Minimum number of resolved questions before the session can end.
pub const SESSION_QUESTION_TARGET: u32 = 15;
/// Best possible award for a single question.
pub const MAX_POINTS_PER_QUESTION: u32 = 4;

/// How long the verdict stays on screen after a correct answer.
pub const CORRECT_FEEDBACK: Duration = Duration::from_millis(1000);
/// Shorter pause before the same question reopens for a retry.
pub const RETRY_FEEDBACK: Duration = Duration::from_millis(600);
/// A repeat of the same digit inside this window is a duplicate event.
pub const DIGIT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct { points: u32 },
    Incorrect,
}

/// What happens once a feedback pause elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    NextQuestion,
    Retry,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingInput,
    Feedback {
        verdict: Verdict,
        until: Instant,
        advance: Advance,
    },
    Complete,
}

/// Time-tiered point award. Quarter of the limit or faster earns the full 4;
/// anything past the limit earns the 1-point floor.
pub fn points_for(elapsed: Duration, limit: Duration) -> u32 {
    if elapsed > limit {
        return 1;
    }
    let p = elapsed.as_secs_f64() / limit.as_secs_f64();
    if p <= 0.25 {
        4
    } else if p <= 0.50 {
        3
    } else if p <= 0.75 {
        2
    } else {
        1
    }
}

/// State machine for one drill session. All time-sensitive entry points take
/// an explicit `now` so the event loop owns the clock; dropping the engine
/// cancels any pending feedback transition.
pub struct RoundEngine {
    settings: GameSettings,
    question: Question,
    entered: String,
    score: u32,
    questions_resolved: u32,
    streak: u32,
    max_streak: u32,
    has_retried: bool,
    timer_active: bool,
    question_started_at: Instant,
    last_digit: Option<(char, Instant)>,
    phase: Phase,
    rng: SmallRng,
}

impl RoundEngine {
    pub fn new(settings: GameSettings, mut rng: SmallRng, now: Instant) -> Self {
        let question = Question::generate(settings.operation, settings.difficulty, &mut rng);
        Self {
            settings,
            question,
            entered: String::new(),
            score: 0,
            questions_resolved: 0,
            streak: 0,
            max_streak: 0,
            has_retried: false,
            timer_active: true,
            question_started_at: now,
            last_digit: None,
            phase: Phase::AwaitingInput,
            rng,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn entered(&self) -> &str {
        &self.entered
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn questions_resolved(&self) -> u32 {
        self.questions_resolved
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn has_retried(&self) -> bool {
        self.has_retried
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    /// Input is locked from the moment an answer is submitted until the
    /// feedback pause resolves (and permanently once the session completes).
    pub fn input_locked(&self) -> bool {
        !matches!(self.phase, Phase::AwaitingInput)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.settings.difficulty.answer_time_limit_ms())
    }

    /// Remaining countdown for display. Zero once the timer has stopped.
    pub fn time_remaining(&self, now: Instant) -> Duration {
        if !self.timer_active {
            return Duration::ZERO;
        }
        self.time_limit()
            .saturating_sub(now.duration_since(self.question_started_at))
    }

    pub fn press_digit(&mut self, digit: char, now: Instant) {
        if self.input_locked() || !digit.is_ascii_digit() {
            return;
        }
        // Duplicate touch/key events arrive as the same digit back to back;
        // ignore a repeat inside the debounce window of its last acceptance.
        if let Some((last, accepted_at)) = self.last_digit {
            if last == digit && now.duration_since(accepted_at) < DIGIT_DEBOUNCE {
                return;
            }
        }
        self.entered.push(digit);
        self.last_digit = Some((digit, now));
    }

    pub fn press_backspace(&mut self) {
        if self.input_locked() {
            return;
        }
        self.entered.pop();
    }

    pub fn submit(&mut self, now: Instant) {
        if self.entered.is_empty() || self.input_locked() {
            return;
        }

        // Overflowed digit strings parse to None and count as incorrect.
        let answered = self.entered.parse::<u32>().ok();
        if answered == Some(self.question.correct_answer) {
            let points = if self.has_retried {
                // Past first-attempt scoring: the question resolves but
                // awards nothing and leaves the streak broken.
                0
            } else {
                self.timer_active = false;
                let elapsed = now.duration_since(self.question_started_at);
                let points = points_for(elapsed, self.time_limit());
                self.score += points;
                self.streak += 1;
                self.max_streak = self.max_streak.max(self.streak);
                points
            };
            self.questions_resolved += 1;

            // The session only ends on a resolved retry at or past the
            // target; a clean streak keeps it alive indefinitely.
            let advance = if self.questions_resolved >= SESSION_QUESTION_TARGET && self.has_retried
            {
                Advance::Complete
            } else {
                Advance::NextQuestion
            };
            self.phase = Phase::Feedback {
                verdict: Verdict::Correct { points },
                until: now + CORRECT_FEEDBACK,
                advance,
            };
        } else {
            if !self.has_retried {
                self.timer_active = false;
                self.has_retried = true;
                self.streak = 0;
            }
            self.phase = Phase::Feedback {
                verdict: Verdict::Incorrect,
                until: now + RETRY_FEEDBACK,
                advance: Advance::Retry,
            };
        }
    }

    /// Advance pending transitions. Called from the app's tick loop.
    pub fn tick(&mut self, now: Instant) {
        // Countdown expiry deactivates the timer but never force-resolves the
        // question; a late correct first attempt earns the 1-point floor.
        if self.timer_active
            && matches!(self.phase, Phase::AwaitingInput)
            && now.duration_since(self.question_started_at) >= self.time_limit()
        {
            self.timer_active = false;
        }

        if let Phase::Feedback { until, advance, .. } = self.phase {
            if now >= until {
                match advance {
                    Advance::Retry => {
                        // Same question, cleared input; timer stays stopped.
                        self.entered.clear();
                        self.phase = Phase::AwaitingInput;
                    }
                    Advance::NextQuestion => self.next_question(now),
                    Advance::Complete => self.phase = Phase::Complete,
                }
            }
        }
    }

    fn next_question(&mut self, now: Instant) {
        self.question =
            Question::generate(self.settings.operation, self.settings.difficulty, &mut self.rng);
        self.entered.clear();
        self.has_retried = false;
        self.timer_active = true;
        self.question_started_at = now;
        self.last_digit = None;
        self.phase = Phase::AwaitingInput;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            questions_resolved: self.questions_resolved,
            max_streak: self.max_streak,
            operation: self.settings.operation,
            difficulty: self.settings.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::game::question::{Difficulty, Operation};

    const MS: Duration = Duration::from_millis(1);

    fn engine(operation: Operation, difficulty: Difficulty) -> (RoundEngine, Instant) {
        let t0 = Instant::now();
        let settings = GameSettings {
            operation,
            difficulty,
        };
        let rng = SmallRng::seed_from_u64(42);
        (RoundEngine::new(settings, rng, t0), t0)
    }

    /// Type a number digit by digit, spacing presses out past the debounce.
    fn type_number(engine: &mut RoundEngine, value: u32, now: Instant) {
        for (i, digit) in value.to_string().chars().enumerate() {
            engine.press_digit(digit, now + MS * 60 * i as u32);
        }
    }

    /// Resolve the current question correctly on the first attempt and step
    /// the clock past the feedback pause. Returns the new clock.
    fn resolve_clean(engine: &mut RoundEngine, now: Instant) -> Instant {
        let answer = engine.question().correct_answer;
        type_number(engine, answer, now);
        let submit_at = now + MS * 1000;
        engine.submit(submit_at);
        let after = submit_at + CORRECT_FEEDBACK + MS;
        engine.tick(after);
        after
    }

    /// Resolve the current question wrong-then-right. Returns the new clock.
    fn resolve_with_retry(engine: &mut RoundEngine, now: Instant) -> Instant {
        let answer = engine.question().correct_answer;
        type_number(engine, answer + 1, now);
        engine.submit(now + MS * 500);
        let reopened = now + MS * 500 + RETRY_FEEDBACK + MS;
        engine.tick(reopened);
        type_number(engine, answer, reopened);
        let submit_at = reopened + MS * 1000;
        engine.submit(submit_at);
        let after = submit_at + CORRECT_FEEDBACK + MS;
        engine.tick(after);
        after
    }

    #[test]
    fn points_tier_boundaries() {
        let limit = Duration::from_millis(15_000);
        assert_eq!(points_for(Duration::ZERO, limit), 4);
        assert_eq!(points_for(limit.mul_f64(0.25), limit), 4);
        assert_eq!(points_for(limit.mul_f64(0.26), limit), 3);
        assert_eq!(points_for(limit.mul_f64(0.50), limit), 3);
        assert_eq!(points_for(limit.mul_f64(0.75), limit), 2);
        assert_eq!(points_for(limit.mul_f64(0.90), limit), 1);
        assert_eq!(points_for(limit, limit), 1);
        assert_eq!(points_for(limit + MS, limit), 1);
    }

    #[test]
    fn fast_correct_answer_awards_four_points() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        let answer = engine.question().correct_answer;
        type_number(&mut engine, answer, t0);
        // 1000ms is within a quarter of the easy 15s limit.
        engine.submit(t0 + MS * 1000);

        assert_eq!(engine.score(), 4);
        assert_eq!(engine.streak(), 1);
        assert_eq!(engine.max_streak(), 1);
        assert_eq!(engine.questions_resolved(), 1);
        assert!(!engine.timer_active());
        assert!(engine.input_locked());
        assert!(matches!(
            engine.phase(),
            Phase::Feedback {
                verdict: Verdict::Correct { points: 4 },
                advance: Advance::NextQuestion,
                ..
            }
        ));
    }

    #[test]
    fn incorrect_answer_resets_streak_and_reopens_same_question() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        let t1 = resolve_clean(&mut engine, t0);
        assert_eq!(engine.streak(), 1);

        let question = *engine.question();
        type_number(&mut engine, question.correct_answer + 1, t1);
        engine.submit(t1 + MS * 500);

        assert!(engine.has_retried());
        assert_eq!(engine.streak(), 0);
        assert_eq!(engine.max_streak(), 1);
        assert_eq!(engine.score(), 4, "no award and no penalty");
        assert_eq!(engine.questions_resolved(), 1, "question not resolved yet");
        assert!(matches!(
            engine.phase(),
            Phase::Feedback {
                verdict: Verdict::Incorrect,
                advance: Advance::Retry,
                ..
            }
        ));

        // After the shorter pause the same question reopens, input cleared.
        let reopened = t1 + MS * 500 + RETRY_FEEDBACK + MS;
        engine.tick(reopened);
        assert_eq!(engine.phase(), Phase::AwaitingInput);
        assert_eq!(engine.entered(), "");
        assert_eq!(*engine.question(), question);
        assert!(!engine.timer_active(), "timer does not restart for a retry");

        // Correct on the retry: resolves, but scores nothing.
        type_number(&mut engine, question.correct_answer, reopened);
        engine.submit(reopened + MS * 200);
        assert_eq!(engine.score(), 4);
        assert_eq!(engine.streak(), 0);
        assert_eq!(engine.questions_resolved(), 2);
    }

    #[test]
    fn second_wrong_attempt_behaves_like_the_first_without_double_reset() {
        let (mut engine, t0) = engine(Operation::Multiplication, Difficulty::Medium);
        let answer = engine.question().correct_answer;

        type_number(&mut engine, answer + 1, t0);
        engine.submit(t0 + MS * 300);
        let t1 = t0 + MS * 300 + RETRY_FEEDBACK + MS;
        engine.tick(t1);

        type_number(&mut engine, answer + 2, t1);
        engine.submit(t1 + MS * 300);
        assert!(engine.has_retried());
        assert_eq!(engine.streak(), 0);

        let t2 = t1 + MS * 300 + RETRY_FEEDBACK + MS;
        engine.tick(t2);
        assert_eq!(engine.phase(), Phase::AwaitingInput);
        assert_eq!(engine.entered(), "");
    }

    #[test]
    fn session_survives_fifteen_clean_questions() {
        let (mut engine, t0) = engine(Operation::Subtraction, Difficulty::Easy);
        let mut clock = t0;
        for _ in 0..SESSION_QUESTION_TARGET {
            clock = resolve_clean(&mut engine, clock);
        }
        assert_eq!(engine.questions_resolved(), SESSION_QUESTION_TARGET);
        assert!(!engine.is_complete());
        assert_eq!(engine.phase(), Phase::AwaitingInput);
        assert_eq!(engine.streak(), SESSION_QUESTION_TARGET);
    }

    #[test]
    fn first_retry_past_the_target_ends_the_session() {
        let (mut engine, t0) = engine(Operation::Subtraction, Difficulty::Easy);
        let mut clock = t0;
        for _ in 0..SESSION_QUESTION_TARGET {
            clock = resolve_clean(&mut engine, clock);
        }
        resolve_with_retry(&mut engine, clock);
        assert!(engine.is_complete());
        assert_eq!(engine.questions_resolved(), SESSION_QUESTION_TARGET + 1);
        assert_eq!(engine.max_streak(), SESSION_QUESTION_TARGET);
    }

    #[test]
    fn retried_fifteenth_question_ends_the_session_immediately() {
        let (mut engine, t0) = engine(Operation::Division, Difficulty::Hard);
        let mut clock = t0;
        for _ in 0..SESSION_QUESTION_TARGET - 1 {
            clock = resolve_clean(&mut engine, clock);
        }
        resolve_with_retry(&mut engine, clock);
        assert!(engine.is_complete());
        assert_eq!(engine.questions_resolved(), SESSION_QUESTION_TARGET);
    }

    #[test]
    fn repeated_digit_inside_debounce_window_is_dropped() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        engine.press_digit('7', t0);
        engine.press_digit('7', t0 + MS * 20);
        assert_eq!(engine.entered(), "7");

        // Past the window the same digit is a real second press.
        engine.press_digit('7', t0 + MS * 60);
        assert_eq!(engine.entered(), "77");

        // A different digit is never debounced.
        engine.press_digit('1', t0 + MS * 61);
        assert_eq!(engine.entered(), "771");
    }

    #[test]
    fn backspace_edits_and_is_ignored_while_locked() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        type_number(&mut engine, 42, t0);
        engine.press_backspace();
        assert_eq!(engine.entered(), "4");

        engine.press_digit('9', t0 + MS * 500);
        engine.submit(t0 + MS * 600);
        let before = engine.entered().to_string();
        engine.press_backspace();
        engine.press_digit('3', t0 + MS * 700);
        assert_eq!(engine.entered(), before);
    }

    #[test]
    fn empty_submit_is_a_no_op() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        engine.submit(t0 + MS * 100);
        assert_eq!(engine.phase(), Phase::AwaitingInput);
        assert_eq!(engine.questions_resolved(), 0);
    }

    #[test]
    fn timer_expiry_leaves_question_outstanding() {
        let (mut engine, t0) = engine(Operation::Addition, Difficulty::Easy);
        let question = *engine.question();

        let expired = t0 + engine.time_limit() + MS;
        engine.tick(expired);
        assert!(!engine.timer_active());
        assert_eq!(engine.phase(), Phase::AwaitingInput, "no auto-resolve");
        assert_eq!(*engine.question(), question);
        assert_eq!(engine.time_remaining(expired), Duration::ZERO);

        // A late first-attempt correct answer earns the floor award.
        type_number(&mut engine, question.correct_answer, expired);
        engine.submit(expired + MS * 500);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.streak(), 1);
    }

    #[test]
    fn streak_tracks_consecutive_first_attempt_answers() {
        let (mut engine, t0) = engine(Operation::Multiplication, Difficulty::Easy);
        let mut clock = t0;
        clock = resolve_clean(&mut engine, clock);
        clock = resolve_clean(&mut engine, clock);
        assert_eq!(engine.streak(), 2);

        clock = resolve_with_retry(&mut engine, clock);
        assert_eq!(engine.streak(), 0);
        assert_eq!(engine.max_streak(), 2);

        resolve_clean(&mut engine, clock);
        assert_eq!(engine.streak(), 1);
        assert_eq!(engine.max_streak(), 2);
    }

    #[test]
    fn summary_reflects_session_tally() {
        let (mut engine, t0) = engine(Operation::Division, Difficulty::Medium);
        let clock = resolve_clean(&mut engine, t0);
        resolve_clean(&mut engine, clock);

        let summary = engine.summary();
        assert_eq!(summary.score, 8);
        assert_eq!(summary.questions_resolved, 2);
        assert_eq!(summary.max_streak, 2);
        assert_eq!(summary.operation, Operation::Division);
        assert_eq!(summary.difficulty, Difficulty::Medium);
    }
}
