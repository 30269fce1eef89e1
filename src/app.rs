use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::game::GameSettings;
use crate::game::question::{Difficulty, Operation};
use crate::game::round::RoundEngine;
use crate::game::summary::SessionSummary;
use crate::store::ledger::StatsLedger;
use crate::store::schema::GameStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Game,
    Results,
    Settings,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    /// Session configuration threaded into each new engine; never read from
    /// anywhere else once a game starts.
    pub settings: GameSettings,
    pub engine: Option<RoundEngine>,
    pub last_summary: Option<SessionSummary>,
    /// Best record snapshot taken before the end-of-session update, so the
    /// results screen can tell whether this session set a new one.
    pub previous_best: Option<GameStats>,
    pub ledger: StatsLedger,
    pub should_quit: bool,
    pub settings_selected: usize,
}

impl App {
    pub fn new() -> Self {
        let mut config = Config::load().unwrap_or_default();
        config.normalize();
        let settings = config.settings();
        Self {
            screen: AppScreen::Menu,
            config,
            settings,
            engine: None,
            last_summary: None,
            previous_best: None,
            ledger: StatsLedger::open(),
            should_quit: false,
            settings_selected: 0,
        }
    }

    pub fn start_game(&mut self, operation: Operation) {
        self.settings.operation = operation;
        let rng = SmallRng::from_entropy();
        self.engine = Some(RoundEngine::new(self.settings, rng, Instant::now()));
        self.screen = AppScreen::Game;
    }

    pub fn replay(&mut self) {
        self.start_game(self.settings.operation);
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(ref mut engine) = self.engine {
            engine.tick(now);
            if engine.is_complete() {
                self.finish_session();
            }
        }
    }

    /// Record the finished session and move to the results screen. Taking the
    /// engine out means the ledger update can only happen once per session.
    fn finish_session(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        let summary = engine.summary();
        self.previous_best = Some(self.ledger.get(summary.difficulty, summary.operation));
        self.ledger.update(
            summary.difficulty,
            summary.operation,
            summary.score,
            summary.max_streak,
        );
        self.last_summary = Some(summary);
        self.screen = AppScreen::Results;
    }

    /// Leaving the game screen abandons the session: the engine and any
    /// pending feedback transition die here, and nothing is recorded.
    pub fn abandon_game(&mut self) {
        self.engine = None;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_menu(&mut self) {
        self.engine = None;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = match self.settings.difficulty {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        };
        self.screen = AppScreen::Settings;
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        self.config.difficulty = difficulty.as_str().to_string();
        if let Err(e) = self.config.save() {
            log::warn!("failed to save config: {e}");
        }
    }

    /// True when the session on the results screen beat the stored best.
    pub fn is_new_best(&self) -> bool {
        match (&self.last_summary, &self.previous_best) {
            (Some(summary), Some(best)) => {
                best.games_played > 0 && summary.score > best.highest_score
            }
            _ => false,
        }
    }
}
