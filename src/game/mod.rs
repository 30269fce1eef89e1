pub mod question;
pub mod round;
pub mod summary;

use crate::game::question::{Difficulty, Operation};

/// Session configuration chosen on the menu/settings screens and threaded
/// explicitly into the engine and generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub operation: Operation,
    pub difficulty: Difficulty,
}
