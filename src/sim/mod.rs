//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and testable:
//! - Injected wall-clock time only (no platform clock reads)
//! - Seeded RNG only
//! - Stable iteration order (roster/swarm vec order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod movement;
pub mod round;
pub mod state;
pub mod steer;
pub mod tick;

pub use collision::circles_overlap;
pub use state::{
    Countdown, CountdownDisplay, Difficulty, EnemyBall, GameEvent, GamePhase, GameSession,
    GameSummary, MusicCommand, PlayerBall, Powerup, PowerupKind, RoundTimer, SpawnTask,
    StatusText,
};
pub use tick::{FrameInput, frame};
