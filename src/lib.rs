//! Ball Tag - evade the swarm, survive the round
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering, collisions, round state)
//! - `audio`: Look-ahead music sequencer and Web Audio instrument bank
//! - `input`: Keyboard/touch input resolution
//! - `touch`: Virtual joystick for mobile
//! - `render`: Canvas 2D renderer (wasm)
//! - `settings`: Audio/UI preferences

pub mod audio;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod sim;
pub mod touch;

pub use settings::Settings;
pub use sim::{Difficulty, GameSession};

/// Gameplay tuning constants
pub mod consts {
    /// Duration of each round in seconds
    pub const ROUND_TIME_SECONDS: u32 = 6;
    /// Base speed of player balls (pixels per frame)
    pub const PLAYER_SPEED_START: f32 = 7.0;
    /// Active-player speed gain per round survived
    pub const PLAYER_SPEED_PER_ROUND: f32 = 0.3;
    /// Round at which the speed ramp stops growing
    pub const SPEED_RAMP_MAX_ROUND: u32 = 15;
    /// Velocity smoothing factor (lower is more slippery)
    pub const PLAYER_SMOOTHING: f32 = 0.1;
    /// Base speed of enemy balls
    pub const ENEMY_SPEED_START: f32 = 3.0;
    /// Speed gain per enemy spawn index
    pub const ENEMY_SPEED_INCREMENT: f32 = 0.2;
    /// Inset from the playfield edges where balls cannot go
    pub const PLAY_AREA_PADDING: f32 = 10.0;
    /// Radius of player and enemy balls
    pub const BALL_RADIUS: f32 = 8.0;
    /// Maximum number of player balls
    pub const MAX_PLAYERS: usize = 15;

    /// Autopilot heading refresh interval bounds (ms)
    pub const AUTOPILOT_DIR_CHANGE_MIN_MS: f64 = 800.0;
    pub const AUTOPILOT_DIR_CHANGE_MAX_MS: f64 = 1600.0;
    /// How strongly autopilot balls steer away from enemies
    pub const AUTOPILOT_AVOID_WEIGHT: f32 = 1.2;
    /// How strongly the active ball is nudged away from enemies
    pub const ACTIVE_AVOID_WEIGHT: f32 = 0.2;

    /// Extra speed while a speed boost is held
    pub const SPEED_BOOST_AMOUNT: f32 = 1.0;
    /// Powerup effect duration (ms)
    pub const POWERUP_DURATION_MS: f64 = 2000.0;
    /// First round in which powerups spawn
    pub const POWERUP_SPAWN_ROUND: u32 = 2;
    /// Radius of powerup items
    pub const POWERUP_RADIUS: f32 = 30.0;
    /// Powerup spawn delay bounds within a round (ms)
    pub const POWERUP_SPAWN_DELAY_MIN_MS: f64 = 600.0;
    pub const POWERUP_SPAWN_DELAY_MAX_MS: f64 = 2600.0;

    /// Depth of the corner/side zones enemies spawn in
    pub const ENEMY_SPAWN_INSET: f32 = 50.0;
    /// Offset between stacked players on round start
    pub const PLAYER_STACK_OFFSET: f32 = 20.0;
    /// Offset for an on-demand spawned player
    pub const PLAYER_SPAWN_OFFSET: f32 = 16.0;

    /// Countdown beep pitch and length
    pub const COUNTDOWN_BEEP_HZ: f32 = 840.0;
    pub const COUNTDOWN_BEEP_MS: f64 = 150.0;
    /// "GO!" beep pitch and length
    pub const COUNTDOWN_GO_HZ: f32 = 1080.0;
    pub const COUNTDOWN_GO_MS: f64 = 200.0;
    /// Pause between "GO!" and the round actually starting (ms)
    pub const COUNTDOWN_GO_HOLD_MS: f64 = 600.0;
}
