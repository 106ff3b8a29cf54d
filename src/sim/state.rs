//! Entities and session state
//!
//! All round, roster, and timer state lives on [`GameSession`]; nothing is
//! global, so several sessions can coexist and tests drive one directly.
//! Wall-clock decisions take an injected `now_ms` timestamp - the session
//! never reads a clock itself.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::steer;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Main menu, no entities live
    Menu,
    /// 3-2-1-GO! overlay before the first round
    Countdown,
    /// Active gameplay
    Playing,
    /// Frozen mid-round
    Paused,
    /// Roster wiped out
    GameOver,
}

/// HUD status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusText {
    Playing,
    NextBall,
    SpeedBoost,
    Invincible,
}

impl StatusText {
    pub fn label(self) -> &'static str {
        match self {
            StatusText::Playing => "Playing",
            StatusText::NextBall => "Next Ball!",
            StatusText::SpeedBoost => "Speed Boost!",
            StatusText::Invincible => "Invincible!",
        }
    }
}

/// Powerup variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    SpeedBoost,
    Invincibility,
}

/// A player-controlled (or autopiloted) ball
///
/// Positions are top-left anchored; the ball occupies `pos..pos + 2r`.
#[derive(Debug, Clone)]
pub struct PlayerBall {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Exactly one player is active whenever the roster is non-empty
    pub is_active: bool,
    /// Current autopilot heading (unit vector)
    pub auto_dir: Vec2,
    /// When the autopilot heading is re-rolled (ms)
    pub auto_dir_expires_at: f64,
    /// Last computed desired direction, for rendering
    pub input_dir: Vec2,
}

impl PlayerBall {
    pub fn new(rng: &mut Pcg32, now_ms: f64) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            is_active: false,
            auto_dir: Vec2::ZERO,
            auto_dir_expires_at: 0.0,
            input_dir: Vec2::ZERO,
        };
        player.retarget_autopilot(rng, now_ms);
        player
    }

    /// Roll a fresh random heading and its expiry time.
    pub fn retarget_autopilot(&mut self, rng: &mut Pcg32, now_ms: f64) {
        self.auto_dir = steer::random_unit(rng);
        let span = AUTOPILOT_DIR_CHANGE_MAX_MS - AUTOPILOT_DIR_CHANGE_MIN_MS;
        self.auto_dir_expires_at =
            now_ms + AUTOPILOT_DIR_CHANGE_MIN_MS + rng.random::<f64>() * span;
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }
}

/// A pursuing enemy ball
#[derive(Debug, Clone)]
pub struct EnemyBall {
    pub pos: Vec2,
    pub radius: f32,
    /// Spawn order within the round; fixes the pursuit speed tier
    pub spawn_index: usize,
}

impl EnemyBall {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }
}

/// A pickup item; at most one exists at a time
#[derive(Debug, Clone)]
pub struct Powerup {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerupKind,
    /// Advances every frame for the pulse animation
    pub pulse_phase: f32,
}

impl Powerup {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }
}

/// Difficulty preset - injectable configuration, not a hardcoded branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub label: String,
    pub start_balls: usize,
    pub player_speed_delta: f32,
    pub enemy_speed_delta: f32,
}

impl Difficulty {
    pub fn easy() -> Self {
        Self {
            label: "Easy".into(),
            start_balls: 1,
            player_speed_delta: 0.0,
            enemy_speed_delta: 0.0,
        }
    }

    pub fn medium() -> Self {
        Self {
            label: "Medium".into(),
            start_balls: 4,
            player_speed_delta: 0.0,
            enemy_speed_delta: 0.0,
        }
    }

    pub fn hard() -> Self {
        Self {
            label: "Hard".into(),
            start_balls: 5,
            player_speed_delta: 0.2,
            enemy_speed_delta: 1.5,
        }
    }

    /// Preset lookup by menu id; unknown ids fall back to easy.
    pub fn from_id(id: &str) -> Self {
        match id {
            "medium" => Self::medium(),
            "hard" => Self::hard(),
            _ => Self::easy(),
        }
    }
}

/// Music transport signal for the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    Start,
    Pause,
    Stop,
}

/// One-shot side effects drained by the shell each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Short UI beep (countdown ticks)
    Beep { freq: f32, duration_ms: f64 },
    Music(MusicCommand),
}

/// Countdown overlay content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    Number(u8),
    Go,
}

/// Pending countdown tick
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    pub display: CountdownDisplay,
    pub next_at: f64,
}

/// Per-round survival timer, advanced by due-time polling
#[derive(Debug, Clone, Copy)]
pub struct RoundTimer {
    /// Whole seconds left in the round
    pub remaining: u32,
    /// Due time of the next one-second tick (ms)
    pub next_tick_at: f64,
}

/// Cancellable delayed-spawn task for the round's powerup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnTask {
    Idle,
    Armed { due_at: f64 },
    /// Pause converts the deadline to a remaining delay
    Suspended { remaining: f64 },
}

/// End-of-game summary for the UI shell
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub rounds_survived: u32,
    pub difficulty_label: String,
}

/// One game instance: roster, swarm, timers, progression
pub struct GameSession {
    pub bounds: Vec2,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub difficulty: Difficulty,

    pub players: Vec<PlayerBall>,
    pub active_index: usize,
    pub enemies: Vec<EnemyBall>,
    pub powerups: Vec<Powerup>,

    /// Enemy count for the current round
    pub ball_count: usize,
    pub rounds_survived: u32,
    pub round_timer: RoundTimer,
    pub countdown: Option<Countdown>,
    pub powerup_task: SpawnTask,

    /// Speed-boost window: wall-clock deadline + holder index
    pub speed_boost_until: f64,
    pub speed_boost_holder: Option<usize>,
    /// Invincibility window: wall-clock deadline
    pub invincible_until: f64,

    pub status: StatusText,
    pub summary: Option<GameSummary>,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(seed: u64, bounds: Vec2) -> Self {
        Self {
            bounds,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            difficulty: Difficulty::easy(),
            players: Vec::new(),
            active_index: 0,
            enemies: Vec::new(),
            powerups: Vec::new(),
            ball_count: 1,
            rounds_survived: 0,
            round_timer: RoundTimer {
                remaining: ROUND_TIME_SECONDS,
                next_tick_at: 0.0,
            },
            countdown: None,
            powerup_task: SpawnTask::Idle,
            speed_boost_until: 0.0,
            speed_boost_holder: None,
            invincible_until: 0.0,
            status: StatusText::Playing,
            summary: None,
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the frame's pending side effects.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn speed_boost_active(&self, now_ms: f64) -> bool {
        now_ms < self.speed_boost_until
    }

    #[inline]
    pub fn invincible_active(&self, now_ms: f64) -> bool {
        now_ms < self.invincible_until
    }

    /// Rounds that count toward the speed ramp (capped).
    #[inline]
    pub fn speed_ramp_rounds(&self) -> u32 {
        self.rounds_survived.min(SPEED_RAMP_MAX_ROUND - 1)
    }

    /// The active player's base speed excluding any powerup bonus.
    ///
    /// Enemies are capped here so they can never structurally outrun an
    /// unboosted player.
    pub fn unboosted_player_speed(&self) -> f32 {
        PLAYER_SPEED_START
            + self.difficulty.player_speed_delta
            + self.speed_ramp_rounds() as f32 * PLAYER_SPEED_PER_ROUND
    }

    /// Make exactly one player active.
    pub fn set_active_player(&mut self, index: usize) {
        if self.players.is_empty() {
            self.active_index = 0;
            return;
        }
        self.active_index = index.min(self.players.len() - 1);
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.is_active = idx == self.active_index;
        }
    }

    /// Re-clamp every entity after a viewport change.
    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        for player in &mut self.players {
            player.pos = steer::clamp_to_bounds(player.pos, player.radius, bounds);
        }
        for enemy in &mut self.enemies {
            enemy.pos = steer::clamp_to_bounds(enemy.pos, enemy.radius, bounds);
        }
        for powerup in &mut self.powerups {
            powerup.pos = steer::clamp_to_bounds(powerup.pos, powerup.radius, bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_presets() {
        assert_eq!(Difficulty::easy().start_balls, 1);
        assert_eq!(Difficulty::medium().start_balls, 4);
        let hard = Difficulty::hard();
        assert_eq!(hard.start_balls, 5);
        assert_eq!(hard.player_speed_delta, 0.2);
        assert_eq!(hard.enemy_speed_delta, 1.5);
        assert_eq!(Difficulty::from_id("nonsense").label, "Easy");
    }

    #[test]
    fn test_effect_windows_lapse_without_deactivation() {
        let mut session = GameSession::new(1, Vec2::new(800.0, 600.0));
        session.speed_boost_until = 5000.0;
        session.invincible_until = 4000.0;
        assert!(session.speed_boost_active(4999.0));
        assert!(!session.speed_boost_active(5000.0));
        assert!(session.invincible_active(3999.0));
        assert!(!session.invincible_active(4000.0));
    }

    #[test]
    fn test_speed_ramp_caps() {
        let mut session = GameSession::new(1, Vec2::new(800.0, 600.0));
        session.rounds_survived = 3;
        assert_eq!(session.speed_ramp_rounds(), 3);
        session.rounds_survived = 40;
        assert_eq!(session.speed_ramp_rounds(), SPEED_RAMP_MAX_ROUND - 1);
    }

    #[test]
    fn test_set_bounds_reclamps_entities() {
        let mut session = GameSession::new(1, Vec2::new(1440.0, 960.0));
        let now = 0.0;
        let player = {
            let mut p = PlayerBall::new(&mut session.rng, now);
            p.pos = Vec2::new(1300.0, 900.0);
            p
        };
        session.players.push(player);
        session.set_bounds(Vec2::new(640.0, 480.0));
        let p = &session.players[0];
        assert!(p.pos.x <= 640.0 - 16.0 - PLAY_AREA_PADDING);
        assert!(p.pos.y <= 480.0 - 16.0 - PLAY_AREA_PADDING);
    }
}
