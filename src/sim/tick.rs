//! Per-frame driver
//!
//! One call per display frame. Movement, pickups, and enemy AI run only
//! while the session is playing; the wall-clock tasks (countdown ticks,
//! round timer, powerup spawn) are polled here so a task due after its
//! round ended is dropped by the phase guard instead of firing stale.

use glam::Vec2;

use super::state::{GamePhase, GameSession};
use super::{collision, movement};

/// Input for a single frame; one-shot flags are cleared by the shell
/// after the frame consumes them.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Resolved movement direction for the active ball (unit or zero)
    pub move_dir: Vec2,
    /// Spawn an extra autopilot ball
    pub spawn_player: bool,
    /// Toggle pause
    pub pause: bool,
}

/// Advance the session by one frame at wall-clock time `now_ms`.
pub fn frame(session: &mut GameSession, input: &FrameInput, now_ms: f64) {
    if input.pause {
        session.toggle_pause(now_ms);
    }

    match session.phase {
        GamePhase::Countdown => session.advance_countdown(now_ms),
        GamePhase::Playing => {
            if input.spawn_player {
                session.spawn_player(now_ms);
            }
            movement::update_players(session, input.move_dir, now_ms);
            collision::check_powerup_pickups(session, now_ms);
            movement::move_enemies(session, now_ms);
            session.expire_status(now_ms);
            session.advance_round_timer(now_ms);
            session.poll_powerup_task(now_ms);
        }
        _ => {}
    }

    for powerup in &mut session.powerups {
        powerup.pulse_phase += 0.1;
    }
}
