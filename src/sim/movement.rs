//! Per-frame movement: player steering and enemy pursuit
//!
//! Players steer by blending a desired direction (manual input or autopilot
//! wander) with an avoidance vector away from the nearest enemy, then smooth
//! velocity toward the target for the slippery feel. Enemies chase the
//! nearest player, or flee it while invincibility is up.

use glam::Vec2;

use super::state::{GamePhase, GameSession};
use super::steer;
use crate::consts::*;

/// Effective speed of one player this frame.
pub fn player_speed(session: &GameSession, is_active: bool, index: usize, now_ms: f64) -> f32 {
    let boosted =
        session.speed_boost_active(now_ms) && session.speed_boost_holder == Some(index);
    let boost = if boosted { SPEED_BOOST_AMOUNT } else { 0.0 };
    let ramp = if is_active {
        session.speed_ramp_rounds() as f32 * PLAYER_SPEED_PER_ROUND
    } else {
        // Autopilot balls never gain the per-round ramp
        0.0
    };
    PLAYER_SPEED_START + session.difficulty.player_speed_delta + ramp + boost
}

/// Pursuit speed of the enemy at the given spawn index, capped so it can
/// never outrun the unboosted player.
pub fn enemy_speed(session: &GameSession, spawn_index: usize) -> f32 {
    let tier = ENEMY_SPEED_START
        + session.difficulty.enemy_speed_delta
        + spawn_index as f32 * ENEMY_SPEED_INCREMENT;
    tier.min(session.unboosted_player_speed())
}

/// Advance every player ball one frame.
///
/// `move_dir` is the resolved manual input (unit or zero) for the active
/// player; autopilot balls ignore it.
pub fn update_players(session: &mut GameSession, move_dir: Vec2, now_ms: f64) {
    let bounds = session.bounds;
    let active_index = session.active_index;

    for idx in 0..session.players.len() {
        let is_active = idx == active_index;
        let speed = player_speed(session, is_active, idx, now_ms);

        let (players, enemies, rng) = (
            &mut session.players,
            &session.enemies,
            &mut session.rng,
        );
        let avoid = steer::avoidance(players[idx].pos, enemies, |e| e.pos);
        let player = &mut players[idx];

        let mut desired = Vec2::ZERO;
        if is_active {
            if move_dir != Vec2::ZERO {
                desired = move_dir + avoid * ACTIVE_AVOID_WEIGHT;
            }
        } else {
            if now_ms > player.auto_dir_expires_at {
                player.retarget_autopilot(rng, now_ms);
            }
            desired = player.auto_dir + avoid * AUTOPILOT_AVOID_WEIGHT;
        }

        let mag = desired.length();
        if mag == 0.0 {
            if !is_active {
                desired = steer::random_unit(rng);
            }
        } else {
            desired /= mag;
        }
        player.input_dir = desired;

        player.vel += (desired * speed - player.vel) * PLAYER_SMOOTHING;
        player.pos = steer::clamp_to_bounds(player.pos + player.vel, player.radius, bounds);
    }
}

/// Advance every enemy one frame, eliminating players on contact.
///
/// A single enemy may take out several players in one frame; the roster
/// shrinking to zero flips the session to game over mid-pass.
pub fn move_enemies(session: &mut GameSession, now_ms: f64) {
    let bounds = session.bounds;
    let invincible = session.invincible_active(now_ms);

    for ei in 0..session.enemies.len() {
        if session.players.is_empty() {
            break;
        }

        let epos = session.enemies[ei].pos;
        let eradius = session.enemies[ei].radius;
        let spawn_index = session.enemies[ei].spawn_index;

        let Some((target_idx, _)) = steer::nearest_index(epos, &session.players, |p| p.pos)
        else {
            break;
        };
        let delta = session.players[target_idx].pos - epos;
        let dist = if delta.length() > 0.0 { delta.length() } else { 1.0 };
        let chase = if invincible { -delta } else { delta };

        let speed = enemy_speed(session, spawn_index);
        let new_pos = steer::clamp_to_bounds(epos + chase / dist * speed, eradius, bounds);
        session.enemies[ei].pos = new_pos;

        if invincible {
            continue;
        }
        let mut pi = session.players.len();
        while pi > 0 {
            pi -= 1;
            let hit = super::collision::circles_overlap(
                new_pos,
                eradius,
                session.players[pi].pos,
                session.players[pi].radius,
            );
            if hit {
                session.eliminate_player(pi);
            }
        }
        if session.phase == GamePhase::GameOver {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, EnemyBall, PlayerBall};

    fn playing_session(difficulty: Difficulty) -> GameSession {
        let mut session = GameSession::new(9, Vec2::new(1440.0, 960.0));
        session.difficulty = difficulty;
        session.phase = GamePhase::Playing;
        let player = PlayerBall::new(&mut session.rng, 0.0);
        session.players.push(player);
        session.set_active_player(0);
        session
    }

    #[test]
    fn test_enemy_speed_never_exceeds_unboosted_player() {
        let mut session = playing_session(Difficulty::hard());
        for rounds in [0, 3, 10, 40] {
            session.rounds_survived = rounds;
            let cap = session.unboosted_player_speed();
            for spawn_index in 0..64 {
                assert!(enemy_speed(&session, spawn_index) <= cap);
            }
        }
    }

    #[test]
    fn test_hard_preset_speed_deltas() {
        let session = playing_session(Difficulty::hard());
        assert_eq!(
            player_speed(&session, true, 0, 0.0),
            PLAYER_SPEED_START + 0.2
        );
        assert_eq!(
            enemy_speed(&session, 0),
            ENEMY_SPEED_START + 1.5
        );
    }

    #[test]
    fn test_speed_boost_applies_until_deadline() {
        let mut session = playing_session(Difficulty::easy());
        session.speed_boost_until = 2000.0;
        session.speed_boost_holder = Some(0);
        assert_eq!(
            player_speed(&session, true, 0, 1000.0),
            PLAYER_SPEED_START + SPEED_BOOST_AMOUNT
        );
        // Deadline passed: reverts with no deactivation call
        assert_eq!(player_speed(&session, true, 0, 2000.0), PLAYER_SPEED_START);
    }

    #[test]
    fn test_boost_only_applies_to_holder() {
        let mut session = playing_session(Difficulty::easy());
        let extra = PlayerBall::new(&mut session.rng, 0.0);
        session.players.push(extra);
        session.speed_boost_until = 2000.0;
        session.speed_boost_holder = Some(1);
        assert_eq!(player_speed(&session, true, 0, 0.0), PLAYER_SPEED_START);
        assert_eq!(
            player_speed(&session, false, 1, 0.0),
            PLAYER_SPEED_START + SPEED_BOOST_AMOUNT
        );
    }

    #[test]
    fn test_velocity_smoothing_is_gradual() {
        let mut session = playing_session(Difficulty::easy());
        session.players[0].pos = Vec2::new(700.0, 480.0);
        update_players(&mut session, Vec2::new(1.0, 0.0), 0.0);
        let vel = session.players[0].vel;
        // One smoothing step toward speed 7: exactly speed * factor
        assert!((vel.x - PLAYER_SPEED_START * PLAYER_SMOOTHING).abs() < 1e-4);
        assert!(vel.x < PLAYER_SPEED_START);
    }

    #[test]
    fn test_enemy_chases_nearest_player() {
        let mut session = playing_session(Difficulty::easy());
        session.players[0].pos = Vec2::new(200.0, 200.0);
        session.enemies.push(EnemyBall {
            pos: Vec2::new(600.0, 200.0),
            radius: BALL_RADIUS,
            spawn_index: 0,
        });
        move_enemies(&mut session, 0.0);
        assert!(session.enemies[0].pos.x < 600.0);
        assert_eq!(session.enemies[0].pos.y, 200.0);
    }

    #[test]
    fn test_enemy_flees_invincible_player() {
        let mut session = playing_session(Difficulty::easy());
        session.players[0].pos = Vec2::new(200.0, 200.0);
        session.invincible_until = 10_000.0;
        session.enemies.push(EnemyBall {
            pos: Vec2::new(600.0, 200.0),
            radius: BALL_RADIUS,
            spawn_index: 0,
        });
        move_enemies(&mut session, 0.0);
        assert!(session.enemies[0].pos.x > 600.0);
    }

    #[test]
    fn test_enemy_contact_eliminates_player() {
        let mut session = playing_session(Difficulty::easy());
        let extra = PlayerBall::new(&mut session.rng, 0.0);
        session.players.push(extra);
        session.set_active_player(0);
        session.players[0].pos = Vec2::new(200.0, 200.0);
        session.players[1].pos = Vec2::new(600.0, 600.0);
        session.enemies.push(EnemyBall {
            pos: Vec2::new(201.0, 200.0),
            radius: BALL_RADIUS,
            spawn_index: 0,
        });
        move_enemies(&mut session, 0.0);
        assert_eq!(session.players.len(), 1);
        assert_eq!(session.players[0].pos, Vec2::new(600.0, 600.0));
        assert!(session.players[0].is_active);
    }

    #[test]
    fn test_no_elimination_while_invincible() {
        let mut session = playing_session(Difficulty::easy());
        session.players[0].pos = Vec2::new(200.0, 200.0);
        session.invincible_until = f64::MAX;
        session.enemies.push(EnemyBall {
            pos: Vec2::new(200.0, 200.0),
            radius: BALL_RADIUS,
            spawn_index: 0,
        });
        move_enemies(&mut session, 0.0);
        assert_eq!(session.players.len(), 1);
    }
}
