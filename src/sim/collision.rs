//! Circle-circle collision and powerup pickup
//!
//! Entities are top-left anchored, so overlap tests derive centers first.

use glam::Vec2;

use super::state::{GameSession, PowerupKind, StatusText};
use crate::consts::POWERUP_DURATION_MS;

/// True iff two top-left-anchored circles overlap.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let center_a = pos_a + Vec2::splat(radius_a);
    let center_b = pos_b + Vec2::splat(radius_b);
    center_a.distance(center_b) < radius_a + radius_b
}

/// Test every player against the live powerup and apply the first pickup.
///
/// The powerup is consumed on contact; a new effect window of the same kind
/// overrides any unexpired one.
pub fn check_powerup_pickups(session: &mut GameSession, now_ms: f64) {
    let mut picked: Option<(usize, PowerupKind)> = None;
    'scan: for (idx, player) in session.players.iter().enumerate() {
        for powerup in &session.powerups {
            if circles_overlap(player.pos, player.radius, powerup.pos, powerup.radius) {
                picked = Some((idx, powerup.kind));
                break 'scan;
            }
        }
    }

    let Some((holder, kind)) = picked else { return };
    session.powerups.clear();
    match kind {
        PowerupKind::SpeedBoost => {
            session.speed_boost_until = now_ms + POWERUP_DURATION_MS;
            session.speed_boost_holder = Some(holder);
            session.status = StatusText::SpeedBoost;
        }
        PowerupKind::Invincibility => {
            session.invincible_until = now_ms + POWERUP_DURATION_MS;
            session.status = StatusText::Invincible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BALL_RADIUS, POWERUP_RADIUS};
    use crate::sim::state::{PlayerBall, Powerup};

    fn session_with_player_at(pos: Vec2) -> GameSession {
        let mut session = GameSession::new(42, Vec2::new(800.0, 600.0));
        let mut player = PlayerBall::new(&mut session.rng, 0.0);
        player.pos = pos;
        session.players.push(player);
        session.set_active_player(0);
        session
    }

    #[test]
    fn test_overlap_uses_center_distance() {
        // Two radius-8 balls, top-left anchored: centers 16 apart -> touching,
        // not overlapping
        assert!(!circles_overlap(
            Vec2::ZERO,
            BALL_RADIUS,
            Vec2::new(16.0, 0.0),
            BALL_RADIUS
        ));
        assert!(circles_overlap(
            Vec2::ZERO,
            BALL_RADIUS,
            Vec2::new(15.0, 0.0),
            BALL_RADIUS
        ));
    }

    #[test]
    fn test_overlap_mixed_radii() {
        // Centers level on y, horizontal gap just under the radius sum
        let gap = BALL_RADIUS + POWERUP_RADIUS - 1.0;
        let powerup_pos = Vec2::new(
            gap + BALL_RADIUS - POWERUP_RADIUS,
            BALL_RADIUS - POWERUP_RADIUS,
        );
        assert!(circles_overlap(
            Vec2::ZERO,
            BALL_RADIUS,
            powerup_pos,
            POWERUP_RADIUS
        ));
        // One pixel past the sum: apart
        let apart = Vec2::new(
            gap + 2.0 + BALL_RADIUS - POWERUP_RADIUS,
            BALL_RADIUS - POWERUP_RADIUS,
        );
        assert!(!circles_overlap(
            Vec2::ZERO,
            BALL_RADIUS,
            apart,
            POWERUP_RADIUS
        ));
    }

    #[test]
    fn test_speed_pickup_records_holder_and_deadline() {
        let mut session = session_with_player_at(Vec2::new(100.0, 100.0));
        session.powerups.push(Powerup {
            pos: Vec2::new(100.0, 100.0),
            radius: POWERUP_RADIUS,
            kind: PowerupKind::SpeedBoost,
            pulse_phase: 0.0,
        });

        check_powerup_pickups(&mut session, 10_000.0);

        assert!(session.powerups.is_empty());
        assert_eq!(session.speed_boost_holder, Some(0));
        assert_eq!(session.speed_boost_until, 10_000.0 + POWERUP_DURATION_MS);
        assert_eq!(session.status, StatusText::SpeedBoost);
    }

    #[test]
    fn test_invincibility_pickup_sets_deadline_only() {
        let mut session = session_with_player_at(Vec2::new(100.0, 100.0));
        session.powerups.push(Powerup {
            pos: Vec2::new(100.0, 100.0),
            radius: POWERUP_RADIUS,
            kind: PowerupKind::Invincibility,
            pulse_phase: 0.0,
        });

        check_powerup_pickups(&mut session, 500.0);

        assert!(session.powerups.is_empty());
        assert_eq!(session.speed_boost_holder, None);
        assert_eq!(session.invincible_until, 500.0 + POWERUP_DURATION_MS);
        assert_eq!(session.status, StatusText::Invincible);
    }

    #[test]
    fn test_no_pickup_when_apart() {
        let mut session = session_with_player_at(Vec2::new(100.0, 100.0));
        session.powerups.push(Powerup {
            pos: Vec2::new(500.0, 500.0),
            radius: POWERUP_RADIUS,
            kind: PowerupKind::SpeedBoost,
            pulse_phase: 0.0,
        });

        check_powerup_pickups(&mut session, 0.0);

        assert_eq!(session.powerups.len(), 1);
        assert_eq!(session.speed_boost_holder, None);
    }
}
