//! Round progression: countdown, respawn, elimination, pause, game over
//!
//! All delayed work (countdown ticks, the one-second round timer, the
//! powerup spawn) is stored as due-at deadlines on the session and polled
//! from the frame driver, so cancelling a task is a plain assignment and
//! a stale callback can never touch a finished round.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    Countdown, CountdownDisplay, Difficulty, EnemyBall, GameEvent, GamePhase, GameSession,
    GameSummary, MusicCommand, PlayerBall, Powerup, PowerupKind, RoundTimer, SpawnTask,
    StatusText,
};
use super::steer;
use crate::consts::*;

fn rand_between(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    if max <= min {
        min
    } else {
        rng.random_range(min..max)
    }
}

impl GameSession {
    /// Begin a new game at the given difficulty: reset the roster to one
    /// ball and run the 3-2-1-GO countdown into round one.
    pub fn start_game(&mut self, difficulty: Difficulty, now_ms: f64) {
        log::info!("starting game on {}", difficulty.label);
        self.ball_count = difficulty.start_balls;
        self.difficulty = difficulty;
        self.rounds_survived = 0;
        self.summary = None;
        self.status = StatusText::Playing;
        self.enemies.clear();
        self.powerups.clear();
        self.powerup_task = SpawnTask::Idle;
        self.speed_boost_until = 0.0;
        self.speed_boost_holder = None;
        self.invincible_until = 0.0;
        self.reset_players_to_one(now_ms);
        self.start_countdown(now_ms);
    }

    /// Restart with the difficulty of the last game.
    pub fn restart(&mut self, now_ms: f64) {
        let difficulty = self.difficulty.clone();
        self.start_game(difficulty, now_ms);
    }

    /// Back to the menu; everything in flight is cancelled.
    pub fn show_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.countdown = None;
        self.powerup_task = SpawnTask::Idle;
        self.players.clear();
        self.enemies.clear();
        self.powerups.clear();
        self.push_event(GameEvent::Music(MusicCommand::Stop));
    }

    fn reset_players_to_one(&mut self, now_ms: f64) {
        self.players.clear();
        let player = PlayerBall::new(&mut self.rng, now_ms);
        self.players.push(player);
        self.set_active_player(0);
        self.speed_boost_holder = None;
    }

    /// Kick off the countdown overlay: one beep per second, then GO.
    pub fn start_countdown(&mut self, now_ms: f64) {
        self.phase = GamePhase::Countdown;
        self.countdown = Some(Countdown {
            display: CountdownDisplay::Number(3),
            next_at: now_ms + 1000.0,
        });
        self.push_event(GameEvent::Beep {
            freq: COUNTDOWN_BEEP_HZ,
            duration_ms: COUNTDOWN_BEEP_MS,
        });
    }

    /// Poll the countdown's due ticks; transitions into the round after GO.
    pub fn advance_countdown(&mut self, now_ms: f64) {
        loop {
            let Some(countdown) = self.countdown else { return };
            if now_ms < countdown.next_at {
                return;
            }
            match countdown.display {
                CountdownDisplay::Number(n) if n > 1 => {
                    self.countdown = Some(Countdown {
                        display: CountdownDisplay::Number(n - 1),
                        next_at: countdown.next_at + 1000.0,
                    });
                    self.push_event(GameEvent::Beep {
                        freq: COUNTDOWN_BEEP_HZ,
                        duration_ms: COUNTDOWN_BEEP_MS,
                    });
                }
                CountdownDisplay::Number(_) => {
                    self.countdown = Some(Countdown {
                        display: CountdownDisplay::Go,
                        next_at: countdown.next_at + COUNTDOWN_GO_HOLD_MS,
                    });
                    self.push_event(GameEvent::Beep {
                        freq: COUNTDOWN_GO_HZ,
                        duration_ms: COUNTDOWN_GO_MS,
                    });
                }
                CountdownDisplay::Go => {
                    self.countdown = None;
                    self.start_round(now_ms);
                    return;
                }
            }
        }
    }

    /// Reset positions and spawn the round's entities; rounds after the
    /// first re-enter here directly, without another countdown.
    pub fn start_round(&mut self, now_ms: f64) {
        if self.players.is_empty() {
            let player = PlayerBall::new(&mut self.rng, now_ms);
            self.players.push(player);
        }
        self.phase = GamePhase::Playing;
        self.status = StatusText::Playing;
        self.speed_boost_until = 0.0;
        self.speed_boost_holder = None;
        self.invincible_until = 0.0;
        self.powerups.clear();
        self.powerup_task = SpawnTask::Idle;

        self.position_players_at_center(now_ms);
        self.spawn_enemies(self.ball_count);
        self.schedule_powerup(now_ms);
        self.set_active_player(self.active_index);

        self.round_timer = RoundTimer {
            remaining: ROUND_TIME_SECONDS,
            next_tick_at: now_ms + 1000.0,
        };
        self.push_event(GameEvent::Music(MusicCommand::Start));
    }

    /// Survived a full round: harder swarm, fresh field.
    pub fn next_round(&mut self, now_ms: f64) {
        self.rounds_survived += 1;
        self.ball_count += 1;
        log::info!(
            "round survived: {} rounds, {} enemies next",
            self.rounds_survived,
            self.ball_count
        );
        self.start_round(now_ms);
    }

    /// Poll the one-second round timer while playing.
    pub fn advance_round_timer(&mut self, now_ms: f64) {
        while self.phase == GamePhase::Playing && now_ms >= self.round_timer.next_tick_at {
            self.round_timer.next_tick_at += 1000.0;
            self.round_timer.remaining = self.round_timer.remaining.saturating_sub(1);
            if self.round_timer.remaining == 0 {
                self.next_round(now_ms);
            }
        }
    }

    /// Stack the roster around the playfield center, offset by index
    /// relative to the active ball.
    fn position_players_at_center(&mut self, now_ms: f64) {
        let center = self.bounds / 2.0;
        let active = self.active_index as f32;
        let bounds = self.bounds;
        let (players, rng) = (&mut self.players, &mut self.rng);
        for (idx, player) in players.iter_mut().enumerate() {
            let offset = (idx as f32 - active) * PLAYER_STACK_OFFSET;
            let pos = center + Vec2::splat(offset - player.radius);
            player.pos = steer::clamp_to_bounds(pos, player.radius, bounds);
            player.vel = Vec2::ZERO;
            player.retarget_autopilot(rng, now_ms);
        }
    }

    /// Batch-spawn the round's enemies: the first four in the corners,
    /// the rest along the sides, so nothing lands on the centered roster.
    fn spawn_enemies(&mut self, count: usize) {
        self.enemies.clear();
        let min_x = PLAY_AREA_PADDING;
        let max_x = self.bounds.x - PLAY_AREA_PADDING - BALL_RADIUS * 2.0;
        let min_y = PLAY_AREA_PADDING;
        let max_y = self.bounds.y - PLAY_AREA_PADDING - BALL_RADIUS * 2.0;
        let inset = ENEMY_SPAWN_INSET;

        for i in 0..count {
            let rng = &mut self.rng;
            let pos = if i < 4 {
                match i % 4 {
                    0 => Vec2::new(
                        rand_between(rng, min_x, (min_x + inset).min(max_x)),
                        rand_between(rng, min_y, (min_y + inset).min(max_y)),
                    ),
                    1 => Vec2::new(
                        rand_between(rng, (max_x - inset).max(min_x), max_x),
                        rand_between(rng, min_y, (min_y + inset).min(max_y)),
                    ),
                    2 => Vec2::new(
                        rand_between(rng, (max_x - inset).max(min_x), max_x),
                        rand_between(rng, (max_y - inset).max(min_y), max_y),
                    ),
                    _ => Vec2::new(
                        rand_between(rng, min_x, (min_x + inset).min(max_x)),
                        rand_between(rng, (max_y - inset).max(min_y), max_y),
                    ),
                }
            } else {
                match (i - 4) % 4 {
                    0 => Vec2::new(
                        rand_between(rng, min_x + inset, max_x - inset),
                        rand_between(rng, min_y, (min_y + inset).min(max_y)),
                    ),
                    1 => Vec2::new(
                        rand_between(rng, (max_x - inset).max(min_x), max_x),
                        rand_between(rng, min_y + inset, max_y - inset),
                    ),
                    2 => Vec2::new(
                        rand_between(rng, min_x + inset, max_x - inset),
                        rand_between(rng, (max_y - inset).max(min_y), max_y),
                    ),
                    _ => Vec2::new(
                        rand_between(rng, min_x, (min_x + inset).min(max_x)),
                        rand_between(rng, min_y + inset, max_y - inset),
                    ),
                }
            };
            self.enemies.push(EnemyBall {
                pos,
                radius: BALL_RADIUS,
                spawn_index: i,
            });
        }
    }

    /// Arm the round's powerup spawn after a random delay (round 2 onward).
    fn schedule_powerup(&mut self, now_ms: f64) {
        self.powerups.clear();
        let current_round = self.rounds_survived + 1;
        if current_round < POWERUP_SPAWN_ROUND {
            self.powerup_task = SpawnTask::Idle;
            return;
        }
        let span = POWERUP_SPAWN_DELAY_MAX_MS - POWERUP_SPAWN_DELAY_MIN_MS;
        let delay = POWERUP_SPAWN_DELAY_MIN_MS + self.rng.random::<f64>() * span;
        self.powerup_task = SpawnTask::Armed {
            due_at: now_ms + delay,
        };
    }

    /// Fire the spawn task once its deadline passes.
    pub fn poll_powerup_task(&mut self, now_ms: f64) {
        if let SpawnTask::Armed { due_at } = self.powerup_task {
            if now_ms >= due_at {
                self.powerup_task = SpawnTask::Idle;
                self.spawn_powerup();
            }
        }
    }

    /// Place a single powerup of random kind; replaces any live one.
    fn spawn_powerup(&mut self) {
        self.powerups.clear();
        let kind = if self.rng.random::<f32>() < 0.5 {
            PowerupKind::SpeedBoost
        } else {
            PowerupKind::Invincibility
        };
        let pos = steer::random_spawn_position(&mut self.rng, self.bounds, POWERUP_RADIUS * 2.0);
        self.powerups.push(Powerup {
            pos,
            radius: POWERUP_RADIUS,
            kind,
            pulse_phase: 0.0,
        });
    }

    /// Add an autopilot ball next to the active one, up to the roster cap.
    pub fn spawn_player(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Playing || self.players.len() >= MAX_PLAYERS {
            return;
        }
        let reference = self
            .players
            .get(self.active_index)
            .or_else(|| self.players.first())
            .map(|p| p.pos);
        let mut player = PlayerBall::new(&mut self.rng, now_ms);
        player.pos = match reference {
            Some(pos) => steer::clamp_to_bounds(
                pos + Vec2::splat(PLAYER_SPAWN_OFFSET),
                player.radius,
                self.bounds,
            ),
            None => self.bounds / 2.0 - Vec2::splat(player.radius),
        };
        self.players.push(player);
        self.set_active_player(self.active_index);
    }

    /// Remove a player from the roster; out-of-range indices are a no-op.
    ///
    /// Reassigns active status, fixes up the boost holder index, and flips
    /// to game over when the roster empties.
    pub fn eliminate_player(&mut self, index: usize) {
        if index >= self.players.len() {
            return;
        }
        let was_active = index == self.active_index;
        self.players.remove(index);

        match self.speed_boost_holder {
            Some(holder) if holder == index => {
                self.speed_boost_holder = None;
                self.speed_boost_until = 0.0;
            }
            Some(holder) if holder > index => {
                self.speed_boost_holder = Some(holder - 1);
            }
            _ => {}
        }

        if self.players.is_empty() {
            self.handle_loss();
            return;
        }

        if was_active {
            self.set_active_player(index.min(self.players.len() - 1));
        } else if index < self.active_index {
            self.active_index -= 1;
        }
        self.status = StatusText::NextBall;
    }

    /// The roster is gone: freeze everything and surface the summary.
    /// Safe to call repeatedly.
    pub fn handle_loss(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.countdown = None;
        self.powerup_task = SpawnTask::Idle;
        self.summary = Some(GameSummary {
            rounds_survived: self.rounds_survived,
            difficulty_label: self.difficulty.label.clone(),
        });
        self.push_event(GameEvent::Music(MusicCommand::Stop));
        log::info!(
            "game over after {} rounds on {}",
            self.rounds_survived,
            self.difficulty.label
        );
    }

    /// Freeze mid-round. Re-pausing is a no-op.
    pub fn pause(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Paused;
        if let SpawnTask::Armed { due_at } = self.powerup_task {
            self.powerup_task = SpawnTask::Suspended {
                remaining: (due_at - now_ms).max(0.0),
            };
        }
        self.push_event(GameEvent::Music(MusicCommand::Pause));
    }

    /// Resume from pause; the round timer keeps its remaining seconds.
    pub fn resume(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Paused {
            return;
        }
        self.phase = GamePhase::Playing;
        self.round_timer.next_tick_at = now_ms + 1000.0;
        if let SpawnTask::Suspended { remaining } = self.powerup_task {
            self.powerup_task = SpawnTask::Armed {
                due_at: now_ms + remaining,
            };
        }
        self.push_event(GameEvent::Music(MusicCommand::Start));
    }

    /// Escape / right-click handler.
    pub fn toggle_pause(&mut self, now_ms: f64) {
        match self.phase {
            GamePhase::Playing => self.pause(now_ms),
            GamePhase::Paused => self.resume(now_ms),
            _ => {}
        }
    }

    /// Clear a transient powerup status line once both windows have lapsed.
    pub fn expire_status(&mut self, now_ms: f64) {
        let transient = matches!(self.status, StatusText::SpeedBoost | StatusText::Invincible);
        if transient && !self.speed_boost_active(now_ms) && !self.invincible_active(now_ms) {
            self.status = StatusText::Playing;
        }
    }
}
