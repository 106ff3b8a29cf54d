//! Canvas 2D renderer
//!
//! Pure read-only view of the session: glows, gradients, and the powerup
//! pulse. Nothing here mutates simulation state.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use crate::sim::{GameSession, PlayerBall, Powerup, PowerupKind};

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Draw one frame: powerups under players under enemies.
    pub fn draw(&self, session: &GameSession, now_ms: f64) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            session.bounds.x as f64,
            session.bounds.y as f64,
        );

        for powerup in &session.powerups {
            self.draw_powerup(powerup);
        }
        for (idx, player) in session.players.iter().enumerate() {
            self.draw_player(session, player, idx, now_ms);
        }
        for enemy in &session.enemies {
            let center = enemy.center();
            self.draw_enemy_ball(center.x as f64, center.y as f64, enemy.radius as f64);
        }
    }

    fn draw_player(&self, session: &GameSession, player: &PlayerBall, idx: usize, now_ms: f64) {
        let ctx = &self.ctx;
        let center = player.center();
        let (cx, cy) = (center.x as f64, center.y as f64);
        let r = player.radius as f64;

        let invincible = session.invincible_active(now_ms);
        let boosted =
            session.speed_boost_active(now_ms) && session.speed_boost_holder == Some(idx);

        // Glow: active balls pulse, powered balls flare
        let (glow_color, glow_size) = if invincible {
            ("#ffd700", 30.0)
        } else if boosted {
            ("#1e90ff", 30.0)
        } else if player.is_active {
            let pulse = (now_ms / 200.0).sin() * 5.0 + 25.0;
            ("rgba(255, 80, 80, 0.8)", pulse)
        } else {
            ("rgba(255, 162, 162, 0.2)", 5.0)
        };

        ctx.save();
        ctx.set_shadow_blur(glow_size);
        ctx.set_shadow_color(glow_color);

        let (inner, outer) = if invincible {
            ("#fff", "#ffd700".to_string())
        } else if boosted {
            ("#fff", "#1e90ff".to_string())
        } else if player.is_active {
            ("#ff9999", "#ff0000".to_string())
        } else {
            ("#ff9999", "rgba(255, 162, 162, 0.4)".to_string())
        };
        if let Ok(grad) = ctx.create_radial_gradient(cx - 3.0, cy - 3.0, 2.0, cx, cy, r) {
            grad.add_color_stop(0.0, inner).ok();
            grad.add_color_stop(1.0, &outer).ok();
            ctx.set_fill_style_canvas_gradient(&grad);
        }
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, r, 0.0, TAU);
        ctx.fill();

        if player.is_active {
            ctx.set_stroke_style_str("#fff");
            ctx.set_line_width(2.0);
            ctx.stroke();

            // Halo ring around the active ball
            ctx.begin_path();
            let _ = ctx.arc(cx, cy, r + 4.0, 0.0, TAU);
            ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
            ctx.set_line_width(1.0);
            ctx.stroke();
        } else {
            ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
            ctx.set_line_width(1.0);
            let dashes = js_sys::Array::of2(&2.0.into(), &2.0.into());
            let _ = ctx.set_line_dash(&dashes);
            ctx.stroke();
            let _ = ctx.set_line_dash(&js_sys::Array::new());
        }

        ctx.restore();
    }

    fn draw_enemy_ball(&self, cx: f64, cy: f64, r: f64) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_shadow_blur(15.0);
        ctx.set_shadow_color("rgba(0, 240, 255, 0.45)");

        if let Ok(grad) = ctx.create_radial_gradient(cx - 3.0, cy - 3.0, 2.0, cx, cy, r) {
            grad.add_color_stop(0.0, "#2a3b55").ok();
            grad.add_color_stop(1.0, "#0b101c").ok();
            ctx.set_fill_style_canvas_gradient(&grad);
        }
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, r, 0.0, TAU);
        ctx.fill();
        ctx.restore();
    }

    fn draw_powerup(&self, powerup: &Powerup) {
        let ctx = &self.ctx;
        let center = powerup.center();
        let scale = 1.0 + (powerup.pulse_phase as f64).sin() * 0.1;
        let (color, icon) = match powerup.kind {
            PowerupKind::SpeedBoost => ("#1e90ff", "\u{26a1}"),
            PowerupKind::Invincibility => ("#ffd700", "\u{1f6e1}\u{fe0f}"),
        };

        ctx.save();
        let _ = ctx.translate(center.x as f64, center.y as f64);
        let _ = ctx.scale(scale, scale);

        ctx.set_shadow_blur(15.0);
        ctx.set_shadow_color(color);
        ctx.set_fill_style_str("rgba(0, 0, 0, 0.4)");
        ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
        ctx.set_line_width(2.0);

        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, powerup.radius as f64, 0.0, TAU);
        ctx.fill();
        ctx.stroke();

        ctx.set_fill_style_str(color);
        ctx.set_font("20px Arial");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(icon, 0.0, 2.0).ok();

        ctx.restore();
    }
}
