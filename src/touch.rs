//! Virtual joystick for touch devices
//!
//! The stick anchors wherever the first qualifying touch lands; the knob
//! follows the finger up to a clamp radius and the normalized offset
//! becomes the movement vector. Only one touch is tracked at a time.

use glam::Vec2;

use crate::input::ControlSource;

/// Stick geometry (CSS pixels)
pub const OUTER_RADIUS: f64 = 60.0;
pub const INNER_RADIUS: f64 = 25.0;
pub const MAX_DISTANCE: f32 = 50.0;
pub const DEAD_ZONE: f32 = 5.0;

#[derive(Debug, Default, Clone)]
pub struct TouchJoystick {
    active: bool,
    center: Vec2,
    knob: Vec2,
    input: Vec2,
    touch_id: Option<i32>,
}

impl TouchJoystick {
    /// Anchor the stick at a new touch. Ignored while another touch is
    /// already tracked.
    pub fn begin(&mut self, id: i32, at: Vec2) {
        if self.touch_id.is_some() {
            return;
        }
        self.touch_id = Some(id);
        self.center = at;
        self.knob = at;
        self.active = true;
        self.apply(at);
    }

    /// Follow the tracked touch; other touch ids are ignored.
    pub fn update(&mut self, id: i32, at: Vec2) {
        if self.touch_id == Some(id) {
            self.apply(at);
        }
    }

    /// Release the tracked touch.
    pub fn end(&mut self, id: i32) {
        if self.touch_id == Some(id) {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.input = Vec2::ZERO;
        self.touch_id = None;
    }

    fn apply(&mut self, at: Vec2) {
        let offset = at - self.center;
        let distance = offset.length();
        if distance < DEAD_ZONE {
            self.input = Vec2::ZERO;
            self.knob = self.center;
            return;
        }
        let clamped = distance.min(MAX_DISTANCE);
        let dir = offset / distance;
        self.knob = self.center + dir * clamped;
        self.input = dir * (clamped / MAX_DISTANCE);
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn knob(&self) -> Vec2 {
        self.knob
    }
}

impl ControlSource for TouchJoystick {
    fn direction(&self) -> Vec2 {
        self.input
    }

    fn engaged(&self) -> bool {
        self.active
    }
}

/// Draw the stick overlay while a touch is down.
#[cfg(target_arch = "wasm32")]
pub fn render(stick: &TouchJoystick, ctx: &web_sys::CanvasRenderingContext2d) {
    use std::f64::consts::TAU;

    if !stick.engaged() {
        return;
    }
    ctx.save();
    ctx.set_global_alpha(0.6);

    ctx.set_fill_style_str("rgba(255, 255, 255, 0.2)");
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let center = stick.center();
    let _ = ctx.arc(center.x as f64, center.y as f64, OUTER_RADIUS, 0.0, TAU);
    ctx.fill();
    ctx.stroke();

    ctx.set_fill_style_str("rgba(255, 80, 80, 0.8)");
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
    ctx.begin_path();
    let knob = stick.knob();
    let _ = ctx.arc(knob.x as f64, knob.y as f64, INNER_RADIUS, 0.0, TAU);
    ctx.fill();
    ctx.stroke();

    ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_zone_gives_no_input() {
        let mut stick = TouchJoystick::default();
        stick.begin(1, Vec2::new(100.0, 100.0));
        stick.update(1, Vec2::new(103.0, 100.0));
        assert!(stick.engaged());
        assert_eq!(stick.direction(), Vec2::ZERO);
        assert_eq!(stick.knob(), stick.center());
    }

    #[test]
    fn test_full_deflection_is_unit_length() {
        let mut stick = TouchJoystick::default();
        stick.begin(1, Vec2::new(100.0, 100.0));
        stick.update(1, Vec2::new(400.0, 100.0));
        let dir = stick.direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(dir, Vec2::new(1.0, 0.0));
        // Knob is clamped to the stick radius
        assert_eq!(stick.knob(), Vec2::new(100.0 + MAX_DISTANCE, 100.0));
    }

    #[test]
    fn test_partial_deflection_scales() {
        let mut stick = TouchJoystick::default();
        stick.begin(1, Vec2::new(0.0, 0.0));
        stick.update(1, Vec2::new(0.0, 25.0));
        let dir = stick.direction();
        assert!((dir.y - 0.5).abs() < 1e-6);
        assert_eq!(dir.x, 0.0);
    }

    #[test]
    fn test_second_touch_ignored() {
        let mut stick = TouchJoystick::default();
        stick.begin(1, Vec2::new(100.0, 100.0));
        stick.begin(2, Vec2::new(500.0, 500.0));
        assert_eq!(stick.center(), Vec2::new(100.0, 100.0));

        stick.update(2, Vec2::new(600.0, 500.0));
        assert_eq!(stick.direction(), Vec2::ZERO);

        stick.end(2);
        assert!(stick.engaged());
        stick.end(1);
        assert!(!stick.engaged());
        assert_eq!(stick.direction(), Vec2::ZERO);
    }
}
