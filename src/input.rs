//! Input resolution
//!
//! The shell feeds raw key events into [`KeyboardState`]; each frame the
//! active ball's direction is resolved from whichever source is live.
//! Touch, when engaged, overrides the keyboard entirely.

use std::collections::HashSet;

use glam::Vec2;

/// Arrow-key directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Dir::Left),
            "ArrowRight" => Some(Dir::Right),
            "ArrowUp" => Some(Dir::Up),
            "ArrowDown" => Some(Dir::Down),
            _ => None,
        }
    }

    fn vector(self) -> Vec2 {
        match self {
            Dir::Left => Vec2::new(-1.0, 0.0),
            Dir::Right => Vec2::new(1.0, 0.0),
            Dir::Up => Vec2::new(0.0, -1.0),
            Dir::Down => Vec2::new(0.0, 1.0),
        }
    }
}

/// Set of currently held arrow keys
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    pressed: HashSet<Dir>,
}

impl KeyboardState {
    /// Record a keydown; returns whether the key was a movement key.
    pub fn press(&mut self, key: &str) -> bool {
        match Dir::from_key(key) {
            Some(dir) => {
                self.pressed.insert(dir);
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, key: &str) {
        if let Some(dir) = Dir::from_key(key) {
            self.pressed.remove(&dir);
        }
    }

    /// Drop any held keys (round start, focus loss).
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// Sum of held directions, unnormalized (opposites cancel).
    pub fn direction(&self) -> Vec2 {
        self.pressed.iter().fold(Vec2::ZERO, |acc, d| acc + d.vector())
    }
}

/// Optional direction source (the touch joystick). The default
/// implementation is a permanently disengaged no-op, so a session without
/// touch hardware injects [`NoTouch`] and nothing else changes.
pub trait ControlSource {
    fn direction(&self) -> Vec2 {
        Vec2::ZERO
    }
    fn engaged(&self) -> bool {
        false
    }
}

/// Absent touch capability
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTouch;

impl ControlSource for NoTouch {}

/// Resolve the active ball's movement direction for this frame:
/// an engaged touch source wins outright, otherwise the keyboard sum.
/// The result is unit length or zero.
pub fn resolve_direction(keyboard: &KeyboardState, touch: &impl ControlSource) -> Vec2 {
    let raw = if touch.engaged() {
        touch.direction()
    } else {
        keyboard.direction()
    };
    if raw == Vec2::ZERO {
        Vec2::ZERO
    } else {
        raw.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTouch(Vec2, bool);
    impl ControlSource for FakeTouch {
        fn direction(&self) -> Vec2 {
            self.0
        }
        fn engaged(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn test_keyboard_sum_normalizes() {
        let mut kb = KeyboardState::default();
        kb.press("ArrowRight");
        kb.press("ArrowDown");
        let dir = resolve_direction(&kb, &NoTouch);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y > 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut kb = KeyboardState::default();
        kb.press("ArrowLeft");
        kb.press("ArrowRight");
        assert_eq!(resolve_direction(&kb, &NoTouch), Vec2::ZERO);
    }

    #[test]
    fn test_touch_overrides_keyboard() {
        let mut kb = KeyboardState::default();
        kb.press("ArrowLeft");
        let touch = FakeTouch(Vec2::new(0.0, 0.4), true);
        let dir = resolve_direction(&kb, &touch);
        assert!((dir - Vec2::new(0.0, 1.0)).length() < 1e-6);

        // Disengaged touch is ignored even with a stale vector
        let idle = FakeTouch(Vec2::new(0.0, 0.4), false);
        let dir = resolve_direction(&kb, &idle);
        assert_eq!(dir, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_non_movement_keys_ignored() {
        let mut kb = KeyboardState::default();
        assert!(!kb.press("Escape"));
        assert!(!kb.press(" "));
        assert_eq!(kb.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_release_and_clear() {
        let mut kb = KeyboardState::default();
        kb.press("ArrowUp");
        kb.release("ArrowUp");
        assert_eq!(kb.direction(), Vec2::ZERO);
        kb.press("ArrowUp");
        kb.press("ArrowLeft");
        kb.clear();
        assert_eq!(kb.direction(), Vec2::ZERO);
    }
}
