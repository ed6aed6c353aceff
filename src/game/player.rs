//! Player and goal tokens.
//!
//! The player does not move at a fixed speed. Every tick it closes a constant fraction of
//! the remaining gap to its target, which gives an exponential ease-in towards wherever
//! the input source last pointed.

use crate::math::Vec2;

/// The player token.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Committed position. Never a point the maze reports as blocked.
    pub position: Vec2,
    /// Latest point the input wants the player to move towards.
    pub target: Vec2,
    pub radius: f32,
    /// Fraction of the remaining gap closed per tick, in (0, 1).
    pub smoothing: f32,
}

impl Player {
    /// Creates a player at rest on `position`.
    pub fn new(position: Vec2, radius: f32, smoothing: f32) -> Self {
        Self {
            position,
            target: position,
            radius,
            smoothing,
        }
    }

    /// Places the player at `position` and clears any pending movement.
    pub fn reset_to(&mut self, position: Vec2) {
        self.position = position;
        self.target = position;
    }

    /// Where the player would be after one more tick of easing.
    pub fn candidate_position(&self) -> Vec2 {
        self.position.lerp(&self.target, self.smoothing)
    }

    /// Distance left to the current target.
    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(&self.target)
    }
}

/// The goal token for the active level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Vec2,
    pub radius: f32,
}

impl Goal {
    /// Creates a goal centered on `position`.
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Arrival happens once the two circles overlap.
    pub fn reached_by(&self, player: &Player) -> bool {
        player.position.distance(&self.position) < player.radius + self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that each tick closes the same fraction of the remaining gap.
    #[test]
    fn test_easing_is_proportional() {
        let mut player = Player::new(Vec2::new(0.0, 0.0), 8.0, 0.25);
        player.target = Vec2::new(100.0, 0.0);

        let first = player.candidate_position();
        assert_eq!(first, Vec2::new(25.0, 0.0));
        player.position = first;

        let second = player.candidate_position();
        assert_eq!(second, Vec2::new(43.75, 0.0));
        assert_eq!(player.distance_to_target(), 75.0);
    }

    #[test]
    fn test_reset_clears_target() {
        let mut player = Player::new(Vec2::new(5.0, 5.0), 8.0, 0.15);
        player.target = Vec2::new(50.0, 50.0);
        player.reset_to(Vec2::new(1.0, 2.0));
        assert_eq!(player.position, player.target);
        assert_eq!(player.candidate_position(), Vec2::new(1.0, 2.0));
    }

    /// Tests the strict overlap check between the player and goal circles.
    #[test]
    fn test_goal_overlap() {
        let goal = Goal::new(Vec2::new(100.0, 100.0), 15.0);
        let mut player = Player::new(Vec2::new(100.0, 77.0), 8.0, 0.15);
        assert!(!goal.reached_by(&player));
        player.position = Vec2::new(100.0, 77.5);
        assert!(goal.reached_by(&player));
    }
}
