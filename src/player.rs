//! The player: hops between belts and slides along under them

use glam::Vec2;

use crate::settings::{LANE_COUNT, Settings};
use crate::sim::Item;

/// Held movement keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    lane: usize,
    x: f32,
    size: f32,
    speed: f32,
    playfield_width: f32,
    /// Player top for each lane
    lane_tops: [f32; LANE_COUNT],
}

impl Player {
    /// Centered under the middle belt
    pub fn new(settings: &Settings) -> Self {
        let below = settings.lane_height + settings.player_offset_y;
        Self {
            lane: LANE_COUNT / 2,
            x: settings.width / 2.0 - settings.player_size / 2.0,
            size: settings.player_size,
            speed: settings.player_speed,
            playfield_width: settings.width,
            lane_tops: settings.lane_ys().map(|y| y + below),
        }
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.size
    }

    /// Top-left corner for rendering
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.lane_tops[self.lane])
    }

    /// Move up (negative) or down (positive) one belt. Returns false when
    /// that would leave the playfield.
    pub fn switch_lane(&mut self, direction: i32) -> bool {
        let target = self.lane as i64 + i64::from(direction);
        if (0..LANE_COUNT as i64).contains(&target) {
            self.lane = target as usize;
            true
        } else {
            false
        }
    }

    /// Slide horizontally; steps that would cross an edge are skipped
    pub fn step(&mut self, input: MoveInput, dt: f32) {
        let movement = self.speed * dt;
        if input.left && self.x - movement >= 0.0 {
            self.x -= movement;
        }
        if input.right && self.x + movement + self.size <= self.playfield_width {
            self.x += movement;
        }
    }

    /// Item center is over the player (edges inclusive)
    pub fn can_grab(&self, item: &Item) -> bool {
        let center = item.center_x();
        center >= self.left() && center <= self.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centered_on_middle_lane() {
        let player = Player::new(&Settings::default());
        assert_eq!(player.lane(), 1);
        assert_eq!(player.x(), 375.0);
        assert_eq!(player.origin(), Vec2::new(375.0, 340.0));
    }

    #[test]
    fn test_switch_lane_stays_in_bounds() {
        let mut player = Player::new(&Settings::default());
        assert!(player.switch_lane(-1));
        assert!(!player.switch_lane(-1));
        assert_eq!(player.lane(), 0);
        assert!(player.switch_lane(1));
        assert!(player.switch_lane(1));
        assert!(!player.switch_lane(1));
        assert_eq!(player.lane(), 2);
    }

    #[test]
    fn test_step_respects_edges() {
        let mut player = Player::new(&Settings::default());
        let left = MoveInput { left: true, right: false };
        player.step(left, 1.0);
        assert_eq!(player.x(), 175.0);
        // 175 - 200 < 0, refused
        player.step(left, 1.0);
        assert_eq!(player.x(), 175.0);

        let right = MoveInput { left: false, right: true };
        player.step(right, 2.5);
        assert_eq!(player.x(), 675.0);
        player.step(right, 1.0);
        assert_eq!(player.x(), 675.0);
    }

    #[test]
    fn test_can_grab_by_item_center() {
        let player = Player::new(&Settings::default());
        let at = |x: f32| Item::new(1, Vec2::new(x, 0.0), 0.0, 50.0);
        // Player spans 375..425; item centers at x + 25
        assert!(player.can_grab(&at(350.0)));
        assert!(player.can_grab(&at(400.0)));
        assert!(!player.can_grab(&at(349.0)));
        assert!(!player.can_grab(&at(401.0)));
    }
}
