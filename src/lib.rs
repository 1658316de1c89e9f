//! Threadmill - a conveyor-belt catching game
//!
//! Core modules:
//! - `sim`: Deterministic belt contents and tick step
//! - `lane`: Threaded lanes that advance their belts in real time
//! - `game`: Lane coordinator (score, lives, spawning, difficulty)
//! - `player`: Lane hopping and catch checks
//! - `settings`: Data-driven geometry and balance

pub mod error;
pub mod game;
pub mod lane;
pub mod player;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, LaneError};
pub use game::{Action, Game, GameEvent};
pub use lane::{Lane, LaneConfig, LaneState, TickTiming};
pub use player::{MoveInput, Player};
pub use settings::{LANE_COUNT, Settings};

/// Frame-loop constants for the binary
pub mod consts {
    use std::time::Duration;

    /// Target frame rate of the outer game loop
    pub const FRAME_RATE: u32 = 60;
    /// Frame length at [`FRAME_RATE`]
    pub const FRAME_TIME: Duration = Duration::from_micros(1_000_000 / FRAME_RATE as u64);
}
