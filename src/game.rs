//! Lane coordinator: score, lives, spawning and difficulty
//!
//! Runs once per frame on the game thread. Only the lane under the player is
//! active; the other belts stay frozen until the player hops onto them.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::LaneError;
use crate::lane::{Lane, LaneConfig};
use crate::player::{MoveInput, Player};
use crate::settings::{LANE_COUNT, Settings};
use crate::sim::{ItemId, LaneSnapshot};

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Grab the item above the player
    Collect,
    LaneUp,
    LaneDown,
}

/// Things that happened during a frame, for HUD and audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Caught { lane: usize, id: ItemId },
    Lost { count: u32 },
    Spawned { lane: usize, id: ItemId },
    /// Lives ran out and the run restarted
    Reset,
}

pub struct Game {
    settings: Settings,
    lanes: Vec<Lane>,
    player: Player,
    rng: Pcg32,
    score: u32,
    lives: u32,
    /// Seconds since the last spawn
    spawn_timer: f32,
    spawn_interval: f32,
    /// Score thresholds already applied to the spawn interval
    spawn_steps: u32,
    next_id: ItemId,
}

impl Game {
    /// Start all lane workers and put the first item on the center belt
    pub fn new(settings: Settings) -> Result<Self, LaneError> {
        let timing = settings.tick_timing();
        let lanes = (0..LANE_COUNT)
            .map(|index| {
                Lane::spawn(LaneConfig {
                    index,
                    geometry: settings.lane_geometry(index),
                    initial_speed: settings.speed_base,
                    timing,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("New game (seed {seed})");

        let mut game = Self {
            player: Player::new(&settings),
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            lives: settings.max_lives,
            spawn_timer: 0.0,
            spawn_interval: settings.spawn_interval_base,
            spawn_steps: 0,
            next_id: 1,
            lanes,
            settings,
        };

        game.spawn_on(LANE_COUNT / 2);
        game.update_active_lanes();
        Ok(game)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Lane `index` (top = 0), `None` past the last lane
    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// The lane under the player
    pub fn active_lane(&self) -> &Lane {
        &self.lanes[self.player.lane()]
    }

    /// Seconds between spawns at the current difficulty
    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn handle_action(&mut self, action: Action) -> Option<GameEvent> {
        match action {
            Action::Collect => self.collect(),
            Action::LaneUp => {
                if self.player.switch_lane(-1) {
                    self.update_active_lanes();
                }
                None
            }
            Action::LaneDown => {
                if self.player.switch_lane(1) {
                    self.update_active_lanes();
                }
                None
            }
        }
    }

    /// Per-frame update: settle losses, move the player, spawn on schedule
    pub fn update(&mut self, dt: f32, input: MoveInput) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let lost: u32 = self.lanes.iter().map(Lane::drain_lost).sum();
        if lost > 0 {
            self.lives = self.lives.saturating_sub(lost);
            log::info!("Lost {} item(s), {} lives left", lost, self.lives);
            events.push(GameEvent::Lost { count: lost });

            if self.lives == 0 {
                self.reset();
                events.push(GameEvent::Reset);
            }
        }

        self.player.step(input, dt);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            let lane = self.rng.random_range(0..LANE_COUNT);
            let id = self.spawn_on(lane);
            self.spawn_timer = 0.0;
            events.push(GameEvent::Spawned { lane, id });
        }

        events
    }

    /// Add a fresh item at the start of `lane`
    pub fn spawn_on(&mut self, lane: usize) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.lanes[lane].add_item(id);
        log::debug!("Spawned item {id} on lane {lane}");
        id
    }

    /// Back to a fresh run. Lane workers keep running; only their items go.
    pub fn reset(&mut self) {
        log::info!("Game over at score {}, restarting", self.score);
        self.score = 0;
        self.lives = self.settings.max_lives;
        self.spawn_interval = self.settings.spawn_interval_base;
        self.spawn_steps = 0;
        self.spawn_timer = 0.0;
        self.apply_speed();

        // Losses from the finished run must not carry into the new one
        let stale: u32 = self
            .lanes
            .iter()
            .map(|lane| {
                lane.clear();
                lane.drain_lost()
            })
            .sum();
        if stale > 0 {
            log::debug!("Discarded {stale} loss(es) from the previous run");
        }
        self.spawn_on(LANE_COUNT / 2);
    }

    /// Stop every lane worker
    pub fn shutdown(&mut self) {
        for lane in &mut self.lanes {
            lane.shutdown();
        }
    }

    fn collect(&mut self) -> Option<GameEvent> {
        let snapshot = self.active_lane().snapshot();
        self.collect_from(&snapshot)
    }

    /// Catch the first grabbable item of `snapshot`, taken from the player's lane
    fn collect_from(&mut self, snapshot: &LaneSnapshot) -> Option<GameEvent> {
        let lane_index = self.player.lane();
        let id = snapshot
            .iter()
            .find(|item| self.player.can_grab(item))?
            .id();

        // The worker may have dropped it off the edge since the snapshot;
        // then it already counts as lost and must not score.
        if !self.lanes[lane_index].remove_item(id) {
            return None;
        }

        self.score += 1;
        self.apply_speed();
        self.apply_spawn_interval();
        log::debug!("Caught item {id} on lane {lane_index}, score {}", self.score);
        Some(GameEvent::Caught {
            lane: lane_index,
            id,
        })
    }

    fn apply_speed(&self) {
        let speed = self.settings.speed_for_score(self.score);
        for lane in &self.lanes {
            lane.set_speed(speed);
        }
    }

    fn apply_spawn_interval(&mut self) {
        let threshold = self.settings.score_threshold.max(1);
        while self.score >= (self.spawn_steps + 1) * threshold {
            self.spawn_interval = (self.spawn_interval - self.settings.spawn_interval_decrement)
                .max(self.settings.spawn_interval_min);
            self.spawn_steps += 1;
        }
    }

    fn update_active_lanes(&self) {
        for lane in &self.lanes {
            lane.deactivate();
        }
        self.active_lane().activate();
    }
}
