//! Conveyor lanes
//!
//! A [`Lane`] owns a [`Belt`] and one worker thread that advances it on a
//! fixed tick while the lane is active. The game loop only talks to the lane
//! through its methods; every call holds the lane lock for a bounded amount
//! of work, so a 60 Hz caller is never stalled by a worker.
//!
//! ## Locking
//!
//! - `control`: belt, active flag, terminated flag, tick counter. Paired with
//!   the `wake` condvar the idle worker parks on.
//! - `lost`: items that ran off the edge since the last drain. The worker
//!   takes it while holding `control`; [`Lane::drain_lost`] takes it alone.
//!   Nothing ever takes `control` while holding `lost`.
//!
//! ```text
//!   activate()            deactivate()
//!  Idle ─────────────▶ Running ─────────────▶ Idle
//!    │                   │
//!    └──── shutdown() ───┴────▶ Terminated
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::LaneError;
use crate::sim::{Belt, ItemId, LaneGeometry, LaneSnapshot, sanitize_speed};

/// Default tick length (~60 Hz)
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Worker cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTiming {
    /// Wall-clock time between ticks
    pub interval: Duration,
    /// Simulated seconds each tick advances items by
    pub dt: f32,
}

impl TickTiming {
    /// Simulated step equal to the wall-clock interval
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            dt: interval.as_secs_f32(),
        }
    }
}

impl Default for TickTiming {
    fn default() -> Self {
        Self::fixed(TICK_INTERVAL)
    }
}

/// Observable worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    /// Worker parked, items frozen
    Idle,
    /// Worker ticking
    Running,
    /// Worker stopped for good
    Terminated,
}

/// Everything needed to build a lane
#[derive(Debug, Clone)]
pub struct LaneConfig {
    /// Track number, top = 0
    pub index: usize,
    pub geometry: LaneGeometry,
    pub initial_speed: f32,
    pub timing: TickTiming,
}

struct Control {
    belt: Belt,
    active: bool,
    terminated: bool,
    ticks: u64,
}

struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
    lost: Mutex<u32>,
}

/// One conveyor track with its own worker thread
pub struct Lane {
    index: usize,
    y: f32,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Lane {
    /// Build the lane and start its worker. The worker idles until the first
    /// [`activate`](Self::activate).
    pub fn spawn(config: LaneConfig) -> Result<Self, LaneError> {
        let LaneConfig {
            index,
            geometry,
            initial_speed,
            timing,
        } = config;

        let shared = Arc::new(Shared {
            control: Mutex::new(Control {
                belt: Belt::new(geometry, initial_speed),
                active: false,
                terminated: false,
                ticks: 0,
            }),
            wake: Condvar::new(),
            lost: Mutex::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(format!("lane-{index}"))
            .spawn(move || run_worker(&worker_shared, timing, index))
            .map_err(|source| LaneError::Spawn { index, source })?;

        log::info!(
            "Lane {} started (y={}, tick={:?})",
            index,
            geometry.y,
            timing.interval
        );

        Ok(Self {
            index,
            y: geometry.y,
            shared,
            worker: Some(worker),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Top edge of the belt
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Put a new item at the start of the belt. Returns false if the id is
    /// already on this lane.
    pub fn add_item(&self, id: ItemId) -> bool {
        self.shared.control.lock().belt.add(id)
    }

    /// Returns whether the item was still on the belt
    pub fn remove_item(&self, id: ItemId) -> bool {
        self.shared.control.lock().belt.remove(id)
    }

    /// Set the speed of the lane and of every item on it
    pub fn set_speed(&self, speed: f32) {
        if sanitize_speed(speed).is_none() {
            log::warn!("Lane {}: ignoring speed {}", self.index, speed);
            return;
        }
        self.shared.control.lock().belt.set_speed(speed);
    }

    pub fn speed(&self) -> f32 {
        self.shared.control.lock().belt.speed()
    }

    pub fn clear(&self) {
        self.shared.control.lock().belt.clear();
    }

    pub fn len(&self) -> usize {
        self.shared.control.lock().belt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start ticking. No-op if already active or shut down.
    pub fn activate(&self) {
        let mut control = self.shared.control.lock();
        if control.active || control.terminated {
            return;
        }
        control.active = true;
        self.shared.wake.notify_one();
        log::debug!("Lane {} activated", self.index);
    }

    /// Stop ticking. Items hold their positions from the moment this returns.
    pub fn deactivate(&self) {
        let mut control = self.shared.control.lock();
        if control.active {
            control.active = false;
            log::debug!("Lane {} deactivated", self.index);
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.control.lock().active
    }

    pub fn state(&self) -> LaneState {
        let control = self.shared.control.lock();
        if control.terminated {
            LaneState::Terminated
        } else if control.active {
            LaneState::Running
        } else {
            LaneState::Idle
        }
    }

    /// Ticks completed since the lane was built
    pub fn ticks(&self) -> u64 {
        self.shared.control.lock().ticks
    }

    /// Items lost since the last call; resets the count
    pub fn drain_lost(&self) -> u32 {
        std::mem::take(&mut *self.shared.lost.lock())
    }

    /// Copy of the lane's items
    pub fn snapshot(&self) -> LaneSnapshot {
        self.shared.control.lock().belt.snapshot()
    }

    /// Stop the worker and wait for it to exit. Later calls do nothing; the
    /// lane still answers queries on its frozen belt afterwards.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        {
            let mut control = self.shared.control.lock();
            control.terminated = true;
            control.active = false;
        }
        self.shared.wake.notify_all();

        if worker.join().is_err() {
            log::error!("Lane {} worker panicked", self.index);
        } else {
            log::info!("Lane {} stopped", self.index);
        }
    }
}

impl Drop for Lane {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("index", &self.index)
            .field("y", &self.y)
            .field("state", &self.state())
            .finish()
    }
}

/// Worker loop. Holds the control lock except while parked.
fn run_worker(shared: &Shared, timing: TickTiming, index: usize) {
    let mut control = shared.control.lock();
    loop {
        while !control.active && !control.terminated {
            shared.wake.wait(&mut control);
        }
        if control.terminated {
            break;
        }

        let lost = control.belt.advance(timing.dt);
        if lost > 0 {
            *shared.lost.lock() += lost;
            log::trace!("Lane {index}: {lost} item(s) ran off the belt");
        }
        control.ticks += 1;

        // Sleep out the full interval even if woken early, so toggling
        // activation can never speed the belt up.
        let deadline = Instant::now() + timing.interval;
        while !control.terminated {
            if shared.wake.wait_until(&mut control, deadline).timed_out() {
                break;
            }
        }
    }
    log::debug!("Lane {index} worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_lane(speed: f32) -> Lane {
        Lane::spawn(LaneConfig {
            index: 1,
            geometry: LaneGeometry {
                y: 250.0,
                height: 80.0,
                playfield_width: 800.0,
                item_size: 50.0,
                start_x: 0.0,
            },
            initial_speed: speed,
            timing: TickTiming {
                interval: Duration::from_millis(1),
                dt: 0.016,
            },
        })
        .unwrap()
    }

    fn wait_for_ticks(lane: &Lane, target: u64) {
        let start = Instant::now();
        while lane.ticks() < target {
            assert!(start.elapsed() < Duration::from_secs(10), "lane stalled");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn position(lane: &Lane, id: ItemId) -> f32 {
        lane.snapshot().get(id).unwrap().position()
    }

    #[test]
    fn test_new_lane_idles() {
        let lane = fast_lane(150.0);
        lane.add_item(1);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(lane.state(), LaneState::Idle);
        assert_eq!(lane.ticks(), 0);
        assert_eq!(position(&lane, 1), 0.0);
    }

    #[test]
    fn test_item_lost_after_crossing_edge() {
        let lane = fast_lane(150.0);
        lane.add_item(1);
        lane.activate();

        let start = Instant::now();
        let mut lost = 0;
        while lost == 0 {
            assert!(start.elapsed() < Duration::from_secs(10), "item never lost");
            lost += lane.drain_lost();
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(lost, 1);
        assert!(lane.ticks() >= 334);
        assert!(lane.is_empty());
        assert_eq!(lane.drain_lost(), 0);
    }

    #[test]
    fn test_deactivate_freezes_items() {
        let lane = fast_lane(150.0);
        lane.add_item(1);
        lane.activate();
        wait_for_ticks(&lane, 5);
        lane.deactivate();

        let ticks = lane.ticks();
        let frozen = lane.snapshot();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(lane.snapshot(), frozen);
        assert_eq!(lane.ticks(), ticks);
        assert_eq!(lane.state(), LaneState::Idle);
    }

    #[test]
    fn test_activation_is_idempotent() {
        let lane = fast_lane(150.0);
        lane.activate();
        lane.activate();
        assert_eq!(lane.state(), LaneState::Running);
        wait_for_ticks(&lane, 3);

        lane.deactivate();
        lane.deactivate();
        assert_eq!(lane.state(), LaneState::Idle);

        lane.activate();
        let resumed_from = lane.ticks();
        wait_for_ticks(&lane, resumed_from + 3);
    }

    #[test]
    fn test_speed_reaches_existing_and_new_items() {
        let lane = fast_lane(50.0);
        lane.add_item(1);
        lane.activate();
        wait_for_ticks(&lane, 10);
        lane.deactivate();

        let t0 = lane.ticks();
        let x0 = position(&lane, 1);
        assert!((x0 - t0 as f32 * 0.8).abs() < 0.01);

        lane.set_speed(100.0);
        lane.add_item(2);
        lane.activate();
        wait_for_ticks(&lane, t0 + 10);
        lane.deactivate();

        let steps = (lane.ticks() - t0) as f32;
        assert!((position(&lane, 1) - x0 - steps * 1.6).abs() < 0.01);
        assert!((position(&lane, 2) - steps * 1.6).abs() < 0.01);
    }

    #[test]
    fn test_rejects_bad_speed() {
        let lane = fast_lane(150.0);
        lane.set_speed(f32::NAN);
        assert_eq!(lane.speed(), 150.0);
        lane.set_speed(-3.0);
        assert_eq!(lane.speed(), 0.0);
    }

    #[test]
    fn test_remove_twice() {
        let lane = fast_lane(150.0);
        lane.add_item(4);
        assert!(lane.remove_item(4));
        assert!(!lane.remove_item(4));
        assert!(!lane.remove_item(5));
        assert!(lane.snapshot().is_empty());
    }

    #[test]
    fn test_shutdown_from_running_and_idle() {
        let mut running = fast_lane(150.0);
        running.activate();
        wait_for_ticks(&running, 2);
        running.shutdown();
        assert_eq!(running.state(), LaneState::Terminated);

        let mut idle = fast_lane(150.0);
        idle.shutdown();
        idle.shutdown();
        assert_eq!(idle.state(), LaneState::Terminated);

        // Still answers, never restarts
        idle.activate();
        assert_eq!(idle.state(), LaneState::Terminated);
        assert!(idle.add_item(1));
        assert_eq!(idle.snapshot().len(), 1);
    }
}
