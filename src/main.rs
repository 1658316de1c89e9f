//! Threadmill entry point
//!
//! Headless autoplay: a simple bot plays the game in real time while the lane
//! workers run. Usage: `threadmill [settings.json] [seconds]`.

use std::time::{Duration, Instant};

use threadmill::consts::FRAME_TIME;
use threadmill::{Action, Game, GameEvent, MoveInput, Settings};

/// Default demo length in seconds
const DEFAULT_RUN_SECS: u64 = 30;
/// Dead zone when lining up under an item
const ALIGN_SLACK: f32 = 4.0;

fn main() {
    env_logger::init();
    log::info!("Threadmill (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let run_for = args
        .next()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_RUN_SECS));

    let mut game = match Game::new(settings) {
        Ok(game) => game,
        Err(err) => {
            log::error!("Could not start lanes: {err}");
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let mut last_frame = started;
    let mut best_score = 0;
    let mut resets = 0;

    while started.elapsed() < run_for {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let (action, input) = autoplay(&game);
        if let Some(action) = action {
            game.handle_action(action);
        }

        for event in game.update(dt, input) {
            if event == GameEvent::Reset {
                resets += 1;
            }
        }
        best_score = best_score.max(game.score());

        if let Some(rest) = FRAME_TIME.checked_sub(now.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    game.shutdown();
    log::info!(
        "Finished: score {}, lives {}, best {}, resets {}",
        game.score(),
        game.lives(),
        best_score,
        resets
    );
}

/// Chase the item closest to falling off, whichever belt it is on
fn autoplay(game: &Game) -> (Option<Action>, MoveInput) {
    let player = game.player();

    let target = game
        .lanes()
        .iter()
        .enumerate()
        .flat_map(|(lane, l)| {
            l.snapshot()
                .iter()
                .map(|item| (lane, *item))
                .collect::<Vec<_>>()
        })
        .max_by(|a, b| a.1.position().total_cmp(&b.1.position()));

    let Some((lane, item)) = target else {
        return (None, MoveInput::default());
    };

    if lane < player.lane() {
        return (Some(Action::LaneUp), MoveInput::default());
    }
    if lane > player.lane() {
        return (Some(Action::LaneDown), MoveInput::default());
    }
    if player.can_grab(&item) {
        return (Some(Action::Collect), MoveInput::default());
    }

    let center = (player.left() + player.right()) / 2.0;
    let input = MoveInput {
        left: item.center_x() < center - ALIGN_SLACK,
        right: item.center_x() > center + ALIGN_SLACK,
    };
    (None, input)
}
