use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;
use pacman_sim::clock::{frame_clock, Clock};
use pacman_sim::config::{load_config, Config};
use pacman_sim::constants::LOOP_TIME;
use pacman_sim::entity::direction::Direction;
use pacman_sim::entity::Entity;
use pacman_sim::factory::HeadlessFactory;
use pacman_sim::formatter::CustomFormatter;
use pacman_sim::lives::Lives;
use pacman_sim::rng::{rng, GameRng};
use pacman_sim::score::Score;
use pacman_sim::world::World;
use tracing::{debug, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Frames between autopilot steering decisions.
const STEER_INTERVAL: u64 = 20;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_env_filter(filter)
        .finish()
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("Could not set global default subscriber")?;

    let config = load_config().context("Could not load configuration")?;
    info!(?config, "Configuration loaded");

    run(&config)
}

fn run(config: &Config) -> anyhow::Result<()> {
    let score = Rc::new(RefCell::new(Score::new(&config.high_score_path)));
    let lives = Rc::new(RefCell::new(Lives::new(config.starting_lives)));

    let world_rng = config.seed.map_or_else(GameRng::from_os_rng, GameRng::seeded);
    let mut world = World::with_rng(Box::new(HeadlessFactory), 1, world_rng);
    world.set_score(score.clone());
    world.set_lives(lives.clone());
    world
        .load_from_file(&config.map_path)
        .with_context(|| format!("Could not load map {}", config.map_path.display()))?;

    let fixed_dt = LOOP_TIME.as_secs_f32();
    let started = Instant::now();
    frame_clock().tick();

    info!(max_frames = config.max_frames, realtime = config.realtime, "Starting simulation");
    let mut frame = 0u64;
    while frame < config.max_frames {
        let frame_start = Instant::now();

        if frame % STEER_INTERVAL == 0 {
            steer(&mut world);
        }

        let dt = if config.realtime {
            let mut clock = frame_clock();
            clock.tick();
            clock.delta_time()
        } else {
            fixed_dt
        };
        world.update(dt);

        if world.is_game_over() {
            info!(frame, "Game over");
            break;
        }
        if world.is_level_cleared() && !world.is_level_cleared_display_active() {
            world.advance_level().context("Could not advance level")?;
        }

        if config.realtime {
            let elapsed = frame_start.elapsed();
            if elapsed < LOOP_TIME {
                spin_sleep::sleep(LOOP_TIME - elapsed);
            } else {
                warn!(behind = ?(elapsed - LOOP_TIME), "Simulation behind schedule");
            }
        }
        frame += 1;
    }

    let final_score = score.borrow().current();
    info!(
        frames = frame,
        level = world.level(),
        score = final_score,
        lives = lives.borrow().remaining(),
        elapsed = ?started.elapsed(),
        "Simulation finished"
    );

    let mut score = score.borrow_mut();
    if score.is_high_score(final_score) {
        score.add_high_score(&config.player_name, final_score);
    }
    Ok(())
}

/// Points Pac-Man at a random open neighbour of its current cell.
fn steer(world: &mut World) {
    let Some(pacman) = world.pacman() else {
        return;
    };
    let cell = pacman.grid_cell();
    let open: Vec<Direction> = Direction::DIRECTIONS
        .into_iter()
        .filter(|direction| !world.has_wall_in_grid_cell(cell + direction.as_ivec2()))
        .collect();

    if let Some(direction) = rng().choose(&open) {
        debug!(direction = direction.as_ref(), "Autopilot steering");
        world.set_desired_direction(Some(direction));
    }
}
