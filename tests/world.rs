use std::collections::HashSet;

use glam::Vec2;
use pacman_sim::constants::{FEAR_BASE_DURATION, GHOST_FEAR_SPEED, LEVEL_CLEARED_POINTS};
use pacman_sim::entity::direction::Direction;
use pacman_sim::entity::ghost::GhostState;
use pacman_sim::entity::{Entity, EntityKind};
use pacman_sim::events::GameEvent;
use pacman_sim::world::Phase;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

use common::Harness;

/// Two coins, the player between them facing the right one.
const COIN_CORRIDOR: &str = "7 3\nxxxxxxx\nx.  P.x\nxxxxxxx\n";
/// A red ghost whose way out of the house leads straight at the player.
const GHOST_CORRIDOR: &str = "8 3\nxxxxxxxx\nxP w r.x\nxxxxxxxx\n";
/// Like `GHOST_CORRIDOR` with a fruit in front of the player.
const FRUIT_CORRIDOR: &str = "9 3\nxxxxxxxxx\nxPf w r.x\nxxxxxxxxx\n";
const THREE_COINS: &str = "6 3\nxxxxxx\nxP...x\nxxxxxx\n";
/// Two ghosts whose exit sits right above the house, the player in the row below it.
const EXIT_ABOVE_HOUSE: &str = "7 5\nxxxxxxx\nx  w  x\nx rb  x\nxP...fx\nxxxxxxx\n";
/// Two ghosts fenced off in their own corridor, out of the player's reach.
const FENCED_GHOSTS: &str = "9 5\nxxxxxxxxx\nxPf.....x\nxxxxxxxxx\nx rbw   x\nxxxxxxxxx\n";
/// A ghost leaving its house through the fruit's corridor.
const HOUSE_BESIDE_FRUIT: &str = "7 3\nxxxxxxx\nxPfwr x\nxxxxxxx\n";
/// Exactly representable, so fear timings land on whole frames.
const FINE_DT: f32 = 1.0 / 32.0;

fn alive_collectables(harness: &Harness) -> usize {
    harness
        .world
        .entities()
        .iter()
        .filter(|e| !e.is_dead() && e.kind().is_collectable())
        .count()
}

fn pacman_center(harness: &Harness) -> Vec2 {
    harness.world.pacman().map(|p| p.center()).unwrap()
}

#[test]
fn test_coin_pickup_scores_full_value() {
    let mut h = Harness::new(COIN_CORRIDOR, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));

    h.run(0.1, 1);
    assert_eq!(h.count(GameEvent::CoinCollected), 0);
    h.run(0.1, 1);
    assert_eq!(h.count(GameEvent::CoinCollected), 1);

    let score = h.score.borrow().current();
    assert!((29..=30).contains(&score), "score was {score}");
    assert_eq!(alive_collectables(&h), 1);
}

#[test]
fn test_player_stops_at_wall_once() {
    let mut h = Harness::new(COIN_CORRIDOR, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));

    h.run(0.1, 10);

    let center = pacman_center(&h);
    assert!((center.x - 5.6).abs() < 1e-4, "center was {center}");
    assert!((center.y - 1.5).abs() < 1e-4);
    assert_eq!(h.world.pacman().and_then(|p| p.direction()), None);
    assert_eq!(h.count(GameEvent::WallHit), 1);
    assert_eq!(h.count(GameEvent::CoinCollected), 1);
    assert!(!h.world.is_level_cleared());
}

#[test]
fn test_turn_into_wall_is_ignored() {
    let mut h = Harness::new(COIN_CORRIDOR, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Up));

    h.run(0.1, 3);

    let pacman = h.world.pacman().unwrap();
    assert_eq!(pacman.direction(), Some(Direction::Left));
    assert_eq!(pacman.desired_direction(), Some(Direction::Up));
    assert!((pacman.center().y - 1.5).abs() < 1e-4);
}

#[test]
fn test_ready_freezes_everything() {
    let mut h = Harness::new(GHOST_CORRIDOR, 3);
    let before: Vec<Vec2> = h.world.entities().iter().map(|e| e.position()).collect();

    h.run(0.5, 9);

    assert!(h.world.is_ready_state_active());
    let after: Vec<Vec2> = h.world.entities().iter().map(|e| e.position()).collect();
    assert_eq!(before, after);
    h.run(0.5, 1);
    assert_eq!(h.world.phase(), Phase::Playing);
}

#[test]
fn test_ghost_kills_player_and_everyone_respawns() {
    let mut h = Harness::new(GHOST_CORRIDOR, 3);
    h.skip_ready();

    h.run_until(0.25, 40, |h| h.count(GameEvent::PacmanDied) > 0);
    assert_eq!(h.lives.borrow().remaining(), 2);
    assert!(h.world.is_death_animation_active());
    assert!(!h.world.is_game_over());

    h.run(0.25, 7);
    assert!(h.world.is_death_animation_active());

    h.run(0.25, 1);
    assert!(h.world.is_ready_state_active());
    let pacman = h.world.pacman().unwrap();
    assert_eq!(pacman.position(), Vec2::new(1.1, 1.1));
    assert_eq!(pacman.direction(), Some(Direction::Left));
    let ghost = h.world.ghosts().next().unwrap();
    assert_eq!(ghost.position(), h.world.ghost_spawn_positions()[0]);
    assert_eq!(ghost.state(), GhostState::Waiting);
    assert!(!ghost.has_left_spawn());

    h.run(0.25, 18);
    assert!(h.world.is_ready_state_active());
    h.run(0.25, 1);
    assert_eq!(h.world.phase(), Phase::Playing);
    assert_eq!(h.count(GameEvent::PacmanDied), 1);
}

#[test]
fn test_game_over_freezes_world() {
    let mut h = Harness::new(GHOST_CORRIDOR, 1);
    h.skip_ready();

    h.run_until(0.25, 40, |h| h.count(GameEvent::PacmanDied) > 0);
    assert!(h.world.is_game_over());

    // Death animation and READY still play out.
    h.run(0.25, 8 + 19);
    assert_eq!(h.world.phase(), Phase::Playing);

    let before: Vec<Vec2> = h.world.entities().iter().map(|e| e.position()).collect();
    h.run(0.25, 40);
    let after: Vec<Vec2> = h.world.entities().iter().map(|e| e.position()).collect();
    assert_eq!(before, after);
    assert_eq!(h.count(GameEvent::PacmanDied), 1);
    assert_that(&h.lives.borrow().remaining()).is_equal_to(0);
}

#[test]
fn test_fruit_frightens_ghost_which_gets_eaten() {
    let mut h = Harness::new(FRUIT_CORRIDOR, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));
    let spawn = h.world.ghost_spawn_positions()[0];

    h.run_until(0.05, 20, |h| h.count(GameEvent::FruitCollected) > 0);
    assert!(h.world.is_fear_mode_active());
    {
        let ghost = h.world.ghosts().next().unwrap();
        assert_eq!(ghost.state(), GhostState::Exiting);
        assert!(ghost.will_enter_fear_when_leaving());
    }

    // Back off until the ghost is out of the house and frightened.
    h.world.set_desired_direction(Some(Direction::Left));
    h.run_until(0.05, 40, |h| h.world.ghosts().next().is_some_and(|g| g.is_frightened()));
    {
        let ghost = h.world.ghosts().next().unwrap();
        assert!(ghost.has_left_spawn());
        assert_eq!(ghost.speed(), GHOST_FEAR_SPEED);
        assert_eq!(ghost.direction(), Some(Direction::Left));
    }

    h.run_until(0.05, 80, |h| h.count(GameEvent::GhostEaten) > 0);
    let ghost = h.world.ghosts().next().unwrap();
    assert_eq!(ghost.position(), spawn);
    assert_eq!(ghost.state(), GhostState::Exiting);
    assert!(!ghost.is_frightened());
    assert!(!ghost.has_left_spawn());
    assert_eq!(ghost.speed(), ghost.normal_speed());

    let score = h.score.borrow().current();
    // 50 + 200, minus a few seconds of decay.
    assert!((215..=250).contains(&score), "score was {score}");
    assert_eq!(h.count(GameEvent::PacmanDied), 0);
}

#[test]
fn test_level_clear_holds_display_then_freezes() {
    let mut h = Harness::new(THREE_COINS, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));

    h.run_until(0.25, 20, |h| h.world.is_level_cleared());
    assert_eq!(h.count(GameEvent::CoinCollected), 3);
    assert_eq!(h.count(GameEvent::LevelCleared), 1);
    assert!(h.world.is_level_cleared_display_active());
    assert_that(&h.score.borrow().current()).is_greater_than(LEVEL_CLEARED_POINTS);

    h.run(0.25, 11);
    assert!(h.world.is_level_cleared_display_active());
    h.run(0.25, 1);
    assert!(!h.world.is_level_cleared_display_active());

    let frozen = pacman_center(&h);
    h.run(0.25, 10);
    assert_eq!(pacman_center(&h), frozen);
    assert!(h.world.is_level_cleared());
    assert_eq!(h.count(GameEvent::LevelCleared), 1);
}

#[test]
fn test_advance_level_restores_collectables() {
    let mut h = Harness::new(THREE_COINS, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));
    h.run_until(0.25, 20, |h| h.world.is_level_cleared());
    let score = h.score.borrow().current();

    h.world.advance_level().unwrap();

    assert_eq!(h.world.level(), 2);
    assert!(!h.world.is_level_cleared());
    assert!(h.world.is_ready_state_active());
    assert_eq!(alive_collectables(&h), 3);
    assert_eq!(h.score.borrow().current(), score);

    // The score is attached to the new models as well.
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));
    h.run(0.25, 1);
    assert_that(&h.score.borrow().current()).is_greater_than(score);
}

#[test]
fn test_reload_produces_same_composition() {
    let mut h = Harness::new(FRUIT_CORRIDOR, 3);
    let kinds = |h: &Harness| h.world.entities().iter().map(|e| e.kind()).collect::<Vec<EntityKind>>();
    let first = kinds(&h);

    h.world.load_from_str(FRUIT_CORRIDOR).unwrap();

    assert_eq!(kinds(&h), first);
    assert_eq!(first.iter().filter(|&&k| k == EntityKind::Ghost).count(), 1);
}

#[test]
fn test_ghost_leaves_exit_next_to_house() {
    let mut h = Harness::new(EXIT_ABOVE_HOUSE, 100);
    let exit = h.world.exit_positions()[0];
    let area = h.world.layout().spawn_area().unwrap();
    assert!(!area.contains(exit));
    h.skip_ready();

    let mut visited = HashSet::new();
    for frame in 0..400 {
        h.run(0.05, 1);
        for ghost in h.world.ghosts().filter(|g| g.has_left_spawn()) {
            assert!(
                !area.contains(ghost.grid_cell()),
                "frame {frame}: {} ghost is back in the house at {}",
                ghost.color(),
                ghost.grid_cell()
            );
            visited.insert(ghost.grid_cell());
        }
    }
    assert!(visited.contains(&exit));
    assert_that(&visited.len()).is_greater_than(3);
}

/// Lets both ghosts out, then picks up the fruit. Returns with the fear just started.
fn frighten_fenced_ghosts() -> Harness {
    let mut h = Harness::new(FENCED_GHOSTS, 3);
    h.skip_ready();
    h.run(FINE_DT, 64);
    assert!(h.world.ghosts().all(|g| g.has_left_spawn()));

    h.world.set_desired_direction(Some(Direction::Right));
    h.run_until(FINE_DT, 40, |h| h.count(GameEvent::FruitCollected) > 0);
    h.world.set_desired_direction(Some(Direction::Left));
    h
}

#[test]
fn test_fear_lasts_its_full_duration() {
    let mut h = frighten_fenced_ghosts();
    assert_eq!(h.world.fear_mode_duration(), FEAR_BASE_DURATION * h.world.fear_duration_multiplier());
    assert!(h.world.is_fear_mode_active());
    assert!(h.world.ghosts().all(|g| g.is_frightened()));

    // 6.96875 s in: one frame left.
    h.run(FINE_DT, 223);
    assert!(h.world.is_fear_mode_active());
    assert!(h.world.ghosts().all(|g| g.is_frightened()));

    h.run(FINE_DT, 1);
    assert!(!h.world.is_fear_mode_active());
    assert!(!h.world.is_fear_mode_ending());
    for ghost in h.world.ghosts() {
        assert_eq!(ghost.state(), GhostState::Chasing);
        assert!(!ghost.is_fear_mode_ending());
        assert_eq!(ghost.speed(), ghost.normal_speed());
    }
    assert_eq!(h.count(GameEvent::GhostEaten), 0);
}

#[test]
fn test_fear_warns_two_seconds_before_ending() {
    let mut h = frighten_fenced_ghosts();

    h.run(FINE_DT, 159);
    assert!(!h.world.is_fear_mode_ending());
    assert!(h.world.ghosts().all(|g| !g.is_fear_mode_ending()));

    h.run(FINE_DT, 1);
    assert!(h.world.is_fear_mode_ending());
    assert!(h.world.ghosts().all(|g| g.is_fear_mode_ending() && g.is_frightened()));
}

#[test]
fn test_death_cancels_fear() {
    let mut h = Harness::new(HOUSE_BESIDE_FRUIT, 3);
    h.skip_ready();
    h.world.set_desired_direction(Some(Direction::Right));

    // The ghost comes out frightened and is eaten, then walks back out unafraid.
    h.run_until(FINE_DT, 40, |h| h.count(GameEvent::GhostEaten) > 0);
    assert!(h.world.is_fear_mode_active());

    h.run_until(FINE_DT, 40, |h| h.count(GameEvent::PacmanDied) > 0);
    assert_eq!(h.count(GameEvent::FruitCollected), 1);
    assert!(!h.world.is_fear_mode_active());
    for ghost in h.world.ghosts() {
        assert!(!ghost.is_frightened());
        assert!(!ghost.will_enter_fear_when_leaving());
    }
}
