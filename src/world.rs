//! The world: owns every model of a level and advances them one frame at a time.
//!
//! Each frame first runs whichever meta-state ([`Phase`]) is active; only in
//! [`Phase::Playing`] does gameplay proceed, in a fixed order: score decay, player
//! movement, ghost movement, fear timer, collisions, dead removal, level check.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::{IVec2, Vec2};
use tracing::{debug, info, warn};

use crate::constants::{
    DEATH_ANIMATION_DURATION, FEAR_BASE_DURATION, FEAR_DURATION_LEVEL_CAP, FEAR_DURATION_STEP, FEAR_ENDING_THRESHOLD,
    GHOST_SPEED_STEP, LEVEL_CLEARED_DURATION, PLAYER_CENTER_TOLERANCE, READY_DURATION,
};
use crate::entity::direction::Direction;
use crate::entity::ghost::{Ghost, Navigation};
use crate::entity::pacman::Pacman;
use crate::entity::{Entity, EntityId, EntityKind, WorldEntity};
use crate::error::{GameError, GameResult};
use crate::events::{GameEvent, SharedObserver, Subject};
use crate::factory::EntityFactory;
use crate::formatter;
use crate::lives::Lives;
use crate::map::{GhostSpawn, Layout, MapParser, SpawnArea, Tile};
use crate::rng::GameRng;
use crate::score::Score;

/// Offset of Pac-Man and ghosts from the top-left corner of their spawn cell.
const ACTOR_OFFSET: f32 = 0.1;
const COIN_OFFSET: f32 = 0.49;
const FRUIT_OFFSET: f32 = 0.485;
/// Slack on the stop line, absorbing rounding from `Body::set_center`.
const STOP_EPSILON: f32 = 1e-4;

/// Meta-state gating the per-frame update. At most one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Playing,
    /// Countdown shown after a level load or a respawn.
    Ready { remaining: f32 },
    /// Death animation; everything is frozen until it ends.
    Dying { remaining: f32 },
    /// Level-cleared display.
    LevelCleared { remaining: f32 },
}

/// Ghost speed multiplier for a 1-based level.
pub fn ghost_speed_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * GHOST_SPEED_STEP
}

/// Fear duration multiplier for a 1-based level. Stops shrinking after
/// [`FEAR_DURATION_LEVEL_CAP`].
pub fn fear_duration_multiplier(level: u32) -> f32 {
    1.0 - (level.clamp(1, FEAR_DURATION_LEVEL_CAP) - 1) as f32 * FEAR_DURATION_STEP
}

pub struct World {
    factory: Box<dyn EntityFactory>,
    rng: GameRng,
    /// Models in insertion order
    entities: Vec<WorldEntity>,
    player: Option<usize>,
    /// Indices of ghosts into `entities`, parallel to `ghost_spawns`
    ghosts: Vec<usize>,
    ghost_spawns: Vec<Vec2>,
    layout: Layout,
    spawn_area_override: Option<SpawnArea>,
    level: u32,
    ghost_speed_multiplier: f32,
    fear_duration_multiplier: f32,
    phase: Phase,
    /// Seconds of fear left, when fear mode is active
    fear_remaining: Option<f32>,
    level_cleared: bool,
    /// Pac-Man's center at the start of the previous update
    prev_player_center: Option<Vec2>,
    score: Option<Rc<RefCell<Score>>>,
    lives: Option<Rc<RefCell<Lives>>>,
    subject: Subject,
    /// Text of the loaded map, reloaded by `advance_level`
    source: Option<String>,
}

impl World {
    /// Creates an empty world at `level`, with a generator seeded from OS entropy.
    pub fn new(factory: Box<dyn EntityFactory>, level: u32) -> Self {
        Self::with_rng(factory, level, GameRng::from_os_rng())
    }

    pub fn with_rng(factory: Box<dyn EntityFactory>, level: u32, rng: GameRng) -> Self {
        let level = level.max(1);
        Self {
            factory,
            rng,
            entities: Vec::new(),
            player: None,
            ghosts: Vec::new(),
            ghost_spawns: Vec::new(),
            layout: Layout::default(),
            spawn_area_override: None,
            level,
            ghost_speed_multiplier: ghost_speed_multiplier(level),
            fear_duration_multiplier: fear_duration_multiplier(level),
            phase: Phase::Playing,
            fear_remaining: None,
            level_cleared: false,
            prev_player_center: None,
            score: None,
            lives: None,
            subject: Subject::new(),
            source: None,
        }
    }

    /// Loads a level from a map file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its header is invalid. The world is left
    /// empty, and [`World::update`] does nothing until a later load succeeds.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> GameResult<()> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(e) => {
                self.clear();
                warn!(path = %path.display(), error = %e, "Could not read map file");
                Err(e.into())
            }
        }
    }

    /// Loads a level from map text. See [`World::load_from_file`].
    pub fn load_from_str(&mut self, text: &str) -> GameResult<()> {
        self.clear();
        let parsed = MapParser::parse(text)?;

        let mut layout = Layout::new(parsed.width, parsed.height);
        let mut ghost_cells = Vec::new();
        let mut player_cell = None;
        for &(cell, tile) in &parsed.tiles {
            let origin = cell.as_vec2();
            match tile {
                Tile::Wall => {
                    layout.set_wall(cell);
                    let wall = self.factory.create_wall(origin);
                    self.entities.push(wall.into());
                }
                Tile::Coin => {
                    let coin = self.factory.create_coin(origin + Vec2::splat(COIN_OFFSET));
                    self.entities.push(coin.into());
                }
                Tile::Fruit => {
                    let fruit = self.factory.create_fruit(origin + Vec2::splat(FRUIT_OFFSET));
                    self.entities.push(fruit.into());
                }
                Tile::PlayerSpawn if self.player.is_some() => {
                    warn!(?cell, "Ignoring extra player spawn");
                }
                Tile::PlayerSpawn => {
                    let pacman = self.factory.create_pacman(origin + Vec2::splat(ACTOR_OFFSET));
                    self.player = Some(self.entities.len());
                    player_cell = Some(cell);
                    self.entities.push(pacman.into());
                }
                Tile::GhostSpawn(color) => {
                    let spawn = GhostSpawn::new(cell, color);
                    let position = origin + Vec2::splat(ACTOR_OFFSET);
                    let ghost = self.factory.create_ghost(
                        position,
                        spawn.personality,
                        spawn.color,
                        spawn.wait_time,
                        self.ghost_speed_multiplier,
                    );
                    self.ghosts.push(self.entities.len());
                    self.ghost_spawns.push(position);
                    ghost_cells.push(cell);
                    self.entities.push(ghost.into());
                }
                Tile::Exit => layout.add_exit(cell),
            }
        }
        let outside: Vec<IVec2> = layout.exits().iter().copied().chain(player_cell).collect();
        let spawn_area = self.spawn_area_override.or_else(|| SpawnArea::derive(&ghost_cells, &outside));
        if let Some(area) = spawn_area {
            for &exit in layout.exits().iter().filter(|&&exit| area.contains(exit)) {
                warn!(?exit, "Exit marker lies inside the ghost house");
            }
        }
        layout.set_spawn_area(spawn_area);
        self.layout = layout;
        self.source = Some(text.to_string());

        self.attach_collaborators();
        self.start_ready_state();

        if self.player.is_none() {
            warn!("Map has no player spawn, the level will not run");
        }
        info!(
            level = self.level,
            width = self.layout.width(),
            height = self.layout.height(),
            entities = self.entities.len(),
            ghosts = self.ghosts.len(),
            "Level loaded"
        );
        Ok(())
    }

    /// Moves to the next level and reloads the current map for it.
    pub fn advance_level(&mut self) -> GameResult<()> {
        let source = self
            .source
            .take()
            .ok_or_else(|| GameError::InvalidState("no map loaded".to_string()))?;
        self.level += 1;
        self.ghost_speed_multiplier = ghost_speed_multiplier(self.level);
        self.fear_duration_multiplier = fear_duration_multiplier(self.level);
        info!(level = self.level, "Advancing level");
        self.load_from_str(&source)
    }

    /// Drops every model, releasing their views first.
    fn clear(&mut self) {
        let ids: Vec<EntityId> = self.entities.iter().map(|e| e.id()).collect();
        if !ids.is_empty() {
            self.factory.remove_dead_views(&ids);
        }
        self.entities.clear();
        self.player = None;
        self.ghosts.clear();
        self.ghost_spawns.clear();
        self.layout = Layout::default();
        self.phase = Phase::Playing;
        self.fear_remaining = None;
        self.level_cleared = false;
        self.prev_player_center = None;
        self.source = None;
    }

    fn attach_collaborators(&mut self) {
        let observers: Vec<SharedObserver> = self
            .score
            .iter()
            .map(|score| score.clone() as SharedObserver)
            .chain(self.lives.iter().map(|lives| lives.clone() as SharedObserver))
            .collect();
        for observer in &observers {
            self.attach_observer(observer);
        }
    }

    /// Subscribes `observer` to the world's own events and to every current model.
    pub fn attach_observer(&mut self, observer: &SharedObserver) {
        self.subject.attach(observer);
        for entity in &mut self.entities {
            entity.attach(observer);
        }
    }

    fn detach_observer(&mut self, observer: &SharedObserver) {
        self.subject.detach(observer);
        for entity in &mut self.entities {
            entity.detach(observer);
        }
    }

    pub fn set_score(&mut self, score: Rc<RefCell<Score>>) {
        if let Some(previous) = self.score.take() {
            self.detach_observer(&(previous as SharedObserver));
        }
        self.attach_observer(&(score.clone() as SharedObserver));
        self.score = Some(score);
    }

    pub fn set_lives(&mut self, lives: Rc<RefCell<Lives>>) {
        if let Some(previous) = self.lives.take() {
            self.detach_observer(&(previous as SharedObserver));
        }
        self.attach_observer(&(lives.clone() as SharedObserver));
        self.lives = Some(lives);
    }

    pub fn score(&self) -> Option<&Rc<RefCell<Score>>> {
        self.score.as_ref()
    }

    pub fn lives(&self) -> Option<&Rc<RefCell<Lives>>> {
        self.lives.as_ref()
    }

    /// Advances the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        formatter::increment_frame();
        if self.player.is_none() {
            return;
        }

        match self.phase {
            Phase::Playing => {}
            Phase::Ready { remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining <= 0.0 {
                    Phase::Playing
                } else {
                    Phase::Ready { remaining }
                };
                return;
            }
            Phase::Dying { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = Phase::Playing;
                    self.respawn_pacman_and_ghosts();
                    self.start_ready_state();
                } else {
                    self.phase = Phase::Dying { remaining };
                }
                return;
            }
            Phase::LevelCleared { remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining <= 0.0 {
                    Phase::Playing
                } else {
                    Phase::LevelCleared { remaining }
                };
                return;
            }
        }

        if self.is_game_over() || self.level_cleared {
            return;
        }

        if let Some(score) = &self.score {
            score.borrow_mut().update_score_decay(dt);
        }
        self.update_player(dt);
        self.update_ghosts(dt);
        self.update_fear_mode(dt);
        self.check_collisions();
        self.remove_dead_entities();
        self.check_level_complete();
    }

    /// Turn arbitration, wall stops and movement for Pac-Man.
    fn update_player(&mut self, dt: f32) {
        let Some(index) = self.player else {
            return;
        };
        let layout = &self.layout;
        let Some(pacman) = self.entities[index].as_pacman_mut() else {
            return;
        };

        let half = pacman.body().size() / 2.0;
        let center = pacman.center();
        let cell = pacman.grid_cell();
        let cell_center = cell.as_vec2() + Vec2::splat(0.5);
        let prev = self.prev_player_center.unwrap_or(center);
        self.prev_player_center = Some(center);

        let tolerance = PLAYER_CENTER_TOLERANCE.max(pacman.speed() * dt * 1.5);
        let near = |prev: f32, now: f32, line: f32| (now - line).abs() <= tolerance || (prev - line) * (now - line) <= 0.0;
        let at_center = near(prev.x, center.x, cell_center.x) && near(prev.y, center.y, cell_center.y);

        if let Some(desired) = pacman.desired_direction() {
            let current = pacman.direction();
            if current != Some(desired) && !layout.has_wall(cell + desired.as_ivec2()) {
                let perpendicular = current.is_some_and(|c| c.is_perpendicular_to(desired));
                if current.is_none() || !perpendicular || at_center {
                    let snapped = if current.is_none() || perpendicular {
                        cell_center
                    } else if desired.is_horizontal() {
                        Vec2::new(center.x, cell_center.y)
                    } else {
                        Vec2::new(cell_center.x, center.y)
                    };
                    pacman.body_mut().set_center(snapped);
                    pacman.set_direction(Some(desired));
                }
            }
        }

        if let Some(direction) = pacman.direction() {
            let wall = cell + direction.as_ivec2();
            if layout.has_wall(wall) && past_stop_line(pacman.center(), direction, wall, half) {
                pacman.set_direction(None);
                pacman.hit_wall();
            }
        }

        pacman.update(dt, true);

        if let Some(direction) = pacman.direction() {
            let wall = cell + direction.as_ivec2();
            if layout.has_wall(wall) {
                let clamped = clamp_to_stop_line(pacman.center(), direction, wall, half);
                pacman.body_mut().set_center(clamped);
            }
        }
    }

    fn update_ghosts(&mut self, dt: f32) {
        let Some(pacman) = self.pacman() else {
            return;
        };
        let nav = Navigation {
            layout: &self.layout,
            player_cell: pacman.grid_cell(),
            player_direction: pacman.direction(),
        };
        for &index in &self.ghosts {
            if let Some(ghost) = self.entities[index].as_ghost_mut() {
                ghost.update(dt, &nav, &mut self.rng);
            }
        }
    }

    fn update_fear_mode(&mut self, dt: f32) {
        let Some(remaining) = self.fear_remaining else {
            return;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.fear_remaining = None;
            self.for_each_ghost(Ghost::exit_fear_mode);
            debug!("Fear mode ended");
            return;
        }
        self.fear_remaining = Some(remaining);
        if remaining <= FEAR_ENDING_THRESHOLD {
            self.for_each_ghost(|ghost| ghost.set_fear_mode_ending(true));
        }
    }

    fn check_collisions(&mut self) {
        let Some(player_index) = self.player else {
            return;
        };
        let player = self.entities[player_index].body();
        let hits: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(i, entity)| {
                *i != player_index && !entity.is_dead() && entity.kind() != EntityKind::Wall && player.overlaps(entity.body())
            })
            .map(|(i, _)| i)
            .collect();

        let mut player_died = false;
        for index in hits {
            match self.entities[index].kind() {
                EntityKind::Ghost => {
                    if self.entities[index].as_ghost().is_some_and(Ghost::is_frightened) {
                        self.eat_ghost(index);
                    } else {
                        player_died = true;
                    }
                }
                kind @ (EntityKind::Coin | EntityKind::Fruit) => {
                    if let Some(item) = self.entities[index].as_item_mut() {
                        item.collect();
                    }
                    if kind == EntityKind::Fruit {
                        self.activate_fear_mode();
                    }
                }
                EntityKind::Wall | EntityKind::Pacman => {}
            }
        }

        if player_died && self.lives.is_some() {
            self.kill_pacman();
        }
    }

    fn eat_ghost(&mut self, index: usize) {
        let Some(spawn) = self
            .ghosts
            .iter()
            .position(|&i| i == index)
            .and_then(|slot| self.ghost_spawns.get(slot).copied())
        else {
            return;
        };
        let Some(ghost) = self.entities[index].as_ghost_mut() else {
            return;
        };
        ghost.on_eaten();
        ghost.body_mut().set_position(spawn);
        ghost.set_direction(Some(Direction::Up));
        ghost.exit_fear_mode();
        ghost.respawn_after_eaten();
        debug!(color = %ghost.color(), "Ghost eaten");
    }

    fn kill_pacman(&mut self) {
        if let Some(pacman) = self.pacman_mut() {
            pacman.die();
        }
        if self.fear_remaining.take().is_some() {
            self.for_each_ghost(Ghost::exit_fear_mode);
        }
        self.phase = Phase::Dying {
            remaining: DEATH_ANIMATION_DURATION,
        };
        info!("Pac-Man died");
    }

    /// Drops models marked dead, letting the factory release their views first.
    fn remove_dead_entities(&mut self) {
        let dead: Vec<EntityId> = self.entities.iter().filter(|e| e.is_dead()).map(|e| e.id()).collect();
        if dead.is_empty() {
            return;
        }
        self.factory.remove_dead_views(&dead);
        self.entities.retain(|e| !e.is_dead());

        self.player = self.entities.iter().position(|e| e.kind() == EntityKind::Pacman);
        self.ghosts = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() == EntityKind::Ghost)
            .map(|(i, _)| i)
            .collect();
    }

    fn check_level_complete(&mut self) {
        if self.level_cleared || self.phase != Phase::Playing {
            return;
        }
        let remaining = self.entities.iter().filter(|e| !e.is_dead() && e.kind().is_collectable()).count();
        if remaining > 0 {
            return;
        }
        self.level_cleared = true;
        self.phase = Phase::LevelCleared {
            remaining: LEVEL_CLEARED_DURATION,
        };
        info!(level = self.level, "Level cleared");
        self.subject.notify(GameEvent::LevelCleared);
    }

    fn respawn_pacman_and_ghosts(&mut self) {
        if let Some(pacman) = self.pacman_mut() {
            pacman.respawn();
        }
        self.prev_player_center = None;
        for (slot, &index) in self.ghosts.iter().enumerate() {
            let (Some(&spawn), Some(ghost)) = (self.ghost_spawns.get(slot), self.entities[index].as_ghost_mut()) else {
                continue;
            };
            ghost.body_mut().set_position(spawn);
            ghost.set_direction(Some(Direction::Up));
            ghost.reset_spawn_flag();
            ghost.exit_fear_mode();
        }
    }

    fn for_each_ghost(&mut self, mut f: impl FnMut(&mut Ghost)) {
        for &index in &self.ghosts {
            if let Some(ghost) = self.entities[index].as_ghost_mut() {
                f(ghost);
            }
        }
    }

    pub fn start_ready_state(&mut self) {
        self.phase = Phase::Ready {
            remaining: READY_DURATION,
        };
    }

    /// Frightens every ghost for this level's fear duration.
    pub fn activate_fear_mode(&mut self) {
        self.fear_remaining = Some(self.fear_mode_duration());
        self.for_each_ghost(Ghost::enter_fear_mode);
        debug!(duration = self.fear_mode_duration(), "Fear mode started");
    }

    /// Overrides the ghost house for this and later loads. `None` derives it from the
    /// ghost spawn cells again on the next load.
    pub fn set_spawn_area(&mut self, spawn_area: Option<SpawnArea>) {
        self.spawn_area_override = spawn_area;
        if spawn_area.is_some() {
            self.layout.set_spawn_area(spawn_area);
        }
    }

    pub fn set_desired_direction(&mut self, direction: Option<Direction>) {
        if let Some(pacman) = self.pacman_mut() {
            pacman.set_desired_direction(direction);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready_state_active(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    pub fn is_death_animation_active(&self) -> bool {
        matches!(self.phase, Phase::Dying { .. })
    }

    pub fn is_level_cleared_display_active(&self) -> bool {
        matches!(self.phase, Phase::LevelCleared { .. })
    }

    pub fn is_level_cleared(&self) -> bool {
        self.level_cleared
    }

    pub fn is_fear_mode_active(&self) -> bool {
        self.fear_remaining.is_some()
    }

    pub fn is_fear_mode_ending(&self) -> bool {
        self.fear_remaining.is_some_and(|remaining| remaining <= FEAR_ENDING_THRESHOLD)
    }

    pub fn is_game_over(&self) -> bool {
        self.lives.as_ref().is_some_and(|lives| lives.borrow().is_game_over())
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn ghost_speed_multiplier(&self) -> f32 {
        self.ghost_speed_multiplier
    }

    pub fn fear_duration_multiplier(&self) -> f32 {
        self.fear_duration_multiplier
    }

    pub fn fear_mode_duration(&self) -> f32 {
        FEAR_BASE_DURATION * self.fear_duration_multiplier
    }

    pub fn entities(&self) -> &[WorldEntity] {
        &self.entities
    }

    pub fn pacman(&self) -> Option<&Pacman> {
        self.player.and_then(|index| self.entities[index].as_pacman())
    }

    pub fn pacman_mut(&mut self) -> Option<&mut Pacman> {
        self.player.and_then(|index| self.entities[index].as_pacman_mut())
    }

    /// Ghosts in map order.
    pub fn ghosts(&self) -> impl Iterator<Item = &Ghost> + '_ {
        self.ghosts.iter().filter_map(|&index| self.entities[index].as_ghost())
    }

    pub fn ghost_spawn_positions(&self) -> &[Vec2] {
        &self.ghost_spawns
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn map_width(&self) -> i32 {
        self.layout.width()
    }

    pub fn map_height(&self) -> i32 {
        self.layout.height()
    }

    pub fn exit_positions(&self) -> &[IVec2] {
        self.layout.exits()
    }

    pub fn is_exit_position(&self, cell: IVec2) -> bool {
        self.layout.is_exit(cell)
    }

    pub fn has_wall_in_grid_cell(&self, cell: IVec2) -> bool {
        self.layout.has_wall(cell)
    }
}

/// Whether Pac-Man's leading edge has reached the wall in cell `wall`.
fn past_stop_line(center: Vec2, direction: Direction, wall: IVec2, half: f32) -> bool {
    let wall = wall.as_vec2();
    match direction {
        Direction::Left => center.x <= wall.x + 1.0 + half + STOP_EPSILON,
        Direction::Right => center.x >= wall.x - half - STOP_EPSILON,
        Direction::Up => center.y <= wall.y + 1.0 + half + STOP_EPSILON,
        Direction::Down => center.y >= wall.y - half - STOP_EPSILON,
    }
}

/// Pulls `center` back onto the stop line if a move carried it past.
fn clamp_to_stop_line(center: Vec2, direction: Direction, wall: IVec2, half: f32) -> Vec2 {
    let wall = wall.as_vec2();
    match direction {
        Direction::Left => Vec2::new(center.x.max(wall.x + 1.0 + half), center.y),
        Direction::Right => Vec2::new(center.x.min(wall.x - half), center.y),
        Direction::Up => Vec2::new(center.x, center.y.max(wall.y + 1.0 + half)),
        Direction::Down => Vec2::new(center.x, center.y.min(wall.y - half)),
    }
}
