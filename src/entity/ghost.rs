//! Ghost entity implementation.
//!
//! A ghost runs a four-state machine (waiting in the house, exiting it, chasing,
//! frightened). Outside the house it moves cell by cell: at every new cell center it
//! may pick a direction among the viable ones, never reversing unless it is boxed in.

use glam::{IVec2, Vec2};
use smallvec::SmallVec;
use strum_macros::{AsRefStr, Display};
use tracing::{debug, trace};

use crate::constants::{AMBUSH_LOOKAHEAD, GHOST_BASE_SPEED, GHOST_CENTER_TOLERANCE, GHOST_FEAR_SPEED, GHOST_SIZE};
use crate::entity::direction::Direction;
use crate::entity::{Body, Entity, EntityKind};
use crate::events::GameEvent;
use crate::map::{manhattan, Layout};
use crate::rng::GameRng;

/// How a ghost picks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Personality {
    /// Wanders, sometimes keeping its heading.
    Random,
    /// Aims a few cells ahead of Pac-Man.
    Ambusher,
    /// Heads straight for Pac-Man.
    Chaser,
}

/// Cosmetic tag surfaced to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum GhostColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum GhostState {
    Waiting,
    Exiting,
    Chasing,
    Fear,
}

/// What a ghost may look at while deciding where to go.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    pub layout: &'a Layout,
    pub player_cell: IVec2,
    pub player_direction: Option<Direction>,
}

type Candidates = SmallVec<[Direction; 4]>;

#[derive(Debug)]
pub struct Ghost {
    body: Body,
    personality: Personality,
    color: GhostColor,
    state: GhostState,
    wait_timer: f32,
    original_wait_time: f32,
    normal_speed: f32,
    fear_speed: f32,
    speed: f32,
    /// Cell of the most recent direction decision, so each cell is decided once.
    last_decision: Option<IVec2>,
    has_left_spawn: bool,
    fear_mode_ending: bool,
    enter_fear_when_leaving: bool,
}

impl Ghost {
    /// Creates a ghost waiting in the house, facing up.
    pub fn new(position: Vec2, personality: Personality, color: GhostColor, wait_time: f32, speed_multiplier: f32) -> Self {
        let mut body = Body::new(position, GHOST_SIZE);
        body.set_direction(Some(Direction::Up));
        let normal_speed = GHOST_BASE_SPEED * speed_multiplier;
        Self {
            body,
            personality,
            color,
            state: GhostState::Waiting,
            wait_timer: wait_time,
            original_wait_time: wait_time,
            normal_speed,
            fear_speed: GHOST_FEAR_SPEED,
            speed: normal_speed,
            last_decision: None,
            has_left_spawn: false,
            fear_mode_ending: false,
            enter_fear_when_leaving: false,
        }
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn color(&self) -> GhostColor {
        self.color
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn normal_speed(&self) -> f32 {
        self.normal_speed
    }

    pub fn wait_timer(&self) -> f32 {
        self.wait_timer
    }

    pub fn has_left_spawn(&self) -> bool {
        self.has_left_spawn
    }

    pub fn is_frightened(&self) -> bool {
        self.state == GhostState::Fear
    }

    pub fn is_fear_mode_ending(&self) -> bool {
        self.fear_mode_ending
    }

    pub fn set_fear_mode_ending(&mut self, ending: bool) {
        self.fear_mode_ending = ending;
    }

    /// Whether fear was requested while the ghost was still inside the house.
    pub fn will_enter_fear_when_leaving(&self) -> bool {
        self.enter_fear_when_leaving
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.body.set_direction(direction);
    }

    /// Advances the state machine and moves the ghost by one frame.
    pub fn update(&mut self, dt: f32, nav: &Navigation<'_>, rng: &mut GameRng) {
        match self.state {
            GhostState::Waiting => {
                self.wait_timer -= dt;
                if self.wait_timer <= 0.0 {
                    self.state = GhostState::Exiting;
                    debug!(color = %self.color, "Ghost leaves its waiting spot");
                    self.route_to_exit(self.grid_cell(), nav.layout, rng);
                }
                return;
            }
            GhostState::Exiting if nav.layout.is_exit(self.grid_cell()) => self.leave_spawn(),
            _ => {}
        }

        self.step(dt, nav, rng);
    }

    /// Switches to chasing (or fear, if it was queued) on reaching an exit marker.
    ///
    /// The new heading is picked at the exit cell's center by the regular decision step.
    fn leave_spawn(&mut self) {
        if self.enter_fear_when_leaving {
            self.enter_fear_when_leaving = false;
            self.state = GhostState::Fear;
            self.speed = self.fear_speed;
        } else {
            self.state = GhostState::Chasing;
        }
        self.has_left_spawn = true;
        self.last_decision = None;
        debug!(color = %self.color, state = %self.state, "Ghost left the house");
    }

    fn step(&mut self, dt: f32, nav: &Navigation<'_>, rng: &mut GameRng) {
        let Some(mut direction) = self.body.direction() else {
            return;
        };
        let center = self.center();
        let cell = self.grid_cell();
        let cell_center = cell.as_vec2() + Vec2::splat(0.5);
        let mut wall_ahead = self.is_blocked(cell + direction.as_ivec2(), nav.layout);

        let at_center = (center - cell_center).abs().max_element() <= GHOST_CENTER_TOLERANCE;
        if at_center && self.last_decision != Some(cell) {
            let viable = self.viable_directions(cell, nav.layout);
            if viable.len() >= 2 || wall_ahead {
                let chosen = match self.state {
                    GhostState::Exiting => self.route(cell, &viable, nav.layout, rng),
                    _ => self.pick_direction(cell, &viable, nav, rng),
                };
                self.last_decision = Some(cell);
                if let Some(chosen) = chosen {
                    if chosen != direction {
                        trace!(color = %self.color, ?cell, from = direction.as_ref(), to = chosen.as_ref(), "Ghost turns");
                        self.body.set_center(cell_center);
                        self.body.set_direction(Some(chosen));
                        direction = chosen;
                    }
                }
                wall_ahead = self.is_blocked(cell + direction.as_ivec2(), nav.layout);
            }
        }

        let travel = self.speed * dt;
        if !wall_ahead {
            self.body.translate(direction.as_vec2() * travel);
        } else {
            let to_center = cell_center - self.center();
            self.body.translate(to_center.clamp(Vec2::splat(-travel), Vec2::splat(travel)));
        }
    }

    /// A cell the ghost may not enter: a wall, or the house once it has left it.
    fn is_blocked(&self, cell: IVec2, layout: &Layout) -> bool {
        !layout.contains(cell) || layout.has_wall(cell) || (self.has_left_spawn && layout.in_spawn_area(cell))
    }

    /// Directions the ghost may take from `cell`.
    ///
    /// Reversing is only offered as a last resort at intersections or as a forced
    /// turnaround at dead ends.
    pub fn viable_directions(&self, cell: IVec2, layout: &Layout) -> SmallVec<[Direction; 4]> {
        let opposite = self.body.direction().map(Direction::opposite);
        let open = |direction: Direction| !self.is_blocked(cell + direction.as_ivec2(), layout);

        let mut viable: Candidates = Direction::DIRECTIONS
            .into_iter()
            .filter(|&direction| Some(direction) != opposite && open(direction))
            .collect();

        if let Some(opposite) = opposite {
            if open(opposite) && (viable.len() >= 2 || viable.is_empty()) {
                viable.push(opposite);
            }
        }
        viable
    }

    fn pick_direction(&self, cell: IVec2, viable: &[Direction], nav: &Navigation<'_>, rng: &mut GameRng) -> Option<Direction> {
        if viable.len() <= 1 {
            return viable.first().copied();
        }

        if self.personality == Personality::Random {
            let current = self.body.direction().filter(|direction| viable.contains(direction));
            return match current {
                Some(current) if !rng.coin_flip() => Some(current),
                _ => rng.choose(viable),
            };
        }

        let target = self.target_cell(cell, nav);
        let flee = self.state == GhostState::Fear;
        self.best_by(viable, rng, |direction| {
            let distance = manhattan(cell + direction.as_ivec2(), target);
            if flee {
                -distance
            } else {
                distance
            }
        })
    }

    /// The cell this ghost is heading for while outside the house.
    pub fn target_cell(&self, cell: IVec2, nav: &Navigation<'_>) -> IVec2 {
        if self.state == GhostState::Fear || self.personality != Personality::Ambusher {
            return nav.player_cell;
        }

        let Some(heading) = nav.player_direction else {
            return nav.player_cell;
        };
        let max = IVec2::new(nav.layout.width() - 1, nav.layout.height() - 1).max(IVec2::ZERO);
        let ahead = (nav.player_cell + heading.as_ivec2() * AMBUSH_LOOKAHEAD).clamp(IVec2::ZERO, max);
        if manhattan(cell, ahead) <= manhattan(nav.player_cell, ahead) {
            nav.player_cell
        } else {
            ahead
        }
    }

    fn route_to_exit(&mut self, cell: IVec2, layout: &Layout, rng: &mut GameRng) {
        let viable = self.viable_directions(cell, layout);
        if let Some(direction) = self.route(cell, &viable, layout, rng) {
            self.body.set_direction(Some(direction));
        }
    }

    /// Picks the viable direction leading closest to an exit marker.
    fn route(&self, cell: IVec2, viable: &[Direction], layout: &Layout, rng: &mut GameRng) -> Option<Direction> {
        if layout.exits().is_empty() {
            return viable.first().copied();
        }
        self.best_by(viable, rng, |direction| {
            layout.nearest_exit_distance(cell + direction.as_ivec2()).unwrap_or(i32::MAX)
        })
    }

    /// Lowest-cost direction with a uniform tie-break. The reverse direction only
    /// wins when it is strictly better than every forward option.
    fn best_by(&self, viable: &[Direction], rng: &mut GameRng, cost: impl Fn(Direction) -> i32) -> Option<Direction> {
        let opposite = self.body.direction().map(Direction::opposite);
        let mut best: Option<i32> = None;
        let mut ties = Candidates::new();
        for direction in viable.iter().copied().filter(|&d| Some(d) != opposite) {
            let c = cost(direction);
            match best {
                Some(b) if c > b => {}
                Some(b) if c == b => ties.push(direction),
                _ => {
                    best = Some(c);
                    ties.clear();
                    ties.push(direction);
                }
            }
        }

        let reverse = opposite.filter(|d| viable.contains(d));
        match (best, reverse) {
            (Some(best), Some(reverse)) if cost(reverse) < best => Some(reverse),
            (Some(_), _) => rng.choose(&ties),
            (None, reverse) => reverse,
        }
    }

    /// Frightens the ghost, or queues fear while it is still in the house.
    pub fn enter_fear_mode(&mut self) {
        match self.state {
            GhostState::Waiting | GhostState::Exiting => self.enter_fear_when_leaving = true,
            GhostState::Fear => self.fear_mode_ending = false,
            GhostState::Chasing => {
                self.state = GhostState::Fear;
                self.speed = self.fear_speed;
                self.fear_mode_ending = false;
                let reversed = self.body.direction().map(Direction::opposite);
                self.body.set_direction(reversed);
                self.last_decision = None;
                debug!(color = %self.color, "Ghost frightened");
            }
        }
    }

    pub fn exit_fear_mode(&mut self) {
        self.fear_mode_ending = false;
        if self.state != GhostState::Fear {
            self.enter_fear_when_leaving = false;
            return;
        }
        self.state = GhostState::Chasing;
        self.speed = self.normal_speed;
        self.last_decision = None;
        debug!(color = %self.color, "Ghost no longer frightened");
    }

    /// Sends the ghost back to waiting with its original timer.
    pub fn reset_spawn_flag(&mut self) {
        self.state = GhostState::Waiting;
        self.wait_timer = self.original_wait_time;
        self.has_left_spawn = false;
        self.speed = self.normal_speed;
        self.last_decision = None;
    }

    /// After being eaten the ghost heads straight for the exit, skipping the wait.
    pub fn respawn_after_eaten(&mut self) {
        self.state = GhostState::Exiting;
        self.wait_timer = -1.0;
        self.has_left_spawn = false;
        self.last_decision = None;
    }

    pub fn on_eaten(&mut self) {
        self.body.notify(GameEvent::GhostEaten);
    }
}

impl Entity for Ghost {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Ghost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SpawnArea;

    /// A 7x7 box with a plus-shaped corridor through the middle.
    fn crossroads() -> Layout {
        let mut layout = Layout::new(7, 7);
        for y in 0..7 {
            for x in 0..7 {
                if x != 3 && y != 3 || x == 0 || y == 0 || x == 6 || y == 6 {
                    layout.set_wall(IVec2::new(x, y));
                }
            }
        }
        layout
    }

    fn ghost_at(cell: IVec2, personality: Personality) -> Ghost {
        Ghost::new(cell.as_vec2() + Vec2::splat(0.1), personality, GhostColor::Red, 0.0, 1.0)
    }

    fn chasing(cell: IVec2, personality: Personality, direction: Direction) -> Ghost {
        let mut ghost = ghost_at(cell, personality);
        ghost.state = GhostState::Chasing;
        ghost.has_left_spawn = true;
        ghost.set_direction(Some(direction));
        ghost
    }

    fn nav(layout: &Layout, player_cell: IVec2) -> Navigation<'_> {
        Navigation {
            layout,
            player_cell,
            player_direction: None,
        }
    }

    #[test]
    fn test_new_ghost_waits_facing_up() {
        let ghost = Ghost::new(Vec2::new(9.1, 9.1), Personality::Chaser, GhostColor::Orange, 5.0, 1.18);
        assert_eq!(ghost.state(), GhostState::Waiting);
        assert_eq!(ghost.direction(), Some(Direction::Up));
        assert!((ghost.speed() - 2.95).abs() < 1e-5);
        assert!(!ghost.has_left_spawn());
    }

    #[test]
    fn test_viable_excludes_reverse_in_corridor() {
        let layout = crossroads();
        let ghost = chasing(IVec2::new(2, 3), Personality::Chaser, Direction::Right);
        let viable = ghost.viable_directions(IVec2::new(2, 3), &layout);
        assert_eq!(viable.as_slice(), &[Direction::Right]);
    }

    #[test]
    fn test_viable_appends_reverse_at_intersection() {
        let layout = crossroads();
        let ghost = chasing(IVec2::new(3, 3), Personality::Chaser, Direction::Right);
        let viable = ghost.viable_directions(IVec2::new(3, 3), &layout);
        assert_eq!(viable.as_slice(), &[Direction::Up, Direction::Down, Direction::Right, Direction::Left]);
    }

    #[test]
    fn test_viable_forced_turnaround_at_dead_end() {
        let layout = crossroads();
        let ghost = chasing(IVec2::new(5, 3), Personality::Chaser, Direction::Right);
        let viable = ghost.viable_directions(IVec2::new(5, 3), &layout);
        assert_eq!(viable.as_slice(), &[Direction::Left]);
    }

    #[test]
    fn test_spawn_area_blocks_after_leaving() {
        let mut layout = crossroads();
        layout.set_spawn_area(Some(SpawnArea::new(IVec2::new(3, 4), IVec2::new(3, 5))));
        let ghost = chasing(IVec2::new(3, 3), Personality::Chaser, Direction::Right);
        let viable = ghost.viable_directions(IVec2::new(3, 3), &layout);
        assert!(!viable.contains(&Direction::Down));
    }

    #[test]
    fn test_chaser_closes_distance() {
        let layout = crossroads();
        let mut rng = GameRng::seeded(3);
        let mut ghost = chasing(IVec2::new(3, 3), Personality::Chaser, Direction::Right);
        let nav = nav(&layout, IVec2::new(3, 1));
        ghost.update(0.01, &nav, &mut rng);
        assert_eq!(ghost.direction(), Some(Direction::Up));
    }

    #[test]
    fn test_frightened_ghost_flees() {
        let layout = crossroads();
        let mut rng = GameRng::seeded(3);
        let mut ghost = chasing(IVec2::new(3, 3), Personality::Chaser, Direction::Left);
        ghost.enter_fear_mode();
        assert_eq!(ghost.direction(), Some(Direction::Right));
        let nav = nav(&layout, IVec2::new(3, 1));
        ghost.update(0.01, &nav, &mut rng);
        let fled = ghost.direction();
        assert!(fled == Some(Direction::Down) || fled == Some(Direction::Right), "{fled:?}");
    }

    #[test]
    fn test_decision_made_once_per_cell() {
        let layout = crossroads();
        let mut rng = GameRng::seeded(11);
        let mut ghost = chasing(IVec2::new(3, 3), Personality::Random, Direction::Right);
        let nav = nav(&layout, IVec2::new(1, 1));
        ghost.update(0.001, &nav, &mut rng);
        let first = ghost.direction();
        for _ in 0..5 {
            ghost.update(0.001, &nav, &mut rng);
            assert_eq!(ghost.direction(), first);
        }
    }

    #[test]
    fn test_halts_at_cell_center_before_wall() {
        let layout = crossroads();
        let mut rng = GameRng::seeded(5);
        let mut ghost = chasing(IVec2::new(5, 3), Personality::Chaser, Direction::Right);
        ghost.last_decision = Some(IVec2::new(5, 3));
        ghost.body_mut().set_center(Vec2::new(5.3, 3.5));
        let nav = nav(&layout, IVec2::new(1, 3));
        for _ in 0..10 {
            ghost.update(0.1, &nav, &mut rng);
        }
        assert!((ghost.center() - Vec2::new(5.5, 3.5)).length() < 1e-4);
    }

    #[test]
    fn test_waiting_counts_down_then_exits() {
        let mut layout = crossroads();
        layout.add_exit(IVec2::new(3, 1));
        let mut rng = GameRng::seeded(9);
        let mut ghost = Ghost::new(Vec2::new(3.1, 5.1), Personality::Chaser, GhostColor::Cyan, 0.5, 1.0);
        let nav = nav(&layout, IVec2::new(1, 3));

        ghost.update(0.3, &nav, &mut rng);
        assert_eq!(ghost.state(), GhostState::Waiting);
        assert_eq!(ghost.position(), Vec2::new(3.1, 5.1));

        ghost.update(0.3, &nav, &mut rng);
        assert_eq!(ghost.state(), GhostState::Exiting);
        assert_eq!(ghost.direction(), Some(Direction::Up));
    }

    #[test]
    fn test_exit_marker_starts_chase_or_queued_fear() {
        let mut layout = crossroads();
        layout.add_exit(IVec2::new(3, 3));
        let mut rng = GameRng::seeded(9);
        let mut ghost = ghost_at(IVec2::new(3, 3), Personality::Chaser);
        ghost.respawn_after_eaten();
        ghost.enter_fear_mode();
        assert_eq!(ghost.state(), GhostState::Exiting);
        assert!(ghost.will_enter_fear_when_leaving());

        ghost.update(0.01, &nav(&layout, IVec2::new(1, 3)), &mut rng);
        assert_eq!(ghost.state(), GhostState::Fear);
        assert_eq!(ghost.speed(), GHOST_FEAR_SPEED);
        assert!(ghost.has_left_spawn());
        assert!(!ghost.will_enter_fear_when_leaving());
    }

    #[test]
    fn test_ambusher_targets_ahead_of_player() {
        let layout = Layout::new(21, 21);
        let ghost = chasing(IVec2::new(1, 1), Personality::Ambusher, Direction::Right);
        let nav = Navigation {
            layout: &layout,
            player_cell: IVec2::new(10, 10),
            player_direction: Some(Direction::Right),
        };
        assert_eq!(ghost.target_cell(IVec2::new(1, 1), &nav), IVec2::new(14, 10));
    }

    #[test]
    fn test_ambusher_lookahead_clamps_to_map() {
        let layout = Layout::new(12, 12);
        let ghost = chasing(IVec2::new(1, 1), Personality::Ambusher, Direction::Right);
        let nav = Navigation {
            layout: &layout,
            player_cell: IVec2::new(10, 5),
            player_direction: Some(Direction::Right),
        };
        assert_eq!(ghost.target_cell(IVec2::new(1, 1), &nav), IVec2::new(11, 5));
    }

    #[test]
    fn test_ambusher_falls_back_to_player_when_close() {
        let layout = Layout::new(21, 21);
        let ghost = chasing(IVec2::new(14, 10), Personality::Ambusher, Direction::Left);
        let nav = Navigation {
            layout: &layout,
            player_cell: IVec2::new(10, 10),
            player_direction: Some(Direction::Right),
        };
        assert_eq!(ghost.target_cell(IVec2::new(14, 10), &nav), IVec2::new(10, 10));
    }

    #[test]
    fn test_fear_transitions() {
        let mut ghost = chasing(IVec2::new(3, 3), Personality::Chaser, Direction::Up);
        ghost.enter_fear_mode();
        assert_eq!(ghost.state(), GhostState::Fear);
        assert_eq!(ghost.direction(), Some(Direction::Down));

        ghost.set_fear_mode_ending(true);
        ghost.enter_fear_mode();
        assert!(!ghost.is_fear_mode_ending());
        assert_eq!(ghost.direction(), Some(Direction::Down));

        ghost.exit_fear_mode();
        assert_eq!(ghost.state(), GhostState::Chasing);
        assert_eq!(ghost.speed(), ghost.normal_speed());
    }

    #[test]
    fn test_waiting_ghost_queues_fear_and_exit_clears_it() {
        let mut ghost = ghost_at(IVec2::new(9, 9), Personality::Random);
        ghost.enter_fear_mode();
        assert_eq!(ghost.state(), GhostState::Waiting);
        assert!(ghost.will_enter_fear_when_leaving());
        ghost.exit_fear_mode();
        assert!(!ghost.will_enter_fear_when_leaving());
    }

    #[test]
    fn test_reset_spawn_flag_restores_wait() {
        let mut ghost = Ghost::new(Vec2::new(9.1, 9.1), Personality::Random, GhostColor::Pink, 10.0, 1.0);
        ghost.state = GhostState::Fear;
        ghost.speed = GHOST_FEAR_SPEED;
        ghost.wait_timer = -3.0;
        ghost.has_left_spawn = true;

        ghost.reset_spawn_flag();

        assert_eq!(ghost.state(), GhostState::Waiting);
        assert_eq!(ghost.wait_timer(), 10.0);
        assert!(!ghost.has_left_spawn());
        assert_eq!(ghost.speed(), ghost.normal_speed());
    }
}
