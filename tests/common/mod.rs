#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use pacman_sim::constants::READY_DURATION;
use pacman_sim::events::{GameEvent, Observer, SharedObserver};
use pacman_sim::factory::HeadlessFactory;
use pacman_sim::lives::Lives;
use pacman_sim::rng::GameRng;
use pacman_sim::score::Score;
use pacman_sim::world::World;

/// Collects every event it is notified of.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<GameEvent>,
}

impl Recorder {
    pub fn count(&self, event: GameEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }
}

impl Observer for Recorder {
    fn on_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// A world with its collaborators and an event recorder attached to every model.
pub struct Harness {
    pub world: World,
    pub score: Rc<RefCell<Score>>,
    pub lives: Rc<RefCell<Lives>>,
    pub recorder: Rc<RefCell<Recorder>>,
}

impl Harness {
    pub fn new(map: &str, lives: i32) -> Self {
        let score = Rc::new(RefCell::new(Score::in_memory()));
        let lives = Rc::new(RefCell::new(Lives::new(lives)));
        let recorder = Rc::new(RefCell::new(Recorder::default()));

        let mut world = World::with_rng(Box::new(HeadlessFactory), 1, GameRng::seeded(7));
        world.set_score(score.clone());
        world.set_lives(lives.clone());
        world.load_from_str(map).unwrap();
        world.attach_observer(&(recorder.clone() as SharedObserver));

        Self {
            world,
            score,
            lives,
            recorder,
        }
    }

    /// Runs the READY countdown out in a single frame.
    pub fn skip_ready(&mut self) {
        self.world.update(READY_DURATION);
        assert!(!self.world.is_ready_state_active());
    }

    pub fn count(&self, event: GameEvent) -> usize {
        self.recorder.borrow().count(event)
    }

    /// Steps at `dt` until `done` holds, giving up after `max_frames`. Returns the frames run.
    pub fn run_until(&mut self, dt: f32, max_frames: usize, mut done: impl FnMut(&Self) -> bool) -> usize {
        for frame in 1..=max_frames {
            self.world.update(dt);
            if done(self) {
                return frame;
            }
        }
        panic!("condition not reached within {max_frames} frames");
    }

    pub fn run(&mut self, dt: f32, frames: usize) {
        for _ in 0..frames {
            self.world.update(dt);
        }
    }
}
