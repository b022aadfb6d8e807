//! Event bus connecting models to the things that observe them.
//!
//! Every model owns a [`Subject`]. Observers (score, lives, views) are shared as
//! `Rc<RefCell<dyn Observer>>`; the subject only keeps weak references, so an observer
//! disappears from the bus as soon as its owner drops it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use strum_macros::{Display, EnumIter};
use tracing::warn;

/// Everything a model can announce. Events carry no payload; observers read the
/// producer's state themselves if they need more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    CoinCollected,
    GhostEaten,
    FruitCollected,
    PacmanDied,
    LevelCleared,
    DirectionChanged,
    WallHit,
}

/// Something that wants to hear about [`GameEvent`]s.
pub trait Observer {
    fn on_event(&mut self, event: GameEvent);
}

/// An owning handle to an observer, as passed to [`Subject::attach`].
pub type SharedObserver = Rc<RefCell<dyn Observer>>;

/// The producing half of the event bus.
#[derive(Default)]
pub struct Subject {
    observers: Vec<Weak<RefCell<dyn Observer>>>,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `observer`. Attaching the same observer twice is a no-op.
    pub fn attach(&mut self, observer: &SharedObserver) {
        let weak = Rc::downgrade(observer);
        if !self.observers.iter().any(|existing| existing.ptr_eq(&weak)) {
            self.observers.push(weak);
        }
    }

    pub fn detach(&mut self, observer: &SharedObserver) {
        let weak = Rc::downgrade(observer);
        self.observers.retain(|existing| !existing.ptr_eq(&weak));
    }

    /// Delivers `event` to every live observer, in attach order.
    ///
    /// Expired observers are pruned first.
    pub fn notify(&mut self, event: GameEvent) {
        self.observers.retain(|observer| observer.strong_count() > 0);

        let live: Vec<SharedObserver> = self.observers.iter().filter_map(Weak::upgrade).collect();
        for observer in live {
            match observer.try_borrow_mut() {
                Ok(mut observer) => observer.on_event(event),
                Err(_) => warn!(%event, "Observer is already borrowed, dropping event"),
            }
        }
    }

    /// Number of observers still alive.
    pub fn observer_count(&self) -> usize {
        self.observers.iter().filter(|observer| observer.strong_count() > 0).count()
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject").field("observers", &self.observer_count()).finish()
    }
}
