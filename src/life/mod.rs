//! The simulation service.
//!
//! [`LifeService`] owns one [`World`] and steps it forward on request. It is
//! built once at startup and shared behind an `Arc` by every handler.

mod world;

use std::fmt;
use std::sync::{Mutex, PoisonError};

pub use world::{MAX_DIMENSION, World};

/// Share of cells alive in a freshly seeded world.
pub const DEFAULT_FILL: f64 = 0.4;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid world dimensions {height}x{width}: each side must be between 1 and {max}", max = MAX_DIMENSION)]
    InvalidDimensions { height: usize, width: usize },
}

/// A world together with the generation number it represents.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub world: World,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.world, f)
    }
}

pub struct LifeService {
    state: Mutex<Snapshot>,
}

impl LifeService {
    /// Creates a randomly seeded `height × width` world at generation 0.
    pub fn new(height: usize, width: usize) -> Result<Self, ServiceError> {
        let mut world = World::new(height, width)?;
        world.seed(DEFAULT_FILL, &mut rand::thread_rng());
        Ok(Self::from_world(world))
    }

    /// Starts from a known world instead of a random one.
    pub fn from_world(world: World) -> Self {
        Self { state: Mutex::new(Snapshot { generation: 0, world }) }
    }

    pub fn current(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Steps the world forward one generation and returns the result.
    pub fn advance(&self) -> Snapshot {
        let mut state = self.lock();
        state.world = state.world.next_state();
        state.generation += 1;
        state.clone()
    }

    // A panic mid-step cannot leave a half-written world: `next_state`
    // builds a fresh grid before the assignment.
    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_dimensions() {
        assert!(matches!(
            LifeService::new(0, 10),
            Err(ServiceError::InvalidDimensions { height: 0, width: 10 })
        ));
        let svc = LifeService::new(10, 10).unwrap();
        let snap = svc.current();
        assert_eq!(snap.generation, 0);
        assert_eq!((snap.world.height(), snap.world.width()), (10, 10));
    }

    #[test]
    fn advance_steps_generation() {
        let mut world = World::new(5, 5).unwrap();
        for col in 1..4 {
            world.set(2, col, true);
        }
        let svc = LifeService::from_world(world.clone());

        let next = svc.advance();
        assert_eq!(next.generation, 1);
        assert_eq!(next.world, world.next_state());
        assert_eq!(svc.current().generation, 1);
    }
}
