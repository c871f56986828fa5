//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (row-major grid, insertion-ordered bolts)
//! - No rendering, audio or input library dependencies

pub mod collision;
pub mod session;
pub mod state;
pub mod wave;

pub use collision::Aabb;
pub use session::{Outcome, SessionController, SessionState};
pub use state::{Alien, AlienGrid, AlienVariant, Bolt, GameEvent, Ship};
pub use wave::WaveSimulation;
