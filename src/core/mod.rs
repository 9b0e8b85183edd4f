//! Neighbor search and flocking automaton core.
//!
//! Leaf-first: particles and geometry, the two neighbor finders, the synchronous
//! flocking tick, and the [`Flock`] driver that owns state between ticks.

pub mod brute_force;
pub mod cell_index;
pub mod flocking;
pub mod geometry;
pub mod neighbors;
pub mod params;
pub mod particle;
pub mod sim;

pub use brute_force::find_neighbors_naive;
pub use cell_index::find_neighbors;
pub use flocking::{circular_mean, order_parameter, step};
pub use geometry::{check_geometry, validate_geometry};
pub use neighbors::{NeighborMap, Pair};
pub use params::FlockParams;
pub use particle::Particle;
pub use sim::Flock;
