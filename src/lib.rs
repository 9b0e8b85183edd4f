//! Cell Index Method neighbor search and an off-lattice flocking automaton built on it.
//!
//! The core lives in [`core`]: [`core::find_neighbors`] (grid search with optional periodic
//! boundaries), [`core::find_neighbors_naive`] (all-pairs reference), [`core::step`] (one
//! synchronous flocking tick) and the [`core::Flock`] driver. Python bindings are available
//! with the `python` feature.

pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{
    check_geometry, find_neighbors, find_neighbors_naive, step, validate_geometry, Flock,
    FlockParams, NeighborMap, Particle,
};
pub use crate::error::{Error, Result};
