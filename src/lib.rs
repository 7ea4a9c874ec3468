//! # Dodge - neuro-evolved drivers on a scrolling road
//!
//! A population of agents, each driven by a small feedforward network, races
//! along a road full of potholes. Agents that crash, turn around, or fall
//! behind the scrolling viewport are eliminated. Once every agent is out, the
//! worst half of the networks is replaced with mutated copies of the best half
//! and the next generation starts.
//!
//! ## Features
//!
//! - Feedforward networks (tanh) with seeded in-place mutation
//! - Ray-cast LIDAR sensing against any occupancy field
//! - Nine-point rotated hit test for collisions
//! - Elitist truncation selection
//! - Binary model files for trained populations
//! - Render snapshots for an external visualiser
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Controller network and model encoding
//! - [`simulation::vision`] - LIDAR sensor array
//! - [`simulation::agent`] - Kinematics and elimination
//! - [`simulation::population`] - Selection and mutation
//! - [`simulation::generation`] - Per-tick orchestration
//! - [`simulation::track`] - The default obstacle field

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent pose, kinematics and elimination checks.
    pub mod agent;
    /// Feedforward controller network and its binary model format.
    pub mod brain;
    /// Error type shared by the simulation core.
    pub mod error;
    /// Generation controller tying sensing, thinking and selection together.
    pub mod generation;
    /// Geometric utility functions for rotations and pixel snapping.
    pub mod geometric_utils;
    /// Obstacle field trait and simple implementations.
    pub mod obstacle;
    /// Simulation parameters.
    pub mod params;
    /// Population of brains and truncation selection.
    pub mod population;
    /// Snapshots for an external visualiser.
    pub mod render;
    /// Seedable random sources.
    pub mod rng;
    /// Scrolling road with barriers and potholes.
    pub mod track;
    /// LIDAR sensor array.
    pub mod vision;
}
