//! Per-tick snapshot handed to an optional external visualiser.
//!
//! Nothing in the core depends on whether a frame is consumed.

use geo::Point;
use ndarray::Array1;

/// What a visualiser needs to draw one live agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    /// Agent identifier.
    pub id: usize,
    /// World position.
    pub position: Point<f32>,
    /// Heading in degrees.
    pub heading: f32,
}

/// The agent singled out for a closer look: the sole survivor, if there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusView {
    /// Agent identifier.
    pub id: usize,
    /// Sensor reading the agent acted on this tick.
    pub reading: Array1<f32>,
}

/// Snapshot of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Generation counter of the population.
    pub generation: u32,
    /// Ticks elapsed in this generation.
    pub tick: u64,
    /// Viewport leading edge.
    pub viewport_left: f32,
    /// Live agents in identifier order.
    pub agents: Vec<AgentView>,
    /// Sole survivor and its latest reading.
    pub focus: Option<FocusView>,
}

/// Receives a frame after every tick.
pub trait RenderHook {
    /// Called once per tick with the post-tick state.
    fn on_frame(&mut self, frame: &RenderFrame);
}

impl<F: FnMut(&RenderFrame)> RenderHook for F {
    fn on_frame(&mut self, frame: &RenderFrame) {
        self(frame);
    }
}
