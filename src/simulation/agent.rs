//! Agent kinematics, fitness and elimination.
//!
//! An agent is Alive until it collides, turns to face backwards, or drops
//! behind the viewport. Elimination is terminal for the generation.

use geo::Point;

use super::geometric_utils::{heading_vector, rotate_about, to_pixel, wrap_degrees};
use super::obstacle::ObstacleField;
use super::params::Params;

/// Hit-test outline with the agent facing 0 degrees, relative to its position.
///
/// ```text
///             p3  p4  p2
///   p5 +---------------+
///      |               |
///      |        +      |  p1 (nose)
///      |               |
///   p6 +---------------+
///             p7  p8  p0
/// ```
pub const FOOTPRINT: [(f32, f32); 9] = [
    (12.0, 6.0),
    (14.0, -1.0),
    (12.0, -8.0),
    (6.0, -8.0),
    (0.0, -8.0),
    (-9.0, -8.0),
    (-9.0, 6.0),
    (0.0, 6.0),
    (6.0, 6.0),
];

/// Position and heading of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Location in world pixels.
    pub position: Point<f32>,
    /// Heading in degrees, `[0, 360)`, 0 pointing along +x.
    pub heading: f32,
}

impl Pose {
    /// Creates a pose, wrapping the heading into range.
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            position: Point::new(x, y),
            heading: wrap_degrees(heading),
        }
    }
}

/// Why an agent left the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationCause {
    /// A footprint point touched an obstacle.
    Collision,
    /// Heading turned past 90 degrees either side of forward.
    WrongWay,
    /// Fell behind the viewport's leading edge.
    FellBehind,
}

/// A simulated driver, paired with the brain of the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Identifier shared with the controlling brain.
    pub id: usize,
    /// Current pose.
    pub pose: Pose,
    /// Forward progress, recomputed every tick.
    pub fitness: f32,
    eliminated: bool,
}

impl Agent {
    /// Creates a live agent facing forward at `(x, y)`.
    pub fn new(id: usize, x: f32, y: f32) -> Self {
        Self {
            id,
            pose: Pose::new(x, y, 0.0),
            fitness: 0.0,
            eliminated: false,
        }
    }

    /// Creates a live agent at the configured start pose.
    pub fn at_start(id: usize, params: &Params) -> Self {
        Self::new(id, params.start_x, params.start_y)
    }

    /// Checks if the agent is still racing.
    pub fn is_alive(&self) -> bool {
        !self.eliminated
    }

    /// Checks if the agent has been eliminated this generation.
    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    /// Removes the agent from the race. There is no way back within a generation.
    pub fn eliminate(&mut self) {
        self.eliminated = true;
    }

    /// Applies one tick of steering and throttle.
    ///
    /// The base speed guarantees forward motion; throttle can only add up to
    /// one more pixel per tick. Eliminated agents do not move.
    pub fn integrate(&mut self, steer: f32, throttle: f32, params: &Params) {
        if self.eliminated {
            return;
        }

        let speed = params.base_speed + (throttle * params.speed_amplifier).clamp(0.0, 1.0);
        self.pose.heading = wrap_degrees(self.pose.heading + steer * params.steering_amplifier);

        let (cos, sin) = heading_vector(self.pose.heading);
        self.pose.position = Point::new(
            self.pose.position.x() + cos * speed,
            self.pose.position.y() + sin * speed,
        );
    }

    /// Sets fitness to the distance travelled along the track.
    pub fn update_fitness(&mut self) {
        self.fitness = self.pose.position.x();
    }

    /// World-space hit-test points for the current pose.
    pub fn footprint(&self) -> [Point<f32>; 9] {
        let origin = self.pose.position;
        FOOTPRINT.map(|(dx, dy)| {
            rotate_about(
                Point::new(origin.x() + dx, origin.y() + dy),
                origin,
                self.pose.heading,
            )
        })
    }

    /// Whether the agent faces somewhere in `(90, 270)` degrees.
    pub fn is_facing_backwards(&self) -> bool {
        self.pose.heading > 90.0 && self.pose.heading < 270.0
    }

    /// Reports the first reason the agent should leave the race, if any.
    pub fn elimination_cause<F: ObstacleField + ?Sized>(
        &self,
        field: &F,
        viewport_left: f32,
    ) -> Option<EliminationCause> {
        let collided = self.footprint().into_iter().any(|point| {
            let (x, y) = to_pixel(point);
            field.is_obstacle(x, y)
        });

        if collided {
            Some(EliminationCause::Collision)
        } else if self.is_facing_backwards() {
            Some(EliminationCause::WrongWay)
        } else if self.pose.position.x() < viewport_left {
            Some(EliminationCause::FellBehind)
        } else {
            None
        }
    }

    /// Eliminates the agent if it collided, turned around or fell behind.
    ///
    /// Returns `true` if the agent is eliminated after the check.
    pub fn check_elimination<F: ObstacleField + ?Sized>(
        &mut self,
        field: &F,
        viewport_left: f32,
    ) -> bool {
        if !self.eliminated && self.elimination_cause(field, viewport_left).is_some() {
            self.eliminated = true;
        }
        self.eliminated
    }
}
