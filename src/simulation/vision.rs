//! Vision sense - ray casting against an obstacle field.
//!
//! Rays fan out across the field of view. Along each ray the field is sampled
//! outwards from the body radius until something blocks it, and the hit
//! distance becomes a proximity where 1.0 is touching and 0.0 is clear.

use geo::Point;
use ndarray::Array1;

use super::agent::Pose;
use super::geometric_utils::heading_vector;
use super::obstacle::ObstacleField;
use super::params::Params;

/// Distance in pixels between consecutive samples along a ray.
pub const SCAN_STEP: f32 = 2.0;

/// Ray layout and range of the sensor array.
///
/// Fields are private so the field of view stays ordered (`fov_start <= fov_stop`).
#[derive(Debug, Clone, PartialEq)]
pub struct Lidar {
    sample_points: usize,
    fov_start: f32,
    fov_stop: f32,
    depth: f32,
    body_radius: f32,
    taper: bool,
}

impl Lidar {
    /// Creates a sensor array with `sample_points` rays from `fov_start` to `fov_stop` degrees.
    ///
    /// A stop angle below the start is raised to the start, leaving a single
    /// direction. `depth` is the reach beyond `body_radius`; `taper` shortens
    /// rays towards the edges.
    pub fn new(
        sample_points: usize,
        fov_start: f32,
        fov_stop: f32,
        depth: f32,
        body_radius: f32,
        taper: bool,
    ) -> Self {
        Self {
            sample_points,
            fov_start,
            fov_stop: fov_stop.max(fov_start),
            depth,
            body_radius,
            taper,
        }
    }

    /// Builds the sensor layout described by `params`.
    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.sample_points,
            params.fov_start(),
            params.fov_stop(),
            params.depth_of_vision,
            params.body_radius,
            params.reduce_depth_at_sides,
        )
    }

    /// Number of rays.
    pub fn sample_points(&self) -> usize {
        self.sample_points
    }

    /// Angle between neighbouring rays.
    pub fn angle_step(&self) -> f32 {
        if self.sample_points > 1 {
            (self.fov_stop - self.fov_start) / (self.sample_points - 1) as f32
        } else {
            0.0
        }
    }

    /// Direction of ray `index` in world degrees for an agent facing `heading`.
    pub fn ray_angle(&self, heading: f32, index: usize) -> f32 {
        heading + self.fov_start + index as f32 * self.angle_step()
    }

    /// How far ray `index` reaches beyond the body radius.
    pub fn ray_depth(&self, index: usize) -> f32 {
        if !self.taper {
            return self.depth;
        }
        let half = self.sample_points as f32 / 2.0;
        let factor = 1.0 - (index as f32 - half).abs() / half;
        self.depth * factor.max(0.0)
    }

    /// Returns one proximity in `[0, 1]` per ray.
    pub fn sense<F: ObstacleField + ?Sized>(&self, pose: &Pose, field: &F) -> Array1<f32> {
        self.sense_with(pose, field, |_, _| {})
    }

    /// Like [`Lidar::sense`], calling `on_sample` for every pixel inspected.
    pub fn sense_with<F, S>(&self, pose: &Pose, field: &F, mut on_sample: S) -> Array1<f32>
    where
        F: ObstacleField + ?Sized,
        S: FnMut(i32, i32),
    {
        let mut outputs = Array1::zeros(self.sample_points);

        for (index, output) in outputs.iter_mut().enumerate() {
            let (cos, sin) = heading_vector(self.ray_angle(pose.heading, index));
            let limit = self.body_radius + self.ray_depth(index);

            let mut radius = self.body_radius;
            while radius < limit {
                let (x, y) = sample_pixel(pose.position, cos, sin, radius);
                on_sample(x, y);
                if field.is_obstacle(x, y) {
                    *output = self.proximity(radius);
                    break;
                }
                radius += SCAN_STEP;
            }
        }

        outputs
    }

    /// Converts a hit radius into a proximity: 1.0 at the body, falling to 0.0 at full depth.
    pub fn proximity(&self, hit_radius: f32) -> f32 {
        let distance = ((hit_radius - self.body_radius) / self.depth).clamp(0.0, 1.0);
        1.0 - distance
    }
}

fn sample_pixel(origin: Point<f32>, cos: f32, sin: f32, radius: f32) -> (i32, i32) {
    let dx = (cos * radius).round() as i32;
    let dy = (sin * radius).round() as i32;
    (origin.x().floor() as i32 + dx, origin.y().floor() as i32 + dy)
}
