use serde::{Deserialize, Serialize};

use super::brain::OUTPUT_SIZE;
use super::error::{Result, SimError};
use super::vision::Lidar;

/// Simulation parameters that control sensing, driving and evolution.
///
/// The field-of-view bounds are private so that `start <= stop` always holds;
/// use [`Params::set_fov_start`] and [`Params::set_fov_stop`] to change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of agents (and genomes) per generation.
    pub population_size: usize,
    /// Scales the steering output, e.g. `-1..1` becomes `-15..15` degrees per tick.
    pub steering_amplifier: f32,
    /// Scales the throttle output before it is clamped to `0..1`.
    pub speed_amplifier: f32,
    /// Minimum forward speed, added to the clamped throttle.
    pub base_speed: f32,
    /// First sensor angle in degrees, relative to the heading.
    fov_start: f32,
    /// Last sensor angle in degrees, relative to the heading.
    fov_stop: f32,
    /// Number of sensor rays.
    pub sample_points: usize,
    /// How far each ray reaches beyond the body radius.
    pub depth_of_vision: f32,
    /// Radius where scanning starts, so the agent does not see itself.
    pub body_radius: f32,
    /// Shorten rays towards the edges of the field of view.
    pub reduce_depth_at_sides: bool,
    /// Chance, in percent, that a single weight is perturbed.
    pub mutation_rate: f32,
    /// Largest perturbation applied to a mutated weight.
    pub mutation_magnitude: f32,
    /// Initial weights are drawn from `[-scale, scale]`.
    pub initial_weight_scale: f32,
    /// Sizes of hidden layers between the sensors and the two outputs.
    pub hidden_layers: Vec<usize>,
    /// Spawn x-coordinate of every agent.
    pub start_x: f32,
    /// Spawn y-coordinate of every agent (the lane offset).
    pub start_y: f32,
    /// Viewport leading edge at the start of each generation.
    pub viewport_start: f32,
    /// Visible length of the track; the viewport follows the leader at its midpoint.
    pub viewport_width: f32,
    /// Seed for initial weights and mutation. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 20,
            steering_amplifier: 15.0,
            speed_amplifier: 10.0,
            base_speed: 1.5,
            fov_start: -140.0,
            fov_stop: 140.0,
            sample_points: 17,
            depth_of_vision: 120.0,
            body_radius: 10.0,
            reduce_depth_at_sides: false,
            mutation_rate: 25.0,
            mutation_magnitude: 0.5,
            initial_weight_scale: 0.5,
            hidden_layers: Vec::new(),
            start_x: 444.0,
            start_y: 44.0,
            viewport_start: 30.0,
            viewport_width: 788.0,
            seed: None,
        }
    }
}

impl Params {
    /// First sensor angle in degrees.
    pub fn fov_start(&self) -> f32 {
        self.fov_start
    }

    /// Last sensor angle in degrees.
    pub fn fov_stop(&self) -> f32 {
        self.fov_stop
    }

    /// Sets the first sensor angle, dragging the last one along if it would be passed.
    pub fn set_fov_start(&mut self, degrees: f32) {
        if degrees > self.fov_stop {
            self.fov_stop = degrees;
        }
        self.fov_start = degrees;
    }

    /// Sets the last sensor angle, dragging the first one along if it would be passed.
    pub fn set_fov_stop(&mut self, degrees: f32) {
        if degrees < self.fov_start {
            self.fov_start = degrees;
        }
        self.fov_stop = degrees;
    }

    /// Sets the sensing depth; values below one pixel are rejected.
    pub fn set_depth_of_vision(&mut self, depth: f32) -> Result<()> {
        check_depth(depth)?;
        self.depth_of_vision = depth;
        Ok(())
    }

    /// Angle between neighbouring rays, zero for a single ray.
    pub fn vision_angle_step(&self) -> f32 {
        Lidar::from_params(self).angle_step()
    }

    /// Network topology: one input per sensor ray, hidden layers, steering and throttle.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.sample_points);
        sizes.extend(&self.hidden_layers);
        sizes.push(OUTPUT_SIZE);
        sizes
    }

    /// Rejects settings the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        check_depth(self.depth_of_vision)?;
        if self.population_size == 0 {
            return Err(SimError::Configuration(
                "population size must be at least 1".into(),
            ));
        }
        if self.sample_points == 0 {
            return Err(SimError::Configuration(
                "at least one sensor ray is required".into(),
            ));
        }
        if self.hidden_layers.contains(&0) {
            return Err(SimError::Configuration(
                "hidden layers must not be empty".into(),
            ));
        }
        if self.base_speed.is_nan() || self.base_speed <= 0.0 {
            return Err(SimError::Configuration(format!(
                "base speed must be positive, got {}",
                self.base_speed
            )));
        }
        if !(0.0..=100.0).contains(&self.mutation_rate) {
            return Err(SimError::Configuration(format!(
                "mutation rate must be a percentage, got {}",
                self.mutation_rate
            )));
        }
        if self.mutation_magnitude < 0.0 || self.initial_weight_scale < 0.0 {
            return Err(SimError::Configuration(
                "mutation magnitude and weight scale must not be negative".into(),
            ));
        }
        if self.body_radius < 0.0 {
            return Err(SimError::Configuration(format!(
                "body radius must not be negative, got {}",
                self.body_radius
            )));
        }
        Ok(())
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads parameters from a JSON file, correcting the field of view and validating.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut params: Params = serde_json::from_str(&json)?;
        let stop = params.fov_stop;
        params.set_fov_stop(stop);
        params.validate()?;
        Ok(params)
    }
}

fn check_depth(depth: f32) -> Result<()> {
    if depth >= 1.0 {
        Ok(())
    } else {
        Err(SimError::Configuration(format!(
            "depth of vision must be at least 1, got {depth}"
        )))
    }
}
