//! Feedforward controller network, the genome each agent is driven by.
//!
//! A brain owns a fixed topology (`layer_sizes`) and one [`Mlp`] per layer
//! transition. It supports inference, in-place mutation, elitist copying and a
//! compact binary encoding (see [`model`]).

use ndarray::Array1;
use rand::Rng;

use super::error::{Result, SimError};

pub mod mlp;
pub mod model;

pub use mlp::Mlp;

/// Output neuron that steers the agent.
pub const STEERING_NEURON: usize = 0;
/// Output neuron that controls the throttle.
pub const THROTTLE_NEURON: usize = 1;
/// Number of outputs every controller network must produce.
pub const OUTPUT_SIZE: usize = 2;

/// Neural network genome paired with exactly one agent slot.
///
/// The topology is fixed at construction; mutation and copying only ever
/// touch the numeric payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    /// Identifier shared with the agent this brain drives.
    pub id: usize,
    /// Ordered layers from input to output.
    layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a new brain with weights drawn uniformly from `[-scale, scale]`.
    pub fn new<R: Rng + ?Sized>(
        id: usize,
        layer_sizes: &[usize],
        scale: f32,
        rng: &mut R,
    ) -> Result<Self> {
        validate_layer_sizes(layer_sizes)?;
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], scale, rng))
            .collect();

        Ok(Self { id, layers })
    }

    /// Creates a brain whose weights and biases are all zero.
    pub fn zeroed(id: usize, layer_sizes: &[usize]) -> Result<Self> {
        validate_layer_sizes(layer_sizes)?;
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::zeros(pair[0], pair[1]))
            .collect();

        Ok(Self { id, layers })
    }

    /// Builds a brain from explicit layers, checking that adjacent layers chain.
    pub fn from_layers(id: usize, layers: Vec<Mlp>) -> Result<Self> {
        if layers.is_empty() {
            return Err(SimError::Configuration(
                "a network needs at least one layer".into(),
            ));
        }
        for (index, layer) in layers.iter().enumerate() {
            if layer.biases.len() != layer.output_size() {
                return Err(SimError::TopologyMismatch {
                    expected: vec![layer.input_size(), layer.output_size()],
                    actual: vec![layer.input_size(), layer.biases.len()],
                });
            }
            if let Some(next) = layers.get(index + 1) {
                if next.input_size() != layer.output_size() {
                    return Err(SimError::TopologyMismatch {
                        expected: vec![layer.output_size(), next.output_size()],
                        actual: vec![next.input_size(), next.output_size()],
                    });
                }
            }
        }

        Ok(Self { id, layers })
    }

    /// Layer sizes from input to output.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        if let Some(first) = self.layers.first() {
            sizes.push(first.input_size());
        }
        sizes.extend(self.layers.iter().map(Mlp::output_size));
        sizes
    }

    /// Number of values the first layer consumes.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Mlp::input_size)
    }

    /// Number of values the last layer produces.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Mlp::output_size)
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[Mlp] {
        &self.layers
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Runs a forward pass through all layers.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>) -> Result<Array1<f32>> {
        if inputs.len() != self.input_size() {
            return Err(SimError::DimensionMismatch {
                expected: self.input_size(),
                actual: inputs.len(),
            });
        }

        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output);
        }

        Ok(output)
    }

    /// Mutates all layers in place, in layer order.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate_percent: f32, magnitude: f32, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(rate_percent, magnitude, rng);
        }
    }

    /// Copies this brain's weights and biases into `other`, keeping `other.id`.
    pub fn copy_into(&self, other: &mut Brain) -> Result<()> {
        if !self.same_topology(other) {
            return Err(SimError::TopologyMismatch {
                expected: other.layer_sizes(),
                actual: self.layer_sizes(),
            });
        }

        for (source, target) in self.layers.iter().zip(other.layers.iter_mut()) {
            target.weights.assign(&source.weights);
            target.biases.assign(&source.biases);
        }

        Ok(())
    }

    /// Whether both brains share an identical layer layout.
    pub fn same_topology(&self, other: &Brain) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.weights.dim() == b.weights.dim())
    }

    /// Calculates the Euclidean distance between two brains.
    ///
    /// Brains with different topologies are infinitely far apart.
    pub fn distance(brain1: &Brain, brain2: &Brain) -> f32 {
        if !brain1.same_topology(brain2) {
            return f32::INFINITY;
        }

        brain1
            .to_flat_vector()
            .iter()
            .zip(brain2.to_flat_vector())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    /// Flattens all weights and biases into a single vector.
    ///
    /// Each layer contributes its weights row-major followed by its biases,
    /// the same order used by mutation and by the model file.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.parameter_count());

        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }

        flat
    }
}

fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(SimError::Configuration(format!(
            "a network needs at least two layer sizes, got {layer_sizes:?}"
        )));
    }
    if layer_sizes.contains(&0) {
        return Err(SimError::Configuration(format!(
            "layer sizes must be non-zero, got {layer_sizes:?}"
        )));
    }
    Ok(())
}
