//! Single fully connected layer of the controller network.

use ndarray::{Array1, Array2};
use rand::Rng;

/// A single layer of a multi-layer perceptron.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Creates a new layer with weights and biases drawn from `[-scale, scale]`.
    pub fn new_random<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        let mut draw = || {
            if scale > 0.0 {
                rng.random_range(-scale..=scale)
            } else {
                0.0
            }
        };
        let weights = Array2::from_shape_simple_fn((output_size, input_size), &mut draw);
        let biases = Array1::from_shape_simple_fn(output_size, &mut draw);
        Self { weights, biases }
    }

    /// Creates a layer whose weights and biases are all zero.
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weights: Array2::zeros((output_size, input_size)),
            biases: Array1::zeros(output_size),
        }
    }

    /// Number of inputs the layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs the layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Performs forward pass with tanh activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;

        output.mapv_inplace(f32::tanh);
        output
    }

    /// Perturbs each weight, then each bias, with probability `rate_percent / 100`.
    ///
    /// A hit adds a value drawn uniformly from `[-magnitude, magnitude]`. Every
    /// parameter consumes one roll, and hits consume one extra draw, in row-major order.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate_percent: f32, magnitude: f32, rng: &mut R) {
        for value in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            if rng.random_range(0.0..100.0) < rate_percent {
                *value += if magnitude > 0.0 {
                    rng.random_range(-magnitude..=magnitude)
                } else {
                    0.0
                };
            }
        }
    }
}
