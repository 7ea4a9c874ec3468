#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dodge::simulation::brain::{Brain, Mlp};
use dodge::simulation::error::SimError;
use dodge::simulation::rng::create_rng;
use ndarray::{Array1, Array2, array};
use proptest::prelude::*;

fn random_brain(id: usize, seed: u64) -> Brain {
    let mut rng = create_rng(seed);
    Brain::new(id, &[5, 4, 2], 0.5, &mut rng).expect("valid topology")
}

#[test]
fn test_think_is_pure() {
    let brain = random_brain(0, 7);
    let input = array![0.1, 0.9, 0.0, 0.4, 1.0];

    let first = brain.think(&input).unwrap();
    let second = brain.think(&input).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_think_rejects_wrong_input_length() {
    let brain = random_brain(0, 7);
    let result = brain.think(&Array1::zeros(3));

    assert!(matches!(
        result,
        Err(SimError::DimensionMismatch {
            expected: 5,
            actual: 3
        })
    ));
}

#[test]
fn test_zeroed_brain_outputs_zero() {
    let brain = Brain::zeroed(3, &[4, 2]).unwrap();
    let output = brain.think(&array![1.0, 1.0, 1.0, 1.0]).unwrap();

    assert_eq!(output, array![0.0, 0.0]);
    assert_eq!(brain.layer_sizes(), vec![4, 2]);
    assert_eq!(brain.parameter_count(), 10);
}

#[test]
fn test_forward_applies_weights_and_bias() {
    let layer = Mlp {
        weights: array![[1.0, 2.0], [0.0, -1.0]],
        biases: array![0.5, 0.0],
    };
    let brain = Brain::from_layers(0, vec![layer]).unwrap();
    let output = brain.think(&array![0.25, 0.5]).unwrap();

    assert!((output[0] - 1.75f32.tanh()).abs() < 1e-6);
    assert!((output[1] - (-0.5f32).tanh()).abs() < 1e-6);
}

#[test]
fn test_mutation_with_zero_rate_changes_nothing() {
    let mut brain = random_brain(0, 11);
    let before = brain.save_to_bytes();

    let mut rng = create_rng(99);
    brain.mutate(0.0, 0.5, &mut rng);

    assert_eq!(brain.save_to_bytes(), before);
}

#[test]
fn test_mutation_with_full_rate_changes_every_parameter() {
    let mut brain = random_brain(0, 11);
    let before = brain.to_flat_vector();

    let mut rng = create_rng(99);
    brain.mutate(100.0, 0.5, &mut rng);
    let after = brain.to_flat_vector();

    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        assert_ne!(old, new);
        assert!((old - new).abs() <= 0.5 + 1e-6);
    }
}

#[test]
fn test_mutation_is_reproducible_from_seed() {
    let mut a = random_brain(0, 5);
    let mut b = random_brain(0, 5);

    a.mutate(25.0, 0.5, &mut create_rng(1234));
    b.mutate(25.0, 0.5, &mut create_rng(1234));

    assert_eq!(a, b);
}

#[test]
fn test_copy_into_keeps_target_id() {
    let source = random_brain(1, 3);
    let mut target = random_brain(6, 4);

    source.copy_into(&mut target).unwrap();

    assert_eq!(target.id, 6);
    assert_eq!(target.to_flat_vector(), source.to_flat_vector());
    assert_eq!(Brain::distance(&source, &target), 0.0);
}

#[test]
fn test_copy_into_rejects_other_topology() {
    let source = random_brain(1, 3);
    let mut target = Brain::zeroed(2, &[5, 2]).unwrap();

    let result = source.copy_into(&mut target);

    assert!(matches!(result, Err(SimError::TopologyMismatch { .. })));
    assert_eq!(target.to_flat_vector(), vec![0.0; 12]);
}

#[test]
fn test_from_layers_rejects_broken_chain() {
    let layers = vec![Mlp::zeros(3, 4), Mlp::zeros(5, 2)];
    let result = Brain::from_layers(0, layers);

    assert!(matches!(result, Err(SimError::TopologyMismatch { .. })));
}

#[test]
fn test_from_layers_rejects_short_bias_vector() {
    let layer = Mlp {
        weights: Array2::zeros((2, 3)),
        biases: Array1::zeros(1),
    };

    assert!(matches!(
        Brain::from_layers(0, vec![layer]),
        Err(SimError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_layers_follow_topology() {
    let brain = Brain::zeroed(0, &[3, 4, 2]).unwrap();
    let shapes: Vec<(usize, usize)> = brain
        .layers()
        .iter()
        .map(|layer| (layer.input_size(), layer.output_size()))
        .collect();

    assert_eq!(shapes, vec![(3, 4), (4, 2)]);
    assert!(brain.layers().iter().all(|layer| layer.biases.len() == layer.output_size()));

    let rebuilt = Brain::from_layers(7, brain.layers().to_vec()).unwrap();
    assert_eq!(rebuilt.layer_sizes(), vec![3, 4, 2]);
    assert_eq!(rebuilt.think(&Array1::zeros(3)).unwrap(), array![0.0, 0.0]);
}

#[test]
fn test_new_rejects_degenerate_topology() {
    let mut rng = create_rng(0);
    assert!(matches!(
        Brain::new(0, &[4], 0.5, &mut rng),
        Err(SimError::Configuration(_))
    ));
    assert!(matches!(
        Brain::new(0, &[4, 0, 2], 0.5, &mut rng),
        Err(SimError::Configuration(_))
    ));
}

#[test]
fn test_initial_weights_respect_scale() {
    let mut rng = create_rng(8);
    let brain = Brain::new(0, &[17, 6, 2], 0.25, &mut rng).unwrap();

    assert!(brain.to_flat_vector().iter().all(|w| w.abs() <= 0.25));
}

proptest! {
    #[test]
    fn proptest_outputs_finite_and_bounded(
        seed in any::<u64>(),
        inputs in proptest::collection::vec(-5.0f32..5.0f32, 5),
    ) {
        let brain = random_brain(0, seed);
        let output = brain.think(&Array1::from_vec(inputs)).unwrap();

        for value in output.iter() {
            prop_assert!(value.is_finite());
            prop_assert!((-1.0..=1.0).contains(value));
        }
    }
}
