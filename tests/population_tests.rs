#![allow(missing_docs)]

use dodge::simulation::brain::Brain;
use dodge::simulation::error::SimError;
use dodge::simulation::params::Params;
use dodge::simulation::population::{Population, rank_ascending};
use dodge::simulation::rng::create_rng;

fn create_test_params(population_size: usize) -> Params {
    let mut params = Params::default();
    params.population_size = population_size;
    params.sample_points = 5;
    params.hidden_layers = vec![3];
    params
}

fn weights(population: &Population, id: usize) -> Vec<f32> {
    population.get(id).unwrap().to_flat_vector()
}

#[test]
fn test_new_population() {
    let params = create_test_params(7);
    let population = Population::new(&params, &mut create_rng(0)).unwrap();

    assert_eq!(population.len(), 7);
    assert!(!population.is_empty());
    assert_eq!(population.generation(), 0);
    for (id, brain) in population.brains().iter().enumerate() {
        assert_eq!(brain.id, id);
        assert_eq!(brain.layer_sizes(), vec![5, 3, 2]);
    }
}

#[test]
fn test_new_rejects_invalid_params() {
    let params = create_test_params(0);

    let result = Population::new(&params, &mut create_rng(0));

    assert!(matches!(result, Err(SimError::Configuration(_))));
}

#[test]
fn test_from_brains_renumbers() {
    let brains = vec![
        Brain::zeroed(10, &[2, 2]).unwrap(),
        Brain::zeroed(20, &[2, 2]).unwrap(),
    ];
    let population = Population::from_brains(brains).unwrap();

    let ids: Vec<usize> = population.brains().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn test_from_brains_rejects_mixed_topology() {
    let brains = vec![
        Brain::zeroed(0, &[2, 2]).unwrap(),
        Brain::zeroed(1, &[3, 2]).unwrap(),
    ];

    assert!(matches!(
        Population::from_brains(brains),
        Err(SimError::TopologyMismatch { .. })
    ));
    assert!(matches!(
        Population::from_brains(Vec::new()),
        Err(SimError::Configuration(_))
    ));
}

#[test]
fn test_rank_ascending_is_stable() {
    assert_eq!(rank_ascending(&[3.0, 1.0, 4.0, 2.0]), vec![1, 3, 0, 2]);
    assert_eq!(rank_ascending(&[2.0, 1.0, 2.0, 1.0]), vec![1, 3, 0, 2]);
    assert_eq!(rank_ascending(&[]), Vec::<usize>::new());
}

#[test]
fn test_worst_half_copies_best_half() {
    let params = create_test_params(4);
    let mut population = Population::new(&params, &mut create_rng(1)).unwrap();
    let before = population.clone();

    population
        .evolve(&[3.0, 1.0, 4.0, 2.0], 0.0, 0.5, &mut create_rng(2))
        .unwrap();

    assert_eq!(population.generation(), 1);
    // ranks 1, 3, 0, 2: brain 1 copies brain 0, brain 3 copies brain 2
    assert_eq!(weights(&population, 1), weights(&before, 0));
    assert_eq!(weights(&population, 3), weights(&before, 2));
    assert_eq!(weights(&population, 0), weights(&before, 0));
    assert_eq!(weights(&population, 2), weights(&before, 2));
    assert_eq!(population.get(1).unwrap().id, 1);
    assert_eq!(population.get(3).unwrap().id, 3);
}

#[test]
fn test_only_the_worst_half_is_mutated() {
    let params = create_test_params(4);
    let mut population = Population::new(&params, &mut create_rng(1)).unwrap();
    let before = population.clone();

    population
        .evolve(&[3.0, 1.0, 4.0, 2.0], 100.0, 0.5, &mut create_rng(2))
        .unwrap();

    assert_ne!(weights(&population, 1), weights(&before, 0));
    assert_ne!(weights(&population, 3), weights(&before, 2));
    assert_eq!(weights(&population, 0), weights(&before, 0));
    assert_eq!(weights(&population, 2), weights(&before, 2));
}

#[test]
fn test_odd_population_keeps_median_and_best() {
    let params = create_test_params(5);
    let mut population = Population::new(&params, &mut create_rng(3)).unwrap();
    let before = population.clone();

    // ranks 1, 3, 4, 2, 0
    population
        .evolve(&[5.0, 1.0, 4.0, 2.0, 3.0], 0.0, 0.5, &mut create_rng(4))
        .unwrap();

    assert_eq!(weights(&population, 1), weights(&before, 4));
    assert_eq!(weights(&population, 3), weights(&before, 2));
    assert_eq!(weights(&population, 4), weights(&before, 4));
    assert_eq!(weights(&population, 2), weights(&before, 2));
    assert_eq!(weights(&population, 0), weights(&before, 0));
}

#[test]
fn test_single_brain_population_is_untouched() {
    let params = create_test_params(1);
    let mut population = Population::new(&params, &mut create_rng(5)).unwrap();
    let before = population.clone();

    population.evolve(&[1.0], 100.0, 0.5, &mut create_rng(6)).unwrap();

    assert_eq!(population.brains(), before.brains());
    assert_eq!(population.generation(), 1);
}

#[test]
fn test_evolution_is_reproducible_from_seed() {
    let params = create_test_params(6);
    let fitness = [10.0, 3.0, 7.0, 7.0, 1.0, 12.0];

    let mut a = Population::new(&params, &mut create_rng(7)).unwrap();
    let mut b = Population::new(&params, &mut create_rng(7)).unwrap();
    a.evolve(&fitness, 25.0, 0.5, &mut create_rng(8)).unwrap();
    b.evolve(&fitness, 25.0, 0.5, &mut create_rng(8)).unwrap();

    assert_eq!(a, b);
    let ids: Vec<usize> = a.brains().iter().map(|brain| brain.id).collect();
    assert_eq!(ids, (0..6).collect::<Vec<_>>());
}

#[test]
fn test_evolve_rejects_wrong_fitness_length() {
    let params = create_test_params(4);
    let mut population = Population::new(&params, &mut create_rng(1)).unwrap();
    let before = population.clone();

    let result = population.evolve(&[1.0, 2.0], 25.0, 0.5, &mut create_rng(2));

    assert!(matches!(
        result,
        Err(SimError::FitnessLength {
            expected: 4,
            actual: 2
        })
    ));
    assert_eq!(population, before);
}
