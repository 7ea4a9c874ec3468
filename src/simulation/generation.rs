//! Generation loop: sense, decide, act and select.
//!
//! Each tick every live agent runs sense → think → integrate → fitness →
//! elimination check in parallel with rayon. Agents only touch their own
//! state, so the reductions (survivor count, leader position, sole survivor)
//! run afterwards in identifier order and the outcome is deterministic.
//!
//! When the last agent is eliminated the population evolves and a fresh set
//! of agents is placed on the start line.

use ndarray::Array1;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::agent::Agent;
use super::brain::{Brain, OUTPUT_SIZE, STEERING_NEURON, THROTTLE_NEURON};
use super::error::{Result, SimError};
use super::obstacle::ObstacleField;
use super::params::Params;
use super::population::Population;
use super::render::{AgentView, FocusView, RenderFrame, RenderHook};
use super::rng::rng_from_seed;
use super::vision::Lidar;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Agents still alive after the tick.
    pub survivors: usize,
    /// Furthest x reached by a surviving agent.
    pub leader_x: Option<f32>,
    /// The sole survivor, when exactly one agent remains.
    pub focus_id: Option<usize>,
    /// Agents whose brain rejected the sensor input this tick.
    pub skipped: usize,
    /// Whether every agent is now eliminated.
    pub generation_over: bool,
}

/// Drives one population of agents through successive generations.
#[derive(Debug, Clone)]
pub struct GenerationController {
    params: Params,
    lidar: Lidar,
    population: Population,
    agents: Vec<Agent>,
    rng: ChaCha12Rng,
    viewport_left: f32,
    tick: u64,
    focus: Option<FocusView>,
}

impl GenerationController {
    /// Creates a controller with a freshly initialised population.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let mut rng = rng_from_seed(params.seed);
        let population = Population::new(&params, &mut rng)?;
        Self::with_population(params, population, rng)
    }

    /// Creates a controller around an existing population.
    ///
    /// The population size and topology must match `params`.
    pub fn with_population(
        params: Params,
        population: Population,
        rng: ChaCha12Rng,
    ) -> Result<Self> {
        params.validate()?;
        if population.len() != params.population_size {
            return Err(SimError::Configuration(format!(
                "population holds {} brains but population_size is {}",
                population.len(),
                params.population_size
            )));
        }
        let expected = params.layer_sizes();
        if let Some(brain) = population
            .brains()
            .iter()
            .find(|brain| brain.layer_sizes() != expected)
        {
            return Err(SimError::TopologyMismatch {
                expected,
                actual: brain.layer_sizes(),
            });
        }

        let mut controller = Self {
            lidar: Lidar::from_params(&params),
            agents: Vec::new(),
            viewport_left: params.viewport_start,
            params,
            population,
            rng,
            tick: 0,
            focus: None,
        };
        controller.reset_agents();
        Ok(controller)
    }

    /// Advances every live agent by one tick.
    pub fn tick<F: ObstacleField + ?Sized>(&mut self, field: &F) -> TickOutcome {
        let lidar = &self.lidar;
        let params = &self.params;
        let population = &self.population;
        let viewport_left = self.viewport_left;

        // parallel phase, each agent only writes to itself
        let results: Vec<(Option<Array1<f32>>, bool)> = self
            .agents
            .par_iter_mut()
            .map(|agent| {
                if agent.is_eliminated() {
                    return (None, false);
                }
                let Some(brain) = population.get(agent.id) else {
                    return (None, true);
                };
                drive(agent, brain, lidar, params, field, viewport_left)
            })
            .collect();

        self.tick += 1;

        let mut survivors = 0;
        let mut skipped = 0;
        let mut leader_x: Option<f32> = None;
        let mut last_alive = None;
        for (agent, (reading, was_skipped)) in self.agents.iter().zip(results) {
            if was_skipped {
                skipped += 1;
            }
            if agent.is_eliminated() {
                continue;
            }
            survivors += 1;
            let x = agent.pose.position.x();
            leader_x = Some(leader_x.map_or(x, |best| best.max(x)));
            last_alive = Some((agent.id, reading));
        }

        let focus_id = if survivors == 1 {
            last_alive.as_ref().map(|(id, _)| *id)
        } else {
            None
        };
        self.focus = match (focus_id, last_alive) {
            (Some(id), Some((_, Some(reading)))) => Some(FocusView { id, reading }),
            _ => None,
        };

        // keep the leader in the left half of the viewport
        if let Some(x) = leader_x {
            let midpoint = self.viewport_left + self.params.viewport_width / 2.0;
            if x > midpoint {
                self.viewport_left += x - midpoint;
            }
        }

        TickOutcome {
            survivors,
            leader_x,
            focus_id,
            skipped,
            generation_over: survivors == 0,
        }
    }

    /// Runs [`GenerationController::tick`] and hands the resulting frame to `hook`.
    pub fn tick_observed<F: ObstacleField + ?Sized>(
        &mut self,
        field: &F,
        hook: &mut dyn RenderHook,
    ) -> TickOutcome {
        let outcome = self.tick(field);
        hook.on_frame(&self.frame());
        outcome
    }

    /// Ticks once and starts the next generation if every agent is out.
    pub fn step<F: ObstacleField + ?Sized>(&mut self, field: &F) -> Result<TickOutcome> {
        let outcome = self.tick(field);
        if outcome.generation_over {
            self.next_generation(true)?;
        }
        Ok(outcome)
    }

    /// Ends the current generation and lines up a fresh set of agents.
    ///
    /// Agents still racing are eliminated first. With `mutate` the population
    /// evolves on this generation's fitness; without it the same brains race
    /// again, which is how a freshly loaded model is replayed.
    pub fn next_generation(&mut self, mutate: bool) -> Result<()> {
        for agent in &mut self.agents {
            agent.eliminate();
        }

        let fitness: Vec<f32> = self.agents.iter().map(|agent| agent.fitness).collect();
        let best = fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        info!(
            generation = self.population.generation(),
            ticks = self.tick,
            best_fitness = best,
            spread = self.spread(&fitness),
            "generation finished"
        );

        if mutate {
            self.population.evolve(
                &fitness,
                self.params.mutation_rate,
                self.params.mutation_magnitude,
                &mut self.rng,
            )?;
        }

        self.reset_agents();
        debug!(
            generation = self.population.generation(),
            mutated = mutate,
            "new generation on the start line"
        );
        Ok(())
    }

    /// Replaces every brain from a saved population model and restarts without mutating.
    pub fn load_model(&mut self, bytes: &[u8]) -> Result<()> {
        self.population.load_from_bytes(bytes)?;
        self.next_generation(false)
    }

    /// Snapshot of the live agents and the focus reading.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            generation: self.population.generation(),
            tick: self.tick,
            viewport_left: self.viewport_left,
            agents: self
                .agents
                .iter()
                .filter(|agent| agent.is_alive())
                .map(|agent| AgentView {
                    id: agent.id,
                    position: agent.pose.position,
                    heading: agent.pose.heading,
                })
                .collect(),
            focus: self.focus.clone(),
        }
    }

    /// Whether every agent has been eliminated.
    pub fn is_generation_over(&self) -> bool {
        self.agents.iter().all(Agent::is_eliminated)
    }

    /// Agents of the current generation, ordered by identifier.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The population being trained.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Parameters the controller was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Sensor layout shared by all agents.
    pub fn lidar(&self) -> &Lidar {
        &self.lidar
    }

    /// Viewport leading edge; agents behind it are eliminated.
    pub fn viewport_left(&self) -> f32 {
        self.viewport_left
    }

    /// Ticks elapsed in the current generation.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Generation counter of the population.
    pub fn generation(&self) -> u32 {
        self.population.generation()
    }

    /// Highest fitness among the current agents.
    pub fn best_fitness(&self) -> Option<f32> {
        self.agents
            .iter()
            .map(|agent| agent.fitness)
            .reduce(f32::max)
    }

    fn reset_agents(&mut self) {
        self.agents = (0..self.params.population_size)
            .map(|id| Agent::at_start(id, &self.params))
            .collect();
        self.viewport_left = self.params.viewport_start;
        self.tick = 0;
        self.focus = None;
    }

    /// Mean genome distance from the fittest brain, a rough diversity measure.
    fn spread(&self, fitness: &[f32]) -> f32 {
        let brains = self.population.brains();
        let Some(best) = (0..brains.len()).max_by(|&a, &b| fitness[a].total_cmp(&fitness[b]))
        else {
            return 0.0;
        };
        let total: f32 = brains
            .iter()
            .map(|brain| Brain::distance(brain, &brains[best]))
            .sum();
        total / brains.len() as f32
    }
}

/// Runs one agent through sense → think → integrate → fitness → elimination.
///
/// Returns the reading the agent acted on and whether its tick was skipped.
fn drive<F: ObstacleField + ?Sized>(
    agent: &mut Agent,
    brain: &Brain,
    lidar: &Lidar,
    params: &Params,
    field: &F,
    viewport_left: f32,
) -> (Option<Array1<f32>>, bool) {
    let reading = lidar.sense(&agent.pose, field);

    let skipped = match brain.think(&reading) {
        Ok(outputs) if outputs.len() == OUTPUT_SIZE => {
            agent.integrate(outputs[STEERING_NEURON], outputs[THROTTLE_NEURON], params);
            agent.update_fitness();
            false
        }
        Ok(outputs) => {
            warn!(
                agent = agent.id,
                outputs = outputs.len(),
                "brain produced the wrong number of outputs, skipping tick"
            );
            true
        }
        Err(err) => {
            warn!(agent = agent.id, %err, "skipping tick");
            true
        }
    };

    // a skipped agent can still fall behind the viewport
    agent.check_elimination(field, viewport_left);
    (Some(reading), skipped)
}
