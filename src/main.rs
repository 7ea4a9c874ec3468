use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dodge::simulation::generation::GenerationController;
use dodge::simulation::params::Params;
use dodge::simulation::track::{Track, TrackParams};

/// Train drivers on the pothole road without a display.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with simulation parameters.
    #[arg(long)]
    config: Option<String>,
    /// Number of generations to train.
    #[arg(long, default_value_t = 50)]
    generations: u32,
    /// Force the next generation after this many ticks.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    /// Seed for weights and mutation (overrides the config).
    #[arg(long)]
    seed: Option<u64>,
    /// Seed for pothole placement.
    #[arg(long)]
    track_seed: Option<u64>,
    /// Start from a saved population model.
    #[arg(long)]
    load: Option<String>,
    /// Write the trained population model here.
    #[arg(long)]
    save: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => Params::default(),
    };
    if args.seed.is_some() {
        params.seed = args.seed;
    }

    let mut track_params = TrackParams {
        visible_length: params.viewport_width,
        ..TrackParams::default()
    };
    if let Some(seed) = args.track_seed {
        track_params.seed = seed;
    }

    let mut controller = GenerationController::new(params).context("invalid parameters")?;
    if let Some(path) = &args.load {
        let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
        match controller.load_model(&bytes) {
            Ok(()) => info!(path = %path, "loaded population model"),
            Err(err) => warn!(path = %path, %err, "ignoring unusable model, training from scratch"),
        }
    }

    let mut track = Track::new(track_params, controller.viewport_left());
    info!(
        population = controller.params().population_size,
        sensors = controller.params().sample_points,
        generations = args.generations,
        "Starting training"
    );

    let target = controller.generation() + args.generations;
    let mut best_ever = f32::NEG_INFINITY;
    while controller.generation() < target {
        track.advance(controller.viewport_left());
        let outcome = controller.tick(&track);

        if outcome.generation_over || controller.ticks() >= args.max_ticks {
            let best = controller.best_fitness().unwrap_or(f32::NEG_INFINITY);
            best_ever = best_ever.max(best);
            info!(
                generation = controller.generation(),
                ticks = controller.ticks(),
                best,
                best_ever,
                "generation complete"
            );
            controller.next_generation(true)?;
            track.reset(controller.viewport_left());
        }
    }

    if let Some(path) = &args.save {
        controller
            .population()
            .save_to_file(path)
            .with_context(|| format!("failed to save model to {path}"))?;
        info!(path = %path, "saved population model");
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
