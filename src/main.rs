use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use wolfpack_core::collaborators::SignalKind;
use wolfpack_core::metrics::{init_logging, KILLS, SIEGES_ENDED, SIEGES_STARTED};
use wolfpack_data::{Season, Weather};
use wolfpack_lib::model::config::AppConfig;
use wolfpack_lib::World;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless wolf pack simulation", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Ticks to simulate (20 per second)
    #[arg(short, long, default_value_t = 2_000)]
    ticks: u64,

    /// RNG seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 3)]
    packs: usize,

    #[arg(long, default_value_t = 5)]
    wolves_per_pack: usize,

    /// Wild prey scattered in herds
    #[arg(long, default_value_t = 60)]
    prey: usize,

    /// Settlements to place
    #[arg(long, default_value_t = 1)]
    settlements: usize,

    /// Start in winter
    #[arg(long)]
    winter: bool,

    /// Start in a blizzard (implies winter)
    #[arg(long)]
    blizzard: bool,

    /// Save the pack records here when done (`.json` for JSON)
    #[arg(long)]
    save: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    ticks: u64,
    fingerprint: String,
    packs: usize,
    wolves: usize,
    prey_left: usize,
    kills: u64,
    howls: u64,
    bonding_howls: u64,
    scent_marks: u64,
    sieges_started: u64,
    sieges_ended: u64,
    collaborator_failures: u64,
    elapsed_ms: u128,
    record_digest: Option<String>,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            AppConfig::from_toml(&content)?
        }
        None => AppConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// `RUST_LOG` selects per-module filters; without it everything logs at INFO.
fn init_tracing() {
    match std::env::var("RUST_LOG") {
        Ok(filter) => tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(filter))
            .with(tracing_subscriber::fmt::layer())
            .init(),
        Err(_) => init_logging(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(&args)?;
    let fingerprint = config.fingerprint();
    let mut world = World::new(config)?;
    if args.winter || args.blizzard {
        world.climate.season = Season::Winter;
    }
    if args.blizzard {
        world.climate.weather = Weather::Blizzard;
    }

    for _ in 0..args.settlements {
        let center = world.random_point();
        world.spawn_settlement(center, 8, 12, 1);
    }
    world.populate(args.packs, args.wolves_per_pack, args.prey);

    let mut failures = 0;
    for _ in 0..args.ticks {
        let report = world.update()?;
        failures += report.collaborator_failures;
        if world.wolf_count() == 0 {
            tracing::info!(tick = world.tick, "No wolves left");
            break;
        }
    }

    let record_digest = match &args.save {
        Some(path) => Some(world.save_records(path)?),
        None => None,
    };

    let prey_left: usize = world
        .config
        .hunting
        .prey_species
        .iter()
        .map(|s| world.count_species(*s))
        .sum();
    let summary = RunSummary {
        ticks: world.tick,
        fingerprint,
        packs: world.packs().len(),
        wolves: world.wolf_count(),
        prey_left,
        kills: world.metrics.counter(KILLS),
        howls: world.signals.total(SignalKind::AlertHowl),
        bonding_howls: world.signals.total(SignalKind::BondingHowl),
        scent_marks: world.signals.total(SignalKind::ScentMark),
        sieges_started: world.metrics.counter(SIEGES_STARTED),
        sieges_ended: world.metrics.counter(SIEGES_ENDED),
        collaborator_failures: failures,
        elapsed_ms: world.metrics.elapsed().as_millis(),
        record_digest,
    };

    tracing::info!(
        ticks = summary.ticks,
        wolves = summary.wolves,
        prey_left = summary.prey_left,
        kills = summary.kills,
        sieges = summary.sieges_started,
        "Run finished"
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} ticks: {} wolves in {} packs, {} kills, {} prey left, {} sieges",
            summary.ticks,
            summary.wolves,
            summary.packs,
            summary.kills,
            summary.prey_left,
            summary.sieges_started
        );
    }

    Ok(())
}
