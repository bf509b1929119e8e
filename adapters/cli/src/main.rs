#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Petri contests and prints rankings.

mod dish;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use petri_core::{
    ContestConfig, ContestResult, Distribution, Outcome, DISH_RADIUS, INITIAL_ENERGY,
    SAFETY_TICK_LIMIT,
};
use petri_ranking::{MatchRecord, ResultLog, Standings};
use petri_system_policies::PolicyKind;
use petri_system_referee::Referee;
use petri_world::{query, World};

#[derive(Parser)]
#[command(name = "petri")]
#[command(author, version, about = "Petri dish contests between microorganism colonies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available behavior policies
    List,

    /// Run a headless contest between two colonies
    Run {
        /// Nutrient distribution (1-6)
        #[arg(short, long)]
        dist: u32,

        /// The two competing policies, by catalogue index or slug
        #[arg(short, long, num_args = 2, required = true)]
        colonies: Vec<PolicyKind>,

        /// Seed for the contest's random source (default: derived from the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Dish radius in cells
        #[arg(short, long, default_value_t = DISH_RADIUS)]
        radius: u32,

        /// Energy of every organism placed at contest start
        #[arg(short, long, default_value_t = INITIAL_ENERGY)]
        energy: f64,

        /// Ticks after which an unresolved contest is cut off
        #[arg(short, long, default_value_t = SAFETY_TICK_LIMIT)]
        max_ticks: u64,

        /// Wall-clock budget in seconds before the contest is stopped
        #[arg(long)]
        time_limit_secs: Option<u64>,

        /// Directory holding the contest log
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Do not record the contest in the log
        #[arg(long)]
        no_save: bool,

        /// Print the final dish
        #[arg(long)]
        show_dish: bool,
    },

    /// Print the standings computed from the contest log
    Ranking {
        /// Directory holding the contest log
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Number of policies to show
        #[arg(short, long, default_value = "10")]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List => list(),
        Commands::Run {
            dist,
            colonies,
            seed,
            radius,
            energy,
            max_ticks,
            time_limit_secs,
            results_dir,
            no_save,
            show_dish,
        } => run(RunOptions {
            dist,
            colonies,
            seed,
            radius,
            energy,
            max_ticks,
            time_limit: time_limit_secs.map(Duration::from_secs),
            results_dir,
            save: !no_save,
            show_dish,
        }),
        Commands::Ranking { results_dir, top } => ranking(results_dir, top),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list() -> Result<()> {
    println!("{:>3}  {:<16} {:<16} {}", "#", "slug", "name", "author");
    for kind in PolicyKind::ALL {
        let policy = kind.build();
        println!(
            "{:>3}  {:<16} {:<16} {}",
            kind.index(),
            kind.slug(),
            policy.name(),
            policy.author()
        );
    }
    Ok(())
}

struct RunOptions {
    dist: u32,
    colonies: Vec<PolicyKind>,
    seed: Option<u64>,
    radius: u32,
    energy: f64,
    max_ticks: u64,
    time_limit: Option<Duration>,
    results_dir: PathBuf,
    save: bool,
    show_dish: bool,
}

fn run(options: RunOptions) -> Result<()> {
    let distribution = Distribution::from_id(options.dist).context("invalid --dist")?;
    let [first, second] = options.colonies.as_slice() else {
        anyhow::bail!("exactly two colonies are required");
    };
    let seed = options.seed.unwrap_or_else(clock_seed);

    let config = ContestConfig::new(distribution, first.factory(), second.factory())
        .with_radius(options.radius)
        .with_starting_energy(options.energy)
        .with_seed(seed);
    let mut world = World::new(&config).context("failed to set up the contest")?;

    println!(
        "{} vs {} on {} (seed {seed})",
        first,
        second,
        distribution.label()
    );

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(limit) = options.time_limit {
        let flag = Arc::clone(&stop);
        let _ = thread::spawn(move || {
            thread::sleep(limit);
            flag.store(true, Ordering::Relaxed);
        });
    }

    let mut referee = Referee::new().with_max_ticks(options.max_ticks);
    let result = referee.run(&mut world, &stop);

    print_result(&result);
    if options.show_dish {
        print!("{}", dish::render(query::field(&world)));
    }

    if !result.completed {
        println!("Contest unresolved after {} ticks; not recorded.", result.ticks);
        return Ok(());
    }
    if options.save {
        let log = ResultLog::new(&options.results_dir);
        log.append(&MatchRecord::new(&result, unix_time()))
            .with_context(|| format!("failed to record the contest in {}", log.path().display()))?;
        println!("Recorded in {}", log.path().display());
    }
    Ok(())
}

fn print_result(result: &ContestResult) {
    println!("{:<16} {:>10} {:>12}", "colony", "population", "energy");
    for report in &result.colonies {
        println!(
            "{:<16} {:>10} {:>12.1}",
            report.name, report.population, report.energy
        );
    }
    match (result.outcome, result.winner()) {
        (Outcome::Winner(_), Some(winner)) => println!(
            "Winner: {} by {} ({} points) after {} ticks",
            winner.name,
            winner.author,
            result.points(),
            result.ticks
        ),
        _ => println!("Draw after {} ticks", result.ticks),
    }
}

fn ranking(results_dir: PathBuf, top: usize) -> Result<()> {
    let log = ResultLog::new(&results_dir);
    let records = log
        .load()
        .with_context(|| format!("failed to read {}", log.path().display()))?;
    if records.is_empty() {
        println!("No contests recorded in {}", log.path().display());
        return Ok(());
    }
    print!("{}", Standings::from_records(&records).report(top));
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
