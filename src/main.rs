use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use roster_shuffle::assign::{
    assign_single_roster, eligible_pool, DualTeamSolver, Participant, PoolKind, PriorityOverrides,
};
use roster_shuffle::config::Config;
use roster_shuffle::display::{format_assignment, format_stats, format_teams, write_report_to_file};
use roster_shuffle::parser::{load_participants, load_profiles, parse_priority_picks};
use roster_shuffle::profile::ProfileBook;

#[derive(Parser)]
#[command(name = "roster-shuffle", about = "Role rosters and 5v5 team splits for community events")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill one roster in signup order
    Assign(SheetArgs),
    /// Split attending participants into two balanced teams
    Shuffle {
        #[command(flatten)]
        sheet: SheetArgs,
        /// Seed for a reproducible split
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the HTTP server
    Web {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct SheetArgs {
    /// Sign-up sheet CSV (id,name,status,timestamp,roles,time)
    csv: String,
    /// Priority pick, e.g. --pick gold=1234
    #[arg(long = "pick")]
    picks: Vec<String>,
    /// Stored profiles CSV (id,roles) used when a row has no roles
    #[arg(long)]
    profiles: Option<String>,
    /// Also write the result to this file
    #[arg(long)]
    out: Option<String>,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_sheet(args: &SheetArgs) -> Result<(Vec<Participant>, PriorityOverrides)> {
    let profiles = match &args.profiles {
        Some(path) => load_profiles(path).map_err(|e| anyhow::anyhow!("Failed to load profiles: {}", e))?,
        None => ProfileBook::new(),
    };
    let participants =
        load_participants(&args.csv, &profiles).map_err(|e| anyhow::anyhow!("Failed to load {}: {}", args.csv, e))?;
    info!("Loaded {} participants ({} profiles)", participants.len(), profiles.len());

    let (picks, _rejected) = parse_priority_picks(&args.picks);
    Ok((participants, picks))
}

fn emit(report: &str, out: Option<&str>) -> Result<()> {
    println!("{}", report);
    if let Some(path) = out {
        write_report_to_file(report, path).map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
        info!("Saved to {}", path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    match Cli::parse().command {
        Command::Assign(args) => {
            let (participants, picks) = load_sheet(&args)?;
            let pool = eligible_pool(&participants, PoolKind::Roster);
            let assignment = assign_single_roster(&pool, &picks);
            emit(&format_assignment(&args.csv, &assignment), args.out.as_deref())?;
        }
        Command::Shuffle { sheet, seed } => {
            let (participants, picks) = load_sheet(&sheet)?;
            let pool = eligible_pool(&participants, PoolKind::Teams);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let solution = DualTeamSolver::default().solve(&pool, &picks, &mut rng)?;
            info!("{}", format_stats(&solution.stats));
            emit(&format_teams(&solution.teams), sheet.out.as_deref())?;
        }
        Command::Web { port } => {
            let mut config = Config::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting web server on port {}...", config.port);
            roster_shuffle::web::start_server(config).await?;
        }
    }

    Ok(())
}
