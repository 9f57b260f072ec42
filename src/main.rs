mod config;   // `config.rs`: layered settings (TOML file + QCAR__* env)
mod drive;    // `drive.rs`: scripted headless drive
mod pipeline; // `pipeline.rs`: sample collection → PADE → Q-label classes

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "qcar")]
#[command(about = "Steered-car parking simulator with qualitative (PADE) analysis", long_about = None)]
struct Cli {
    /// Config TOML file (optional; missing file means built-in defaults)
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive weaving sessions from several headings and classify the samples
    Sweep {
        /// Override the number of neighbours per tube
        #[arg(short = 'k', long)]
        neighbours: Option<usize>,
    },
    /// Coast from random headings and steering angles and classify the arcs
    Probe {
        /// Seed for reproducible probes
        #[arg(long)]
        seed: Option<u64>,

        /// Override the number of probes
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Override the number of neighbours per tube
        #[arg(short = 'k', long)]
        neighbours: Option<usize>,
    },
    /// Play the configured action script and log the car state per frame
    Drive {
        /// Pace frames at the session's frame rate
        #[arg(long)]
        realtime: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("qcar failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load_config(&cli.config)?;

    match cli.command {
        Command::Sweep { neighbours } => {
            if let Some(k) = neighbours {
                config.pade.neighbours = k;
            }
            info!(headings = ?config.sweep.initial_headings, "Running heading sweep");
            let classes = pipeline::run_sweep(&config)?;
            pipeline::print_classes(&classes);
        }
        Command::Probe { seed, count, neighbours } => {
            if let Some(k) = neighbours {
                config.pade.neighbours = k;
            }
            if let Some(n) = count {
                config.probe.count = n;
            }
            info!(count = config.probe.count, ?seed, "Running arc probes");
            let classes = pipeline::run_probe(&config, seed)?;
            pipeline::print_classes(&classes);
        }
        Command::Drive { realtime } => {
            config.drive.realtime |= realtime;
            let report = drive::run_drive(config.session, &config.drive)?;
            println!("frames:       {}", report.frames);
            println!("goal reached: {}", report.goal_reached);
            println!("world:        {}", report.world);
            println!("egocentric:   {}", report.egocentric);
        }
    }
    Ok(())
}
