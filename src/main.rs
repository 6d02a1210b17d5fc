//! Command line entry point of the team balancer service.
//!
//! # Usage
//!
//! ```text
//! team-balancer serve --bind 0.0.0.0:8000
//! team-balancer balance roster.csv --num-teams 3 --time-limit 5 --num-attempts 20
//! ```

use std::{fs::File, net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use team_balancer::{
    api::build_router, balancer::Balancer, configuration::Configuration, logger::init_logger,
    roster::read_csv_roster,
};

#[derive(Parser)]
#[command(name = "team-balancer", about = "Split a roster into balanced teams")]
struct Cli {
    /// Log to a timestamped file instead of stderr.
    #[arg(long, global = true)]
    log_file: bool,

    /// Worker threads per search.
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Balance a CSV roster once and print the result as JSON.
    Balance {
        /// CSV file with `name,overall,position` columns.
        csv: PathBuf,

        /// Number of teams.
        #[arg(long)]
        num_teams: Option<usize>,

        /// Search budget in seconds.
        #[arg(long)]
        time_limit: Option<f64>,

        /// Maximum number of attempts.
        #[arg(long)]
        num_attempts: Option<usize>,

        /// Fixed seed for a reproducible result.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Configuration::from_env();
    if cli.log_file {
        config = config.with_log(true);
    }
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    init_logger(config.log())?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config = config.with_bind_address(bind);
            }
            serve(config).await
        }
        Command::Balance {
            csv,
            num_teams,
            time_limit,
            num_attempts,
            seed,
        } => {
            let balancer = Balancer::new(config);
            let file = File::open(&csv)
                .with_context(|| format!("could not open roster '{}'", csv.display()))?;
            let mut builder = balancer.request_builder(read_csv_roster(file)?);
            if let Some(n) = num_teams {
                builder = builder.with_num_teams(n);
            }
            if let Some(secs) = time_limit {
                builder = builder.with_time_limit_secs(secs);
            }
            if let Some(n) = num_attempts {
                builder = builder.with_num_attempts(n);
            }
            if let Some(seed) = seed {
                builder = builder.with_seed(seed);
            }

            let request = builder.build()?;
            let response = tokio::task::spawn_blocking(move || balancer.balance(request))
                .await
                .context("balancing task failed")??;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

async fn serve(config: Configuration) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let router = build_router(Balancer::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!(%addr, "team balancer listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("server error")
}
