use crate::api::{self, DEFAULT_HOST, DEFAULT_PORT};
use crate::config::Config;
use crate::log::ActivityLogger;
use crate::lookup::Lookup;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bilreg", version, about = "Vehicle and owner lookups (JSON only)")]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Vehicle data for a registration number
    Vehicle { regnr: String },
    /// Current owner's profile, found through the vehicle page
    Owner { regnr: String },
    /// Owner profile by profile id
    Profile { profile_id: String },
    /// All vehicles registered at the owner's address
    Address { regnr: String },
    /// Force a credential refresh
    Refresh,
    /// Run the JSON API
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: IpAddr,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => return fail(e),
    };

    match runtime.block_on(execute(cli.cmd)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

async fn execute(cmd: Command) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let mut lookup = Lookup::from_config(&config)?;
    match ActivityLogger::new() {
        Ok(logger) => lookup = lookup.with_activity_log(logger),
        Err(e) => tracing::debug!(error = %e, "activity log disabled"),
    }

    match cmd {
        Command::Vehicle { regnr } => print_json(&lookup.vehicle(&regnr).await?),
        Command::Owner { regnr } => print_json(&lookup.owner_by_regnr(&regnr).await?),
        Command::Profile { profile_id } => print_json(&lookup.owner_profile(&profile_id).await?),
        Command::Address { regnr } => print_json(&lookup.address_vehicles(&regnr).await?),
        Command::Refresh => print_json(&lookup.refresh().await),
        Command::Serve { host, port } => {
            api::serve(SocketAddr::new(host, port), Arc::new(lookup)).await
        }
    }
}

fn print_json<T: Serialize>(val: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn fail(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}
