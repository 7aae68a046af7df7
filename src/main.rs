//! cloudserver-vpn CLI - On-demand WireGuard VPN
//!
//! Creates or removes VPN servers on CloudServer using settings from the
//! environment, or serves the same operations over HTTP.

use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::{fmt, EnvFilter};

use cloudserver_vpn::{http, CloudVpnError, Provisioner, Settings};

/// Run a New Zealand based VPN on demand for only 1.5c per hour
#[derive(Parser, Debug)]
#[command(name = "cloudserver-vpn")]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
#[command(group(ArgGroup::new("action").required(true).args(["create", "remove", "serve"])))]
struct Args {
    /// Create a VPN server
    #[arg(long)]
    create: bool,

    /// Remove all created VPN servers, or a single server by id
    #[arg(long, value_name = "ID", num_args = 0..=1)]
    remove: Option<Option<u64>>,

    /// Create an HTTP server
    #[arg(long)]
    serve: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), CloudVpnError> {
    let provisioner = Provisioner::new(Settings::from_env());

    if args.create {
        tracing::info!("Creating and configuring vps");
        provisioner.create_and_publish().await?;
        tracing::info!("Completed successfully");
        return Ok(());
    }

    if let Some(target) = args.remove {
        match target {
            Some(server_id) => provisioner.remove(&[server_id]).await?,
            None => {
                provisioner.remove_all().await?;
            }
        }
        tracing::info!("Completed successfully");
        return Ok(());
    }

    run_serve(provisioner).await
}

/// Run serve mode until Ctrl+C
async fn run_serve(provisioner: Provisioner) -> Result<(), CloudVpnError> {
    let ctrl_c = tokio::signal::ctrl_c();

    tokio::select! {
        result = http::serve(provisioner) => {
            result
        }
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    }
}
