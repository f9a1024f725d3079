//! CLI entry point for the netswp ping sweeper.

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use netswp_core::NetworkRange;
use netswp_sweep::config::{OutputFormat, SweepConfig};
use netswp_sweep::error::SweepError;
use netswp_sweep::interfaces;
use netswp_sweep::platform::OsFamily;
use netswp_sweep::probe::{PingProber, ProbeConfig};
use netswp_sweep::reply;
use netswp_sweep::report;
use netswp_sweep::sweep::SweepCoordinator;

#[derive(Parser)]
#[command(name = "netswp")]
#[command(about = "Mini IPv4 and IPv6 ping sweep utility")]
struct Cli {
    /// Target network address (e.g. 172.30.16.0/20 or fd00:face:cafe:fade::/64).
    #[arg(short, long, value_name = "NETWORK_ADDRESS")]
    network: String,

    /// Interface to send probes from (default: best interface).
    #[arg(short, long)]
    interface: Option<String>,

    /// Maximum probes in flight (overrides config).
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Retry unbound when an interface-bound probe produces no output.
    #[arg(long)]
    fallback_unbound: bool,

    /// Config file prefix (default: netswp).
    #[arg(long, default_value = "netswp")]
    config: String,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if cli.log_json {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<SweepError>() {
            Some(sweep_err) => {
                println!("{}", report::render_failure(sweep_err));
                ExitCode::from(sweep_err.exit_code())
            }
            None => {
                eprintln!("[-] {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SweepConfig::load(&cli.config)?;
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if cli.json {
        config.output = OutputFormat::Json;
    }
    config.fallback_unbound |= cli.fallback_unbound;
    config.validate()?;

    let range = NetworkRange::parse(&cli.network).map_err(SweepError::from)?;
    range.ensure_sweepable().map_err(SweepError::from)?;

    let os = OsFamily::current();
    let text = config.output == OutputFormat::Text;

    if text {
        println!("Starting Ping Sweep...");
    }

    if let Some(iface) = cli.interface.as_deref() {
        interfaces::validate_interface(iface, &interfaces::available_interfaces())?;
        if text {
            println!("{iface} interface selected\n");
        }
        if !os.supports_interface_binding() {
            tracing::warn!(interface = %iface, os = %os, "Interface binding unsupported, probing unbound");
        }
    }

    let prober = PingProber::new(os, &config);
    let coordinator = SweepCoordinator::new(
        prober,
        reply::for_os(os),
        ProbeConfig::new(cli.interface.clone()),
        config.concurrency,
    )
    .with_host_lines(text);

    let cancel = CancellationToken::new();
    tokio::spawn(interrupt_signal(cancel.clone()));

    let summary = coordinator.run(&range, cancel).await?;

    match config.output {
        OutputFormat::Text => println!("{}", report::render_text(&summary)),
        OutputFormat::Json => println!("{}", report::render_json(&summary)?),
    }

    Ok(())
}

/// Cancel the sweep on Ctrl+C.
async fn interrupt_signal(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
            cancel.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
