mod collectors;
mod probes;
mod report;

use chrono::Utc;
use clap::{Parser, Subcommand};
use collectors::network::run_netcheck;
use collectors::system::{collect_sysinfo, default_provider};
use report::{build_report, default_prefix, save_report, Report, ReportError};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sysreport")]
#[command(version)]
#[command(about = "IT support toolkit: sysinfo + netcheck + report")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print system info as JSON
    Sysinfo,
    /// Run DNS + ping checks
    Netcheck {
        /// Host to DNS-resolve
        #[arg(long, default_value = "google.com")]
        dns: String,
        /// Host/IP to ping
        #[arg(long, default_value = "8.8.8.8")]
        ping: String,
    },
    /// Generate JSON + TXT support report
    Report {
        /// Host to DNS-resolve
        #[arg(long, default_value = "google.com")]
        dns: String,
        /// Host/IP to ping
        #[arg(long, default_value = "8.8.8.8")]
        ping: String,
        /// Output file prefix (no extension)
        #[arg(long)]
        out: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "parsed arguments");

    let result = match cli.command {
        Command::Sysinfo => cmd_sysinfo().await,
        Command::Netcheck { dns, ping } => cmd_netcheck(&dns, &ping).await,
        Command::Report { dns, ping, out } => cmd_report(&dns, &ping, out).await,
    };

    if let Err(err) = result {
        error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

async fn cmd_sysinfo() -> Result<(), ReportError> {
    let mut provider = default_provider();
    let info = collect_sysinfo(provider.as_mut()).await;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn cmd_netcheck(dns_host: &str, ping_host: &str) -> Result<(), ReportError> {
    let check = run_netcheck(dns_host, ping_host).await;
    println!("{}", serde_json::to_string_pretty(&check)?);
    Ok(())
}

async fn cmd_report(
    dns_host: &str,
    ping_host: &str,
    out: Option<String>,
) -> Result<(), ReportError> {
    let mut provider = default_provider();
    let report: Report = build_report(dns_host, ping_host, provider.as_mut()).await;

    let prefix = out.unwrap_or_else(|| default_prefix(Utc::now()));
    let (json_path, txt_path) = save_report(&report, &prefix)?;
    println!("Wrote: {}", json_path.display());
    println!("Wrote: {}", txt_path.display());
    Ok(())
}

/// Logging goes to stderr so JSON on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
