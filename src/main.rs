//! headerblock gateway.
//!
//! Sits in front of one upstream and rejects requests before they reach it.
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ listener ─▶ filter ──allow──▶ forward ─────┼──▶ Upstream
//!                           │                 │                            │
//!     403 (empty body)      │                 │ deny                       │
//!     ◀─────────────────────┼─────────────────┘                            │
//!                           │                                              │
//!                           │  config watcher ─▶ recompile ─▶ swap filter  │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use headerblock::lifecycle::startup::{self, StartupOptions};
use headerblock::observability::logging;

#[derive(Parser)]
#[command(name = "headerblock")]
#[command(about = "Block HTTP requests by client IP and header rules", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate and compile the configuration, then exit.
    #[arg(long)]
    check: bool,

    /// Do not reload the filter when the configuration file changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match startup::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("headerblock: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);

    if cli.check {
        return match startup::check(&config) {
            Ok(report) => {
                println!(
                    "configuration ok: {} block rules, {} whitelist rules, {} allowed networks",
                    report.block_rules, report.whitelist_rules, report.allowed_networks
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("headerblock: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    tracing::info!("headerblock v{} starting", env!("CARGO_PKG_VERSION"));

    let options = StartupOptions {
        config_path: cli.config,
        watch: !cli.no_watch,
    };

    match startup::start(config, options).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
