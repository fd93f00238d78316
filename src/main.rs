//! Proxy Delay Checker - Main CLI Application
//!
//! Asks a Clash-style proxy daemon to measure the delay of every leaf proxy
//! it knows about and optionally saves the healthy ones to a new profile.

use clap::Parser;
use proxy_delay_checker::{
    app::App,
    cli::Cli,
    config::{load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    BUILD_TIME, GIT_COMMIT, PKG_NAME, TARGET_TRIPLE, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is a bug; please report it together with the command line used.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    cli.validate().map_err(AppError::config)?;

    if cli.debug {
        eprintln!("{} v{} ({}, built {}, {})", PKG_NAME, VERSION, GIT_COMMIT, BUILD_TIME, TARGET_TRIPLE);
        eprintln!("Debug mode enabled");
        eprintln!();
    }

    let settings = load_config(cli)?;
    App::new(settings).run().await?;

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("{}", EnvManager::display_env_help());
        }
        AppError::Upstream(_) => {
            eprintln!();
            eprintln!("Control API troubleshooting:");
            eprintln!("  - Check that the daemon is running");
            eprintln!("  - Compare --controller with external-controller in the daemon's profile");
            eprintln!("  - Make sure nothing else is bound to that port");
        }
        AppError::Auth(_) => {
            eprintln!();
            eprintln!("Authentication help:");
            eprintln!("  - Pass the daemon's secret with --secret or PDC_SECRET");
        }
        _ => {}
    }
}
