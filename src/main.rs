use clap::Parser;
use tracing_subscriber::EnvFilter;

use vuln_regex_cache::{cli, config, errors};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        cli::Commands::Query(args) => cli::query::handle_query(args).await,
        cli::Commands::Report(args) => cli::report::handle_report(args).await,
        cli::Commands::Serve(args) => cli::serve::handle_serve(args).await,
        cli::Commands::Reconcile(args) => cli::reconcile::handle_reconcile(args).await,
        cli::Commands::Rescan(args) => cli::maintenance::handle_rescan(args).await,
        cli::Commands::Erase(args) => cli::maintenance::handle_erase(args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                errors::CacheError::Config(_) => 2,
                errors::CacheError::Transport(_) => 3,
                errors::CacheError::BackendUnavailable(_) => 4,
                errors::CacheError::Collaborator(_) => 5,
                errors::CacheError::InvalidQuery(_)
                | errors::CacheError::UnverifiedClaimRejected(_) => 6,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), errors::CacheError> {
    let _config = config::load_config(Some(&args.config)).await?;
    println!("Configuration is valid: {}", args.config.display());
    Ok(())
}
