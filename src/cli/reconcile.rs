use serde_json::json;
use tracing::info;

use crate::checker::{CheckBudget, SubprocessChecker};
use crate::cli::commands::ReconcileArgs;
use crate::config::{self, types::CheckerConfig};
use crate::db::{Collections, Database};
use crate::errors::CacheError;
use crate::reconcile::ReconciliationJob;

pub async fn handle_reconcile(args: ReconcileArgs) -> Result<(), CacheError> {
    let config = config::load_config(args.config.as_deref()).await?;
    let server_config = config.server_config.unwrap_or_default();
    let checker_config = config.checker_config.unwrap_or_default();

    let db_path = args.db.unwrap_or_else(|| server_config.db_path_or_default());
    let collections = Collections {
        trusted: server_config.trusted_collection_or_default(),
        untrusted: server_config.untrusted_collection_or_default(),
    };

    // Flag commands override the config file; either must name a driver.
    let checker_config = CheckerConfig {
        check_cmd: args
            .check_cmd
            .map(|cmd| cmd.split_whitespace().map(String::from).collect())
            .or_else(|| checker_config.check_cmd.clone()),
        validate_cmd: args
            .validate_cmd
            .map(|cmd| cmd.split_whitespace().map(String::from).collect())
            .or_else(|| checker_config.validate_cmd.clone()),
        n_pumps: checker_config.n_pumps,
        time_limit_secs: checker_config.time_limit_secs,
    };

    let db = Database::new(&db_path, collections)?;
    let checker = SubprocessChecker::from_config(&checker_config)?;
    let budget = CheckBudget::from_config(&checker_config);

    info!(db = %db_path.display(), "Running reconciliation pass");
    let job = ReconciliationJob::new(&db, &checker, budget);
    let summary = job.run_pass().await?;

    println!(
        "{}",
        json!({
            "processed": summary.processed,
            "promoted": summary.promoted,
            "keptExisting": summary.kept_existing,
            "falseReports": summary.false_reports,
            "malformed": summary.malformed,
            "checkerFailures": summary.checker_failures,
            "storageFailures": summary.storage_failures,
        })
    );
    Ok(())
}
