use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{info, warn};

use crate::cli::commands::{EraseArgs, RescanArgs};
use crate::config;
use crate::db::{Collections, Database};
use crate::errors::CacheError;

async fn open_database(
    config_path: Option<&Path>,
    db_override: Option<PathBuf>,
) -> Result<(Database, PathBuf), CacheError> {
    let config = config::load_config(config_path).await?;
    let server_config = config.server_config.unwrap_or_default();
    let db_path = db_override.unwrap_or_else(|| server_config.db_path_or_default());
    let collections = Collections {
        trusted: server_config.trusted_collection_or_default(),
        untrusted: server_config.untrusted_collection_or_default(),
    };
    let db = Database::new(&db_path, collections)?;
    Ok((db, db_path))
}

pub async fn handle_rescan(args: RescanArgs) -> Result<(), CacheError> {
    let (db, db_path) = open_database(args.config.as_deref(), args.db).await?;

    info!(db = %db_path.display(), "Demoting trusted SAFE records");
    let moved = db.rescan_safe()?;
    info!(moved, "Rescan complete; the next reconcile pass re-adjudicates");

    println!("{}", json!({ "moved": moved }));
    Ok(())
}

pub async fn handle_erase(args: EraseArgs) -> Result<(), CacheError> {
    if !args.yes {
        return Err(CacheError::Config(
            "Erase discards every stored verdict; pass --yes to confirm".into(),
        ));
    }

    let (db, db_path) = open_database(args.config.as_deref(), args.db).await?;

    warn!(db = %db_path.display(), "Erasing both verdict tables");
    db.erase_all()?;

    println!("{}", json!({ "erased": true }));
    Ok(())
}
