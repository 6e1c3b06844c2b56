use tracing::{info, warn};

use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config;
use crate::db::Collections;
use crate::errors::CacheError;

pub async fn handle_serve(args: ServeArgs) -> Result<(), CacheError> {
    let server_config = config::load_config(args.config.as_deref())
        .await?
        .server_config
        .unwrap_or_default();

    if server_config.tls_key_path.is_some() || server_config.tls_cert_path.is_some() {
        // TLS terminates at the fronting proxy; the paths are config-file
        // passthrough for its benefit.
        warn!("TLS paths configured; this process still serves plain HTTP");
    }

    let port = args.port.unwrap_or_else(|| server_config.port_or_default());
    let db_path = args.db.unwrap_or_else(|| server_config.db_path_or_default());
    let collections = Collections {
        trusted: server_config.trusted_collection_or_default(),
        untrusted: server_config.untrusted_collection_or_default(),
    };

    info!(db = %db_path.display(), port, "Starting lookup service");
    let state = api::create_app_state(&db_path, collections)?;
    let app = api::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| CacheError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
