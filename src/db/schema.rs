use super::Collections;

/// Table DDL. Collection names are validated identifiers by the time they
/// reach here (see `Collections::validate`), so interpolation is safe.
pub fn create_tables(collections: &Collections) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {trusted} (
    key TEXT PRIMARY KEY,
    pattern TEXT NOT NULL,
    language TEXT NOT NULL,
    result TEXT NOT NULL,
    evil_input TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS {untrusted} (
    id TEXT PRIMARY KEY,
    pattern TEXT NOT NULL,
    language TEXT NOT NULL,
    result TEXT NOT NULL,
    evil_input TEXT,
    created_at TEXT NOT NULL
);
"#,
        trusted = collections.trusted,
        untrusted = collections.untrusted,
    )
}
