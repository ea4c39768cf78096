/// Schema of a cache snapshot file.
///
/// One row per fingerprint. The label column holds an empty string for
/// records still awaiting classification.
pub const SNAPSHOT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    fingerprint TEXT PRIMARY KEY NOT NULL,
    bookmark_id INTEGER NOT NULL,
    article TEXT NOT NULL,
    label TEXT NOT NULL DEFAULT ''
);
"#;

pub const SELECT_RECORDS: &str =
    "SELECT fingerprint, bookmark_id, article, label FROM records";

pub const INSERT_RECORD: &str =
    "INSERT INTO records (fingerprint, bookmark_id, article, label) VALUES (?1, ?2, ?3, ?4)";
