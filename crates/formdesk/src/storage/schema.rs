//! `SQLite` schema for formdesk.
//!
//! One table mirrors browser local storage: string keys mapping to whole
//! string values.

/// Version 1: the key/value table.
pub const CREATE_LOCAL_STORAGE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Version 2: when each key was last written. Null for rows older than v2.
pub const ADD_UPDATED_AT_COLUMN: &str = r"
ALTER TABLE local_storage ADD COLUMN updated_at TEXT
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_storage_table_columns() {
        assert!(CREATE_LOCAL_STORAGE_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_LOCAL_STORAGE_TABLE.contains("value TEXT NOT NULL"));
    }

    #[test]
    fn test_added_column_has_no_default() {
        // ALTER TABLE cannot add a column with a non-constant default.
        assert!(!ADD_UPDATED_AT_COLUMN.contains("DEFAULT"));
    }
}
