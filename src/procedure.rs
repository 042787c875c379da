use crate::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static! {
    // Optionally schema-qualified, unquoted Oracle identifier
    static ref IDENTIFIER_REGEX: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9_$#]*(\.[A-Za-z][A-Za-z0-9_$#]*)?$").unwrap();
}

/// Query returning a procedure's source lines in order
pub const SOURCE_QUERY: &str = "SELECT TEXT FROM ALL_SOURCE WHERE NAME = :1 ORDER BY LINE";

/// Access to the database catalog holding procedure sources
///
/// Implementations open whatever connection they need inside each call and
/// release it before returning, on success and on error alike.
pub trait ProcedureStore: Send + Sync {
    /// Source of `name`, its lines joined without separators.
    /// `Ok(None)` when the catalog has no rows for it.
    fn fetch(&self, name: &str) -> Result<Option<String>, AppError>;

    /// Recreate `name` as `AS` followed by `new_text` and commit.
    /// Returns the source captured just before the replace (empty if none).
    fn replace(&self, name: &str, new_text: &str) -> Result<String, AppError>;
}

/// Catalog key for a procedure name: trimmed and upper-cased
pub fn catalog_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Reject names that cannot be spliced into DDL as a bare identifier
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if IDENTIFIER_REGEX.is_match(name.trim()) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid procedure name '{}'",
            name.trim()
        )))
    }
}

/// DDL statement that overwrites the definition of `name`
pub fn replace_statement(name: &str, new_text: &str) -> String {
    format!(
        "CREATE OR REPLACE PROCEDURE {} AS\n{}\n",
        catalog_key(name),
        new_text
    )
}

/// Store keeping sources in memory, laid out the way the catalog keeps them
#[derive(Debug, Default)]
pub struct MemoryStore {
    sources: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a procedure with raw source lines
    pub fn with_lines<I, S>(self, name: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut sources) = self.sources.lock() {
            sources.insert(
                catalog_key(name),
                lines.into_iter().map(Into::into).collect(),
            );
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<String>>>, AppError> {
        self.sources
            .lock()
            .map_err(|_| AppError::data_access("Source store lock poisoned"))
    }
}

impl ProcedureStore for MemoryStore {
    fn fetch(&self, name: &str) -> Result<Option<String>, AppError> {
        let sources = self.lock()?;
        Ok(sources
            .get(&catalog_key(name))
            .filter(|lines| !lines.is_empty())
            .map(|lines| lines.concat()))
    }

    fn replace(&self, name: &str, new_text: &str) -> Result<String, AppError> {
        validate_name(name)?;
        let key = catalog_key(name);
        let mut sources = self.lock()?;
        let old = sources.get(&key).map(|lines| lines.concat()).unwrap_or_default();

        // the catalog keeps the definition without its CREATE OR REPLACE prefix
        let ddl = replace_statement(name, new_text);
        let stored = ddl.trim_start_matches("CREATE OR REPLACE ");
        let lines = stored.split_inclusive('\n').map(str::to_string).collect();
        sources.insert(key, lines);

        Ok(old)
    }
}

#[cfg(feature = "web")]
pub use oracle_store::OracleStore;

#[cfg(feature = "web")]
mod oracle_store {
    use super::{ProcedureStore, SOURCE_QUERY, catalog_key, replace_statement, validate_name};
    use crate::config::DatabaseConfig;
    use crate::error::AppError;
    use log::{debug, info};
    use oracle::Connection;

    /// Store reading `ALL_SOURCE` over a fresh Oracle connection per call
    pub struct OracleStore {
        config: DatabaseConfig,
    }

    impl OracleStore {
        pub fn new(config: DatabaseConfig) -> Self {
            OracleStore { config }
        }

        fn connect(&self) -> Result<Connection, AppError> {
            debug!(
                "connecting to {} as {}",
                self.config.connect_string(),
                self.config.user
            );
            Connection::connect(
                &self.config.user,
                &self.config.password,
                self.config.connect_string(),
            )
            .map_err(|e| AppError::data_access(format!("Connection failed: {}", e)))
        }

        fn fetch_with(conn: &Connection, name: &str) -> Result<Option<String>, AppError> {
            let key = catalog_key(name);
            let rows = conn.query(SOURCE_QUERY, &[&key])?;

            let mut source = String::new();
            let mut found = false;
            for row in rows {
                let row = row?;
                let text: Option<String> = row.get(0)?;
                source.push_str(text.as_deref().unwrap_or(""));
                found = true;
            }

            Ok(found.then_some(source))
        }
    }

    impl ProcedureStore for OracleStore {
        fn fetch(&self, name: &str) -> Result<Option<String>, AppError> {
            // the connection is closed when dropped, whichever way we leave
            let conn = self.connect()?;
            Self::fetch_with(&conn, name)
        }

        fn replace(&self, name: &str, new_text: &str) -> Result<String, AppError> {
            validate_name(name)?;
            let conn = self.connect()?;

            let old = Self::fetch_with(&conn, name)?.unwrap_or_default();
            conn.execute(&replace_statement(name, new_text), &[])?;
            conn.commit()?;
            info!("replaced procedure {}", catalog_key(name));

            Ok(old)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fetch_joins_lines_without_separator() {
        let store = MemoryStore::new().with_lines("report_p", ["PROCEDURE REPORT_P AS\n", "BEGIN\n", "NULL;", " END;"]);
        assert_eq!(
            store.fetch("REPORT_P").unwrap().as_deref(),
            Some("PROCEDURE REPORT_P AS\nBEGIN\nNULL; END;")
        );
    }

    #[test]
    fn fetch_is_case_insensitive() {
        let store = MemoryStore::new().with_lines("P1", ["x"]);
        assert_eq!(store.fetch("p1").unwrap().as_deref(), Some("x"));
        assert_eq!(store.fetch("  P1 ").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn fetch_missing_is_absent_not_error() {
        let store = MemoryStore::new();
        assert_eq!(store.fetch("missing_proc").unwrap(), None);
    }

    #[test]
    fn replace_then_fetch_reflects_new_text() {
        let store = MemoryStore::new().with_lines("P1", ["PROCEDURE P1 AS\n", "BEGIN old; END;\n"]);
        let old = store.replace("p1", "BEGIN NULL; END;").unwrap();
        assert_eq!(old, "PROCEDURE P1 AS\nBEGIN old; END;\n");

        let now = store.fetch("p1").unwrap().unwrap();
        assert!(now.contains("BEGIN NULL; END;"));
        assert_eq!(now, "PROCEDURE P1 AS\nBEGIN NULL; END;\n");
    }

    #[test]
    fn replace_unknown_reports_empty_old_source() {
        let store = MemoryStore::new();
        assert_eq!(store.replace("fresh", "BEGIN NULL; END;").unwrap(), "");
        assert!(store.fetch("FRESH").unwrap().is_some());
    }

    #[test]
    fn replace_rejects_non_identifiers() {
        let store = MemoryStore::new();
        let err = store.replace("p; DROP TABLE x", "BEGIN NULL; END;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.fetch("p").unwrap(), None);
    }

    #[test]
    fn names_accepted_as_identifiers() {
        assert!(validate_name("P_REPORT$1").is_ok());
        assert!(validate_name("app.p_report").is_ok());
        assert!(validate_name(" p1 ").is_ok());
        assert!(validate_name("1abc").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("a.b.c").is_err());
    }

    #[test]
    fn statement_upper_cases_name() {
        assert_eq!(
            replace_statement(" p1 ", "BEGIN NULL; END;"),
            "CREATE OR REPLACE PROCEDURE P1 AS\nBEGIN NULL; END;\n"
        );
    }
}
