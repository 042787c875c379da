/// Plaintext backup of a procedure's source, served as a file download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Suggested file name, `<name>.sql`
    pub file_name: String,

    /// Raw source, exactly as fetched
    pub contents: String,
}

impl Backup {
    pub fn new(name: &str, contents: String) -> Self {
        Backup {
            file_name: format!("{}.sql", name),
            contents,
        }
    }

    /// Value for the `Content-Disposition` header
    ///
    /// Carries an ASCII-only `filename` for old clients plus the exact name
    /// percent-encoded in `filename*`.
    ///
    /// # Examples
    /// ```
    /// use plsql_restyle::downloader::Backup;
    ///
    /// let backup = Backup::new("P_REPORT", String::new());
    /// assert_eq!(
    ///     backup.content_disposition(),
    ///     "attachment; filename=\"P_REPORT.sql\"; filename*=UTF-8''P_REPORT.sql"
    /// );
    /// ```
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii_fallback(&self.file_name),
            urlencoding::encode(&self.file_name)
        )
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.contents.into_bytes()
    }
}

fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '$' | '#') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
