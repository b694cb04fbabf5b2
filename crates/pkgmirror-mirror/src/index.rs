//! The flat, append-only index of reconciled packages.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{MirrorError, Result};

pub const FIELD_SEPARATOR: &str = " | ";

/// One line of the index: `name | version | summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub name:    String,
    pub version: String,
    pub summary: String,
}

impl IndexRecord {
    /// Build a record, collapsing summary line breaks so it stays one line.
    pub fn new(name: impl Into<String>, version: impl Into<String>, summary: impl AsRef<str>) -> Self {
        Self {
            name:    name.into(),
            version: version.into(),
            summary: summary.as_ref().replace('\r', "").replace('\n', "."),
        }
    }

    /// Parse an index line; `None` when it has fewer than three fields.
    ///
    /// Only the first two separators split, so a summary may itself contain one.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.splitn(3, FIELD_SEPARATOR);
        let name = fields.next()?;
        let version = fields.next()?;
        let summary = fields.next()?;
        Some(Self {
            name:    name.to_string(),
            version: version.to_string(),
            summary: summary.to_string(),
        })
    }
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.name, self.version, self.summary
        )
    }
}

/// Appends records as they arrive and counts them.
pub struct IndexWriter {
    path:  PathBuf,
    file:  File,
    count: u64,
}

impl IndexWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| MirrorError::Index {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file,
            count: 0,
        })
    }

    pub fn append(&mut self, record: &IndexRecord) -> Result<()> {
        writeln!(self.file, "{record}").map_err(|source| MirrorError::Index {
            path: self.path.clone(),
            source,
        })?;
        self.count += 1;
        tracing::debug!(package = %record.name, count = self.count, "indexed");
        Ok(())
    }

    /// Records appended by this writer, not lines in the file.
    pub fn count(&self) -> u64 { self.count }

    pub fn path(&self) -> &Path { &self.path }

    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|source| MirrorError::Index {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_line_format() {
        let record = IndexRecord::new("Foo", "1.0", "Does foo things");
        assert_eq!(record.to_string(), "Foo | 1.0 | Does foo things");
    }

    #[test]
    fn test_parse_line() {
        let record = IndexRecord::parse("Foo | 1.0 | a | b\n").unwrap();
        assert_eq!(record.name, "Foo");
        assert_eq!(record.version, "1.0");
        assert_eq!(record.summary, "a | b");

        assert!(IndexRecord::parse("Foo | 1.0").is_none());
        assert_eq!(IndexRecord::parse("Foo |  | ").unwrap().version, "");
    }

    #[test]
    fn test_writer_appends_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index");

        let mut writer = IndexWriter::open(&path).unwrap();
        writer.append(&IndexRecord::new("Foo", "1.0", "first")).unwrap();
        assert_eq!(writer.count(), 1);
        drop(writer);

        let mut writer = IndexWriter::open(&path).unwrap();
        writer.append(&IndexRecord::new("Foo", "1.1", "second")).unwrap();
        writer.sync().unwrap();
        assert_eq!(writer.count(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Foo | 1.0 | first\nFoo | 1.1 | second\n");
    }
}
