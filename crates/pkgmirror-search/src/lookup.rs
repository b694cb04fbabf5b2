use std::collections::HashMap;
use std::io;
use std::path::Path;

use pkgmirror_mirror::IndexRecord;

use crate::error::{Result, SearchError};

/// The latest record per package name, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    records: Vec<IndexRecord>,
}

impl SearchIndex {
    /// Build from index text; malformed lines are skipped and a later record
    /// for the same name replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let mut records: Vec<IndexRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in text.lines().filter_map(IndexRecord::parse) {
            match positions.get(&record.name) {
                Some(&at) => records[at] = record,
                None => {
                    positions.insert(record.name.clone(), records.len());
                    records.push(record);
                }
            }
        }

        Self { records }
    }

    /// Load the index file; a missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "index not found, answering with no results");
                Ok(Self::default())
            }
            Err(source) => Err(SearchError::Index {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Records whose name starts with `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&IndexRecord> {
        let term = term.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.name.to_lowercase().starts_with(&term))
            .collect()
    }
}
