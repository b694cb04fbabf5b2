//! Typed view over the per-package JSON metadata document.

use std::collections::BTreeMap;

use pkgmirror_verify::Checksum;
use serde::Deserialize;

use crate::index::IndexRecord;
use crate::name::PackageName;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub info:     Option<Info>,
    #[serde(default)]
    pub releases: Option<BTreeMap<String, Vec<FileDescriptor>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One entry of a release's file list, as published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDescriptor {
    pub filename:   String,
    pub url:        String,
    #[serde(default)]
    pub size:       u64,
    #[serde(default)]
    pub md5_digest: Option<String>,
    #[serde(default)]
    pub digests:    Digests,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Digests {
    #[serde(default)]
    pub md5:    Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl FileDescriptor {
    /// Declared checksum: md5 when present and well-formed, otherwise sha256.
    pub fn checksum(&self) -> Option<Checksum> {
        let md5 = self.md5_digest.as_deref().or(self.digests.md5.as_deref());
        md5.and_then(|d| Checksum::md5(d).ok())
            .or_else(|| self.digests.sha256.as_deref().and_then(|d| Checksum::sha256(d).ok()))
    }
}

/// A release artifact bound to its owning package and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    pub package:  PackageName,
    pub version:  String,
    pub filename: String,
    pub url:      String,
    pub size:     u64,
    pub checksum: Option<Checksum>,
}

impl ReleaseFile {
    pub fn new(package: &PackageName, version: &str, descriptor: &FileDescriptor) -> Self {
        Self {
            package:  package.clone(),
            version:  version.to_string(),
            filename: descriptor.filename.clone(),
            url:      descriptor.url.clone(),
            size:     descriptor.size,
            checksum: descriptor.checksum(),
        }
    }
}

impl PackageMetadata {
    pub fn releases(&self) -> impl Iterator<Item = (&str, &FileDescriptor)> {
        self.releases
            .iter()
            .flatten()
            .flat_map(|(version, files)| files.iter().map(move |f| (version.as_str(), f)))
    }

    /// The index line for this package, empty fields when `info` is absent.
    pub fn index_record(&self, name: &PackageName) -> IndexRecord {
        let info = self.info.clone().unwrap_or_default();
        IndexRecord::new(
            name.canonical(),
            info.version.unwrap_or_default(),
            info.summary.unwrap_or_default(),
        )
    }
}

/// Pretty-print the verbatim metadata document for `desc.json`.
pub fn render_snapshot(document: &serde_json::Value) -> serde_json::Result<Vec<u8>> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name() -> PackageName { PackageName::new("Foo").unwrap() }

    #[test]
    fn test_deserialize_releases() {
        let doc = json!({
            "info": {"version": "1.0", "summary": "A foo"},
            "releases": {
                "0.9": [],
                "1.0": [{
                    "filename": "foo-1.0.tar.gz",
                    "url": "https://files.example/foo-1.0.tar.gz",
                    "size": 100,
                    "md5_digest": "5eb63bbbe01eeed093cb22bb8f5acdc3",
                    "upload_time": "2013-01-01T00:00:00"
                }]
            }
        });

        let metadata: PackageMetadata = serde_json::from_value(doc).unwrap();
        let files: Vec<_> = metadata.releases().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "1.0");

        let release = ReleaseFile::new(&name(), files[0].0, files[0].1);
        assert_eq!(release.size, 100);
        assert_eq!(
            release.checksum.unwrap().to_string(),
            "md5:5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_missing_info_gives_empty_record() {
        let metadata: PackageMetadata =
            serde_json::from_value(json!({"info": null, "releases": null})).unwrap();
        let record = metadata.index_record(&name());
        assert_eq!(record.to_string(), "Foo |  | ");
        assert_eq!(metadata.releases().count(), 0);
    }

    #[test]
    fn test_summary_newlines_collapse() {
        let metadata: PackageMetadata = serde_json::from_value(
            json!({"info": {"version": "2.1", "summary": "line one\nline two\r\n"}}),
        )
        .unwrap();
        assert_eq!(metadata.index_record(&name()).summary, "line one.line two.");
    }

    #[test]
    fn test_checksum_falls_back_to_sha256() {
        let descriptor: FileDescriptor = serde_json::from_value(json!({
            "filename": "foo-1.0.whl",
            "url": "https://files.example/foo-1.0.whl",
            "size": 3,
            "md5_digest": "not-hex",
            "digests": {
                "sha256": "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
            }
        }))
        .unwrap();

        let checksum = descriptor.checksum().unwrap();
        assert_eq!(checksum.algorithm(), pkgmirror_verify::Algorithm::Sha256);
    }

    #[test]
    fn test_snapshot_uses_three_space_indent() {
        let rendered = render_snapshot(&json!({"info": {"version": "1.0"}})).unwrap();
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "{\n   \"info\": {\n      \"version\": \"1.0\"\n   }\n}"
        );
    }
}
