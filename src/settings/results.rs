//! Replicate / file registry
//!
//! Result rows in the document name a replicate and, optionally, a file id
//! within it. The registry is built by the settings reader and only ever
//! queried afterwards.

use std::fmt;
use std::sync::Arc;

/// Identifier of one measurement file within a replicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChromFileId(Arc<str>);

impl ChromFileId {
    /// Wrap a file id
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The id text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChromFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One measurement file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromFileInfo {
    /// File id
    pub id: ChromFileId,
    /// Location of the file
    pub path: String,
}

/// A named replicate and its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromatogramSet {
    /// Replicate name
    pub name: String,
    /// Files in document order
    pub files: Vec<ChromFileInfo>,
}

impl ChromatogramSet {
    /// Create a replicate
    pub fn new(name: impl Into<String>, files: Vec<ChromFileInfo>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// File with the given id
    pub fn find_file_by_id(&self, id: &str) -> Option<&ChromFileId> {
        self.files
            .iter()
            .find(|file| file.id.as_str() == id)
            .map(|file| &file.id)
    }

    /// The first file, used when a result row omits its file id
    pub fn first_file(&self) -> Option<&ChromFileId> {
        self.files.first().map(|file| &file.id)
    }
}

/// The ordered replicate registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasuredResults {
    chromatograms: Vec<ChromatogramSet>,
}

impl MeasuredResults {
    /// Create a registry
    pub fn new(chromatograms: Vec<ChromatogramSet>) -> Self {
        Self { chromatograms }
    }

    /// Replicates in order
    pub fn chromatograms(&self) -> &[ChromatogramSet] {
        &self.chromatograms
    }

    /// Number of replicates
    pub fn len(&self) -> usize {
        self.chromatograms.len()
    }

    /// Whether the registry has no replicates
    pub fn is_empty(&self) -> bool {
        self.chromatograms.is_empty()
    }

    /// Position and definition of a replicate by name
    pub fn find_replicate(&self, name: &str) -> Option<(usize, &ChromatogramSet)> {
        self.chromatograms
            .iter()
            .enumerate()
            .find(|(_, set)| set.name == name)
    }

    /// Replicate at a position
    pub fn get(&self, index: usize) -> Option<&ChromatogramSet> {
        self.chromatograms.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MeasuredResults {
        MeasuredResults::new(vec![
            ChromatogramSet::new(
                "R1",
                vec![
                    ChromFileInfo {
                        id: ChromFileId::new("f1"),
                        path: "r1a.raw".into(),
                    },
                    ChromFileInfo {
                        id: ChromFileId::new("f2"),
                        path: "r1b.raw".into(),
                    },
                ],
            ),
            ChromatogramSet::new(
                "R2",
                vec![ChromFileInfo {
                    id: ChromFileId::new("f3"),
                    path: "r2.raw".into(),
                }],
            ),
        ])
    }

    #[test]
    fn test_find_replicate() {
        let results = registry();
        let (index, set) = results.find_replicate("R2").unwrap();
        assert_eq!(index, 1);
        assert_eq!(set.first_file().unwrap().as_str(), "f3");
        assert!(results.find_replicate("R3").is_none());
    }

    #[test]
    fn test_find_file() {
        let results = registry();
        let set = results.get(0).unwrap();
        assert_eq!(set.find_file_by_id("f2").unwrap().as_str(), "f2");
        assert!(set.find_file_by_id("f3").is_none());
        assert_eq!(set.first_file().unwrap().as_str(), "f1");
    }
}
