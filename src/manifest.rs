//! Dependency manifest loading.
//!
//! A dependency manifest is a plain text file listing one dependency label per
//! line, as produced by source translation tools. Blank lines are skipped and
//! surrounding whitespace is trimmed. There is no comment or escape syntax.

use camino::Utf8Path;
use std::fs;
use tracing::debug;

use crate::ir::GraphError;

/// Opaque identifier of a buildable unit. Order and duplicates are significant.
pub type DependencyLabel = String;

/// Reads ordered dependency labels from manifest files.
///
/// Every call reads the file afresh; nothing is cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestReader;

impl ManifestReader {
    /// Load the labels listed in `path`, preserving file order and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ResourceNotFound`] when the file is missing or
    /// cannot be read as UTF-8 text.
    pub fn read(path: &Utf8Path) -> Result<Vec<DependencyLabel>, GraphError> {
        let text = fs::read_to_string(path).map_err(|source| GraphError::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let labels = parse_labels(&text);
        debug!(manifest = %path, count = labels.len(), "read dependency manifest");
        Ok(labels)
    }
}

/// Split manifest text into labels.
#[must_use]
pub fn parse_labels(text: &str) -> Vec<DependencyLabel> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
