//! Folder scans: find the first document in a directory that satisfies a
//! comparison.
//!
//! Only regular files directly inside the directory are considered, in file
//! name order. Files that cannot be read or parsed are skipped with a warning.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use vouch_types::TypeName;
use walkdir::WalkDir;

use crate::assertion::assert_field;
use crate::document::{parse_document, Format};
use crate::error::{DiffError, DiffResult};
use crate::tree_diff::{diff_at_path, TolerantKeys};
use crate::xml::XmlOptions;

/// A matcher's verdict on one candidate document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    Match,
    /// Not a match, with a short reason for the log.
    Reject(String),
}

/// The document a scan settled on.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanMatch {
    pub file: PathBuf,
    pub tree: Value,
    /// Documents compared before and including the match.
    pub tried: usize,
}

/// Scan `dir` and return the first document `matcher` accepts.
///
/// Errors returned by the matcher abort the scan.
pub fn scan_folder<F>(dir: &Path, format: Format, options: &XmlOptions, mut matcher: F) -> DiffResult<ScanMatch>
where
    F: FnMut(&Path, &Value) -> DiffResult<Candidate>,
{
    let meta = std::fs::metadata(dir)?;
    if !meta.is_dir() {
        return Err(DiffError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let mut tried = 0;
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file = entry.path();

        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let tree = match parse_document(&text, format, options) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping unparsable file");
                continue;
            }
        };

        tried += 1;
        match matcher(file, &tree)? {
            Candidate::Match => {
                debug!(file = %file.display(), tried, "found matching document");
                return Ok(ScanMatch {
                    file: file.to_path_buf(),
                    tree,
                    tried,
                });
            }
            Candidate::Reject(reason) => {
                debug!(file = %file.display(), %reason, "candidate rejected");
            }
        }
    }

    Err(DiffError::NoMatchingDocument {
        dir: dir.to_path_buf(),
        candidates: tried,
    })
}

/// Find a document whose node at `scope` has no differences from `expected`.
pub fn find_matching_document(
    dir: &Path,
    format: Format,
    expected: &Value,
    scope: &str,
    tolerant: &TolerantKeys,
    options: &XmlOptions,
) -> DiffResult<ScanMatch> {
    scan_folder(dir, format, options, |_, candidate| {
        let report = diff_at_path(expected, candidate, scope, tolerant)?;
        if report.is_empty() {
            Ok(Candidate::Match)
        } else {
            Ok(Candidate::Reject(format!("{} difference(s)", report.len())))
        }
    })
}

/// Find a document whose first node at `expr` has the given text and type.
pub fn find_matching_field(
    dir: &Path,
    format: Format,
    expr: &str,
    value: &str,
    type_name: TypeName,
    options: &XmlOptions,
) -> DiffResult<ScanMatch> {
    scan_folder(dir, format, options, |_, candidate| {
        match assert_field(candidate, expr, value, type_name) {
            Ok(()) => Ok(Candidate::Match),
            Err(e @ (DiffError::NodeNotFound { .. } | DiffError::AssertionFailed { .. })) => {
                Ok(Candidate::Reject(e.to_string()))
            }
            Err(e) => Err(e),
        }
    })
}
