//! Diff engine for Vouch.
//!
//! Compares an expected payload tree with an actual one and reports every
//! discrepancy as data. A non-empty report is the caller's signal to fail.
//!
//! # Key Types
//!
//! - [`DiffReport`] / [`Difference`] -- Ordered list of typed discrepancies
//! - [`TolerantKeys`] -- Key names exempt from comparison anywhere in the tree
//! - [`PathQuery`] / [`Match`] -- JSONPath-style scope selection
//! - [`Format`] / [`XmlOptions`] -- Payload parsing (XML is projected to JSON shape)
//!
//! # Entry Points
//!
//! - [`diff_tree`] -- Recursive comparison of two nodes
//! - [`diff_at_path`] -- Comparison of the first node matching a scope on each side
//! - [`assert_field`] -- Single-field value and type assertion
//! - [`find_matching_document`] / [`find_matching_field`] -- Folder scans
//! - [`amend_at_path`] -- Type-preserving in-place edits

pub mod amend;
pub mod assertion;
pub mod difference;
pub mod document;
pub mod error;
pub mod query;
pub mod scan;
pub mod tree_diff;
pub mod xml;

pub use amend::{amend_at_path, cast_to_type};
pub use assertion::{assert_field, check_field};
pub use difference::{DiffReport, Difference, Side};
pub use document::{compare_documents, detect_format, parse_document, Format};
pub use error::{DiffError, DiffResult};
pub use query::{select, Match, PathQuery};
pub use scan::{find_matching_document, find_matching_field, scan_folder, Candidate, ScanMatch};
pub use tree_diff::{diff_at_path, diff_tree, diff_with_query, TolerantKeys};
pub use xml::{parse_xml, XmlOptions};
