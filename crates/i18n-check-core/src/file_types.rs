//! File type detection based on path extensions.
//!
//! Detection is path-based only (no I/O) and decides which reviewer a file
//! is dispatched to.

use std::path::Path;

/// The language family a reviewer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewerKind {
    Cpp,
    Csharp,
    Rc,
    Po,
}

pub const CPP_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "h", "hpp"];
pub const CSHARP_EXTENSIONS: &[&str] = &["cs"];
pub const RC_EXTENSIONS: &[&str] = &["rc"];
pub const PO_EXTENSIONS: &[&str] = &["po", "pot"];

/// Map a path to its reviewer, if the extension is recognized.
/// Matching is case-insensitive.
pub fn reviewer_kind_for(path: &Path) -> Option<ReviewerKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ext = ext.as_str();
    if CPP_EXTENSIONS.contains(&ext) {
        Some(ReviewerKind::Cpp)
    } else if CSHARP_EXTENSIONS.contains(&ext) {
        Some(ReviewerKind::Csharp)
    } else if RC_EXTENSIONS.contains(&ext) {
        Some(ReviewerKind::Rc)
    } else if PO_EXTENSIONS.contains(&ext) {
        Some(ReviewerKind::Po)
    } else {
        None
    }
}
