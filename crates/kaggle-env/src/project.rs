//! Working-directory sanity check.
//!
//! A heuristic for "is this the project root": the directory name contains a
//! marker, or a known entry-point file exists. It only ever drives an
//! advisory prompt.

use std::path::{Path, PathBuf};

/// Why a directory was recognized as a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectMatch {
    /// The directory name contains the marker.
    NameMarker(String),
    /// An entry-point file exists.
    EntryPoint(PathBuf),
}

/// Check `dir` against the marker (case-insensitive) and entry-point files
/// (relative to `dir`). Returns `None` when neither matches.
pub fn recognize_project(dir: &Path, marker: &str, entry_points: &[PathBuf]) -> Option<ProjectMatch> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let marker = marker.to_lowercase();
    if !marker.is_empty() && name.contains(&marker) {
        return Some(ProjectMatch::NameMarker(name));
    }

    entry_points
        .iter()
        .map(|entry| dir.join(entry))
        .find(|candidate| candidate.is_file())
        .map(ProjectMatch::EntryPoint)
}
