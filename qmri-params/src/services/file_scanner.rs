//! Acquisition file scanner
//!
//! Walks a dataset root once and sorts what it finds into MPRAGE files
//! (images and sidecars, already parsed) and B1 field maps. Candidates that
//! look like MPRAGE files but fail the grammar are logged and skipped.

use crate::models::ParsedFilename;
use crate::services::filename_parser::{
    is_mprage_candidate, parse_b1map_filename, parse_mprage_filename, B1MapName,
};
use qmri_common::config::DEFAULT_IGNORE_PATTERNS;
use qmri_common::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// An MPRAGE file found on disk
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub parsed: ParsedFilename,
}

/// A B1 field map found on disk
#[derive(Debug, Clone)]
pub struct ScannedB1Map {
    pub path: PathBuf,
    pub name: B1MapName,
}

/// Scan result
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Images and sidecars matching the grammar, sorted by path
    pub files: Vec<ScannedFile>,
    /// B1 maps, sorted by path
    pub b1_maps: Vec<ScannedB1Map>,
    /// MPRAGE candidates that failed the grammar
    pub skipped: Vec<PathBuf>,
}

/// Dataset file scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Create new file scanner with default ignore patterns
    pub fn new() -> Self {
        Self::with_ignore_patterns(DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect())
    }

    /// Create a scanner that skips entries named exactly like a pattern
    ///
    /// Dot-prefixed entries are skipped regardless of the patterns.
    pub fn with_ignore_patterns(ignore_patterns: Vec<String>) -> Self {
        Self { ignore_patterns }
    }

    /// Walk `root_path` recursively
    pub fn scan(&self, root_path: &Path) -> Result<ScanResult> {
        if !root_path.exists() {
            return Err(Error::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(Error::NotADirectory(root_path.to_path_buf()));
        }

        let mut result = ScanResult::default();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if is_mprage_candidate(&file_name) {
                match parse_mprage_filename(&file_name) {
                    Ok(parsed) => result.files.push(ScannedFile {
                        path: entry.path().to_path_buf(),
                        parsed,
                    }),
                    Err(e) => {
                        tracing::warn!(path = %entry.path().display(), "Skipping unparsable file: {}", e);
                        result.skipped.push(entry.path().to_path_buf());
                    }
                }
            } else if let Some(name) = parse_b1map_filename(&file_name) {
                result.b1_maps.push(ScannedB1Map {
                    path: entry.path().to_path_buf(),
                    name,
                });
            }
        }

        tracing::debug!(
            root = %root_path.display(),
            files = result.files.len(),
            b1_maps = result.b1_maps.len(),
            skipped = result.skipped.len(),
            "Scan complete"
        );

        Ok(result)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        // Never filter the root itself
        if entry.depth() == 0 {
            return true;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            return false;
        }
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name == pattern.as_str())
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
