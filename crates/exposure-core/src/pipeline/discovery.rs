//! File discovery for finding source photographs.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::types::file_name_of;

/// Discovers image files in the source directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the discovery root, mirrored in the output tree
    pub relative: PathBuf,
    /// Asset name: the relative path with `/` separators, unique per root
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported. If path is a directory,
    /// lists its supported files, descending only when `recursive` is set.
    /// A missing path yields an empty list.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            let relative = path.file_name().map(PathBuf::from);
            return relative
                .and_then(|relative| self.entry(path, relative))
                .into_iter()
                .collect();
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(path).ok()?.to_path_buf();
                self.entry(e.path(), relative)
            })
            .collect();

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn entry(&self, path: &Path, relative: PathBuf) -> Option<DiscoveredFile> {
        if !self.is_supported(path) || file_name_of(path).is_none() {
            return None;
        }
        let meta = std::fs::metadata(path).ok()?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(DiscoveredFile {
            path: path.to_path_buf(),
            relative,
            name,
            size: meta.len(),
        })
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}
