use crate::config::LocatorConfig;
use crate::error::{NotFoundError, Result};

use log::{debug, info};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Finds candidate slice files below a directory.
pub struct SliceLocator {
    config: LocatorConfig,
}

impl SliceLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Recursively collect the slice files below `root`.
    ///
    /// The returned order is unspecified, callers sort by InstanceNumber.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `root` does not exist or nothing matches.
    pub fn locate(&self, root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(NotFoundError::MissingDirectory {
                path: root.to_path_buf(),
            }
            .into());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.matches(&name) {
                paths.push(normalize(entry.path()));
            } else {
                debug!("Skipping {}", entry.path().display());
            }
        }

        if paths.is_empty() {
            return Err(NotFoundError::NoSlices {
                extension: self.config.extension.clone(),
                root: root.to_path_buf(),
            }
            .into());
        }

        info!(
            "Found {} DICOM files in '{}'",
            paths.len(),
            root.display()
        );
        Ok(paths)
    }

    fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        let suffix = format!(".{}", self.config.extension.to_lowercase());
        if !name.ends_with(&suffix) {
            return false;
        }
        match &self.config.exclude_marker {
            Some(marker) => !name.contains(&marker.to_lowercase()),
            None => true,
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
