//! Specification catalog - loads specification JSON from the filesystem
//!
//! A file holds either one specification object or an array of them, the
//! same shape `export` writes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::spec::Specification;
use crate::system::system_specifications;

/// Ordered list of specifications; order is matching priority
#[derive(Debug, Default, Clone)]
pub struct SpecCatalog {
    specs: Vec<Specification>,
    /// Number of files scanned
    pub scanned_files: usize,
    /// Per-file load errors
    pub errors: Vec<String>,
    /// Scan duration in milliseconds
    pub scan_ms: u128,
}

impl SpecCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a file or a directory tree for `*.json` specifications
    pub fn scan(root: impl AsRef<Path>) -> Self {
        let started = Instant::now();
        let root = root.as_ref();
        let mut catalog = Self::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    catalog.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            catalog.scanned_files += 1;
            if let Err(err) = catalog.load_file(path) {
                catalog.errors.push(format!("{}: {:#}", path.display(), err));
            }
        }

        catalog.scan_ms = started.elapsed().as_millis();
        debug!(
            root = %root.display(),
            files = catalog.scanned_files,
            specs = catalog.len(),
            errors = catalog.errors.len(),
            "specification scan finished"
        );
        catalog
    }

    /// Scan multiple roots, keeping their order
    pub fn scan_roots(roots: &[PathBuf]) -> Self {
        let started = Instant::now();
        let mut catalog = Self::new();

        for root in roots {
            catalog.merge(Self::scan(root));
        }

        catalog.scan_ms = started.elapsed().as_millis();
        catalog
    }

    /// Append the built-in system specifications
    pub fn with_system_specs(mut self) -> Self {
        self.specs.extend(system_specifications());
        self
    }

    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        self.specs.extend(other.specs);
    }

    pub fn push(&mut self, spec: Specification) {
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[Specification] {
        &self.specs
    }

    /// Find by id first, then by name
    pub fn get(&self, key: &str) -> Option<&Specification> {
        self.specs
            .iter()
            .find(|spec| spec.id.as_deref() == Some(key))
            .or_else(|| self.specs.iter().find(|spec| spec.name == key))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Write every specification as one JSON array
    pub fn export(&self, path: &Path) -> Result<usize> {
        let json = serde_json::to_string_pretty(&self.specs)?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(self.specs.len())
    }

    /// Parse an exported file: one object or an array of objects
    pub fn parse(content: &str) -> Result<Vec<Specification>> {
        let value: serde_json::Value = serde_json::from_str(content)?;

        let items = match value {
            serde_json::Value::Array(items) => items,
            single => vec![single],
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Specification::from_value(item)
                    .with_context(|| format!("specification #{index}"))
            })
            .collect()
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let specs = Self::parse(&content)?;
        if specs.is_empty() {
            warn!(path = %path.display(), "file holds no specifications");
        }
        self.specs.extend(specs);
        Ok(())
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules"))
            .unwrap_or(false)
    }
}
