//! Read-mostly cache of the consolidated dataset.
//!
//! The dataset is rebuilt outside the lock and swapped in whole, so readers
//! see either the previous dataset or the new one.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use data_import::SnifferConfig;
use models::{CanonicalAsset, Settings};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::{consolidate, discover_files, ingest_all, FileReport, MergeStats};

/// SHA-256 over the sorted (path, mtime, length) of every input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_files(files: &[PathBuf]) -> Result<Self> {
        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let meta = fs::metadata(path)
                .with_context(|| format!("Reading metadata: {}", path.display()))?;
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            entries.push(format!("{}|{}|{}", path.display(), mtime, meta.len()));
        }
        entries.sort();

        let mut hasher = Sha256::new();
        for entry in &entries {
            hasher.update(entry.as_bytes());
            hasher.update(b"\n");
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything ingested from one file set.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub fingerprint: Fingerprint,
    pub reports: Vec<FileReport>,
    pub assets: Vec<CanonicalAsset>,
    pub stats: MergeStats,
}

impl Dataset {
    pub fn build(files: &[PathBuf], fingerprint: Fingerprint, config: &SnifferConfig) -> Self {
        let reports = ingest_all(files, config);
        let (assets, stats) = consolidate(&reports);
        info!(
            files = reports.len(),
            assets = assets.len(),
            duplicates = stats.skipped,
            "dataset consolidated"
        );
        Self {
            fingerprint,
            reports,
            assets,
            stats,
        }
    }

    pub fn report(&self, name: &str) -> Option<&FileReport> {
        self.reports.iter().find(|r| r.name() == name)
    }
}

pub struct Catalog {
    settings: Settings,
    cache: RwLock<Option<Arc<Dataset>>>,
}

impl Catalog {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cache: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current dataset, rebuilt first if the file set changed since the last build.
    pub fn dataset(&self) -> Result<Arc<Dataset>> {
        let files = discover_files(&self.settings.data_dir, &self.settings)?;
        let fingerprint = Fingerprint::of_files(&files)?;

        if let Some(current) = self.cached() {
            if current.fingerprint == fingerprint {
                return Ok(current);
            }
            debug!("input files changed, rebuilding dataset");
        }

        let config = SnifferConfig::from(&self.settings);
        let dataset = Arc::new(Dataset::build(&files, fingerprint, &config));
        *self.write() = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Dataset from the last build, without touching the file system.
    pub fn cached(&self) -> Option<Arc<Dataset>> {
        self.read().clone()
    }

    /// Drops the cached dataset. The next call to [`Catalog::dataset`] rebuilds it.
    pub fn invalidate(&self) {
        *self.write() = None;
        debug!("dataset cache invalidated");
    }

    /// Report for one file, looked up by file name.
    pub fn report(&self, name: &str) -> Result<Option<FileReport>> {
        let dataset = self.dataset()?;
        Ok(dataset.report(name).cloned())
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<Dataset>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Dataset>>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}
