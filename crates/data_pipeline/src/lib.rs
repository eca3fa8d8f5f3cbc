pub mod catalog;
pub mod filters;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use data_import::{import_file, SnifferConfig};
use data_normalization::canonicalize;
use models::{dedup_by_signature, CanonicalAsset, FormatFamily, Settings, UNKNOWN_ISSUER};
use serde::Serialize;
use tracing::{info, warn};

pub use catalog::{Catalog, Dataset, Fingerprint};
pub use filters::{AssetFilter, FilterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Processed,
    /// Nothing usable came out of the file.
    Unprocessable,
}

/// Outcome of ingesting one source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub family: Option<FormatFamily>,
    /// Banking ran only because no other signature matched.
    pub fallback: bool,
    pub assets: Vec<CanonicalAsset>,
    /// Extracted rows rejected for a missing rate or maturity.
    pub dropped_rows: usize,
    pub failure: Option<String>,
}

impl FileReport {
    fn failed(source: &Path, failure: String) -> Self {
        Self {
            source: source.to_path_buf(),
            family: None,
            fallback: false,
            assets: Vec::new(),
            dropped_rows: 0,
            failure: Some(failure),
        }
    }

    pub fn status(&self) -> FileStatus {
        if self.assets.is_empty() {
            FileStatus::Unprocessable
        } else {
            FileStatus::Processed
        }
    }

    /// File name without directories, as shown in report listings.
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Statistics about a consolidation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

impl MergeStats {
    pub fn has_duplicates(&self) -> bool {
        self.skipped > 0
    }
}

/// Runs one file through load, sniff, dispatch and canonicalization.
///
/// Never fails: every error is captured in the report so the caller can move
/// on to the next file.
pub fn ingest_file(path: &Path, config: &SnifferConfig) -> FileReport {
    let dispatched = match import_file(path, config) {
        Ok(d) => d,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "file could not be processed");
            return FileReport::failed(path, e.to_string());
        }
    };

    let total = dispatched.records.len();
    let assets: Vec<CanonicalAsset> = dispatched
        .records
        .iter()
        .filter_map(|r| canonicalize(r).ok())
        .collect();
    let dropped_rows = total - assets.len();

    if assets.is_empty() {
        warn!(file = %path.display(), family = %dispatched.family, "no usable rows");
    } else {
        info!(
            file = %path.display(),
            family = %dispatched.family,
            assets = assets.len(),
            dropped_rows,
            "file ingested"
        );
    }

    FileReport {
        source: path.to_path_buf(),
        family: Some(dispatched.family),
        fallback: dispatched.fallback,
        assets,
        dropped_rows,
        failure: None,
    }
}

/// Ingests every file in order. One bad file never stops the others.
pub fn ingest_all(files: &[PathBuf], config: &SnifferConfig) -> Vec<FileReport> {
    files.iter().map(|f| ingest_file(f, config)).collect()
}

/// Concatenates the assets of every report and drops exact duplicates,
/// keeping the first occurrence.
pub fn consolidate(reports: &[FileReport]) -> (Vec<CanonicalAsset>, MergeStats) {
    let mut assets: Vec<CanonicalAsset> = reports
        .iter()
        .flat_map(|r| r.assets.iter().cloned())
        .collect();

    let total = assets.len();
    let skipped = dedup_by_signature(&mut assets);
    let stats = MergeStats {
        added: assets.len(),
        skipped,
        total,
    };
    (assets, stats)
}

/// Lists the input files in `dir`, sorted by path.
///
/// Hidden files and spreadsheet lock files ("~$report.xlsx") are skipped, as is
/// anything whose extension the settings do not accept.
pub fn discover_files(dir: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Reading data dir: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if filename.starts_with('.') || filename.starts_with("~$") {
            continue;
        }

        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| settings.accepts_extension(e));
        if accepted {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Sorted, unique issuer names other than the unknown sentinel.
pub fn distinct_issuers(assets: &[CanonicalAsset]) -> Vec<String> {
    assets
        .iter()
        .filter(|a| a.issuer != UNKNOWN_ISSUER)
        .map(|a| a.issuer.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const BANKING_CSV: &str = "\
Ofertas Renda Fixa,,,,
Produto,Prazo,Taxa,Aplicação Mínima,ROA
CDB Banco XYZ,720 dias,110% do CDI,\"R$ 1.000,00\",\"1,5%\"
,2026-05-10 00:00:00,,,
LCA Banco Pine Diária,Diária,92% CDI,\"R$ 5.000,00\",
,2026-12-01,,,
CDB Banco Master,360 dias,CDI,1000,
,2027-01-10,,,
";

    pub const REPO_CSV: &str = "\
Produto;Vencimento;Rentabilidade Anual;IR
Compromissada Banco BTG Pactual;2026-08-01;100% CDI;22,5%
";

    pub fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }
}
