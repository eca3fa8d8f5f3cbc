use std::path::Path;

use models::{FormatFamily, RawRecord};
use tracing::debug;

use crate::data_parsers::{
    BankingExtractor, DebentureExtractor, PrivateCreditExtractor, PublicBondsExtractor,
    RepoExtractor,
};
use crate::grid::Grid;
use crate::sniffer::{Sheet, SnifferConfig};
use crate::{Extractor, ImportError};

/// Records produced by the one extractor that ran.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub family: FormatFamily,
    pub records: Vec<RawRecord>,
    /// True when no signature matched and Banking ran as the fallback.
    pub fallback: bool,
}

/// Every extractor, in the order the dispatcher tries them.
pub fn extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(BankingExtractor),
        Box::new(RepoExtractor),
        Box::new(PrivateCreditExtractor),
        Box::new(DebentureExtractor),
        Box::new(PublicBondsExtractor),
    ]
}

/// Simple registry to pick an extractor by family.
pub fn extractor_for(family: FormatFamily) -> Box<dyn Extractor> {
    match family {
        FormatFamily::Banking => Box::new(BankingExtractor),
        FormatFamily::Repo => Box::new(RepoExtractor),
        FormatFamily::PrivateCredit => Box::new(PrivateCreditExtractor),
        FormatFamily::Debenture => Box::new(DebentureExtractor),
        FormatFamily::PublicBonds => Box::new(PublicBondsExtractor),
    }
}

/// Family whose signature the sheet carries, without extracting anything.
pub fn probe_family(sheet: &Sheet) -> Option<FormatFamily> {
    extractors()
        .into_iter()
        .find(|e| e.applicable(sheet).is_ok())
        .map(|e| e.family())
}

/// Runs exactly one extractor over the sheet.
///
/// Candidates are tried in order until one accepts its signature. When all of
/// them reject, Banking runs anyway; if it lacks its required columns the sheet
/// has no applicable format.
pub fn dispatch(sheet: &Sheet) -> Result<Dispatched, ImportError> {
    for extractor in extractors() {
        match extractor.applicable(sheet) {
            Ok(()) => {
                let family = extractor.family();
                debug!(%family, "extractor accepted sheet");
                let records = extractor.extract(sheet)?;
                return Ok(Dispatched {
                    family,
                    records,
                    fallback: false,
                });
            }
            Err(ImportError::FormatNotApplicable { family, reason }) => {
                debug!(%family, %reason, "extractor rejected sheet");
            }
            Err(e) => return Err(e),
        }
    }

    debug!("no signature matched, forcing banking extractor");
    match BankingExtractor.extract(sheet) {
        Ok(records) => Ok(Dispatched {
            family: FormatFamily::Banking,
            records,
            fallback: true,
        }),
        Err(ImportError::MissingRequiredColumn { .. }) => Err(ImportError::NoApplicableFormat),
        Err(e) => Err(e),
    }
}

/// Loads, sniffs and dispatches one file.
pub fn import_file(path: &Path, config: &SnifferConfig) -> Result<Dispatched, ImportError> {
    let grid = Grid::load(path)?;
    let sheet = Sheet::sniff(grid, config)?;
    dispatch(&sheet)
}
