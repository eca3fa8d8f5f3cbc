//! Best-asset selection.
//!
//! Assets are ranked by (grace-free, daily-liquid, nearest maturity year,
//! highest rate) and split into three buckets. Term assets are capped per
//! maturity year rather than globally, so offers for distant years still show
//! up next to the many near-term ones.

use std::collections::{BTreeMap, HashMap};

use models::{dedup_by_signature, CanonicalAsset, FormatFamily, Settings};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Audience of a report. Advisors see more rows per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Client,
    Advisor,
}

impl SelectionMode {
    pub fn top_n(&self, settings: &Settings) -> usize {
        match self {
            SelectionMode::Client => settings.top_n,
            SelectionMode::Advisor => settings.advisor_top_n,
        }
    }

    /// Mode actually used for a report of the given family.
    ///
    /// Repo reports always fall back to client mode since repos carry no ROA.
    pub fn for_family(self, family: Option<FormatFamily>) -> Self {
        match family {
            Some(FormatFamily::Repo) => SelectionMode::Client,
            _ => self,
        }
    }

    pub fn shows_roa(&self) -> bool {
        matches!(self, SelectionMode::Advisor)
    }
}

/// Selected assets, grouped the way reports display them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BestAssets {
    /// Daily liquidity with no grace period.
    pub grace_free: Vec<CanonicalAsset>,
    /// Daily liquidity after a grace period.
    pub daily_liquid: Vec<CanonicalAsset>,
    pub term_by_year: BTreeMap<i32, Vec<CanonicalAsset>>,
}

impl BestAssets {
    pub fn len(&self) -> usize {
        self.grace_free.len()
            + self.daily_liquid.len()
            + self.term_by_year.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every selected asset in display order.
    pub fn all(&self) -> Vec<CanonicalAsset> {
        self.grace_free
            .iter()
            .chain(self.daily_liquid.iter())
            .chain(self.term_by_year.values().flatten())
            .cloned()
            .collect()
    }
}

/// Stable sort by the ranking key.
pub fn rank(assets: &mut [CanonicalAsset]) {
    assets.sort_by(|a, b| a.ranking_cmp(b));
}

/// Top `top_n` of each liquidity bucket, term assets capped per maturity year.
/// The result is deduplicated and ranked.
pub fn select(assets: &[CanonicalAsset], top_n: usize) -> Vec<CanonicalAsset> {
    let mut sorted = assets.to_vec();
    rank(&mut sorted);

    let grace_free = sorted.iter().filter(|a| a.is_grace_free).take(top_n);
    let daily = sorted
        .iter()
        .filter(|a| a.is_daily_liquid && !a.is_grace_free)
        .take(top_n);

    let mut per_year: HashMap<i32, usize> = HashMap::new();
    let term = sorted.iter().filter(|a| !a.is_daily_liquid).filter(|a| {
        let count = per_year.entry(a.maturity_year).or_insert(0);
        *count += 1;
        *count <= top_n
    });

    let mut selected: Vec<CanonicalAsset> = grace_free.chain(daily).chain(term).cloned().collect();
    let removed = dedup_by_signature(&mut selected);
    rank(&mut selected);

    debug!(
        input = assets.len(),
        selected = selected.len(),
        duplicates = removed,
        top_n,
        "best assets selected"
    );
    selected
}

/// Runs [`select`] and groups the result into display buckets.
pub fn find_best_assets(assets: &[CanonicalAsset], top_n: usize) -> BestAssets {
    let mut best = BestAssets::default();
    for asset in select(assets, top_n) {
        if asset.is_grace_free {
            best.grace_free.push(asset);
        } else if asset.is_daily_liquid {
            best.daily_liquid.push(asset);
        } else {
            best.term_by_year
                .entry(asset.maturity_year)
                .or_default()
                .push(asset);
        }
    }
    best
}
