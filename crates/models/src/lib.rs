use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel used wherever an issuer could not be identified.
pub const UNKNOWN_ISSUER: &str = "N/A";

/// Tax label used when a sheet carries no tax information for a row.
pub const UNKNOWN_TAX: &str = "N/A";

// Settings models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
	/// Directory scanned for institution exports.
	pub data_dir: PathBuf,
	/// Lower-case file extensions accepted as inputs.
	pub extensions: Vec<String>,
	/// How many leading rows the header sniffer looks at.
	pub header_scan_rows: usize,
	/// Distinct vocabulary hits a row needs to count as the header.
	pub header_min_hits: usize,
	pub top_n: usize,
	pub advisor_top_n: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			data_dir: PathBuf::from("data"),
			extensions: vec![
				"xlsx".to_string(),
				"xlsm".to_string(),
				"xls".to_string(),
				"ods".to_string(),
				"csv".to_string(),
			],
			header_scan_rows: 20,
			header_min_hits: 2,
			top_n: 5,
			advisor_top_n: 8,
		}
	}
}

impl Settings {
	pub fn accepts_extension(&self, ext: &str) -> bool {
		let ext = ext.to_ascii_lowercase();
		self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
	}
}

// Layout families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
	Banking,
	Repo,
	PrivateCredit,
	Debenture,
	PublicBonds,
}

impl FormatFamily {
	/// Specificity order used by the dispatcher.
	pub const ALL: [FormatFamily; 5] = [
		FormatFamily::Banking,
		FormatFamily::Repo,
		FormatFamily::PrivateCredit,
		FormatFamily::Debenture,
		FormatFamily::PublicBonds,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FormatFamily::Banking => "banking",
			FormatFamily::Repo => "repo",
			FormatFamily::PrivateCredit => "private_credit",
			FormatFamily::Debenture => "debenture",
			FormatFamily::PublicBonds => "public_bonds",
		}
	}
}

impl fmt::Display for FormatFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// Raw extractor output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
	pub product_full_text: String,
	#[serde(default)]
	pub term_text: Option<String>,
	pub rate_text: String,
	pub maturity_raw: String,
	pub min_investment_raw: String,
	#[serde(default)]
	pub roa_raw: Option<String>,
	pub tax_label: String,
}

impl RawRecord {
	/// Builds a record, rejecting blank product text.
	pub fn new(product_full_text: impl Into<String>) -> Option<Self> {
		let product_full_text = product_full_text.into();
		if product_full_text.trim().is_empty() {
			return None;
		}
		Some(Self {
			product_full_text,
			term_text: None,
			rate_text: String::new(),
			maturity_raw: String::new(),
			min_investment_raw: String::new(),
			roa_raw: None,
			tax_label: UNKNOWN_TAX.to_string(),
		})
	}
}

// Taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
	Lca,
	Lci,
	Cdb,
	Lf,
	Cra,
	Cri,
	Cdca,
	Debenture,
	Compromissada,
	TituloPublico,
	Outros,
}

impl ProductType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProductType::Lca => "LCA",
			ProductType::Lci => "LCI",
			ProductType::Cdb => "CDB",
			ProductType::Lf => "LF",
			ProductType::Cra => "CRA",
			ProductType::Cri => "CRI",
			ProductType::Cdca => "CDCA",
			ProductType::Debenture => "DEBENTURE",
			ProductType::Compromissada => "COMPROMISSADA",
			ProductType::TituloPublico => "TITULO_PUBLICO",
			ProductType::Outros => "OUTROS",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s.trim().to_uppercase().as_str() {
			"LCA" => Some(ProductType::Lca),
			"LCI" => Some(ProductType::Lci),
			"CDB" => Some(ProductType::Cdb),
			"LF" => Some(ProductType::Lf),
			"CRA" => Some(ProductType::Cra),
			"CRI" => Some(ProductType::Cri),
			"CDCA" => Some(ProductType::Cdca),
			"DEBENTURE" | "DEBÊNTURE" => Some(ProductType::Debenture),
			"COMPROMISSADA" => Some(ProductType::Compromissada),
			"TITULO_PUBLICO" | "TITULO PUBLICO" => Some(ProductType::TituloPublico),
			"OUTROS" => Some(ProductType::Outros),
			_ => None,
		}
	}

	/// Category is a pure function of the product type.
	pub fn category(&self) -> AssetCategory {
		match self {
			ProductType::Lca | ProductType::Lci | ProductType::Cdb | ProductType::Lf => {
				AssetCategory::CreditoBancario
			}
			ProductType::Cra | ProductType::Cri | ProductType::Cdca | ProductType::Debenture => {
				AssetCategory::CreditoPrivado
			}
			ProductType::TituloPublico => AssetCategory::TitulosPublicos,
			ProductType::Compromissada | ProductType::Outros => AssetCategory::Outros,
		}
	}
}

impl fmt::Display for ProductType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
	CreditoBancario,
	CreditoPrivado,
	TitulosPublicos,
	Outros,
}

impl AssetCategory {
	pub fn as_str(&self) -> &'static str {
		match self {
			AssetCategory::CreditoBancario => "CREDITO_BANCARIO",
			AssetCategory::CreditoPrivado => "CREDITO_PRIVADO",
			AssetCategory::TitulosPublicos => "TITULOS_PUBLICOS",
			AssetCategory::Outros => "OUTROS",
		}
	}
}

impl fmt::Display for AssetCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateKind {
	PosCdi,
	HibridoIpca,
	PreFixado,
	Outros,
}

impl RateKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			RateKind::PosCdi => "POS_CDI",
			RateKind::HibridoIpca => "HIBRIDO_IPCA",
			RateKind::PreFixado => "PRE_FIXADO",
			RateKind::Outros => "OUTROS",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s.trim().to_uppercase().as_str() {
			"POS_CDI" | "CDI" => Some(RateKind::PosCdi),
			"HIBRIDO_IPCA" | "IPCA" => Some(RateKind::HibridoIpca),
			"PRE_FIXADO" | "PRE" => Some(RateKind::PreFixado),
			"OUTROS" => Some(RateKind::Outros),
			_ => None,
		}
	}
}

impl fmt::Display for RateKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// Canonical model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAsset {
	pub product: String,
	pub issuer: String,
	pub issuer_display: String,
	pub product_type: ProductType,
	pub category: AssetCategory,
	pub rate_text: String,
	pub rate_value: f64,
	pub rate_kind: RateKind,
	pub maturity: NaiveDate,
	pub maturity_year: i32,
	pub min_investment: Option<f64>,
	/// Fraction, not percent.
	pub roa: Option<f64>,
	pub tax_treatment: String,
	pub is_daily_liquid: bool,
	pub is_grace_free: bool,
}

impl CanonicalAsset {
	pub fn has_known_issuer(&self) -> bool {
		self.issuer != UNKNOWN_ISSUER
	}

	/// Grace-free assets first, then daily-liquid, nearest maturity, best rate.
	pub fn ranking_cmp(&self, other: &Self) -> std::cmp::Ordering {
		other
			.is_grace_free
			.cmp(&self.is_grace_free)
			.then_with(|| other.is_daily_liquid.cmp(&self.is_daily_liquid))
			.then_with(|| self.maturity_year.cmp(&other.maturity_year))
			.then_with(|| other.rate_value.total_cmp(&self.rate_value))
	}

	/// Exact-duplicate signature over every field.
	pub fn signature(&self) -> String {
		format!(
			"{}|{}|{}|{}|{}|{}|{:?}|{}|{}|{}|{:?}|{:?}|{}|{}|{}",
			self.product,
			self.issuer,
			self.issuer_display,
			self.product_type,
			self.category,
			self.rate_text,
			self.rate_value,
			self.rate_kind,
			self.maturity.format("%Y-%m-%d"),
			self.maturity_year,
			self.min_investment,
			self.roa,
			self.tax_treatment,
			self.is_daily_liquid,
			self.is_grace_free
		)
	}
}

/// Removes exact duplicates in place, keeping first occurrences and order.
/// Returns how many assets were removed.
pub fn dedup_by_signature(assets: &mut Vec<CanonicalAsset>) -> usize {
	let before = assets.len();
	let mut seen = std::collections::HashSet::new();
	assets.retain(|a| seen.insert(a.signature()));
	before - assets.len()
}
