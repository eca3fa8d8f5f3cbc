use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use asset_selection::{BestAssets, SelectionMode, find_best_assets};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use data_pipeline::{AssetFilter, Catalog, FileStatus, FilterOptions, distinct_issuers};
use models::{CanonicalAsset, FormatFamily, ProductType, RateKind};
use tracing_subscriber::EnvFilter;

/// Ingests fixed-income offer spreadsheets and ranks the offers.
#[derive(Debug, Parser)]
#[command(name = "offers", author, version, about = "Ingest and rank fixed-income offers", long_about = None)]
struct Args {
    /// Directory holding the institution exports (overrides settings)
    #[arg(short = 'd', long = "data-dir", env = "OFFERS_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Path to settings.json (optional). Falls back to ./settings.json, then defaults
    #[arg(short = 's', long = "settings", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest every file and print a per-file summary
    Ingest,
    /// Print the best assets per liquidity bucket and maturity year
    Best {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print the distinct known issuers, one per line
    Issuers,
    /// Print the values available to each filter
    Filters,
    /// Write the canonical table, or the best-asset selection, to a file
    Export {
        /// Output file
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Export the best-asset selection instead of the full table
        #[arg(long = "best")]
        best: bool,

        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, ClapArgs)]
struct SelectionArgs {
    /// Restrict to one file, by name
    #[arg(long = "report")]
    report: Option<String>,

    /// Advisor mode: more rows per bucket and ROA shown
    #[arg(long = "advisor")]
    advisor: bool,

    /// Show daily-liquid assets instead of term assets. Without it only term
    /// assets are listed, grouped by maturity year
    #[arg(long = "daily")]
    daily: bool,

    #[arg(long = "year")]
    years: Vec<i32>,

    #[arg(long = "product", value_parser = parse_product_type)]
    products: Vec<ProductType>,

    #[arg(long = "rate-kind", value_parser = parse_rate_kind)]
    rate_kinds: Vec<RateKind>,

    #[arg(long = "issuer")]
    issuers: Vec<String>,

    #[arg(long = "tax")]
    taxes: Vec<String>,
}

impl SelectionArgs {
    fn filter(&self) -> AssetFilter {
        AssetFilter {
            years: self.years.clone(),
            product_types: self.products.clone(),
            rate_kinds: self.rate_kinds.clone(),
            issuers: self.issuers.clone(),
            tax_treatments: self.taxes.clone(),
            daily_liquid: self.daily,
        }
    }

    fn mode(&self) -> SelectionMode {
        if self.advisor {
            SelectionMode::Advisor
        } else {
            SelectionMode::Client
        }
    }

    /// Any filter is set, the liquidity toggle included.
    fn is_filtering(&self) -> bool {
        !(self.years.is_empty()
            && self.products.is_empty()
            && self.rate_kinds.is_empty()
            && self.issuers.is_empty()
            && self.taxes.is_empty())
            || self.daily
    }
}

fn parse_product_type(s: &str) -> Result<ProductType, String> {
    ProductType::from_str(s).ok_or_else(|| format!("unknown product type '{}'", s))
}

fn parse_rate_kind(s: &str) -> Result<RateKind, String> {
    RateKind::from_str(s).ok_or_else(|| format!("unknown rate kind '{}'", s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = settings_loader::load_settings_with_fallback(args.settings.as_ref())?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    let catalog = Catalog::new(settings);

    match args.command {
        Command::Ingest => run_ingest(&catalog),
        Command::Best { selection } => {
            let (mode, best) = select(&catalog, &selection)?;
            print_best(&best, mode);
            Ok(())
        }
        Command::Issuers => {
            let dataset = catalog.dataset()?;
            for issuer in distinct_issuers(&dataset.assets) {
                println!("{}", issuer);
            }
            Ok(())
        }
        Command::Filters => {
            let dataset = catalog.dataset()?;
            let options = FilterOptions::from_assets(&dataset.assets);
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(())
        }
        Command::Export {
            output,
            format,
            best,
            selection,
        } => run_export(&catalog, &output, format, best, &selection),
    }
}

fn run_ingest(catalog: &Catalog) -> Result<()> {
    let dataset = catalog.dataset()?;

    for report in &dataset.reports {
        let family = report
            .family
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        match report.status() {
            FileStatus::Processed => println!(
                "[OK]   {:<40} {:<15} {:>4} assets, {} rows dropped{}",
                report.name(),
                family,
                report.assets.len(),
                report.dropped_rows,
                if report.fallback { " (fallback)" } else { "" }
            ),
            FileStatus::Unprocessable => println!(
                "[FAIL] {:<40} {:<15} could not be processed: {}",
                report.name(),
                family,
                report.failure.as_deref().unwrap_or("no usable rows")
            ),
        }
    }

    println!(
        "\n{} files, {} assets ({} duplicates removed)",
        dataset.reports.len(),
        dataset.assets.len(),
        dataset.stats.skipped
    );
    Ok(())
}

/// Resolves the asset set (one report or everything), filters it and selects.
fn select(catalog: &Catalog, args: &SelectionArgs) -> Result<(SelectionMode, BestAssets)> {
    let (assets, family): (Vec<CanonicalAsset>, Option<FormatFamily>) = match &args.report {
        Some(name) => {
            let report = catalog
                .report(name)?
                .ok_or_else(|| anyhow!("No report named '{}' in the data directory", name))?;
            if report.status() == FileStatus::Unprocessable {
                bail!(
                    "Report '{}' could not be processed: {}",
                    name,
                    report.failure.as_deref().unwrap_or("no usable rows")
                );
            }
            (report.assets, report.family)
        }
        None => (catalog.dataset()?.assets.clone(), None),
    };

    let mode = args.mode().for_family(family);
    let filtered = args.filter().apply(&assets);
    if filtered.is_empty() && args.is_filtering() {
        tracing::warn!("no assets match the filters");
    }

    let top_n = mode.top_n(catalog.settings());
    Ok((mode, find_best_assets(&filtered, top_n)))
}

fn print_best(best: &BestAssets, mode: SelectionMode) {
    if best.is_empty() {
        println!("No assets found.");
        return;
    }

    if !best.grace_free.is_empty() {
        println!("== Daily liquidity, no grace period ==");
        for a in &best.grace_free {
            print_asset(a, mode);
        }
    }
    if !best.daily_liquid.is_empty() {
        println!("== Daily liquidity after grace period ==");
        for a in &best.daily_liquid {
            print_asset(a, mode);
        }
    }
    for (year, assets) in &best.term_by_year {
        println!("== Maturing in {} ==", year);
        for a in assets {
            print_asset(a, mode);
        }
    }
}

fn print_asset(a: &CanonicalAsset, mode: SelectionMode) {
    let min = a
        .min_investment
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "  {:<30} {:<35} {:<22} {} {:<20} min {}",
        a.product,
        a.issuer_display,
        a.rate_text,
        a.maturity.format("%d/%m/%Y"),
        a.tax_treatment,
        min
    );
    if mode.shows_roa() {
        let roa = a
            .roa
            .map(|r| format!("{:.2}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        line.push_str(&format!(" roa {}", roa));
    }
    println!("{}", line);
}

fn run_export(
    catalog: &Catalog,
    output: &Path,
    format: ExportFormat,
    best: bool,
    selection: &SelectionArgs,
) -> Result<()> {
    let assets = if best {
        select(catalog, selection)?.1.all()
    } else {
        let dataset = catalog.dataset()?;
        if selection.is_filtering() {
            selection.filter().apply(&dataset.assets)
        } else {
            dataset.assets.clone()
        }
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output dir: {}", parent.display()))?;
    }

    match format {
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(&assets)?;
            fs::write(output, json)
                .with_context(|| format!("Writing output file: {}", output.display()))?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(output)
                .with_context(|| format!("Creating CSV file: {}", output.display()))?;
            for asset in &assets {
                writer.serialize(asset)?;
            }
            writer.flush()?;
        }
    }

    println!("Wrote {} assets to {}", assets.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn selection(argv: &[&str]) -> SelectionArgs {
        match Args::parse_from(argv).command {
            Command::Best { selection } => selection,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_best_defaults_to_term_view() {
        let args = selection(&["offers", "best"]);
        assert!(!args.filter().daily_liquid);
        assert!(!args.is_filtering());
        assert_eq!(args.mode(), SelectionMode::Client);

        let args = selection(&["offers", "best", "--daily", "--advisor"]);
        assert!(args.filter().daily_liquid);
        assert_eq!(args.mode(), SelectionMode::Advisor);
    }

    #[test]
    fn test_filter_values_are_parsed() {
        let args = selection(&["offers", "best", "--year", "2027", "--product", "cdb", "--rate-kind", "ipca"]);
        let filter = args.filter();
        assert_eq!(filter.years, vec![2027]);
        assert_eq!(filter.product_types, vec![ProductType::Cdb]);
        assert_eq!(filter.rate_kinds, vec![RateKind::HibridoIpca]);
    }
}
