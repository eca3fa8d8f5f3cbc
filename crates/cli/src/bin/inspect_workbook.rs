use anyhow::{Context, Result};
use data_import::sniffer::{find_header_row, header_score};
use data_import::{probe_family, Grid, Sheet, SnifferConfig};
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    let path = PathBuf::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "ofertas.xlsx".to_string()),
    );

    let grid = Grid::load(&path).with_context(|| format!("Cannot open {}", path.display()))?;
    println!("== {} ==", path.display());
    println!("  size: rows={}, cols={}", grid.height(), grid.width());

    // First 15 non-empty rows, up to 12 columns
    let mut printed = 0usize;
    for r_idx in 0..grid.height() {
        if printed >= 15 {
            break;
        }

        let mut cells: Vec<String> = grid
            .row(r_idx)
            .iter()
            .take(12)
            .map(|c| c.clone().unwrap_or_default())
            .collect();

        if cells.iter().all(|s| s.is_empty()) {
            continue;
        }

        // Trim trailing empties for readability
        while matches!(cells.last(), Some(s) if s.is_empty()) {
            cells.pop();
        }

        println!("  row {:>4}: {}", r_idx + 1, cells.join(" | "));
        printed += 1;
    }

    let config = SnifferConfig::default();
    let header_row = match find_header_row(&grid, &config) {
        Ok(r) => r,
        Err(e) => {
            println!("  header row: (none) {e}");
            return Ok(());
        }
    };

    let headers: Vec<String> = grid.row(header_row).iter().flatten().cloned().collect();
    println!(
        "  header row: {} (score {})",
        header_row + 1,
        header_score(grid.row(header_row))
    );
    println!("  headers: {}", headers.join(", "));

    let sheet = Sheet::sniff(grid, &config)?;
    match probe_family(&sheet) {
        Some(family) => println!("  family: {family}"),
        None => println!("  family: (no signature, banking fallback)"),
    }

    Ok(())
}
