use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use serde::Serialize;
use shelfscan_catalog::{create_missing, review_products, MemoryCatalog};
use shelfscan_core::{normalize_receipt_barcode, Money};
use shelfscan_receipt::{normalize, ExtractionError, ExtractionPipeline, ReceiptExtraction, RegistryKind};

/// Exit status for a receipt no parser could handle.
pub const EXIT_UNPARSEABLE: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

fn read_receipt(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read receipt {}", path.display()))
}

fn report_unparseable(path: &Path, err: &ExtractionError) -> ExitCode {
    let ExtractionError::Unparseable { tried } = err;
    eprintln!("could not parse this receipt: {}", path.display());
    if !tried.is_empty() {
        eprintln!("stores tried: {}", tried.join(", "));
    }
    ExitCode::from(EXIT_UNPARSEABLE)
}

// ── parse ────────────────────────────────────────────────────────────────────

pub fn parse(pipeline: &ExtractionPipeline, file: &Path, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let text = read_receipt(file)?;
    let extraction = match pipeline.extract(&text) {
        Ok(extraction) => extraction,
        Err(err) => return Ok(report_unparseable(file, &err)),
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extraction)?),
        OutputFormat::Table => print!("{}", format_table(&extraction)),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn format_table(extraction: &ReceiptExtraction) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} processors, pattern #{})",
        extraction.store, extraction.registry, extraction.pattern_index
    );
    for p in &extraction.products {
        let _ = writeln!(
            out,
            "{:<32} {:>9}  {:<14} {}",
            p.name,
            p.price.to_string(),
            p.barcode,
            p.category.as_deref().unwrap_or("-")
        );
    }
    let _ = writeln!(out, "{:<32} {:>9}", "TOTAL", extraction.total().to_string());
    out
}

// ── batch ────────────────────────────────────────────────────────────────────

/// One line of `batch` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryKind>,
    pub products: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchSummary {
    fn failed(file: PathBuf, error: String) -> Self {
        Self { file, store: None, registry: None, products: 0, total: None, error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn summarize(pipeline: &ExtractionPipeline, file: PathBuf) -> BatchSummary {
    let text = match read_receipt(&file) {
        Ok(text) => text,
        Err(err) => return BatchSummary::failed(file, format!("{err:#}")),
    };
    match pipeline.extract(&text) {
        Ok(r) => BatchSummary {
            store: Some(r.store.clone()),
            registry: Some(r.registry),
            products: r.products.len(),
            total: Some(r.total()),
            error: None,
            file,
        },
        Err(err) => BatchSummary::failed(file, err.to_string()),
    }
}

/// Parse every file on the blocking pool, sharing one pipeline. Summaries
/// come back in input order.
pub async fn run_batch(pipeline: Arc<ExtractionPipeline>, files: Vec<PathBuf>) -> anyhow::Result<Vec<BatchSummary>> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let pipeline = Arc::clone(&pipeline);
            tokio::task::spawn_blocking(move || summarize(&pipeline, file))
        })
        .collect();

    let mut summaries = Vec::with_capacity(handles.len());
    for handle in handles {
        summaries.push(handle.await.context("Receipt worker panicked")?);
    }
    Ok(summaries)
}

pub async fn batch(pipeline: Arc<ExtractionPipeline>, files: Vec<PathBuf>) -> anyhow::Result<ExitCode> {
    let summaries = run_batch(pipeline, files).await?;
    for summary in &summaries {
        println!("{}", serde_json::to_string(summary)?);
    }
    let failed = summaries.iter().filter(|s| !s.is_ok()).count();
    if failed > 0 {
        tracing::warn!(failed, total = summaries.len(), "some receipts could not be parsed");
        return Ok(ExitCode::from(EXIT_UNPARSEABLE));
    }
    Ok(ExitCode::SUCCESS)
}

// ── normalize / barcode ──────────────────────────────────────────────────────

pub fn normalize_file(file: &Path) -> anyhow::Result<ExitCode> {
    println!("{}", normalize(&read_receipt(file)?));
    Ok(ExitCode::SUCCESS)
}

pub fn barcodes(codes: &[String]) -> anyhow::Result<ExitCode> {
    for code in codes {
        println!("{}", normalize_receipt_barcode(code));
    }
    Ok(ExitCode::SUCCESS)
}

// ── stores ───────────────────────────────────────────────────────────────────

pub fn list_stores(pipeline: &ExtractionPipeline) -> String {
    let mut out = String::new();
    for (kind, registry) in pipeline.registries() {
        for store in registry.iter() {
            let _ = writeln!(
                out,
                "{kind}\t{}\tdetect: {:?}\tpatterns: {}\tcategories: {}",
                store.name(),
                store.detection_needle(),
                store.patterns().len(),
                store.categories().len()
            );
        }
    }
    out
}

// ── review ───────────────────────────────────────────────────────────────────

pub fn review(
    pipeline: &ExtractionPipeline,
    file: &Path,
    catalog_path: &Path,
    create: bool,
) -> anyhow::Result<ExitCode> {
    let text = read_receipt(file)?;
    let extraction = match pipeline.extract(&text) {
        Ok(extraction) => extraction,
        Err(err) => return Ok(report_unparseable(file, &err)),
    };

    let catalog = MemoryCatalog::load_json(catalog_path)?;
    let mut reviewed = review_products(extraction.products, &catalog)?;
    if create {
        let created = create_missing(&mut reviewed, &catalog)?;
        if !created.is_empty() {
            catalog.save_json(catalog_path)?;
            tracing::info!(created = created.len(), path = %catalog_path.display(), "catalog snapshot updated");
        }
    }
    println!("{}", serde_json::to_string_pretty(&reviewed)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_receipt::{StoreConfig, StoreRegistry};

    const GENERIC: &str = r"^(?P<title>.+?)\s+\$?(?P<price>\d+\.\d{2})$";

    fn pipeline() -> ExtractionPipeline {
        let custom = StoreRegistry::new(vec![StoreConfig::from_patterns("Corner Shop", &[GENERIC]).unwrap()]).unwrap();
        let default = StoreRegistry::new(vec![
            StoreConfig::from_patterns("Safeway", &[GENERIC])
                .unwrap()
                .with_categories([("PRODUCE", "Produce")].into_iter().collect()),
        ])
        .unwrap();
        ExtractionPipeline::new(custom, default)
    }

    #[test]
    fn table_lists_products_and_total() {
        let r = pipeline().extract("SAFEWAY\nPRODUCE\nApples 2.99\nBananas 1.49").unwrap();
        let table = format_table(&r);
        assert!(table.starts_with("Safeway (default processors, pattern #0)"));
        assert!(table.contains("Apples"));
        assert!(table.contains("Produce"));
        assert!(table.lines().last().unwrap().ends_with("$4.48"));
    }

    #[test]
    fn stores_lists_both_registries_in_order() {
        let listing = list_stores(&pipeline());
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("custom\tCorner Shop"));
        assert!(lines[1].starts_with("default\tSafeway"));
        assert!(lines[1].ends_with("categories: 1"));
    }

    #[tokio::test]
    async fn batch_keeps_input_order_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&good, "SAFEWAY\nBread 2.49\nMilk 3.99").unwrap();
        std::fs::write(&bad, "unknown store\nBread 2.49").unwrap();
        let missing = dir.path().join("missing.txt");

        let summaries = run_batch(Arc::new(pipeline()), vec![good.clone(), bad.clone(), missing.clone()])
            .await
            .unwrap();

        assert_eq!(summaries[0].file, good);
        assert_eq!(summaries[0].store.as_deref(), Some("Safeway"));
        assert_eq!(summaries[0].products, 2);
        assert_eq!(summaries[0].total, Some(Money::from_cents(648)));

        assert_eq!(summaries[1].file, bad);
        assert_eq!(
            summaries[1].error.as_deref(),
            Some("No parser could extract products from this receipt")
        );

        assert_eq!(summaries[2].file, missing);
        assert!(summaries[2].error.as_deref().unwrap().contains("Failed to read receipt"));
    }

    #[test]
    fn review_creates_missing_items_in_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let receipt = dir.path().join("receipt.txt");
        let catalog = dir.path().join("catalog.json");
        std::fs::write(&receipt, "SAFEWAY\nBread 2.49").unwrap();
        std::fs::write(&catalog, "[]").unwrap();

        let code = review(&pipeline(), &receipt, &catalog, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let items = MemoryCatalog::load_json(&catalog).unwrap().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bread");
    }

    #[test]
    fn unparseable_receipt_exits_with_status_two() {
        let dir = tempfile::tempdir().unwrap();
        let receipt = dir.path().join("receipt.txt");
        std::fs::write(&receipt, "nothing to see").unwrap();
        let code = parse(&pipeline(), &receipt, OutputFormat::Json).unwrap();
        assert_eq!(code, ExitCode::from(EXIT_UNPARSEABLE));
    }
}
