//! wfs-search CLI - field-based search against a feature service
//!
//! Usage:
//!   wfs-search fields <catalog.json>
//!   wfs-search filter <catalog.json> <query>
//!   wfs-search search <catalog.json> [features.json] [--query <q>] [--max-results <n>]
//!                     [--fields a,b] [--format json|table] [--worker --url <url>]
//!
//! Examples:
//!   wfs-search fields boringen.json
//!   wfs-search filter boringen.json "boornummer like 'KART_PROF_%'"
//!   wfs-search search boringen.json boringen-features.json --query "diepte_tot_m > 20" --format table
//!   wfs-search search boringen.json --worker --url https://www.dov.vlaanderen.be/geoserver/wfs

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wfs_search::assemble::LogProgress;
use wfs_search::catalog::{CatalogDocument, FieldCatalog};
use wfs_search::config::Settings;
use wfs_search::fetch::{CountCache, FeatureFetcher, MemoryFetcher};
use wfs_search::filter::parse_query;
use wfs_search::worker::{WorkerClient, WorkerFeatureFetcher};
use wfs_search::{FeatureSearch, ResultSet};

#[derive(Parser)]
#[command(name = "wfs-search")]
#[command(about = "wfs-search - Field-based search against a paginated feature service")]
#[command(version)]
struct Cli {
    /// Path to a wfs-search.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the fields of a feature type
    Fields {
        /// Path to the catalog description (JSON)
        catalog: PathBuf,
    },

    /// Validate a query string and print its OGC filter
    Filter {
        /// Path to the catalog description (JSON)
        catalog: PathBuf,

        /// Query string, e.g. "naam like 'KART_PROF_%', diepte > 20"
        query: String,
    },

    /// Run a search
    Search {
        /// Path to the catalog description (JSON)
        catalog: PathBuf,

        /// Local features file (JSON array or feature collection)
        features: Option<PathBuf>,

        /// Query string; matches all features if omitted
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of rows
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Comma separated list of fields to return
        #[arg(short, long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        /// Fetch through the worker process instead of a local file
        #[arg(long)]
        worker: bool,

        /// Feature service URL (with --worker)
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// JSON array of objects
    Json,
    /// Aligned text table
    Table,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    match cli.command {
        Commands::Fields { catalog } => cmd_fields(&catalog),
        Commands::Filter { catalog, query } => cmd_filter(&catalog, &query),
        Commands::Search {
            catalog,
            features,
            query,
            max_results,
            fields,
            format,
            worker,
            url,
        } => {
            let args = SearchArgs {
                query,
                max_results,
                fields,
                format,
            };
            let Some(catalog) = read_catalog(&catalog) else {
                return ExitCode::FAILURE;
            };

            if worker {
                let Some(url) = url else {
                    eprintln!("--worker requires --url");
                    return ExitCode::FAILURE;
                };
                let client = match WorkerClient::spawn_with_settings(&settings).await {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Failed to start worker: {}", e);
                        return ExitCode::FAILURE;
                    }
                };
                let fetcher = CountCache::new(WorkerFeatureFetcher::new(client, url));
                run_search(catalog, fetcher, &settings, args).await
            } else {
                let Some(features) = features else {
                    eprintln!("A features file is required without --worker");
                    return ExitCode::FAILURE;
                };
                let fetcher = match fs::read_to_string(&features)
                    .map_err(|e| e.to_string())
                    .and_then(|s| MemoryFetcher::from_json(&s).map_err(|e| e.to_string()))
                {
                    Ok(f) => f,
                    Err(e) => {
                        eprintln!("Error reading features '{}': {}", features.display(), e);
                        return ExitCode::FAILURE;
                    }
                };
                run_search(catalog, fetcher, &settings, args).await
            }
        }
    }
}

struct SearchArgs {
    query: Option<String>,
    max_results: Option<usize>,
    fields: Option<Vec<String>>,
    format: OutputFormat,
}

fn read_catalog(path: &Path) -> Option<FieldCatalog> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };

    let feature_type = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    // A feature_type inside the document takes precedence over the file name.
    let declared = serde_json::from_str::<CatalogDocument>(&source)
        .ok()
        .and_then(|doc| doc.feature_type)
        .unwrap_or(feature_type);

    match FieldCatalog::from_document(&declared, &source) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            eprintln!("Invalid catalog '{}': {}", path.display(), e);
            None
        }
    }
}

fn cmd_fields(path: &Path) -> ExitCode {
    let Some(catalog) = read_catalog(path) else {
        return ExitCode::FAILURE;
    };

    println!("Feature type: {}", catalog.feature_type());
    if !catalog.definition().is_empty() {
        println!("  {}", catalog.definition());
    }
    println!();

    let rows: Vec<Vec<String>> = catalog
        .list()
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                f.data_type.to_string(),
                if f.queryable { "yes" } else { "no" }.to_string(),
                f.retrieval_cost.to_string(),
                f.definition.clone(),
            ]
        })
        .collect();
    print_table(&["name", "type", "queryable", "cost", "definition"], &rows);

    ExitCode::SUCCESS
}

fn cmd_filter(path: &Path, query: &str) -> ExitCode {
    let Some(catalog) = read_catalog(path) else {
        return ExitCode::FAILURE;
    };

    let request = parse_query(query, &catalog)
        .and_then(|predicate| catalog_request(&catalog, predicate));

    match request {
        Ok(request) => {
            match request.filter_xml() {
                Some(xml) => println!("{}", xml),
                None => println!("(no filter: matches all features)"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid query: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn catalog_request(
    catalog: &FieldCatalog,
    predicate: Option<wfs_search::Predicate>,
) -> wfs_search::SearchResult<wfs_search::QueryRequest> {
    wfs_search::query::build(catalog, predicate, None, None)
}

async fn run_search<F: FeatureFetcher>(
    catalog: FieldCatalog,
    fetcher: F,
    settings: &Settings,
    args: SearchArgs,
) -> ExitCode {
    let search = FeatureSearch::with_settings(catalog, fetcher, settings).with_observer(LogProgress);

    let result = search
        .search_str(
            args.query.as_deref().unwrap_or(""),
            args.max_results,
            args.fields,
        )
        .await;

    match result {
        Ok(rows) => {
            match args.format {
                OutputFormat::Json => match rows.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize results: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
                OutputFormat::Table => print_results(&rows),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Search failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_results(rows: &ResultSet) {
    let headers: Vec<&str> = rows.columns().iter().map(String::as_str).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.values().iter().map(|v| v.to_string()).collect())
        .collect();
    print_table(&headers, &body);
    println!("({} rows)", rows.len());
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_line(headers.iter().copied(), &widths);
    print_line(rule.iter().map(String::as_str), &widths);
    for row in rows {
        print_line(row.iter().map(String::as_str), &widths);
    }
}

fn print_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    println!("{}", padded.join("  ").trim_end());
}
