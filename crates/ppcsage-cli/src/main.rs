//! PPCSage: turn pasted research phases into page content from the shell.

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ppcsage_core::PpcSageConfig;
use ppcsage_runtime::ContentService;

mod documents;

use documents::{load_documents, parse_page};

fn print_help() {
    println!("PPCSage: page content from campaign research phases");
    println!();
    println!("Usage: ppcsage <command>");
    println!();
    println!("Commands:");
    println!("  summarize <page> <documents.json>   Processed content for a page (cached)");
    println!("  insights <page> <documents.json>    Findings, metrics, competitors, risks");
    println!("  cache stats                         Cache sizes and hit rate");
    println!("  cache sweep                         Remove expired cache entries");
    println!("  cache clear                         Remove every cache entry");
    println!("  help                                Show this help message");
    println!();
    println!("Environment: PPCSAGE_CONFIG, PPCSAGE_DATA_DIR, PPCSAGE_PROCESSING_TIMEOUT_MS, RUST_LOG");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    match command {
        "summarize" | "insights" => {
            if args.len() < 4 {
                usage_error(&format!("Usage: ppcsage {} <page> <documents.json>", command));
            }
            let page = parse_page(&args[2])?;
            let documents = load_documents(Path::new(&args[3]))?;
            let service = build_service()?;

            let output = if command == "summarize" {
                let content = service.page_content(page, documents).await?;
                serde_json::to_string_pretty(&content)?
            } else {
                let insights = service.page_insights(page, documents).await?;
                serde_json::to_string_pretty(&insights)?
            };
            println!("{}", output);
        }
        "cache" => {
            let service = build_service()?;
            let cache = service.cache();
            match args.get(2).map(String::as_str) {
                Some("stats") => {
                    let stats = cache.stats().await?;
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                Some("sweep") => {
                    let removed = cache.clear_expired().await?;
                    println!("Removed {} expired entries", removed);
                }
                Some("clear") => {
                    cache.clear_all().await?;
                    println!("Cache cleared");
                }
                _ => usage_error("Usage: ppcsage cache <stats|sweep|clear>"),
            }
        }
        "--help" | "-h" | "help" => print_help(),
        other => {
            usage_error(&format!("Unknown command: {}. Use 'ppcsage help' for usage.", other));
        }
    }

    Ok(())
}

fn build_service() -> anyhow::Result<ContentService> {
    let config = PpcSageConfig::from_env()?;
    info!("Data directory: {}", config.data_dir.display());
    Ok(ContentService::from_config(&config)?)
}
