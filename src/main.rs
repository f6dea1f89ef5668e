mod catalog;
mod corpus;
mod db;
mod emit;
mod ident;
mod model;
mod parser;
mod resolver;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};

use crate::emit::EmitOptions;
use crate::resolver::{HttpSource, RetryPolicy};

#[derive(Parser)]
#[command(name = "javadoc_scraper", about = "Javadoc site scraper and TypeScript declaration emitter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct ResolveArgs {
    /// Max pages to resolve (default: all unvisited)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Concurrent page fetches
    #[arg(long, default_value_t = resolver::CONCURRENCY)]
    concurrency: usize,
    /// Retries per page after the first failed fetch
    #[arg(long, default_value_t = resolver::MAX_RETRIES)]
    retries: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the all-classes index and populate the page queue
    Init {
        #[arg(long, default_value = catalog::INDEX_URL)]
        index_url: String,
    },
    /// Fetch and resolve unvisited type pages
    Resolve(ResolveArgs),
    /// Write resolved objects to the corpus file
    Export {
        #[arg(long, default_value = corpus::CORPUS_PATH)]
        out: PathBuf,
    },
    /// Resolve + export in one pipeline
    Run {
        #[command(flatten)]
        resolve: ResolveArgs,
        #[arg(long, default_value = corpus::CORPUS_PATH)]
        out: PathBuf,
    },
    /// Resolve a single page and print its JSON
    Page { url: String },
    /// Render the corpus as TypeScript declarations
    Emit {
        #[arg(long, default_value = corpus::CORPUS_PATH)]
        corpus: PathBuf,
        #[arg(long, default_value = "result.d.ts")]
        out: PathBuf,
        /// Keep objects that use generics
        #[arg(long)]
        include_generic: bool,
    },
    /// Show queue statistics
    Stats {
        /// Failed pages to list
        #[arg(long, default_value = "10")]
        errors: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { index_url } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let source = HttpSource::new()?;
            let pages = catalog::fetch_catalog(source.client(), &index_url).await?;
            let inserted = db::insert_pages(&conn, &pages)?;
            println!("Inserted {} new type pages ({} total found)", inserted, pages.len());
            Ok(())
        }
        Commands::Resolve(args) => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            match resolve(&conn, args).await? {
                Some(stats) => println!(
                    "Done: {} resolved ({} ok, {} errors).",
                    stats.total, stats.ok, stats.errors
                ),
                None => println!("No unvisited pages. Run 'init' first or all pages are resolved."),
            }
            Ok(())
        }
        Commands::Export { out } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let objects = db::fetch_corpus(&conn)?;
            corpus::save(&out, &objects)?;
            println!("Exported {} objects to {}", objects.len(), out.display());
            Ok(())
        }
        Commands::Run { resolve: args, out } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            // Phase 1: Resolve (streaming to DB)
            let t_resolve = Instant::now();
            match resolve(&conn, args).await? {
                Some(stats) => println!(
                    "Resolved {} pages ({} ok, {} errors) in {:.1}s",
                    stats.total,
                    stats.ok,
                    stats.errors,
                    t_resolve.elapsed().as_secs_f64()
                ),
                None => println!("No unvisited pages; exporting what is resolved."),
            }

            // Phase 2: Export
            let objects = db::fetch_corpus(&conn)?;
            if objects.is_empty() {
                println!("Nothing to export (no page resolved).");
                return Ok(());
            }
            corpus::save(&out, &objects)?;
            println!("Exported {} objects to {}", objects.len(), out.display());
            Ok(())
        }
        Commands::Page { url } => {
            let object = resolver::resolve_single_page(&url).await?;
            println!("{}", serde_json::to_string_pretty(&object)?);
            Ok(())
        }
        Commands::Emit {
            corpus: corpus_path,
            out,
            include_generic,
        } => {
            let objects = corpus::load(&corpus_path)?;
            let opts = EmitOptions {
                skip_generic_objects: !include_generic,
            };
            let stats = emit::write_declarations(&out, &objects, opts)?;
            println!(
                "Wrote {} declarations to {} ({} skipped for generics).",
                stats.emitted,
                out.display(),
                stats.skipped
            );
            Ok(())
        }
        Commands::Stats { errors } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Total:     {}", s.total);
            println!("Visited:   {}", s.visited);
            println!("Unvisited: {}", s.unvisited);
            println!("Resolved:  {}", s.resolved);
            println!("Errors:    {}", s.errors);
            let failed = db::fetch_errors(&conn, errors)?;
            if !failed.is_empty() {
                println!("\n--- Errors ---");
                for (url, error) in &failed {
                    println!("  {}\n    {}", url, truncate(error, 120));
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn resolve(
    conn: &rusqlite::Connection,
    args: ResolveArgs,
) -> anyhow::Result<Option<resolver::ResolveStats>> {
    let pages = db::fetch_unvisited(conn, args.limit)?;
    if pages.is_empty() {
        return Ok(None);
    }
    println!("Resolving {} pages (streaming to DB)...", pages.len());
    let policy = RetryPolicy {
        max_retries: args.retries,
        ..RetryPolicy::default()
    };
    let source = Arc::new(HttpSource::new()?);
    let stats =
        resolver::resolve_pages_streaming(conn, pages, source, policy, args.concurrency).await?;
    Ok(Some(stats))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
