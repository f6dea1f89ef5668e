use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::db::{ResultRow, ResultWriter};
use crate::model::ApiObject;
use crate::parser;

pub const CONCURRENCY: usize = 10;
pub const MAX_RETRIES: u32 = 5;
const BACKOFF_STEP_MS: u64 = 1000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Anything that can hand back the markup of a documentation page.
pub trait PageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("javadoc_scraper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpSource { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

/// Linear backoff: the n-th retry waits `n × backoff_step`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: MAX_RETRIES,
            backoff_step: Duration::from_millis(BACKOFF_STEP_MS),
        }
    }
}

/// Fetch `url`, retrying every failure up to `policy.max_retries` times.
pub async fn fetch_with_retry<S: PageSource>(
    source: &S,
    url: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let mut attempt = 0u32;
    loop {
        match source.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                let backoff = policy.backoff_step * attempt;
                warn!(
                    "Fetch failed for {} (retry {}/{}), backing off {:.1}s: {}",
                    url,
                    attempt,
                    policy.max_retries,
                    backoff.as_secs_f64(),
                    e
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                return Err(e.context(format!("Gave up on {} after {} attempts", url, attempt + 1)))
            }
        }
    }
}

/// Resolve stats returned after completion.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolveStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch and resolve pages concurrently, saving each result to DB as it
/// arrives. A failed page becomes an error row; the run carries on.
pub async fn resolve_pages_streaming<S: PageSource>(
    conn: &Connection,
    pages: Vec<(i64, String, String)>,
    source: Arc<S>,
    policy: RetryPolicy,
    concurrency: usize,
) -> Result<ResolveStats> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = pages.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ResultRow>(concurrency.max(1) * 2);

    for (page_id, url, name) in pages {
        let source = Arc::clone(&source);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let start = Instant::now();
            let outcome = match fetch_with_retry(source.as_ref(), &url, policy).await {
                Ok(html) => parser::resolve_object(&html),
                Err(e) => Err(e),
            };
            let latency_ms = Some(start.elapsed().as_millis() as i64);

            let row = match outcome {
                Ok(object) => ResultRow {
                    page_id,
                    url,
                    object: Some(object),
                    error: None,
                    latency_ms,
                },
                Err(e) => {
                    warn!("Failed to resolve {}: {:#}", name, e);
                    ResultRow {
                        page_id,
                        url,
                        object: None,
                        error: Some(format!("{:#}", e)),
                        latency_ms,
                    }
                }
            };
            let _ = tx.send(row).await;
        });
    }

    // rx closes once every task has dropped its sender
    drop(tx);

    let mut writer = ResultWriter::new(conn)?;
    let mut ok = 0usize;
    let mut errors = 0usize;

    while let Some(row) = rx.recv().await {
        if row.error.is_some() {
            errors += 1;
        } else {
            ok += 1;
        }
        writer.save(&row)?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Resolved {} pages ({} ok, {} errors)", total, ok, errors);

    Ok(ResolveStats { total, ok, errors })
}

/// Fetch and resolve one page outside the queue.
pub async fn resolve_single_page(url: &str) -> Result<ApiObject> {
    let source = HttpSource::new()?;
    let html = fetch_with_retry(&source, url, RetryPolicy::default()).await?;
    parser::resolve_object(&html).with_context(|| format!("Failed to resolve {}", url))
}
