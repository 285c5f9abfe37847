//! Staggered row submission and outcome aggregation.
//!
//! Each row gets its own task, delayed `index * delay` from the start of
//! the import. The stagger rate-limits submission starts only; a slow
//! server means overlapping in-flight requests, and responses arrive in
//! completion order, not row order. Every task reports into one mpsc
//! channel and a single aggregator loop owns the log and the progress
//! count.

use std::time::Duration;

use abim_common::api::{ImportOutcome, ImportRowRequest};
use abim_common::CsvRow;
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::debug;

/// Submission parameters.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Import service base URL
    pub server_url: String,
    /// Anti-forgery token sent with every row
    pub token: String,
    /// Delay between row submission starts
    pub delay: Duration,
}

/// Final tally of one file's import.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Submit every row and aggregate the outcomes.
///
/// Success and failure both count toward completion; the import is
/// finished when every scheduled row has answered, and there is no abort
/// path once submission starts.
pub async fn submit_all(config: &SubmitConfig, rows: Vec<CsvRow>) -> ImportSummary {
    let total = rows.len();
    let client = reqwest::Client::new();
    let url = format!(
        "{}/api/import/row",
        config.server_url.trim_end_matches('/')
    );
    let (tx, mut rx) = mpsc::channel::<Result<ImportOutcome>>(total.max(1));

    for (index, row) in rows.into_iter().enumerate() {
        let client = client.clone();
        let tx = tx.clone();
        let url = url.clone();
        let token = config.token.clone();
        let delay = config.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay * index as u32).await;
            let result = post_row(&client, &url, token, row).await;
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    let mut summary = ImportSummary {
        total,
        ..Default::default()
    };

    while let Some(result) = rx.recv().await {
        match result {
            Ok(outcome) if outcome.ok => {
                println!("Processed: {}", outcome.label);
                summary.succeeded += 1;
            }
            Ok(outcome) => {
                println!("Failed: {}", outcome.label);
                summary.failed += 1;
            }
            Err(e) => {
                println!("Failed: {:#}", e);
                summary.failed += 1;
            }
        }
        summary.completed += 1;
        debug!("{} of {} rows completed", summary.completed, summary.total);
    }

    println!("Total processed: {}", summary.completed);
    summary
}

/// POST one row; any non-success status is a row failure, terminal with
/// no retry.
async fn post_row(
    client: &reqwest::Client,
    url: &str,
    token: String,
    row: CsvRow,
) -> Result<ImportOutcome> {
    let request = ImportRowRequest { token, row };
    let response = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("row submission failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("server rejected row ({}): {}", status, body.trim());
    }

    response
        .json::<ImportOutcome>()
        .await
        .context("malformed import outcome")
}
