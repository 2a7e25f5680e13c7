//! Paginated pull request history
//!
//! Pull request list endpoints sort by last update, not by merge time, so the
//! early-exit below is an approximation: it may read one page past the true
//! boundary, and a pull request merged inside the window but updated long
//! after a run of older ones could in principle sit behind the stop point.
//! Results are filtered by window again downstream.

use beacon_forge::{PullRequestInfo, PullRequestState, RepositoryClient, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Fetch merged pull requests, scanning backwards from the most recently
/// updated until the page boundary passes `from_date` or `max_pull_requests`
/// entries are collected.
///
/// The returned list holds at most `max_pull_requests` entries, ordered by
/// merge timestamp ascending (stable for equal timestamps).
#[instrument(skip(client), fields(repo = %client.full_name()))]
pub async fn fetch_pull_requests_between(
    client: &dyn RepositoryClient,
    from_date: DateTime<Utc>,
    to_date: DateTime<Utc>,
    max_pull_requests: usize,
) -> Result<Vec<PullRequestInfo>> {
    info!(%from_date, %to_date, max_pull_requests, "fetching merged pull requests");
    let per_page = client.max_page_size().max(1);
    let mut collected: Vec<PullRequestInfo> = Vec::new();
    let mut page = 1;

    while collected.len() < max_pull_requests {
        let batch = client
            .get_pull_request_page(PullRequestState::Closed, page, per_page)
            .await?;
        let batch_len = batch.len();

        let merged: Vec<PullRequestInfo> = batch.into_iter().filter(|pr| pr.is_merged()).collect();
        let oldest_in_page = merged.last().and_then(|pr| pr.merged_at);
        debug!(page, batch_len, merged = merged.len(), "scanned pull request page");
        collected.extend(merged);

        if oldest_in_page.is_some_and(|merged_at| merged_at < from_date) {
            debug!(page, "page boundary passed from date, stopping");
            break;
        }
        if batch_len < per_page as usize {
            break;
        }
        page += 1;
    }

    collected.truncate(max_pull_requests);
    collected.sort_by_key(|pr| pr.merged_at);

    info!(count = collected.len(), pages = page, "fetched merged pull requests");
    Ok(collected)
}

/// Fetch open pull requests, most recently updated first, at most `max`
#[instrument(skip(client), fields(repo = %client.full_name()))]
pub async fn fetch_open_pull_requests(
    client: &dyn RepositoryClient,
    max: usize,
) -> Result<Vec<PullRequestInfo>> {
    let per_page = client.max_page_size().max(1);
    let mut collected = Vec::new();
    let mut page = 1;

    while collected.len() < max {
        let batch = client
            .get_pull_request_page(PullRequestState::Open, page, per_page)
            .await?;
        let batch_len = batch.len();
        collected.extend(batch);
        if batch_len < per_page as usize {
            break;
        }
        page += 1;
    }

    collected.truncate(max);
    info!(count = collected.len(), "fetched open pull requests");
    Ok(collected)
}

/// Fetch the pull requests referenced by reconciled commits.
///
/// Requests are issued one at a time. Numbers the platform reports missing
/// are skipped (the client logs them); any other failure aborts the batch.
#[instrument(skip(client, numbers), fields(count = numbers.len()))]
pub async fn fetch_pull_requests_for_commits(
    client: &dyn RepositoryClient,
    numbers: &[u64],
) -> Result<Vec<PullRequestInfo>> {
    let mut collected = Vec::with_capacity(numbers.len());
    for &number in numbers {
        if let Some(pr) = client.get_pull_request(number).await? {
            collected.push(pr);
        }
    }

    info!(requested = numbers.len(), found = collected.len(), "fetched pull requests for commits");
    Ok(collected)
}
