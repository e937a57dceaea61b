//! Subcommand bodies, written against any history backend and output sink

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use research_core::history::{HistoryStorage, HistoryStore};
use research_core::render::{relative_time, result_html};
use research_core::schema::{SearchRequest, SearchResponse};
use std::io::Write;

use crate::client::RelayClient;

fn print_first_result<W: Write>(
    out: &mut W,
    results: Option<&SearchResponse>,
    html: bool,
) -> Result<()> {
    let Some(result) = results.and_then(|r| r.first()) else {
        writeln!(out, "No results.")?;
        return Ok(());
    };

    if html {
        writeln!(out, "{}", result_html(result))?;
    } else {
        writeln!(out, "{}", result.output)?;
    }
    Ok(())
}

/// Run a query through the relay and record it
pub async fn search<S: HistoryStorage, W: Write>(
    client: &RelayClient,
    history: &mut HistoryStore<S>,
    query: &str,
    html: bool,
    out: &mut W,
) -> Result<()> {
    let request = SearchRequest::new(query);
    let results = client.search(&request).await?;
    history
        .add(&request.query, Some(results.clone()))
        .context("Failed to save search history")?;

    writeln!(out, "Query: \"{}\"\n", request.query)?;
    print_first_result(out, Some(&results), html)
}

pub fn list<S: HistoryStorage, W: Write>(
    history: &HistoryStore<S>,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<()> {
    if history.is_empty() {
        writeln!(out, "No search history yet.")?;
        return Ok(());
    }

    for entry in history.entries() {
        writeln!(
            out,
            "{:<24} {:<16} {}",
            entry.id,
            relative_time(&entry.timestamp, now),
            entry.query
        )?;
    }
    Ok(())
}

/// Replay a stored search without contacting the relay
pub fn show<S: HistoryStorage, W: Write>(
    history: &HistoryStore<S>,
    id: &str,
    html: bool,
    out: &mut W,
) -> Result<()> {
    let entry = history
        .get(id)
        .with_context(|| format!("No history entry with id {}", id))?;

    writeln!(out, "Query: \"{}\"", entry.query)?;
    writeln!(out, "Searched: {}\n", relative_time(&entry.timestamp, Utc::now()))?;
    print_first_result(out, entry.results.as_ref(), html)
}

/// Empty the history once `confirm` agrees. It receives the entry count.
pub fn clear<S, W, F>(history: &mut HistoryStore<S>, confirm: F, out: &mut W) -> Result<()>
where
    S: HistoryStorage,
    W: Write,
    F: FnOnce(usize) -> Result<bool>,
{
    if history.is_empty() {
        writeln!(out, "Search history is already empty.")?;
        return Ok(());
    }

    if !confirm(history.len())? {
        writeln!(out, "Aborted.")?;
        return Ok(());
    }

    history.clear().context("Failed to clear search history")?;
    writeln!(out, "Search history cleared.")?;
    Ok(())
}
