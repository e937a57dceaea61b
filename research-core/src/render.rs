//! Display helpers for research results and history timestamps

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Event, Options, Parser};

use crate::schema::SearchResult;

/// HTML for a result, rendering the markdown when the upstream sent none
pub fn result_html(result: &SearchResult) -> Cow<'_, str> {
    match result.output_html.as_deref() {
        Some(html) if !html.trim().is_empty() => Cow::Borrowed(html),
        _ => Cow::Owned(markdown_to_html(&result.output)),
    }
}

/// Render markdown to HTML.
///
/// Raw HTML embedded in the markdown is emitted as escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut body_html = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body_html, parser);
    body_html
}

/// Human-readable age of an ISO-8601 timestamp.
///
/// Unparsable timestamps are returned as-is.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(past) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };

    let elapsed = now.signed_duration_since(past.with_timezone(&Utc));
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if hours > 24 {
        plural(hours / 24, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "Just now".to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
