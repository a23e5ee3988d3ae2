use chrono::{DateTime, Utc};

use crate::error::MalformedEntryError;
use crate::model::{NewsItem, RawEntry, PLACEHOLDER_SUMMARY};

/// Convert a raw feed entry into a `NewsItem`.
///
/// `now` stands in for the publish time when the entry has none (or one that
/// does not parse). The summary is left at the placeholder; the enrichment
/// stage fills it in.
pub fn normalize(raw: RawEntry, now: DateTime<Utc>) -> Result<NewsItem, MalformedEntryError> {
    let headline = match raw.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(MalformedEntryError::MissingTitle),
    };
    let link = match raw.link {
        Some(l) if !l.trim().is_empty() => l,
        _ => return Err(MalformedEntryError::MissingLink { title: headline }),
    };

    let published = raw
        .published
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(now);

    Ok(NewsItem {
        headline,
        link,
        cover_image: raw.media_url.filter(|u| !u.trim().is_empty()),
        published,
        content: raw.body,
        summary: PLACEHOLDER_SUMMARY.to_string(),
    })
}

/// Feeds stamp entries with RFC 3339 (Atom) or RFC 2822 (RSS).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
