// Local lead-sentence summarizer
use async_trait::async_trait;

use super::Enricher;
use crate::error::EnrichmentError;

/// Summarizes by keeping the leading sentences of the article, up to
/// `max_chars`. Needs no model, so it is the default backend.
pub struct ExtractiveEnricher {
    max_chars: usize,
}

impl ExtractiveEnricher {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(16),
        }
    }
}

#[async_trait]
impl Enricher for ExtractiveEnricher {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError> {
        let content = content.to_string();
        let max_chars = self.max_chars;
        off_runtime(move || {
            let text = plain_text(&content);
            if text.is_empty() {
                return Err(EnrichmentError::Empty);
            }
            Ok(lead_sentences(&text, max_chars))
        })
        .await?
    }
}

/// Run CPU-bound text work on the blocking pool.
pub(crate) async fn off_runtime<T, F>(f: F) -> Result<T, EnrichmentError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EnrichmentError::Unavailable(format!("text task failed: {}", e)))
}

/// Render feed HTML as single-line plain text.
pub fn plain_text(content: &str) -> String {
    let rendered = html2text::from_read(content.as_bytes(), 10_000)
        .unwrap_or_else(|_| content.to_string());
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lead_sentences(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for sentence in sentences(text) {
        let sep = usize::from(!out.is_empty());
        if out.chars().count() + sep + sentence.chars().count() > max_chars {
            break;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(sentence);
    }

    if out.is_empty() {
        // First sentence alone is over the cap
        truncate(text, max_chars)
    } else {
        out
    }
}

/// Split after `.`, `!` or `?` followed by whitespace; the terminator stays
/// with its sentence.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut cut = rest.len();
        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if matches!(c, '.' | '!' | '?')
                && chars.peek().map_or(true, |(_, next)| next.is_whitespace())
            {
                cut = i + c.len_utf8();
                break;
            }
        }
        let (sentence, tail) = rest.split_at(cut);
        rest = tail.trim_start();
        Some(sentence.trim())
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept.trim_end())
    }
}
