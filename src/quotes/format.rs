//! Clipboard and social share formatting

use super::QuoteRecord;

/// Character limit applied to share text by default
pub const DEFAULT_SHARE_LENGTH: usize = 280;

/// Marker appended to truncated quote text
pub const ELLIPSIS: &str = "...";

/// Opening and closing quote marks around the text
const QUOTE_MARKS: usize = 2;

/// Format a quote for copying: `"<text>"`, a blank line, then `— <author>`
#[must_use]
pub fn format_for_clipboard(record: &QuoteRecord) -> String {
    format!("\"{}\"\n\n— {}", record.text, record.author)
}

/// Format a quote for a social post, bounded to `max_length` characters
///
/// Produces `"<text>" — <author> <hashtags>`. When that is too long only the
/// quote text is shortened and ends with [`ELLIPSIS`]; author and hashtags are
/// kept whole. If even the author and hashtags cannot fit, the whole string
/// is cut at `max_length`.
#[must_use]
pub fn format_for_social_share<S: AsRef<str>>(
    record: &QuoteRecord,
    hashtags: &[S],
    max_length: usize,
) -> String {
    let suffix = share_suffix(&record.author, hashtags);
    let full = format!("\"{}\"{suffix}", record.text);
    if full.chars().count() <= max_length {
        return full;
    }

    let reserved = suffix.chars().count() + QUOTE_MARKS;
    let budget = max_length.saturating_sub(reserved);
    if budget < ELLIPSIS.len() {
        tracing::debug!(max_length, reserved, "share suffix exceeds limit, hard truncating");
        return full.chars().take(max_length).collect();
    }

    let kept: String = record.text.chars().take(budget - ELLIPSIS.len()).collect();
    format!("\"{}{ELLIPSIS}\"{suffix}", kept.trim_end())
}

/// Build ` — <author>` followed by ` #tag #tag` when hashtags are present
fn share_suffix<S: AsRef<str>>(author: &str, hashtags: &[S]) -> String {
    let tags: Vec<String> = hashtags
        .iter()
        .map(|t| t.as_ref().trim().trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{t}"))
        .collect();

    if tags.is_empty() {
        format!(" — {author}")
    } else {
        format!(" — {author} {}", tags.join(" "))
    }
}
