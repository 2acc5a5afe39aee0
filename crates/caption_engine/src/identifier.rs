use caption_core::{FailureKind, JobError};
use url::Url;

/// Derives the stable, filesystem-safe key that names a job's artifacts.
///
/// Recognised shapes: `?v=<key>` on any path, `youtu.be/<key>`,
/// `/embed/<key>` and `/shorts/<key>`. Scheme-less input such as
/// `youtu.be/abc` is accepted by retrying with `https://`.
pub fn content_key(identifier: &str) -> Result<String, JobError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(parse_error(identifier, "identifier is empty"));
    }

    let url = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{trimmed}")))
        .map_err(|err| parse_error(identifier, &err.to_string()))?;

    let key = key_from_url(&url)
        .ok_or_else(|| parse_error(identifier, "no video id found"))?;

    if !is_safe_key(&key) {
        return Err(parse_error(identifier, "video id contains unexpected characters"));
    }
    Ok(key)
}

fn key_from_url(url: &Url) -> Option<String> {
    if let Some((_, value)) = url.query_pairs().find(|(name, _)| name == "v") {
        return Some(value.into_owned());
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    if url.host_str() == Some("youtu.be") {
        return segments.next().map(str::to_owned);
    }
    while let Some(segment) = segments.next() {
        if segment == "embed" || segment == "shorts" {
            return segments.next().map(str::to_owned);
        }
    }
    None
}

fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_error(identifier: &str, reason: &str) -> JobError {
    JobError::new(
        FailureKind::IdentifierParse,
        format!("{identifier:?}: {reason}"),
    )
}
