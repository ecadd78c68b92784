use std::fmt;

use serde::Serialize;
use url::Url;

/// Opaque token naming one reel within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wraps a raw token. Empty or whitespace-only tokens are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, ExtractionError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtractionError::Empty);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("location has no identifier segment")]
    Empty,
    #[error("location points at the landing page ({0})")]
    Sentinel(String),
}

/// Derive the identifier of the item on screen from the session location.
///
/// The identifier is the last non-empty path segment. Query strings and
/// fragments are ignored. A segment equal to `sentinel` means the session is
/// still on the landing page and no item is selected.
pub fn extract_content_id(location: &str, sentinel: &str) -> Result<ContentId, ExtractionError> {
    let segment = match Url::parse(location.trim()) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => last_segment(location),
    };

    let segment = segment.ok_or(ExtractionError::Empty)?;
    let id = ContentId::new(segment)?;
    if id.as_str() == sentinel {
        return Err(ExtractionError::Sentinel(sentinel.to_string()));
    }
    Ok(id)
}

fn last_segment(location: &str) -> Option<String> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}
