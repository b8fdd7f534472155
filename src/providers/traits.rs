//! Provider trait and content item types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of media a content item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Event,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Event => write!(f, "event"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// One discovered piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content fingerprint (md5 hex of the provider's own identifier)
    pub id: String,
    /// Profile the item was found for
    pub pid: String,
    /// Unix timestamp of the item's event, 0 when unknown
    pub event: i64,
    /// Display text
    pub text: String,
    /// Link to the content
    pub link: String,
    /// Media kind
    pub media: MediaKind,
    /// Image URL, if the provider has one
    pub image: Option<String>,
}

impl ContentItem {
    pub fn new(
        source_id: &str,
        ctx: &SearchContext,
        text: impl Into<String>,
        link: impl Into<String>,
        media: MediaKind,
    ) -> Self {
        Self {
            id: fingerprint(source_id),
            pid: ctx.pid.clone(),
            event: 0,
            text: text.into(),
            link: link.into(),
            media,
            image: None,
        }
    }

    pub fn with_event(mut self, event: i64) -> Self {
        self.event = event;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image.filter(|i| !i.is_empty());
        self
    }
}

/// Stable content fingerprint for a provider-specific identifier
pub fn fingerprint(source_id: &str) -> String {
    format!("{:x}", md5::compute(source_id.as_bytes()))
}

/// Context a search runs in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContext {
    /// Profile id on whose behalf the search runs
    pub pid: String,
}

impl SearchContext {
    pub fn new(pid: impl Into<String>) -> Self {
        Self { pid: pid.into() }
    }
}

/// Which providers take part in a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Every registered provider
    #[default]
    Items,
    Video,
    Audio,
    Event,
}

impl SearchKind {
    /// Whether a provider of `media` takes part in this kind of search
    pub fn includes(&self, media: MediaKind) -> bool {
        match self {
            Self::Items => true,
            Self::Video => media == MediaKind::Video,
            Self::Audio => media == MediaKind::Audio,
            Self::Event => media == MediaKind::Event,
        }
    }
}

impl FromStr for SearchKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "items" | "all" => Ok(Self::Items),
            "video" | "videos" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "event" | "events" => Ok(Self::Event),
            other => Err(anyhow::anyhow!("Unknown search kind: {}", other)),
        }
    }
}

/// A content-discovery backend.
///
/// `search` never fails: a provider logs its own errors and returns an
/// empty list. It should bound its own requests rather than hang.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Media kind of the items this provider returns
    fn media(&self) -> MediaKind;

    /// Search for `query`
    async fn search(&self, query: &str, ctx: &SearchContext) -> Vec<ContentItem>;
}
