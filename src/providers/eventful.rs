//! Eventful event provider (RSS feed)

use super::traits::*;
use crate::network::{HttpClient, Request};
use async_trait::async_trait;
use chrono::DateTime;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    enclosure: Option<Enclosure>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> i64 {
    DateTime::parse_from_rfc2822(ts.trim())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

/// Future events matching the keywords, from the Eventful RSS API
pub struct EventfulProvider {
    name: String,
    client: HttpClient,
    base_url: String,
    app_key: String,
}

impl EventfulProvider {
    pub fn new(client: HttpClient, app_key: impl Into<String>) -> Self {
        Self {
            name: "eventful".to_string(),
            client,
            base_url: "http://api.eventful.com/rest/events/rss".to_string(),
            app_key: app_key.into(),
        }
    }

    /// Register under a configured name instead of the provider type
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_feed(xml: &str, ctx: &SearchContext) -> anyhow::Result<Vec<ContentItem>> {
        let rss: Rss = from_str(xml)?;

        Ok(rss
            .channel
            .items
            .into_iter()
            .filter_map(|item| {
                let link = item.link.unwrap_or_default();
                let source_id = item.guid.clone().unwrap_or_else(|| link.clone());
                if source_id.is_empty() {
                    return None;
                }

                let event = item
                    .pub_date
                    .as_deref()
                    .map(parse_rfc2822_to_unix)
                    .unwrap_or(0);

                Some(
                    ContentItem::new(
                        &source_id,
                        ctx,
                        item.title.unwrap_or_default().trim(),
                        link,
                        MediaKind::Event,
                    )
                    .with_event(event)
                    .with_image(item.enclosure.and_then(|e| e.url)),
                )
            })
            .collect())
    }
}

#[async_trait]
impl Provider for EventfulProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn media(&self) -> MediaKind {
        MediaKind::Event
    }

    async fn search(&self, query: &str, ctx: &SearchContext) -> Vec<ContentItem> {
        let request = Request::get(&self.base_url)
            .param("app_key", &self.app_key)
            .param("date", "Future")
            .param("keywords", query);

        debug!("Fetching {} for '{}'", self.base_url, query);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Fetch of eventful feed got http error {}", e);
                return Vec::new();
            }
        };

        debug!("Response {}", response.status);
        if !response.is_success() {
            return Vec::new();
        }

        match Self::parse_feed(&response.text(), ctx) {
            Ok(items) => {
                debug!("Received {} items from eventful matching {}", items.len(), query);
                items
            }
            Err(e) => {
                error!("Parse of eventful feed failed: {}", e);
                Vec::new()
            }
        }
    }
}
