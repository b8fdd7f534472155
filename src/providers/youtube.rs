//! YouTube video provider (no API key required)

use super::traits::*;
use crate::network::{HttpClient, Request};
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// YouTube video search, scraped from the public results page
pub struct YouTubeProvider {
    name: String,
    client: HttpClient,
    base_url: String,
    max_items: usize,
}

impl YouTubeProvider {
    pub fn new(client: HttpClient) -> Self {
        Self {
            name: "youtube".to_string(),
            client,
            base_url: "https://www.youtube.com/results".to_string(),
            max_items: 25,
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

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Extract text from YouTube's JSON structure
    fn get_text_from_json(element: &serde_json::Value) -> String {
        if let Some(runs) = element.get("runs").and_then(|r| r.as_array()) {
            return runs
                .iter()
                .filter_map(|r| r.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("");
        }
        element
            .get("simpleText")
            .and_then(|s| s.as_str())
            .unwrap_or("")
            .to_string()
    }

    /// Extract the ytInitialData JSON embedded in the results page
    fn extract_initial_data(html: &str) -> Option<serde_json::Value> {
        let start_marker = "ytInitialData = ";
        let start = html.find(start_marker)?;
        let json_start = start + start_marker.len();

        let end = html[json_start..].find(";</script>")?;
        serde_json::from_str(&html[json_start..json_start + end]).ok()
    }

    /// Turn every `videoRenderer` in the initial data into an item
    fn parse_videos(&self, data: &serde_json::Value, ctx: &SearchContext) -> Vec<ContentItem> {
        let sections = data
            .pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
            .and_then(|c| c.as_array());

        let Some(sections) = sections else {
            return Vec::new();
        };

        sections
            .iter()
            .filter_map(|section| {
                section
                    .pointer("/itemSectionRenderer/contents")
                    .and_then(|c| c.as_array())
            })
            .flatten()
            .filter_map(|container| container.get("videoRenderer"))
            .filter_map(|video| {
                let video_id = video.get("videoId").and_then(|v| v.as_str())?;
                let title = Self::get_text_from_json(
                    video.get("title").unwrap_or(&serde_json::Value::Null),
                );
                if title.is_empty() {
                    return None;
                }

                let link = format!("https://www.youtube.com/watch?v={}", video_id);
                let thumbnail = format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id);

                Some(
                    ContentItem::new(video_id, ctx, title, link, MediaKind::Video)
                        .with_image(Some(thumbnail)),
                )
            })
            .take(self.max_items)
            .collect()
    }
}

#[async_trait]
impl Provider for YouTubeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn media(&self) -> MediaKind {
        MediaKind::Video
    }

    async fn search(&self, query: &str, ctx: &SearchContext) -> Vec<ContentItem> {
        let request = Request::get(&self.base_url)
            .param("search_query", query)
            // Bypass the consent interstitial
            .cookie("CONSENT", "YES+");

        debug!("Fetching {} for '{}'", self.base_url, query);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Fetch of youtube results got http error {}", e);
                return Vec::new();
            }
        };

        if !response.is_success() {
            error!("Fetch of youtube results got status {}", response.status);
            return Vec::new();
        }

        match Self::extract_initial_data(&response.text()) {
            Some(data) => self.parse_videos(&data, ctx),
            None => {
                warn!("Could not extract ytInitialData from YouTube response");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn results_page() -> String {
        let data = serde_json::json!({
            "contents": {"twoColumnSearchResultsRenderer": {"primaryContents": {
                "sectionListRenderer": {"contents": [
                    {"itemSectionRenderer": {"contents": [
                        {"videoRenderer": {"videoId": "v1", "title": {"runs": [{"text": "First "}, {"text": "clip"}]}}},
                        {"adRenderer": {}},
                        {"videoRenderer": {"videoId": "v2", "title": {"simpleText": "Second clip"}}},
                        {"videoRenderer": {"videoId": "v3", "title": {}}}
                    ]}}
                ]}
            }}}
        });
        format!("<script>var ytInitialData = {};</script>", data)
    }

    #[test]
    fn test_get_text_from_json() {
        let simple = serde_json::json!({ "simpleText": "Hello World" });
        assert_eq!(YouTubeProvider::get_text_from_json(&simple), "Hello World");

        let runs = serde_json::json!({ "runs": [{"text": "Hello "}, {"text": "World"}] });
        assert_eq!(YouTubeProvider::get_text_from_json(&runs), "Hello World");
    }

    #[tokio::test]
    async fn test_search_parses_videos() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("search_query", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string(results_page()))
            .mount(&server)
            .await;

        let provider = YouTubeProvider::new(HttpClient::new().unwrap())
            .with_base_url(format!("{}/results", server.uri()));
        let items = provider.search("rust", &SearchContext::new("p1")).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "First clip");
        assert_eq!(items[0].link, "https://www.youtube.com/watch?v=v1");
        assert_eq!(items[0].id, fingerprint("v1"));
        assert_eq!(items[1].media, MediaKind::Video);
        assert!(items[1].image.as_deref().unwrap().contains("/v2/"));
    }

    #[tokio::test]
    async fn test_search_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = YouTubeProvider::new(HttpClient::new().unwrap())
            .with_base_url(format!("{}/results", server.uri()));

        assert!(provider.search("rust", &SearchContext::default()).await.is_empty());
    }
}
