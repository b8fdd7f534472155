//! Spotify audio provider (Web API track search)

use super::traits::*;
use crate::network::{HttpClient, Request};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<Tracks>,
}

#[derive(Debug, Deserialize)]
struct Tracks {
    #[serde(default)]
    items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<AlbumImage>,
}

#[derive(Debug, Deserialize)]
struct AlbumImage {
    url: String,
    #[serde(default)]
    width: Option<u32>,
}

/// Track search against the Spotify Web API
pub struct SpotifyProvider {
    name: String,
    client: HttpClient,
    base_url: String,
    token: String,
    max_items: usize,
}

impl SpotifyProvider {
    pub fn new(client: HttpClient, token: impl Into<String>) -> Self {
        Self {
            name: "spotify".to_string(),
            client,
            base_url: "https://api.spotify.com/v1/search".to_string(),
            token: token.into(),
            max_items: 16,
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

    fn to_item(track: Track, ctx: &SearchContext) -> ContentItem {
        // Largest album art
        let image = track.album.and_then(|album| {
            album
                .images
                .into_iter()
                .max_by_key(|img| img.width.unwrap_or(0))
                .map(|img| img.url)
        });

        let text = match track.artists.first() {
            Some(artist) => format!("{} - {}", track.name, artist.name),
            None => track.name,
        };

        ContentItem::new(&track.uri, ctx, text, track.uri.clone(), MediaKind::Audio).with_image(image)
    }
}

#[async_trait]
impl Provider for SpotifyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn media(&self) -> MediaKind {
        MediaKind::Audio
    }

    async fn search(&self, query: &str, ctx: &SearchContext) -> Vec<ContentItem> {
        let request = Request::get(&self.base_url)
            .param("q", query)
            .param("type", "track")
            .param("limit", self.max_items.to_string())
            .header("Authorization", format!("Bearer {}", self.token));

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Fetch of spotify search got http error {}", e);
                return Vec::new();
            }
        };

        if !response.is_success() {
            error!("Fetch of spotify search got status {}", response.status);
            return Vec::new();
        }

        let parsed: SearchResponse = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("Parse of spotify search failed: {}", e);
                return Vec::new();
            }
        };

        let tracks = parsed.tracks.map(|t| t.items).unwrap_or_default();
        debug!("Received {} items from spotify matching {}", tracks.len(), query);

        tracks
            .into_iter()
            .take(self.max_items)
            .map(|track| Self::to_item(track, ctx))
            .collect()
    }
}
