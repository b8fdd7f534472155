//! Page detection: title, media and the representative image of a URL

use super::{
    crop_to_fit, find_media, save_png, select_best_image, ImageFetcher, ImageSummary, Selection,
};
use crate::config::ImageSettings;
use crate::network::HttpClient;
use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// What was found on a page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub title: String,
    pub url: String,
    /// Raw candidate image URLs (only when no best image was requested)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Fetched images other than the best one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<ImageSummary>,
    pub media: Option<String>,
    /// Filename of the cropped best image, relative to the image directory
    pub best_image: Option<String>,
}

/// Detects the media featured on web pages
pub struct Detector {
    client: HttpClient,
    fetcher: Arc<dyn ImageFetcher>,
    settings: ImageSettings,
}

impl Detector {
    pub fn new(client: HttpClient, fetcher: Arc<dyn ImageFetcher>, settings: ImageSettings) -> Self {
        Self {
            client,
            fetcher,
            settings,
        }
    }

    /// Scrape `page_url`; with `select_best`, also pick, crop and store its best image.
    ///
    /// A page with no usable image yields `best_image: None`, not an error.
    pub async fn detect(&self, page_url: &str, select_best: bool) -> Result<DetectionResult> {
        let page = find_media(&self.client, page_url).await?;

        let mut result = DetectionResult {
            title: page.title,
            url: page_url.to_string(),
            media: page.media_url,
            ..Default::default()
        };

        if !select_best {
            result.images = page.image_urls;
            return Ok(result);
        }

        let selection = self.select(&page.image_urls).await;
        result.alternates = selection.alternates();

        match selection.best {
            Some(best) => {
                let filename = self.persist(best.image, page_url).await?;
                info!("Stored best image for {} as {}", page_url, filename);
                result.best_image = Some(filename);
            }
            None => debug!("No image found for {}", page_url),
        }

        Ok(result)
    }

    /// The best image on `page_url`, or a blank placeholder when there is none
    pub async fn pick_image(&self, page_url: &str) -> Result<DynamicImage> {
        let page = find_media(&self.client, page_url).await?;
        let selection = self.select(&page.image_urls).await;

        Ok(match selection.best {
            Some(best) => best.image.as_ref().clone(),
            None => DynamicImage::new_rgba8(50, 50),
        })
    }

    async fn select(&self, urls: &[String]) -> Selection {
        select_best_image(urls, self.fetcher.clone(), &self.settings.select_config()).await
    }

    async fn persist(&self, image: Arc<DynamicImage>, page_url: &str) -> Result<String> {
        let dir = self.settings.path.clone();
        let (width, height) = (self.settings.crop_width, self.settings.crop_height);
        let page_url = page_url.to_string();

        let path = tokio::task::spawn_blocking(move || {
            let cropped = crop_to_fit(&image, width, height);
            save_png(&cropped, &dir, &page_url)
        })
        .await??;

        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::{image_filename, HttpImageFetcher};
    use image::ImageOutputFormat;
    use std::io::Cursor;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    async fn page_server() -> MockServer {
        let server = MockServer::start().await;
        let page = r#"<html><title>Gallery - Example</title>
<img src="/big.png"><img src="/icon.png"><img src="/banner.png"></html>"#;

        Mock::given(method("GET"))
            .and(path("/gallery"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        for (file, w, h) in [("/big.png", 300, 200), ("/icon.png", 16, 16), ("/banner.png", 900, 100)] {
            Mock::given(method("GET"))
                .and(path(file))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(w, h)))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>Nothing</title>"))
            .mount(&server)
            .await;

        server
    }

    fn detector(dir: std::path::PathBuf) -> Detector {
        let client = HttpClient::new().unwrap();
        let settings = ImageSettings {
            path: dir,
            select_timeout_ms: 2000,
            ..Default::default()
        };
        Detector::new(client.clone(), Arc::new(HttpImageFetcher::new(client)), settings)
    }

    #[tokio::test]
    async fn test_detect_selects_and_stores_best() {
        let server = page_server().await;
        let dir = std::env::temp_dir().join(format!("mediapick-detect-{}", rand::random::<u32>()));
        std::fs::create_dir_all(&dir).unwrap();

        let page_url = format!("{}/gallery", server.uri());
        let result = detector(dir.clone()).detect(&page_url, true).await.unwrap();

        assert_eq!(result.title, "Gallery");
        assert_eq!(result.best_image, Some(image_filename(&page_url)));
        assert_eq!(result.alternates.len(), 2);
        assert!(result.alternates.iter().all(|a| !a.url.ends_with("/big.png")));
        assert!(result.images.is_empty());

        let stored = image::open(dir.join(image_filename(&page_url))).unwrap();
        assert_eq!((stored.width(), stored.height()), (460, 160));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_detect_without_selection_lists_images() {
        let server = page_server().await;
        let page_url = format!("{}/gallery", server.uri());
        let result = detector(std::env::temp_dir())
            .detect(&page_url, false)
            .await
            .unwrap();

        assert_eq!(result.images.len(), 3);
        assert!(result.best_image.is_none());
    }

    #[tokio::test]
    async fn test_page_without_images() {
        let server = page_server().await;
        let page_url = format!("{}/empty", server.uri());
        let detector = detector(std::env::temp_dir());

        let result = detector.detect(&page_url, true).await.unwrap();
        assert!(result.best_image.is_none());

        let placeholder = detector.pick_image(&page_url).await.unwrap();
        assert_eq!((placeholder.width(), placeholder.height()), (50, 50));
    }
}
