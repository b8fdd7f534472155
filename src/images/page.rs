//! Scraping of titles, candidate images and embedded media from a page

use crate::network::HttpClient;
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r#"<meta property="og:title" content="([^"]+)">"#,
        r#"<meta property="twitter:title" content="([^"]+)">"#,
        r#"<title>([^<]+)</title>"#,
    ])
});

static IMG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r#"<img[^>]+src="([^"]+)""#,
        r#"<img[^>]+src='([^']+)'"#,
    ])
});

static YOUTUBE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"//www\.youtube\.com/watch\?v=([A-Za-z0-9-]+)",
        r"//www\.youtube\.com/embed/([A-Za-z0-9-]+)",
    ])
});

static OG_URL_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r#"<meta property="og:url" content="([^"]+)">"#]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// What a page offers for best-image selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMedia {
    /// Cleaned page title
    pub title: String,
    /// Candidate image URLs, de-duplicated, in discovery order
    pub image_urls: Vec<String>,
    /// Embeddable media URL, if the page is a known media host
    pub media_url: Option<String>,
}

/// Fetch `page_url` and scrape it for images and media
pub async fn find_media(client: &HttpClient, page_url: &str) -> Result<PageMedia> {
    let base = Url::parse(page_url)?;

    let response = client.get(page_url).await?;
    if !response.is_success() {
        return Err(anyhow!("HTTP error: {}", response.status));
    }

    Ok(parse_page(&response.text(), &base))
}

/// Scrape already-fetched page content
pub fn parse_page(content: &str, base: &Url) -> PageMedia {
    let title = clean_title(&first_match(content, &TITLE_PATTERNS).unwrap_or_default());

    let mut seen = HashSet::new();
    let image_urls = youtube_thumbnails(content)
        .into_iter()
        .chain(image_sources(content, base))
        .filter(|url| seen.insert(url.clone()))
        .collect();

    PageMedia {
        title,
        image_urls,
        media_url: detect_media(content, base),
    }
}

/// Trim site names and separators from a page title
pub fn clean_title(title: &str) -> String {
    let mut title = title;
    for separator in [" |", " —", " - ", "&nbsp;-&nbsp;"] {
        if let Some(pos) = title.find(separator) {
            title = &title[..pos];
        }
    }
    title.trim_matches(' ').to_string()
}

fn image_sources(content: &str, base: &Url) -> Vec<String> {
    all_matches(content, &IMG_PATTERNS)
        .into_iter()
        .filter_map(|href| base.join(&href).ok())
        .map(|url| url.to_string())
        .collect()
}

fn youtube_thumbnails(content: &str) -> Vec<String> {
    all_matches(content, &YOUTUBE_PATTERNS)
        .into_iter()
        .map(|key| format!("https://img.youtube.com/vi/{}/0.jpg", key))
        .collect()
}

fn detect_media(content: &str, base: &Url) -> Option<String> {
    match base.host_str() {
        Some("youtube.com") | Some("www.youtube.com") => first_match(content, &OG_URL_PATTERNS),
        _ => None,
    }
}

fn first_match(content: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn all_matches(content: &str, patterns: &[Regex]) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|re| {
            re.captures_iter(content)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head>
<title>Fallback Title</title>
<meta property="og:title" content="Big News | The Daily">
</head><body>
<img class="hero" src="/img/hero.jpg">
<img src='https://cdn.example.org/thumb.png'>
<img src="/img/hero.jpg">
<iframe src="//www.youtube.com/embed/abc-123"></iframe>
</body></html>"#;

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Big News | The Daily"), "Big News");
        assert_eq!(clean_title("Story - Site"), "Story");
        assert_eq!(clean_title("Story&nbsp;-&nbsp;Site"), "Story");
        assert_eq!(clean_title("  Plain  "), "Plain");
    }

    #[test]
    fn test_parse_page() {
        let base = Url::parse("https://news.example.com/story/1").unwrap();
        let media = parse_page(PAGE, &base);

        assert_eq!(media.title, "Big News");
        assert_eq!(
            media.image_urls,
            vec![
                "https://img.youtube.com/vi/abc-123/0.jpg".to_string(),
                "https://news.example.com/img/hero.jpg".to_string(),
                "https://cdn.example.org/thumb.png".to_string(),
            ]
        );
        assert_eq!(media.media_url, None);
    }

    #[test]
    fn test_youtube_page_media() {
        let base = Url::parse("https://www.youtube.com/watch?v=xyz").unwrap();
        let content = r#"<meta property="og:url" content="https://www.youtube.com/watch?v=xyz">"#;
        let media = parse_page(content, &base);

        assert_eq!(
            media.media_url.as_deref(),
            Some("https://www.youtube.com/watch?v=xyz")
        );
    }

    #[tokio::test]
    async fn test_find_media_fetches_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let media = find_media(&client, &format!("{}/story", server.uri()))
            .await
            .unwrap();

        assert_eq!(media.image_urls.len(), 3);
        assert_eq!(
            media.image_urls[1],
            format!("{}/img/hero.jpg", server.uri())
        );
    }
}
