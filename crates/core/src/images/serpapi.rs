use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ImageData, ImageError, ImageSource};

/// Google Images results through SerpAPI.
pub struct SerpApiImageSource {
    client: Client,
    api_key: String,
    api_base: String,
}

impl SerpApiImageSource {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search.json?engine=google_images&q={}&hl=fr&gl=fr&safe=active&api_key={}",
            self.api_base,
            urlencoding::encode(&format!("{} activité", query)),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    images_results: Vec<SerpApiImage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiImage {
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl SerpApiResponse {
    fn first_image(self, query: &str) -> Option<ImageData> {
        self.images_results.into_iter().find_map(|img| {
            let image_url = img.original.or(img.thumbnail)?;
            Some(ImageData {
                image_url,
                source_url: img.source.or(img.link).unwrap_or_default(),
                title: img.title.unwrap_or_else(|| query.to_string()),
            })
        })
    }
}

#[async_trait]
impl ImageSource for SerpApiImageSource {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn find(&self, query: &str) -> Result<Option<ImageData>, ImageError> {
        debug!(query, "Searching image with SerpAPI");

        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| ImageError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error.as_deref() {
            if parsed.images_results.is_empty() {
                return Err(ImageError::Api(error.to_string()));
            }
        }

        Ok(parsed.first_image(query))
    }
}
