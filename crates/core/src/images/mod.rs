//! Representative image lookup with source fallback.
//!
//! Sources are tried in order (place photo, then image search). Errors and
//! empty results fall through to the next source; when every source fails
//! the configured placeholder is returned.

mod place_photo;
mod serpapi;

pub use place_photo::PlacePhotoSource;
pub use serpapi::SerpApiImageSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// An image for an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub image_url: String,
    /// Page the image comes from; empty for the placeholder
    pub source_url: String,
    pub title: String,
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Source name for logs.
    fn name(&self) -> &str;

    /// `Ok(None)` when the source has no image for the query.
    async fn find(&self, query: &str) -> Result<Option<ImageData>, ImageError>;
}

/// Ordered chain of image sources ending with a placeholder.
pub struct ImageFinder {
    sources: Vec<Arc<dyn ImageSource>>,
    placeholder_url: String,
}

impl ImageFinder {
    pub fn new(placeholder_url: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            placeholder_url: placeholder_url.into(),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn placeholder(&self, title: &str) -> ImageData {
        ImageData {
            image_url: self.placeholder_url.clone(),
            source_url: String::new(),
            title: title.to_string(),
        }
    }

    /// Find an image for an activity title. Never fails.
    pub async fn find(&self, title: &str) -> ImageData {
        for source in &self.sources {
            match source.find(title).await {
                Ok(Some(image)) => {
                    debug!(source = source.name(), title, url = %image.image_url, "Image found");
                    return image;
                }
                Ok(None) => {
                    debug!(source = source.name(), title, "No image, trying next source");
                }
                Err(e) => {
                    warn!(source = source.name(), title, error = %e, "Image source failed");
                }
            }
        }

        debug!(title, "Using placeholder image");
        self.placeholder(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockImageSource;

    fn image(url: &str) -> ImageData {
        ImageData {
            image_url: url.to_string(),
            source_url: "https://source".to_string(),
            title: "t".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let first = Arc::new(MockImageSource::new("first"));
        first.set_image(image("https://first/img.jpg")).await;
        let second = Arc::new(MockImageSource::new("second"));
        second.set_image(image("https://second/img.jpg")).await;

        let finder = ImageFinder::new("https://placeholder")
            .with_source(first.clone())
            .with_source(second.clone());

        let found = finder.find("Louvre").await;
        assert_eq!(found.image_url, "https://first/img.jpg");
        assert_eq!(second.query_count().await, 0);
    }

    #[tokio::test]
    async fn test_falls_through_empty_and_failing_sources() {
        let empty = Arc::new(MockImageSource::new("empty"));
        let failing = Arc::new(MockImageSource::new("failing"));
        failing.fail_with("quota exceeded").await;
        let last = Arc::new(MockImageSource::new("last"));
        last.set_image(image("https://last/img.jpg")).await;

        let finder = ImageFinder::new("https://placeholder")
            .with_source(empty.clone())
            .with_source(failing.clone())
            .with_source(last);

        let found = finder.find("Louvre").await;
        assert_eq!(found.image_url, "https://last/img.jpg");
        assert_eq!(empty.query_count().await, 1);
        assert_eq!(failing.query_count().await, 1);
    }

    #[tokio::test]
    async fn test_placeholder_when_all_fail() {
        let finder = ImageFinder::new("https://placeholder")
            .with_source(Arc::new(MockImageSource::new("empty")));

        let found = finder.find("Canal Saint-Martin").await;
        assert_eq!(found.image_url, "https://placeholder");
        assert_eq!(found.source_url, "");
        assert_eq!(found.title, "Canal Saint-Martin");
        assert_eq!(finder.source_names(), vec!["empty"]);
    }
}
