//! Mock image source for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::images::{ImageData, ImageError, ImageSource};

/// Mock implementation of the ImageSource trait.
///
/// Finds nothing until an image is set; `fail_with` makes every lookup fail.
#[derive(Debug)]
pub struct MockImageSource {
    name: String,
    image: Arc<RwLock<Option<ImageData>>>,
    error: Arc<RwLock<Option<String>>>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockImageSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image: Arc::new(RwLock::new(None)),
            error: Arc::new(RwLock::new(None)),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_image(&self, image: ImageData) {
        *self.image.write().await = Some(image);
    }

    pub async fn fail_with(&self, message: &str) {
        *self.error.write().await = Some(message.to_string());
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: &str) -> Result<Option<ImageData>, ImageError> {
        self.queries.write().await.push(query.to_string());

        if let Some(message) = self.error.read().await.clone() {
            return Err(ImageError::Api(message));
        }

        Ok(self.image.read().await.clone())
    }
}
