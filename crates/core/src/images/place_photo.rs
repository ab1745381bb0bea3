use async_trait::async_trait;
use std::sync::Arc;

use super::{ImageData, ImageError, ImageSource};
use crate::maps::MapsProvider;

/// First photo of the first place matching the title.
pub struct PlacePhotoSource {
    maps: Arc<dyn MapsProvider>,
    max_width: u32,
}

impl PlacePhotoSource {
    pub fn new(maps: Arc<dyn MapsProvider>, max_width: u32) -> Self {
        Self { maps, max_width }
    }
}

#[async_trait]
impl ImageSource for PlacePhotoSource {
    fn name(&self) -> &str {
        "place_photo"
    }

    async fn find(&self, query: &str) -> Result<Option<ImageData>, ImageError> {
        let place = self
            .maps
            .find_place(query)
            .await
            .map_err(|e| ImageError::Api(e.to_string()))?;

        let Some(place) = place else {
            return Ok(None);
        };
        let Some(photo_reference) = place.photo_reference.as_deref() else {
            return Ok(None);
        };

        Ok(Some(ImageData {
            image_url: self.maps.photo_url(photo_reference, self.max_width),
            source_url: format!(
                "https://www.google.com/maps/place/?q=place_id:{}",
                place.place_id
            ),
            title: place.name.clone(),
        }))
    }
}
