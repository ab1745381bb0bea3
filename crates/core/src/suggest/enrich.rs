use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::activity::{Activity, Coordinates};
use crate::images::ImageFinder;
use crate::maps::{calculate_route, refine_coordinates, MapsProvider};

/// Adds travel data and an image to each activity.
pub struct Enricher {
    maps: Arc<dyn MapsProvider>,
    images: Arc<ImageFinder>,
    walking_threshold_min: u32,
    geocode_refinement: bool,
}

impl Enricher {
    pub fn new(maps: Arc<dyn MapsProvider>, images: Arc<ImageFinder>) -> Self {
        Self {
            maps,
            images,
            walking_threshold_min: 15,
            geocode_refinement: true,
        }
    }

    pub fn with_walking_threshold(mut self, minutes: u32) -> Self {
        self.walking_threshold_min = minutes;
        self
    }

    pub fn with_geocode_refinement(mut self, enabled: bool) -> Self {
        self.geocode_refinement = enabled;
        self
    }

    /// Enrich all activities concurrently. Output order matches input order.
    pub async fn enrich(&self, activities: Vec<Activity>, origin: Coordinates) -> Vec<Activity> {
        info!(count = activities.len(), "Enriching activities");
        join_all(
            activities
                .into_iter()
                .map(|activity| self.enrich_one(activity, origin)),
        )
        .await
    }

    async fn enrich_one(&self, mut activity: Activity, origin: Coordinates) -> Activity {
        // Travel data is computed here, never taken from the model.
        activity.distance_m = None;
        activity.estimated_travel_time = None;
        activity.travel_type = None;

        if self.geocode_refinement {
            let refined = refine_coordinates(self.maps.as_ref(), &activity.location).await;
            activity.location.set_coordinates(refined);
        }

        let destination = activity.location.coordinates();
        if destination.is_usable() {
            match calculate_route(
                self.maps.as_ref(),
                origin,
                destination,
                self.walking_threshold_min,
            )
            .await
            {
                Ok(route) => {
                    activity.distance_m = Some(route.distance_m);
                    activity.estimated_travel_time = Some(route.estimated_travel_time);
                    activity.travel_type = Some(route.travel_type);
                }
                Err(e) => {
                    warn!(id = %activity.id, title = %activity.title, error = %e, "Route calculation failed");
                }
            }
        } else {
            debug!(id = %activity.id, "No usable coordinates, skipping route");
        }

        if !activity.title.trim().is_empty() {
            let image = self.images.find(&activity.title).await;
            activity.image_url = Some(image.image_url);
        }

        activity
    }
}
