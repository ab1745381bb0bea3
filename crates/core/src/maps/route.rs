//! Travel mode selection and coordinate refinement.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{MapsError, MapsProvider, RouteLeg, TravelMode};
use crate::activity::{Coordinates, Location, TravelType};

/// Travel data attached to an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteData {
    pub distance_m: i64,
    /// Seconds
    pub estimated_travel_time: i64,
    pub travel_type: TravelType,
}

impl RouteData {
    fn from_leg(leg: &RouteLeg, travel_type: TravelType) -> Self {
        Self {
            distance_m: leg.distance_m,
            estimated_travel_time: leg.duration_s,
            travel_type,
        }
    }
}

/// Walk when the walk takes at most `walking_threshold_min` minutes,
/// otherwise take transit when a transit route exists.
///
/// Fails only when no walking route exists. Transit errors or missing transit
/// routes fall back to walking.
pub async fn calculate_route(
    maps: &dyn MapsProvider,
    origin: Coordinates,
    destination: Coordinates,
    walking_threshold_min: u32,
) -> Result<RouteData, MapsError> {
    let walking = maps
        .directions(origin, destination, TravelMode::Walking)
        .await?
        .ok_or(MapsError::NoRoute)?;

    let walking_minutes = walking.duration_s as f64 / 60.0;
    debug!(
        distance_m = walking.distance_m,
        minutes = %format!("{:.1}", walking_minutes),
        summary = %walking.summary,
        "Walking route found"
    );

    if walking_minutes <= walking_threshold_min as f64 {
        return Ok(RouteData::from_leg(&walking, TravelType::Walking));
    }

    debug!(
        threshold_min = walking_threshold_min,
        "Walking exceeds threshold, trying transit"
    );

    match maps
        .directions(origin, destination, TravelMode::Transit)
        .await
    {
        Ok(Some(transit)) => {
            debug!(
                distance_m = transit.distance_m,
                duration_s = transit.duration_s,
                "Transit route found"
            );
            Ok(RouteData::from_leg(&transit, TravelType::Transit))
        }
        Ok(None) => {
            warn!("No transit route found, falling back to walking");
            Ok(RouteData::from_leg(&walking, TravelType::Walking))
        }
        Err(e) => {
            warn!(error = %e, "Transit lookup failed, falling back to walking");
            Ok(RouteData::from_leg(&walking, TravelType::Walking))
        }
    }
}

/// Geocode `"{name}, {address}"` and prefer the result over the LLM's
/// coordinates.
///
/// Returns the location's own coordinates when the address is empty, nothing
/// is found or geocoding fails.
pub async fn refine_coordinates(maps: &dyn MapsProvider, location: &Location) -> Coordinates {
    let current = location.coordinates();
    let address = location.address.trim();
    if address.is_empty() {
        return current;
    }

    let query = match location.name.trim() {
        "" => address.to_string(),
        name => format!("{}, {}", name, address),
    };

    match maps.geocode(&query).await {
        Ok(Some(coords)) if coords.is_usable() => {
            debug!(query = %query, ?coords, "Refined coordinates by geocoding");
            coords
        }
        Ok(_) => {
            debug!(query = %query, "Geocoding found nothing, keeping coordinates");
            current
        }
        Err(e) => {
            warn!(query = %query, error = %e, "Geocoding failed, keeping coordinates");
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockMaps;

    fn origin() -> Coordinates {
        Coordinates::new(48.8566, 2.3522)
    }

    fn destination() -> Coordinates {
        Coordinates::new(48.8462, 2.3372)
    }

    fn leg(distance_m: i64, duration_s: i64) -> RouteLeg {
        RouteLeg {
            distance_m,
            duration_s,
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_short_walk_uses_walking() {
        let maps = MockMaps::new();
        maps.set_leg(TravelMode::Walking, leg(1000, 15 * 60)).await;
        maps.set_leg(TravelMode::Transit, leg(1500, 300)).await;

        let route = calculate_route(&maps, origin(), destination(), 15).await.unwrap();
        assert_eq!(route.travel_type, TravelType::Walking);
        assert_eq!(route.distance_m, 1000);
        assert_eq!(route.estimated_travel_time, 900);
        assert_eq!(maps.directions_count(TravelMode::Transit).await, 0);
    }

    #[tokio::test]
    async fn test_long_walk_uses_transit() {
        let maps = MockMaps::new();
        maps.set_leg(TravelMode::Walking, leg(4000, 16 * 60)).await;
        maps.set_leg(TravelMode::Transit, leg(4500, 600)).await;

        let route = calculate_route(&maps, origin(), destination(), 15).await.unwrap();
        assert_eq!(route.travel_type, TravelType::Transit);
        assert_eq!(route.distance_m, 4500);
        assert_eq!(route.estimated_travel_time, 600);
    }

    #[tokio::test]
    async fn test_missing_transit_falls_back_to_walking() {
        let maps = MockMaps::new();
        maps.set_leg(TravelMode::Walking, leg(4000, 50 * 60)).await;

        let route = calculate_route(&maps, origin(), destination(), 15).await.unwrap();
        assert_eq!(route.travel_type, TravelType::Walking);
        assert_eq!(route.estimated_travel_time, 3000);
    }

    #[tokio::test]
    async fn test_transit_error_falls_back_to_walking() {
        let maps = MockMaps::new();
        maps.set_leg(TravelMode::Walking, leg(4000, 50 * 60)).await;
        maps.fail_mode(TravelMode::Transit).await;

        let route = calculate_route(&maps, origin(), destination(), 15).await.unwrap();
        assert_eq!(route.travel_type, TravelType::Walking);
    }

    #[tokio::test]
    async fn test_no_walking_route_is_an_error() {
        let maps = MockMaps::new();
        let result = calculate_route(&maps, origin(), destination(), 15).await;
        assert!(matches!(result, Err(MapsError::NoRoute)));
    }

    fn location() -> Location {
        Location {
            name: "Jardin du Luxembourg".to_string(),
            address: "75006 Paris".to_string(),
            lat: 0.0,
            lng: 0.0,
        }
    }

    #[tokio::test]
    async fn test_refine_coordinates_uses_geocode() {
        let maps = MockMaps::new();
        maps.set_geocode("Jardin du Luxembourg, 75006 Paris", destination())
            .await;

        let coords = refine_coordinates(&maps, &location()).await;
        assert_eq!(coords, destination());
    }

    #[tokio::test]
    async fn test_refine_coordinates_keeps_original_when_not_found() {
        let maps = MockMaps::new();
        let mut loc = location();
        loc.lat = 48.1;
        loc.lng = 2.1;

        let coords = refine_coordinates(&maps, &loc).await;
        assert_eq!(coords, Coordinates::new(48.1, 2.1));
    }

    #[tokio::test]
    async fn test_refine_coordinates_skips_empty_address() {
        let maps = MockMaps::new();
        let mut loc = location();
        loc.address = "  ".to_string();

        let coords = refine_coordinates(&maps, &loc).await;
        assert_eq!(coords, Coordinates::new(0.0, 0.0));
        assert_eq!(maps.geocode_count().await, 0);
    }
}
