//! Canned suggestions for client loading-state testing.

use once_cell::sync::Lazy;
use serde_json::json;

use super::SuggestResponse;

static SAMPLE: Lazy<SuggestResponse> = Lazy::new(|| {
    serde_json::from_value(
        json!({
            "activities": [
                {
                    "id": "mock-activity-1",
                    "title": "Visite du musée d'art moderne",
                    "description": "Une expérience culturelle immersive au cœur de l'art contemporain, dans l'un des musées les plus emblématiques de la capitale, avec vue sur la Seine.",
                    "price_eur": 12.5,
                    "duration_min": 60,
                    "duration_max": 180,
                    "location": {
                        "name": "Musée d'Art Moderne de Paris",
                        "address": "11 Avenue du Président Wilson, 75116 Paris",
                        "lat": 48.8651,
                        "lng": 2.2909
                    },
                    "distance_m": 1500,
                    "estimated_travel_time": 900,
                    "travel_type": 1,
                    "indoor": true,
                    "authentic": true,
                    "temporary": false,
                    "tags": ["art", "culture", "musée", "intérieur"],
                    "rating_google": 4.2,
                    "reviews_count": 3542,
                    "image_url": "https://example.com/images/museum.jpg",
                    "external_url": "https://www.mam.paris.fr",
                    "is_free": false,
                    "is_student_free": true,
                    "language": "fr",
                    "open_hours": [
                        { "day": "lundi", "open": "fermé", "close": "fermé" },
                        { "day": "mardi", "open": "10:00", "close": "18:00" },
                        { "day": "dimanche", "open": "10:00", "close": "18:00" }
                    ],
                    "date_special": null,
                    "organizer": { "type": "museum", "name": "Ville de Paris" }
                },
                {
                    "id": "mock-activity-2",
                    "title": "Balade dans le Jardin du Luxembourg",
                    "description": "Une évasion verdoyante dans ce jardin à la française créé en 1612, entre statues, fontaine Médicis et grand bassin.",
                    "price_eur": 0,
                    "duration_min": 30,
                    "duration_max": 120,
                    "location": {
                        "name": "Jardin du Luxembourg",
                        "address": "Rue de Médicis, 75006 Paris",
                        "lat": 48.8462,
                        "lng": 2.3372
                    },
                    "distance_m": 2200,
                    "estimated_travel_time": 1500,
                    "travel_type": 2,
                    "indoor": false,
                    "authentic": true,
                    "temporary": false,
                    "tags": ["parc", "nature", "détente", "extérieur"],
                    "rating_google": 4.7,
                    "reviews_count": 8756,
                    "image_url": null,
                    "external_url": "https://www.senat.fr/jardin/",
                    "is_free": true,
                    "is_student_free": true,
                    "language": null,
                    "open_hours": [{ "day": "tous les jours", "open": "7:30", "close": "21:30" }],
                    "date_special": null,
                    "organizer": { "type": "government", "name": "Sénat" }
                },
                {
                    "id": "mock-activity-3",
                    "title": "Concert de jazz au Sunset/Sunside",
                    "description": "Une soirée dans un club mythique de la rue des Lombards, temple du jazz parisien depuis plus de 40 ans.",
                    "price_eur": 25,
                    "duration_min": 90,
                    "duration_max": 120,
                    "location": {
                        "name": "Sunset/Sunside",
                        "address": "60 Rue des Lombards, 75001 Paris",
                        "lat": 48.8593,
                        "lng": 2.3479
                    },
                    "distance_m": 1800,
                    "estimated_travel_time": 1200,
                    "travel_type": 1,
                    "indoor": true,
                    "authentic": true,
                    "temporary": true,
                    "tags": ["musique", "jazz", "concert", "soirée"],
                    "rating_google": 4.5,
                    "reviews_count": 1245,
                    "image_url": null,
                    "external_url": "https://www.sunset-sunside.com",
                    "is_free": false,
                    "is_student_free": false,
                    "language": null,
                    "open_hours": [{ "day": "tous les jours", "open": "19:30", "close": "02:00" }],
                    "date_special": "2023-12-15",
                    "organizer": { "type": "club", "name": "Sunset/Sunside" }
                }
            ],
            "note": 7,
            "note_reasons": "Ces suggestions sont des exemples fictifs, non générés en fonction de vos préférences."
        })
    )
    .expect("sample response is valid")
});

/// Three fixed Paris activities with travel data, rated 7.
pub fn sample_response() -> SuggestResponse {
    SAMPLE.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{validate_response, TravelType};

    #[test]
    fn test_sample_response_is_valid() {
        let response = sample_response();
        assert_eq!(response.activities.len(), 3);
        assert_eq!(response.note, 7);
        assert!(validate_response(&response).is_empty());
    }

    #[test]
    fn test_sample_response_has_travel_data() {
        let response = sample_response();
        let travel: Vec<_> = response
            .activities
            .iter()
            .map(|a| (a.distance_m, a.estimated_travel_time, a.travel_type))
            .collect();
        assert_eq!(
            travel,
            vec![
                (Some(1500), Some(900), Some(TravelType::Walking)),
                (Some(2200), Some(1500), Some(TravelType::Transit)),
                (Some(1800), Some(1200), Some(TravelType::Walking)),
            ]
        );
    }
}
