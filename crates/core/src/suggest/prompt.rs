//! French prompts sent to the model.

use crate::activity::{Answers, Coordinates, RawSuggestResponse};
use crate::datetime::DatetimeInfo;
use crate::weather::WeatherData;

/// Everything the suggestion prompt is built from.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub answers: &'a Answers,
    pub location: Coordinates,
    pub weather: &'a WeatherData,
    pub datetime: &'a DatetimeInfo,
    pub refine: bool,
    pub exclude_ids: &'a [String],
}

const RESPONSE_TEMPLATE: &str = r#"{
  "activities": [
    {
      "id": "act_XX", // Un identifiant unique par activité (act_01, act_02, act_03)
      "title": "Titre de l'activité",
      "description": "Description détaillée de l'activité",
      "price_eur": 0, // Prix en euros, ou 0 si gratuit
      "duration_min": 0, // Durée minimum estimée en minutes
      "duration_max": 0, // Durée maximum estimée en minutes
      "location": {
        "name": "Nom du lieu",
        "address": "Adresse complète",
        "lat": 0.0, // Latitude du lieu
        "lng": 0.0 // Longitude du lieu
      },
      "distance_m": null, // Laisse null, sera calculé par le backend
      "estimated_travel_time": null, // Laisse null, sera calculé par le backend
      "travel_type": null, // Laisse null, sera calculé par le backend
      "indoor": true/false, // Indique si l'activité est en intérieur
      "authentic": true/false, // Indique si l'activité est authentique ou touristique
      "temporary": true/false, // Indique si c'est un événement temporaire
      "tags": ["tag1", "tag2"], // Liste de tags pertinents
      "rating_google": 0.0, // Note Google si disponible, ou null
      "reviews_count": 0, // Nombre d'avis, ou null si non disponible
      "image_url": "URL d'une image", // URL d'une image représentative, ou null
      "external_url": "URL externe", // URL du site ou Google Maps, ou null
      "is_free": true/false, // Indique si l'activité est gratuite
      "is_student_free": true/false, // Indique si gratuit pour étudiants
      "language": "fr", // Langue principale de l'activité
      "open_hours": [ // Heures d'ouverture, ou null si non applicable
        {
          "day": "Lundi",
          "open": "09:00",
          "close": "18:00"
        }
      ],
      "date_special": "2023-06-15 14:00-16:00", // Pour événements ponctuels, ou null
      "organizer": { // Organisateur, ou null si non applicable
        "type": "association/entreprise/etc",
        "name": "Nom de l'organisateur"
      }
    }
  ],
  "note": 8, // Auto-évaluation de 1 à 10 de la qualité de ta réponse
  "note_reasons": "Explication de ta note" // Pourquoi tu t'es donné cette note
}"#;

/// Build the suggestion prompt.
///
/// Optional answers only produce a line when present and non-zero; the
/// refinement block is only emitted when `refine` is set.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let answers = ctx.answers;
    let mut prompt = String::new();

    let canceled = match answers.canceled_activity.trim() {
        "" => "une activité",
        other => other,
    };
    prompt.push_str(
        "Tu es \"Where2\", un assistant IA spécialisé dans la recommandation d'activités en France.\n\n"
    );
    prompt.push_str(&format!(
        "Je viens d'annuler mon activité précédente: \"{}\".\n",
        canceled
    ));

    prompt.push_str(&format!(
        "Je cherche {}.\n",
        if answers.same_type {
            "le même type d'activité"
        } else {
            "un type d'activité différent"
        }
    ));

    if let Some(budget) = non_zero(answers.budget) {
        prompt.push_str(&format!("Mon budget maximum est de {} euros.\n", budget));
    }
    if let Some(travel_time) = non_zero(answers.travel_time) {
        prompt.push_str(&format!(
            "Je souhaite que le temps de trajet n'excède pas {} minutes.\n",
            travel_time
        ));
    }
    if let Some(energy) = non_zero(answers.energy_level) {
        prompt.push_str(&format!("Mon niveau d'énergie est de {}/10.\n", energy));
    }
    if let Some(available) = non_zero(answers.available_time) {
        prompt.push_str(&format!(
            "J'ai {} minutes de temps libre disponible.\n",
            available
        ));
    }

    push_datetime(&mut prompt, ctx.datetime);

    if ctx.refine {
        push_refinement(&mut prompt, answers, ctx.exclude_ids);
    }

    push_weather(&mut prompt, ctx.weather);

    prompt.push_str(&format!(
        "\nMa position actuelle est: latitude {}, longitude {}.\n\n\
         Cherche sur internet des activités qui correspondent à mes critères près de ma position actuelle.\n\
         Retourne exactement 3 activités différentes sous forme de JSON selon ce format:\n\n",
        ctx.location.lat, ctx.location.lng
    ));
    prompt.push_str(RESPONSE_TEMPLATE);
    prompt.push_str(
        "\n\nN'invente pas d'informations. Si tu ne trouves pas une donnée, indique null pour ce champ.\n\
         Assure-toi que toutes les activités sont réelles et actuellement disponibles, \
         et qu'elles correspondent bien aux critères fournis.\n",
    );

    prompt
}

/// Build the prompt asking the model to fill the null or missing fields of
/// an incomplete response.
pub fn build_fill_prompt(initial: &RawSuggestResponse) -> String {
    let json = serde_json::to_string_pretty(initial).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Je t'ai précédemment demandé de générer des suggestions d'activités, et j'ai reçu ce JSON incomplet:\n\n\
         {}\n\n\
         Certains champs sont manquants ou null. Peux-tu compléter uniquement les champs manquants (null) \
         en faisant des recherches supplémentaires sur internet?\n\
         Garde exactement les mêmes activités, mais assure-toi que tous les champs obligatoires sont remplis.\n\
         Retourne le JSON complet avec les champs manquants remplis.\n",
        json
    )
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

fn push_datetime(prompt: &mut String, datetime: &DatetimeInfo) {
    prompt.push_str(&format!(
        "\nNous sommes le {} ({}), il est {}.\n",
        datetime.date, datetime.day, datetime.time
    ));
    if datetime.is_weekend {
        prompt.push_str("C'est le week-end.\n");
    }
    if datetime.is_holiday {
        prompt.push_str("C'est un jour férié.\n");
    }
}

fn push_refinement(prompt: &mut String, answers: &Answers, exclude_ids: &[String]) {
    if let Some(count) = non_zero(answers.participants_count) {
        prompt.push_str(&format!("Nous sommes {} participants.\n", count));
    }
    if let Some(indoor) = answers.indoor_preference {
        prompt.push_str(&format!(
            "Je préfère une activité {}.\n",
            if indoor { "en intérieur" } else { "en extérieur" }
        ));
    }
    if let Some(authentic) = answers.authentic_preference {
        prompt.push_str(&format!(
            "Je préfère une activité {}.\n",
            if authentic { "authentique" } else { "touristique" }
        ));
    }
    if let Some(temporary) = answers.temporary_preference {
        prompt.push_str(&format!(
            "Je préfère un {}.\n",
            if temporary {
                "événement éphémère"
            } else {
                "lieu permanent"
            }
        ));
    }
    if !exclude_ids.is_empty() {
        prompt.push_str(&format!(
            "Exclus les activités avec les IDs suivants: {}.\n",
            exclude_ids.join(", ")
        ));
    }
    prompt.push_str("Propose-moi de nouvelles suggestions différentes des précédentes.\n");
}

fn push_weather(prompt: &mut String, weather: &WeatherData) {
    prompt.push_str(&format!(
        "\nLa météo actuelle à ma position est: {}, température de {}°C, ressenti {}°C, humidité {}%, vent {} m/s.\n",
        weather.description,
        weather.temperature,
        weather.feels_like,
        weather.humidity,
        weather.wind_speed
    ));
    if weather.is_snowy {
        prompt.push_str(
            "Il neige actuellement: privilégie les activités en intérieur ou adaptées à la neige.\n"
        );
    } else if weather.is_rainy {
        prompt.push_str(
            "Il pleut actuellement: privilégie les activités en intérieur ou abritées.\n"
        );
    }
}
