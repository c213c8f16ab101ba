use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use ecoscan_core::{
    format_distance_km, haversine_km, Coordinate, EcoScanError, Rating, RecyclerEntry,
    RecyclerLocator, Result,
};

/// Upper bound on returned recyclers.
pub const MAX_RECYCLERS: usize = 5;

/// Search radius in meters.
pub const SEARCH_RADIUS_M: u32 = 5000;

pub const SEARCH_KEYWORD: &str = "ewaste recycler";

const SERVICE: &str = "places";
const PHOTO_MAX_WIDTH: u32 = 200;

/// Places-backed recycler locator.
pub struct PlacesRecyclerLocator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PlacesRecyclerLocator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://maps.googleapis.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| EcoScanError::config("Missing PLACES_API_KEY in environment."))
    }
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<Place>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: Option<String>,
    vicinity: Option<String>,
    rating: Option<f64>,
    place_id: Option<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: Option<String>,
}

/// Map a reqwest failure to an upstream error. The URL is dropped because it
/// carries the API key.
fn transport_error(err: reqwest::Error) -> EcoScanError {
    EcoScanError::upstream(SERVICE, err.without_url().to_string())
}

/// Statuses for which `results` is meaningful.
const OK_STATUSES: &[&str] = &["OK", "ZERO_RESULTS"];

/// Build display entries from a `nearbysearch` reply.
///
/// Keeps the upstream order and at most [`MAX_RECYCLERS`] places; never pads.
pub fn recyclers_from_response(
    origin: Coordinate,
    status: u16,
    body: &str,
    api_key: &str,
) -> Result<Vec<RecyclerEntry>> {
    let parsed: NearbySearchResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !(200..300).contains(&status) => {
            return Err(EcoScanError::upstream(SERVICE, format!("HTTP {status}: {body}")));
        }
        Err(e) => {
            return Err(EcoScanError::upstream(
                SERVICE,
                format!("unreadable nearbysearch response: {e}"),
            ));
        }
    };

    if let Some(message) = parsed.error_message {
        return Err(EcoScanError::upstream(SERVICE, message));
    }
    if !(200..300).contains(&status) {
        return Err(EcoScanError::upstream(SERVICE, format!("HTTP {status}")));
    }
    if let Some(place_status) = parsed.status.as_deref() {
        if !OK_STATUSES.contains(&place_status) {
            return Err(EcoScanError::upstream(SERVICE, place_status.to_string()));
        }
    }

    Ok(parsed
        .results
        .into_iter()
        .take(MAX_RECYCLERS)
        .map(|place| to_entry(origin, place, api_key))
        .collect())
}

fn to_entry(origin: Coordinate, place: Place, api_key: &str) -> RecyclerEntry {
    let name = place.name.unwrap_or_default();

    let distance = place
        .geometry
        .and_then(|g| g.location)
        .and_then(|loc| Some(Coordinate::new(loc.lat?, loc.lng?)))
        .map(|to| format_distance_km(haversine_km(origin, to)))
        .unwrap_or_default();

    let thumbnail = place
        .photos
        .first()
        .and_then(|p| p.photo_reference.as_deref())
        .map(|reference| photo_url(reference, api_key))
        .unwrap_or_default();

    let maps_url = place
        .place_id
        .as_deref()
        .map(|id| maps_url(&name, id))
        .unwrap_or_default();

    RecyclerEntry {
        name,
        address: place.vicinity.unwrap_or_default(),
        rating: Rating::from_option(place.rating),
        distance,
        thumbnail,
        maps_url,
    }
}

fn photo_url(reference: &str, api_key: &str) -> String {
    format!(
        "https://maps.googleapis.com/maps/api/place/photo?maxwidth={PHOTO_MAX_WIDTH}&photoreference={}&key={}",
        urlencoding::encode(reference),
        urlencoding::encode(api_key),
    )
}

/// Google Maps deep link; spaces in the name become `+`.
fn maps_url(name: &str, place_id: &str) -> String {
    let query = name
        .split(' ')
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    format!(
        "https://www.google.com/maps/search/?api=1&query={query}&query_place_id={}",
        urlencoding::encode(place_id)
    )
}

#[async_trait]
impl RecyclerLocator for PlacesRecyclerLocator {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn nearby(&self, origin: Coordinate) -> Result<Vec<RecyclerEntry>> {
        let api_key = self.api_key()?;
        info!(location = %origin, "[Places] Searching for recyclers");

        let radius = SEARCH_RADIUS_M.to_string();
        let location = origin.to_string();
        let resp = self
            .client
            .get(format!("{}/maps/api/place/nearbysearch/json", self.base_url))
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", SEARCH_KEYWORD),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(transport_error)?;

        let recyclers = recyclers_from_response(origin, status, &body, api_key)?;
        debug!(count = recyclers.len(), "[Places] Recyclers found");
        Ok(recyclers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SF: Coordinate = Coordinate {
        latitude: 37.7749,
        longitude: -122.4194,
    };

    fn place(i: usize) -> serde_json::Value {
        serde_json::json!({
            "name": format!("Green Recycler {i}"),
            "vicinity": format!("{i} Market St"),
            "rating": 4.0 + i as f64 / 10.0,
            "place_id": format!("pid-{i}"),
            "geometry": { "location": { "lat": 37.7749 + i as f64 * 0.01, "lng": -122.4194 } },
            "photos": [{ "photo_reference": format!("ref-{i}") }]
        })
    }

    fn body(places: Vec<serde_json::Value>) -> String {
        serde_json::json!({ "results": places, "status": "OK" }).to_string()
    }

    #[test]
    fn truncates_to_five_in_upstream_order() {
        let places = (0..8).map(place).collect();
        let entries = recyclers_from_response(SF, 200, &body(places), "k").unwrap();
        assert_eq!(entries.len(), MAX_RECYCLERS);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Green Recycler 0",
                "Green Recycler 1",
                "Green Recycler 2",
                "Green Recycler 3",
                "Green Recycler 4"
            ]
        );
    }

    #[test]
    fn fewer_than_five_are_not_padded() {
        for available in 0..=MAX_RECYCLERS {
            let places = (0..available).map(place).collect();
            let entries = recyclers_from_response(SF, 200, &body(places), "k").unwrap();
            assert_eq!(entries.len(), available);
        }
    }

    #[test]
    fn annotates_distance_thumbnail_and_maps_url() {
        let entries = recyclers_from_response(SF, 200, &body(vec![place(1)]), "secret").unwrap();
        let entry = &entries[0];
        assert_eq!(entry.address, "1 Market St");
        assert_eq!(entry.rating, Rating::Score(4.1));
        assert_eq!(entry.distance, "1.1 km");
        assert_eq!(
            entry.thumbnail,
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=200&photoreference=ref-1&key=secret"
        );
        assert_eq!(
            entry.maps_url,
            "https://www.google.com/maps/search/?api=1&query=Green+Recycler+1&query_place_id=pid-1"
        );
    }

    #[test]
    fn missing_fields_fall_back_to_empty() {
        let bare = serde_json::json!({ "name": "Bare Place" });
        let entries = recyclers_from_response(SF, 200, &body(vec![bare]), "k").unwrap();
        let entry = &entries[0];
        assert_eq!(entry.distance, "");
        assert_eq!(entry.thumbnail, "");
        assert_eq!(entry.maps_url, "");
        assert_eq!(entry.address, "");
        assert_eq!(entry.rating, Rating::Unrated("N/A".into()));
    }

    #[test]
    fn partial_geometry_has_no_distance() {
        let partial = serde_json::json!({ "name": "Half", "geometry": { "location": { "lat": 1.0 } } });
        let entries = recyclers_from_response(SF, 200, &body(vec![partial]), "k").unwrap();
        assert_eq!(entries[0].distance, "");
    }

    #[test]
    fn error_message_is_upstream() {
        let payload = r#"{"error_message": "The provided API key is invalid.", "results": [], "status": "REQUEST_DENIED"}"#;
        let err = recyclers_from_response(SF, 200, payload, "k").unwrap_err();
        assert_eq!(err.to_string(), "places error: The provided API key is invalid.");
    }

    #[test]
    fn failed_status_without_message_is_upstream() {
        let payload = r#"{"results": [], "status": "OVER_QUERY_LIMIT"}"#;
        let err = recyclers_from_response(SF, 200, payload, "k").unwrap_err();
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
    }

    #[test]
    fn zero_results_is_empty() {
        let payload = r#"{"results": [], "status": "ZERO_RESULTS"}"#;
        assert!(recyclers_from_response(SF, 200, payload, "k").unwrap().is_empty());
    }

    #[test]
    fn names_are_url_encoded() {
        assert_eq!(
            maps_url("A&B Recycling", "x y"),
            "https://www.google.com/maps/search/?api=1&query=A%26B+Recycling&query_place_id=x%20y"
        );
    }

    #[tokio::test]
    async fn transport_error_hides_key() {
        let locator = PlacesRecyclerLocator::new(Some("AIzaSecretKey".into()))
            .with_base_url("http://127.0.0.1:1");
        let err = locator.nearby(SF).await.unwrap_err();
        assert!(matches!(err, EcoScanError::Upstream { .. }));
        assert!(!err.to_string().contains("AIzaSecretKey"));
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let err = PlacesRecyclerLocator::new(None).nearby(SF).await.unwrap_err();
        assert!(matches!(err, EcoScanError::Config(_)));
    }
}
