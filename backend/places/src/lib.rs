//! Nearby e-waste recyclers via the Google Places `nearbysearch` API.

pub mod recyclers;

pub use recyclers::{
    recyclers_from_response, PlacesRecyclerLocator, MAX_RECYCLERS, SEARCH_KEYWORD,
    SEARCH_RADIUS_M,
};
