use rand::Rng;
use rand::seq::IndexedRandom;

/// Google place types the bot is allowed to search for.
pub const PLACE_TYPES: &[&str] = &[
    "art_gallery",
    "art_studio",
    "cultural_landmark",
    "historical_place",
    "monument",
    "museum",
    "performing_arts_theater",
    "sculpture",
    "library",
    "adventure_sports_center",
    "bowling_alley",
    "comedy_club",
    "community_center",
    "concert_hall",
    "convention_center",
    "cultural_center",
    "cycling_park",
    "dog_park",
    "hiking_area",
    "historical_landmark",
    "movie_theater",
    "park",
    "skateboard_park",
    "state_park",
    "tourist_attraction",
    "visitor_center",
    "city_hall",
    "courthouse",
    "fire_station",
    "police",
    "post_office",
    "apartment_building",
    "apartment_complex",
    "church",
    "hindu_temple",
    "mosque",
    "synagogue",
    "bicycle_store",
    "book_store",
    "athletic_field",
    "ice_skating_rink",
    "swimming_pool",
    "sports_complex",
    "sports_club",
    "bus_station",
];

pub const DEFAULT_TYPE_COUNT: usize = 3;

/// Draw `count` distinct types from `types`. Asking for more than exist returns all of them.
pub fn sample_types<T, R>(types: &[T], count: usize, rng: &mut R) -> Vec<String>
where
    T: AsRef<str>,
    R: Rng + ?Sized,
{
    types
        .choose_multiple(rng, count)
        .map(|t| {
            let name: &str = t.as_ref();
            name.to_string()
        })
        .collect()
}
