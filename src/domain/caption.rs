use crate::domain::places::SelectedPlace;

/// Where the posted image came from. Decides the alt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    PlacePhoto,
    StreetView,
}

/// Everything the poster needs for one image post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePost {
    pub text: String,
    pub alt: String,
    pub image: Vec<u8>,
}

impl ImagePost {
    pub fn for_place(place: &SelectedPlace, kind: ImageKind, image: Vec<u8>) -> Self {
        Self {
            text: caption(&place.name, &place.address),
            alt: alt_text(kind, &place.name, &place.address),
            image,
        }
    }
}

/// `"{name} at {address}"`, or just the address when the place has no name.
pub fn caption(name: &str, address: &str) -> String {
    if name.is_empty() {
        address.to_string()
    } else {
        format!("{name} at {address}")
    }
}

pub fn alt_text(kind: ImageKind, name: &str, address: &str) -> String {
    match kind {
        ImageKind::PlacePhoto => format!("An image from Google Maps of {}", caption(name, address)),
        ImageKind::StreetView => format!("A Google Streetview image of {address}"),
    }
}

/// Turn a free-form location string into a file stem made of ASCII
/// alphanumerics, with each run of anything else collapsed to one `_`.
///
/// Falls back to `image` when nothing alphanumeric is left.
pub fn sanitize_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    if out.chars().any(|c| c.is_ascii_alphanumeric()) {
        out
    } else {
        "image".to_string()
    }
}
