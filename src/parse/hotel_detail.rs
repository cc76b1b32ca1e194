//! Hotel-detail extraction from an agent reply.
//!
//! Extraction is marker-based, not positional: each field has its own labeled
//! pattern and fails independently. Partial extraction is normal, not an
//! error.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Detail sections, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Location,
    Amenities,
    Rooms,
    BusinessAmenities,
    Attractions,
}

/// Detail record for a single hotel. Unextracted fields keep their defaults;
/// missing sections are absent keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelDetail {
    pub name: String,
    pub place: String,
    pub stars: u32,
    pub image_url: Option<String>,
    pub sections: BTreeMap<Section, String>,
}

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("static regex"));
static PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Местоположение:\*\*\s*([^\n]+)").expect("static regex"));
static STARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*звезд").expect("static regex"));
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[URL изображения:\s*(https?://[^\]]+)\]").expect("static regex")
});

static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Описание:\*\*\s*([^*]+)").expect("static regex"));
static AMENITIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Удобства:\*\*\s*([^*]+)").expect("static regex"));
static ROOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Номера:\*\*\s*([^*]+)").expect("static regex"));
static BUSINESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Бизнес-удобства:\*\*\s*([^*]+)").expect("static regex"));
// Attractions also stop at the sibling "Ближайший ..." label.
static ATTRACTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\*\*Достопримечательности:\*\*\s*(.*?)(?:\*\*|Ближайший|$)")
        .expect("static regex")
});

fn capture(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?[1].trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Parses an agent detail reply. Any field whose pattern does not match is
/// left at its default; never fails.
pub fn parse_hotel_detail(response_text: &str) -> HotelDetail {
    let mut detail = HotelDetail {
        // Name is the first bold span in the reply.
        name: capture(&NAME_RE, response_text).unwrap_or_default(),
        place: capture(&PLACE_RE, response_text).unwrap_or_default(),
        stars: STARS_RE
            .captures(response_text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0),
        image_url: capture(&IMAGE_RE, response_text),
        sections: BTreeMap::new(),
    };

    // The description section doubles as the location text: replies that only
    // carry a "Местоположение" block still yield the location section.
    if let Some(value) =
        capture(&DESCRIPTION_RE, response_text).or_else(|| capture(&PLACE_RE, response_text))
    {
        detail.sections.insert(Section::Location, value);
    }
    for (re, section) in [
        (&AMENITIES_RE, Section::Amenities),
        (&ROOMS_RE, Section::Rooms),
        (&BUSINESS_RE, Section::BusinessAmenities),
        (&ATTRACTIONS_RE, Section::Attractions),
    ] {
        if let Some(value) = capture(re, response_text) {
            detail.sections.insert(section, value);
        }
    }

    tracing::debug!(
        name = %detail.name,
        stars = detail.stars,
        has_image = detail.image_url.is_some(),
        sections = detail.sections.len(),
        "parsed hotel detail"
    );
    detail
}
