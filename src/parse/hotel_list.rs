//! Hotel-list extraction from an agent reply.
//!
//! The reply is a line protocol: `HOTEL_PHOTO:` opens a record, `HOTEL_INFO:`
//! carries `"<name> - <price> USD (<stars>⭐)"`, `HOTEL_ID:` overrides the
//! synthesized id. A record is only emitted once both a photo marker and a
//! name-bearing info marker have been seen for it.

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

/// Locality used when the agent does not say where a hotel is.
pub const DEFAULT_PLACE: &str = "Анталия";

/// One listing entry parsed out of the agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelSummary {
    pub photo: String,
    pub name: String,
    pub price: u32,
    pub stars: u32,
    pub place: String,
    /// Explicit `HOTEL_ID:` value, or `hotel_<millis>_<ordinal>` when the
    /// marker is absent. Synthesized ids are not stable across requests.
    pub id: String,
}

static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Найдено\s+(\d+)\s+отел[ейя]").expect("static regex"));

static INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)\s*-\s*(\d+)\s*USD\s*\((\d+)⭐\)").expect("static regex"));

struct PendingHotel {
    photo: String,
    name: Option<String>,
    price: u32,
    stars: u32,
    id: Option<String>,
}

impl PendingHotel {
    fn open(photo: String) -> Self {
        Self {
            photo,
            name: None,
            price: 0,
            stars: 0,
            id: None,
        }
    }

    /// A record is complete once an info marker has supplied a name.
    fn finish(self, ordinal: usize) -> Option<HotelSummary> {
        let name = self.name?;
        let id = self
            .id
            .unwrap_or_else(|| format!("hotel_{}_{}", Utc::now().timestamp_millis(), ordinal));
        Some(HotelSummary {
            photo: self.photo,
            name,
            price: self.price,
            stars: self.stars,
            place: DEFAULT_PLACE.to_string(),
            id,
        })
    }
}

/// Parses an agent reply into an ordered hotel list.
///
/// Lenient by contract: malformed lines are skipped or partially applied and
/// the accumulated result is returned. Never fails.
pub fn parse_hotel_list(response_text: &str) -> Vec<HotelSummary> {
    // The "Найдено N отелей" header is advisory only; the parsed record count
    // is authoritative.
    if let Some(caps) = TOTAL_RE.captures(response_text) {
        tracing::debug!(advertised_total = %&caps[1], "hotel list header");
    }

    let mut hotels: Vec<HotelSummary> = Vec::new();
    let mut current: Option<PendingHotel> = None;

    for line in response_text.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("HOTEL_PHOTO:") {
            if let Some(done) = current.take().and_then(|p| p.finish(hotels.len())) {
                hotels.push(done);
            }
            current = Some(PendingHotel::open(rest.trim().to_string()));
        } else if let Some(rest) = line.strip_prefix("HOTEL_INFO:") {
            // Info without a preceding photo marker is a no-op.
            let Some(pending) = current.as_mut() else {
                continue;
            };
            let info = rest.trim();
            if let Some(caps) = INFO_RE.captures(info) {
                pending.name = Some(caps[1].trim().to_string());
                pending.price = caps[2].parse().unwrap_or_default();
                pending.stars = caps[3].parse().unwrap_or_default();
            } else if !info.is_empty() {
                // Unrecognized info format: keep the raw text as the name.
                tracing::debug!(info, "hotel info did not match expected format");
                pending.name = Some(info.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("HOTEL_ID:") {
            if let Some(pending) = current.as_mut() {
                pending.id = Some(rest.trim().to_string());
            }
        }
    }

    if let Some(done) = current.and_then(|p| p.finish(hotels.len())) {
        hotels.push(done);
    }

    tracing::debug!(count = hotels.len(), "parsed hotel list");
    hotels
}
