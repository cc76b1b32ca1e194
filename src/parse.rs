//! Marker-based parsing of Dialogflow response text
//!
//! The agent replies in free text with line-prefixed markers (`HOTEL_PHOTO:`,
//! `HOTEL_INFO:`, `HOTEL_ID:`) for listings and bold `**Label:**` sections for
//! hotel details. These parsers are deliberately lenient: malformed input
//! degrades to a partial (possibly empty) result and a log entry, never an
//! error.

pub mod hotel_detail;
pub mod hotel_list;
#[cfg(test)]
mod proptests;
pub mod text;

pub use hotel_detail::{parse_hotel_detail, HotelDetail, Section};
pub use hotel_list::{parse_hotel_list, HotelSummary};
