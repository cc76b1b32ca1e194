//! Property-based tests for the parsing stage.

use super::hotel_detail::parse_hotel_detail;
use super::hotel_list::parse_hotel_list;
use super::text::{detect_requested_page, html_to_markdown};
use proptest::prelude::*;

proptest! {
    /// Applying the markup conversion twice yields the same result as once.
    #[test]
    fn html_to_markdown_is_idempotent(input in "\\PC*") {
        let once = html_to_markdown(&input);
        prop_assert_eq!(html_to_markdown(&once), once);
    }

    /// The list parser never panics and returns a (possibly empty) list for
    /// arbitrary input.
    #[test]
    fn hotel_list_parser_never_panics(input in "\\PC*") {
        let _ = parse_hotel_list(&input);
    }

    /// The detail parser never panics for arbitrary input.
    #[test]
    fn hotel_detail_parser_never_panics(input in "\\PC*") {
        let _ = parse_hotel_detail(&input);
    }

    /// Page detection finds the page number in every configured phrasing.
    #[test]
    fn page_detection_matches_configured_phrasings(page in 1u32..1000) {
        for phrase in [
            format!("покажи страницу {page}"),
            format!("стр. {page}"),
            format!("страница {page}"),
            format!("page {page}"),
        ] {
            prop_assert_eq!(detect_requested_page(&phrase), Some(page));
        }
    }

    /// Every complete photo+info pair produces exactly one record, in order.
    #[test]
    fn complete_records_are_all_returned(count in 0usize..20) {
        let mut input = String::from("Найдено 99 отелей\n");
        for i in 0..count {
            input.push_str(&format!(
                "HOTEL_PHOTO: http://x/{i}.jpg\nHOTEL_INFO: Hotel {i} - {i} USD (3⭐)\n"
            ));
        }
        let hotels = parse_hotel_list(&input);
        prop_assert_eq!(hotels.len(), count);
        for (i, hotel) in hotels.iter().enumerate() {
            prop_assert_eq!(&hotel.photo, &format!("http://x/{i}.jpg"));
        }
    }
}
