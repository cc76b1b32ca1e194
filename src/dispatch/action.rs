//! Callback-button payload decoding.
//!
//! Button payloads are a small fixed namespace of prefixes plus two literal
//! values. They are decoded once, here, into a closed set of actions the
//! dispatcher matches exhaustively; anything else is ignored.

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the hotel at this index of the current list.
    SelectHotel(usize),
    /// Fetch and show another result page.
    GotoPage(u32),
    /// Send the manager's contact info.
    Contact(String),
    /// Fetch and show details for this hotel id.
    Detail(String),
    BackToList,
    NewSearch,
}

impl Action {
    pub fn decode(data: &str) -> Option<Action> {
        match data {
            "back_to_list" => return Some(Action::BackToList),
            "new_search" => return Some(Action::NewSearch),
            _ => {}
        }
        if let Some(rest) = data.strip_prefix("hotel_") {
            return rest.parse().ok().map(Action::SelectHotel);
        }
        if let Some(rest) = data.strip_prefix("page_") {
            return rest.parse().ok().map(Action::GotoPage);
        }
        if let Some(rest) = data.strip_prefix("contact_") {
            return Some(Action::Contact(rest.to_string()));
        }
        if let Some(rest) = data.strip_prefix("detail_") {
            return Some(Action::Detail(rest.to_string()));
        }
        None
    }
}
