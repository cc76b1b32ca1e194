//! Per-chat session state.
//!
//! The store hands out one async mutex per chat so two events for the same
//! chat serialize their read-modify-write instead of racing. Sessions live in
//! memory only; nothing survives a restart.

use crate::parse::HotelSummary;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Navigation state for one chat. Created on the first successful hotel-list
/// parse, overwritten on every new top-level search, deleted on "new search".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Current page's result set only, not a multi-page cache.
    pub hotels: Vec<HotelSummary>,
    pub current_hotel_index: usize,
    pub current_page: u32,
    /// Verbatim query text resent to the agent when another page is requested.
    pub last_search_text: String,
}

impl UserSession {
    pub fn new(hotels: Vec<HotelSummary>, page: u32, last_search_text: String) -> Self {
        Self {
            hotels,
            current_hotel_index: 0,
            current_page: page,
            last_search_text,
        }
    }
}

type Slot = Arc<AsyncMutex<Option<UserSession>>>;

#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<i64, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot for `chat_id`, inserting an empty one if absent. The
    /// guard is held across the whole mutation so same-chat events cannot
    /// interleave.
    pub async fn entry(&self, chat_id: i64) -> OwnedMutexGuard<Option<UserSession>> {
        let slot = {
            let mut slots = self.slots.lock().expect("session map lock");
            slots.entry(chat_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Drops the slot itself. Callers clear the session through their guard
    /// first; this just keeps the map from accumulating dead chats.
    pub fn remove(&self, chat_id: i64) {
        self.slots.lock().expect("session map lock").remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::hotel_list::DEFAULT_PLACE;

    fn hotel(id: &str) -> HotelSummary {
        HotelSummary {
            photo: format!("http://x/{id}.jpg"),
            name: format!("Hotel {id}"),
            price: 100,
            stars: 4,
            place: DEFAULT_PLACE.to_string(),
            id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn entry_is_lazily_created_empty() {
        let store = SessionStore::new();
        let guard = store.entry(1).await;
        assert!(guard.is_none());
    }

    #[tokio::test]
    async fn new_search_overwrites_not_merges() {
        let store = SessionStore::new();
        {
            let mut guard = store.entry(1).await;
            *guard = Some(UserSession::new(
                vec![hotel("a"), hotel("b")],
                3,
                "первый запрос".to_string(),
            ));
            guard.as_mut().expect("session").current_hotel_index = 1;
        }
        {
            let mut guard = store.entry(1).await;
            *guard = Some(UserSession::new(
                vec![hotel("c")],
                1,
                "второй запрос".to_string(),
            ));
        }

        let guard = store.entry(1).await;
        let session = guard.as_ref().expect("session");
        assert_eq!(session.hotels, vec![hotel("c")]);
        assert_eq!(session.current_hotel_index, 0);
        assert_eq!(session.current_page, 1);
        assert_eq!(session.last_search_text, "второй запрос");
    }

    #[tokio::test]
    async fn sessions_are_per_chat() {
        let store = SessionStore::new();
        {
            let mut guard = store.entry(1).await;
            *guard = Some(UserSession::new(vec![hotel("a")], 1, "q".to_string()));
        }
        assert!(store.entry(2).await.is_none());
        assert!(store.entry(1).await.is_some());
    }

    #[tokio::test]
    async fn remove_deletes_the_session() {
        let store = SessionStore::new();
        {
            let mut guard = store.entry(1).await;
            *guard = Some(UserSession::new(vec![hotel("a")], 1, "q".to_string()));
        }
        store.remove(1);
        assert!(store.entry(1).await.is_none());
    }
}
