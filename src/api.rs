//! HTTP surface of the bot: the Telegram webhook endpoint.

mod handlers;

pub use handlers::create_router;

use crate::dispatch::Dispatcher;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Expected webhook path segment; requests under any other token 404.
    pub telegram_token: Arc<str>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, telegram_token: &str) -> Self {
        Self {
            dispatcher,
            telegram_token: telegram_token.into(),
        }
    }
}
