//! Event dispatch and navigation state machine
//!
//! One inbound Telegram update in, zero or more outbound sends out. The
//! dispatcher owns the session store, calls the intent backend, feeds its
//! reply to the parsers and decides which card to render next. Backend and
//! messaging failures are caught here and surfaced as localized apology
//! messages; they never escape an event.

mod action;

pub use action::Action;

use crate::intent::IntentClient;
use crate::parse::text::{detect_detail_request, detect_requested_page};
use crate::parse::{parse_hotel_detail, parse_hotel_list};
use crate::render::{self, HotelCard};
use crate::session::{SessionStore, UserSession};
use crate::telegram::{
    CallbackQuery, ChatApi, InlineKeyboardButton, InlineKeyboardMarkup, TelegramError, Update,
};
use std::sync::Arc;

/// Query sent when a page button arrives for a chat with no recorded search.
const DEFAULT_SEARCH_QUERY: &str = "найди отели";

const GREETING: &str = "🏨 *Поиск отелей в Анталии*\n\n\
    👋 Привет! Я помогу найти отель в Анталии\n\n\
    ✨ Просто напишите:\n\
    • \"найди отель завтра на неделю\"\n\
    • \"отель с 25 декабря по 1 января\"\n\
    • \"отель на выходные для 2 человек\"\n\
    • \"покажи страницу 2\" - для навигации\n\
    • \"подробнее об отеле 12345\" - детали отеля";

const NEW_SEARCH_PROMPT: &str = "🔍 *Новый поиск отелей в Анталии*\n\n\
    Напишите даты и количество человек\n\n\
    Пример: \"отель с 25 по 30 декабря для 2 взрослых\"";

const CONTACT_INFO: &str = "📞 *Свяжитесь с менеджером*\n\n\
    👤 Telegram: @asialuxe_manager\n\n\
    ⏰ Ответим в течение 15 минут";

const LIST_NOT_FOUND: &str = "❌ Список отелей не найден. Начните новый поиск.";
const DETAIL_EMPTY: &str = "❌ Не удалось получить детальную информацию об отеле";
const DETAIL_ERROR: &str = "❌ Ошибка получения информации об отеле. Попробуйте еще раз.";
const FALLBACK_REPLY: &str = "Не понял ваш запрос. Попробуйте еще раз.";
const SEARCH_ERROR: &str = "Извините, произошла ошибка. Попробуйте еще раз.";
const GENERIC_ERROR: &str =
    "⚠️ Произошла ошибка. Попробуйте еще раз или обратитесь к @asialuxe_manager";

pub struct Dispatcher {
    intent: Arc<dyn IntentClient>,
    chat: Arc<dyn ChatApi>,
    sessions: SessionStore,
}

impl Dispatcher {
    pub fn new(intent: Arc<dyn IntentClient>, chat: Arc<dyn ChatApi>) -> Self {
        Self {
            intent,
            chat,
            sessions: SessionStore::new(),
        }
    }

    /// Entry point for one webhook update. Never propagates an error; the
    /// last-resort failure path notifies the user and logs.
    pub async fn handle_update(&self, update: Update) {
        let chat_id = update
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .or_else(|| {
                update
                    .callback_query
                    .as_ref()
                    .and_then(|q| q.message.as_ref())
                    .map(|m| m.chat.id)
            });

        if let Err(e) = self.route(update).await {
            tracing::error!(chat_id, error = %e, "update handling failed");
            if let Some(chat_id) = chat_id {
                if let Err(send_err) = self.chat.send_message(chat_id, GENERIC_ERROR, false, None).await
                {
                    tracing::error!(chat_id, error = %send_err, "failed to send error notice");
                }
            }
        }
    }

    async fn route(&self, update: Update) -> Result<(), TelegramError> {
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        if let Some(message) = update.message {
            if let Some(text) = message.text {
                return self.handle_message(message.chat.id, &text).await;
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<(), TelegramError> {
        let Some(message) = query.message else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if let Err(e) = self.chat.answer_callback_query(&query.id).await {
            tracing::warn!(chat_id, error = %e, "failed to answer callback query");
        }

        let Some(data) = query.data.as_deref() else {
            return Ok(());
        };
        let Some(action) = Action::decode(data) else {
            tracing::debug!(chat_id, data, "ignoring unrecognized callback payload");
            return Ok(());
        };
        tracing::info!(chat_id, ?action, "callback");

        match action {
            Action::SelectHotel(index) => {
                self.select_hotel(chat_id, message.message_id, index).await
            }
            Action::GotoPage(page) => self.goto_page(chat_id, Some(message.message_id), page).await,
            Action::BackToList => self.back_to_list(chat_id).await,
            Action::Contact(_) => self.chat.send_message(chat_id, CONTACT_INFO, true, None).await,
            Action::Detail(hotel_id) => self.show_detail(chat_id, &hotel_id).await,
            Action::NewSearch => self.new_search(chat_id).await,
        }
    }

    async fn handle_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        tracing::info!(chat_id, text, "message");

        if text == "/start" {
            return self.chat.send_message(chat_id, GREETING, true, None).await;
        }

        if let Some(hotel_id) = detect_detail_request(text) {
            return self.show_detail(chat_id, &hotel_id).await;
        }

        if let Some(page) = detect_requested_page(text) {
            let has_search = {
                let session = self.sessions.entry(chat_id).await;
                session.as_ref().is_some_and(|s| !s.last_search_text.is_empty())
            };
            if has_search {
                return self.goto_page(chat_id, None, page).await;
            }
            // Without a prior search the page phrasing is just another query.
        }

        self.fresh_search(chat_id, text).await
    }

    async fn fresh_search(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.typing(chat_id).await;

        let response = match self.intent.detect_intent(chat_id, text, Some(1)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "intent request failed");
                return self.chat.send_message(chat_id, SEARCH_ERROR, false, None).await;
            }
        };
        if response.is_empty() {
            return self.chat.send_message(chat_id, SEARCH_ERROR, false, None).await;
        }

        let response_text = response.joined_text();
        let hotels = parse_hotel_list(&response_text);
        if hotels.is_empty() {
            // Not a listing reply; forward the agent's own words.
            let reply = if response_text.trim().is_empty() {
                FALLBACK_REPLY
            } else {
                response_text.as_str()
            };
            return self.chat.send_message(chat_id, reply, false, None).await;
        }

        let count = hotels.len();
        let card = render::hotel_card(&hotels[0], 0, count, 1, None);
        {
            let mut session = self.sessions.entry(chat_id).await;
            *session = Some(UserSession::new(hotels, 1, text.to_string()));
        }

        self.send_card(chat_id, &card).await?;
        self.chat
            .send_message(
                chat_id,
                &format!(
                    "✅ Найдено {count} отелей на этой странице\n\n\
                     👆 Используйте кнопки для навигации или напишите \"покажи страницу X\""
                ),
                false,
                None,
            )
            .await
    }

    async fn select_hotel(
        &self,
        chat_id: i64,
        message_id: i64,
        index: usize,
    ) -> Result<(), TelegramError> {
        let card = {
            let mut session = self.sessions.entry(chat_id).await;
            let Some(session) = session.as_mut() else {
                return Ok(());
            };
            if index >= session.hotels.len() {
                // Stale keyboard from a replaced list.
                tracing::debug!(chat_id, index, "hotel index out of range, ignoring");
                return Ok(());
            }
            session.current_hotel_index = index;
            render::hotel_card(
                &session.hotels[index],
                index,
                session.hotels.len(),
                session.current_page,
                None,
            )
        };
        self.edit_or_send_card(chat_id, message_id, &card).await
    }

    async fn goto_page(
        &self,
        chat_id: i64,
        source_message: Option<i64>,
        page: u32,
    ) -> Result<(), TelegramError> {
        self.typing(chat_id).await;

        let search_text = {
            let session = self.sessions.entry(chat_id).await;
            session.as_ref().map(|s| s.last_search_text.clone())
        }
        .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string());

        let response = match self
            .intent
            .detect_intent(chat_id, &search_text, Some(page))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(chat_id, page, error = %e, "page fetch failed");
                return self
                    .chat
                    .send_message(
                        chat_id,
                        &format!("❌ Ошибка загрузки страницы {page}. Попробуйте еще раз."),
                        false,
                        None,
                    )
                    .await;
            }
        };

        let hotels = parse_hotel_list(&response.joined_text());
        if hotels.is_empty() {
            // Out-of-range page: prior session stays untouched.
            return self
                .chat
                .send_message(
                    chat_id,
                    &format!("❌ На странице {page} отели не найдены"),
                    false,
                    None,
                )
                .await;
        }

        let count = hotels.len();
        let card = render::hotel_card(&hotels[0], 0, count, page, None);
        {
            let mut session = self.sessions.entry(chat_id).await;
            match session.as_mut() {
                Some(session) => {
                    session.hotels = hotels;
                    session.current_hotel_index = 0;
                    session.current_page = page;
                }
                None => *session = Some(UserSession::new(hotels, page, search_text)),
            }
        }

        match source_message {
            Some(message_id) => self.edit_or_send_card(chat_id, message_id, &card).await?,
            None => self.send_card(chat_id, &card).await?,
        }
        self.chat
            .send_message(
                chat_id,
                &format!("✅ Страница {page} - найдено {count} отелей"),
                false,
                None,
            )
            .await
    }

    async fn back_to_list(&self, chat_id: i64) -> Result<(), TelegramError> {
        let current = {
            let session = self.sessions.entry(chat_id).await;
            session.as_ref().and_then(|s| {
                let hotel = s.hotels.get(s.current_hotel_index)?;
                Some((
                    render::hotel_card(
                        hotel,
                        s.current_hotel_index,
                        s.hotels.len(),
                        s.current_page,
                        None,
                    ),
                    s.current_page,
                ))
            })
        };

        match current {
            Some((card, page)) => {
                self.send_card(chat_id, &card).await?;
                self.chat
                    .send_message(
                        chat_id,
                        &format!("↩️ Вы вернулись к списку отелей (стр. {page})"),
                        false,
                        None,
                    )
                    .await
            }
            None => {
                let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::new(
                    render::NEW_SEARCH_BUTTON,
                    "new_search",
                )]]);
                self.chat
                    .send_message(chat_id, LIST_NOT_FOUND, false, Some(keyboard))
                    .await
            }
        }
    }

    async fn show_detail(&self, chat_id: i64, hotel_id: &str) -> Result<(), TelegramError> {
        self.typing(chat_id).await;

        let query = format!("покажи подробнее об отеле {hotel_id}");
        let response = match self.intent.detect_intent(chat_id, &query, None).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(chat_id, hotel_id, error = %e, "detail fetch failed");
                return self.chat.send_message(chat_id, DETAIL_ERROR, false, None).await;
            }
        };
        if response.is_empty() {
            return self.chat.send_message(chat_id, DETAIL_EMPTY, false, None).await;
        }

        let raw = response.joined_text();
        let detail = parse_hotel_detail(&raw);
        let has_list = {
            let session = self.sessions.entry(chat_id).await;
            session.as_ref().is_some_and(|s| !s.hotels.is_empty())
        };
        let message = render::detail_message(&detail, &raw, hotel_id, has_list);

        if let Some(photo) = &message.photo {
            match self
                .chat
                .send_photo(chat_id, photo, &message.text, Some(message.keyboard.clone()))
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(chat_id, error = %e, "detail photo send failed, sending text")
                }
            }
            let text = format!("{}\n\n📷 Фото: {photo}", message.text);
            return self
                .chat
                .send_message(chat_id, &text, true, Some(message.keyboard))
                .await;
        }
        self.chat
            .send_message(chat_id, &message.text, true, Some(message.keyboard))
            .await
    }

    async fn new_search(&self, chat_id: i64) -> Result<(), TelegramError> {
        {
            let mut session = self.sessions.entry(chat_id).await;
            *session = None;
        }
        self.sessions.remove(chat_id);
        self.chat
            .send_message(chat_id, NEW_SEARCH_PROMPT, true, None)
            .await
    }

    /// Typing indicator is best effort.
    async fn typing(&self, chat_id: i64) {
        if let Err(e) = self.chat.send_typing(chat_id).await {
            tracing::warn!(chat_id, error = %e, "failed to send typing action");
        }
    }

    /// Sends a hotel card, preferring a photo message and degrading to text
    /// when the photo cannot be sent.
    async fn send_card(&self, chat_id: i64, card: &HotelCard) -> Result<(), TelegramError> {
        if !card.photo.starts_with("http") {
            return self
                .chat
                .send_message(chat_id, &card.caption, true, Some(card.keyboard.clone()))
                .await;
        }
        match self
            .chat
            .send_photo(chat_id, &card.photo, &card.caption, Some(card.keyboard.clone()))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "photo send failed, falling back to text");
                let text = format!("🏨 {}\n\n📷 Фото: {}", card.caption, card.photo);
                self.chat
                    .send_message(chat_id, &text, true, Some(card.keyboard.clone()))
                    .await
            }
        }
    }

    /// Edits the card message in place, falling back to a fresh card when the
    /// edit is rejected (e.g. the message is too old).
    async fn edit_or_send_card(
        &self,
        chat_id: i64,
        message_id: i64,
        card: &HotelCard,
    ) -> Result<(), TelegramError> {
        match self
            .chat
            .edit_message_photo(
                chat_id,
                message_id,
                &card.photo,
                &card.caption,
                Some(card.keyboard.clone()),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(chat_id, message_id, error = %e, "edit failed, sending a new card");
                self.chat
                    .send_photo(chat_id, &card.photo, &card.caption, Some(card.keyboard.clone()))
                    .await
            }
        }
    }
}
